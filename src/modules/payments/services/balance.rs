use crate::config::PakaiLinkConfig;
use crate::core::Result;
use crate::modules::gateway::ApiClient;
use crate::modules::payments::models::random_reference;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Merchant account balance and mutations
pub struct BalanceService {
    client: Arc<ApiClient>,
    inquiry_endpoint: String,
    history_endpoint: String,
    account_no: Option<String>,
}

impl BalanceService {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            client,
            inquiry_endpoint: config.endpoints.balance_inquiry.clone(),
            history_endpoint: config.endpoints.balance_history.clone(),
            account_no: config.account_no.clone(),
        }
    }

    /// `account_no` falls back to the configured merchant account
    pub async fn inquiry(&self, balance_types: &[&str], account_no: Option<&str>) -> Result<Value> {
        let account_no = account_no.or(self.account_no.as_deref());
        debug!(balance_types = ?balance_types, account_no = ?account_no, "Inquiring balance");

        let mut payload = json!({
            "partnerReferenceNo": random_reference(40),
            "balanceTypes": balance_types,
        });
        if let Some(account_no) = account_no {
            payload["accountNo"] = json!(account_no);
        }

        let response = self.client.post(&self.inquiry_endpoint, &payload).await?;
        info!("Balance inquiry successful");
        Ok(response)
    }

    /// Page through mutations between two SNAP timestamps
    pub async fn history(
        &self,
        from_date_time: &str,
        to_date_time: &str,
        page_size: u32,
        page_number: u32,
    ) -> Result<Value> {
        debug!(from = from_date_time, to = to_date_time, page = page_number, "Fetching balance history");

        let response = self
            .client
            .post(
                &self.history_endpoint,
                &json!({
                    "partnerReferenceNo": random_reference(40),
                    "fromDateTime": from_date_time,
                    "toDateTime": to_date_time,
                    "pageSize": page_size.to_string(),
                    "pageNumber": page_number.to_string(),
                }),
            )
            .await?;

        info!(
            records = response["detailData"].as_array().map(Vec::len).unwrap_or_default(),
            "Balance history retrieved"
        );
        Ok(response)
    }
}
