use crate::config::PakaiLinkConfig;
use crate::core::Result;
use crate::modules::callbacks::models::CallbackType;
use crate::modules::gateway::ApiClient;
use crate::modules::payments::models::{generate_reference_no, CreateVirtualAccount};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Virtual account (bank transfer) payments
pub struct VirtualAccountService {
    client: Arc<ApiClient>,
    create_endpoint: String,
    status_endpoint: String,
    callback_url: String,
}

impl VirtualAccountService {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            client,
            create_endpoint: config.endpoints.va_create.clone(),
            status_endpoint: config.endpoints.va_inquiry_status.clone(),
            callback_url: config.callback_url(CallbackType::VirtualAccount.route_segment()),
        }
    }

    /// Create a VA; fields of `virtualAccountData` are lifted to the top level
    pub async fn create(&self, request: &CreateVirtualAccount) -> Result<Value> {
        info!(amount = %request.amount, bank_code = %request.bank_code, "Creating Virtual Account");

        let payload = request.to_payload(&self.callback_url);
        let mut response = self
            .client
            .post(&self.create_endpoint, &payload)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create Virtual Account"))?;

        if let Some(Value::Object(va_data)) = response.get("virtualAccountData").cloned() {
            if let Value::Object(top) = &mut response {
                for (key, value) in va_data {
                    top.insert(key, value);
                }
            }
        }

        info!(
            va_number = response["virtualAccountNo"].as_str().unwrap_or_default(),
            reference_no = response["partnerReferenceNo"].as_str().unwrap_or_default(),
            "Virtual Account created successfully"
        );

        Ok(response)
    }

    pub async fn inquiry_status(&self, original_partner_reference_no: &str) -> Result<Value> {
        debug!(partner_reference_no = original_partner_reference_no, "Inquiring VA status");

        let response = self
            .client
            .post(
                &self.status_endpoint,
                &json!({ "originalPartnerReferenceNo": original_partner_reference_no }),
            )
            .await?;

        info!(
            status = response["latestTransactionStatus"].as_str().unwrap_or("unknown"),
            "VA status inquiry successful"
        );
        Ok(response)
    }

    pub fn generate_reference_no(&self) -> String {
        generate_reference_no("VA", 8)
    }
}
