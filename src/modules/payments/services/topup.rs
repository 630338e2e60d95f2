use crate::config::PakaiLinkConfig;
use crate::core::{Amount, Result};
use crate::modules::callbacks::models::CallbackType;
use crate::modules::gateway::ApiClient;
use crate::modules::payments::models::{generate_reference_no, random_reference, TopupPayment};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// E-wallet top-ups
pub struct TopupService {
    client: Arc<ApiClient>,
    inquiry_endpoint: String,
    topup_endpoint: String,
    status_endpoint: String,
    callback_url: String,
}

impl TopupService {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            client,
            inquiry_endpoint: config.endpoints.topup_inquiry.clone(),
            topup_endpoint: config.endpoints.topup_payment.clone(),
            status_endpoint: config.endpoints.topup_status.clone(),
            callback_url: config.callback_url(CallbackType::Topup.route_segment()),
        }
    }

    /// Look up the wallet holder; the response carries the session id for the top-up
    pub async fn inquiry_customer(
        &self,
        customer_number: &str,
        product_code: &str,
        amount: Decimal,
        partner_reference_no: Option<&str>,
    ) -> Result<Value> {
        info!(customer_number = customer_number, product_code = product_code, "Inquiring top-up customer");

        let payload = json!({
            "partnerReferenceNo": partner_reference_no
                .map(str::to_string)
                .unwrap_or_else(|| random_reference(40)),
            "customerNumber": customer_number,
            "amount": Amount::idr(amount),
            "additionalInfo": { "productCode": product_code },
        });

        let response = self.client.post(&self.inquiry_endpoint, &payload).await?;

        info!(
            customer_name = response["customerName"].as_str().unwrap_or("unknown"),
            "Top-up customer inquiry successful"
        );
        Ok(response)
    }

    pub async fn create_topup(&self, request: &TopupPayment) -> Result<Value> {
        info!(
            product_code = %request.product_code,
            amount = %request.amount,
            "Creating top-up"
        );

        let response = self
            .client
            .post(&self.topup_endpoint, &request.to_payload(&self.callback_url))
            .await
            .inspect_err(|e| error!(error = %e, "Top-up failed"))?;

        info!(
            reference_no = response["referenceNo"].as_str().unwrap_or_default(),
            "Top-up submitted"
        );
        Ok(response)
    }

    pub async fn inquiry_status(&self, original_partner_reference_no: &str) -> Result<Value> {
        debug!(partner_reference_no = original_partner_reference_no, "Inquiring top-up status");

        self.client
            .post(
                &self.status_endpoint,
                &json!({ "originalPartnerReferenceNo": original_partner_reference_no }),
            )
            .await
    }

    pub fn generate_reference_no(&self) -> String {
        generate_reference_no("TOP", 8)
    }
}
