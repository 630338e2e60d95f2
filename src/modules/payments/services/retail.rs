use crate::config::PakaiLinkConfig;
use crate::core::Result;
use crate::modules::callbacks::models::CallbackType;
use crate::modules::gateway::ApiClient;
use crate::modules::payments::models::{generate_reference_no, CreateRetailPayment};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Payment codes redeemable at minimarkets
pub struct RetailService {
    client: Arc<ApiClient>,
    create_endpoint: String,
    status_endpoint: String,
    callback_url: String,
}

impl RetailService {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            client,
            create_endpoint: config.endpoints.retail_create.clone(),
            status_endpoint: config.endpoints.retail_inquiry.clone(),
            callback_url: config.callback_url(CallbackType::Retail.route_segment()),
        }
    }

    pub async fn create_payment(&self, request: &CreateRetailPayment) -> Result<Value> {
        info!(
            amount = %request.amount,
            product_code = %request.product_code,
            "Creating retail payment"
        );

        let response = self
            .client
            .post(&self.create_endpoint, &request.to_payload(&self.callback_url))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create retail payment"))?;

        info!(
            payment_code = response["paymentData"]["paymentCode"].as_str().unwrap_or_default(),
            "Retail payment created"
        );
        Ok(response)
    }

    pub async fn inquiry_status(&self, original_partner_reference_no: &str) -> Result<Value> {
        debug!(partner_reference_no = original_partner_reference_no, "Inquiring retail status");

        self.client
            .post(
                &self.status_endpoint,
                &json!({ "originalPartnerReferenceNo": original_partner_reference_no }),
            )
            .await
    }

    pub fn generate_reference_no(&self) -> String {
        generate_reference_no("RTL", 8)
    }
}
