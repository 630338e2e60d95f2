use crate::config::PakaiLinkConfig;
use crate::core::Result;
use crate::modules::callbacks::models::CallbackType;
use crate::modules::gateway::ApiClient;
use crate::modules::payments::models::{generate_reference_no, GenerateQris};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// QRIS merchant-presented payments
pub struct QrisService {
    client: Arc<ApiClient>,
    generate_endpoint: String,
    status_endpoint: String,
    callback_url: String,
}

impl QrisService {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            client,
            generate_endpoint: config.endpoints.qris_generate.clone(),
            status_endpoint: config.endpoints.qris_inquiry.clone(),
            callback_url: config.callback_url(CallbackType::Qris.route_segment()),
        }
    }

    pub async fn generate(&self, request: &GenerateQris) -> Result<Value> {
        info!(amount = %request.amount, merchant_id = %request.merchant_id, "Generating QRIS");

        let response = self
            .client
            .post(&self.generate_endpoint, &request.to_payload(&self.callback_url))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to generate QRIS"))?;

        info!(
            reference_no = response["referenceNo"].as_str().unwrap_or_default(),
            "QRIS generated successfully"
        );
        Ok(response)
    }

    pub async fn inquiry_status(&self, original_partner_reference_no: &str) -> Result<Value> {
        debug!(partner_reference_no = original_partner_reference_no, "Inquiring QRIS status");

        self.client
            .post(
                &self.status_endpoint,
                &json!({ "originalPartnerReferenceNo": original_partner_reference_no }),
            )
            .await
    }

    pub fn generate_reference_no(&self) -> String {
        generate_reference_no("QRIS", 8)
    }
}
