use crate::config::PakaiLinkConfig;
use crate::core::Result;
use crate::modules::callbacks::models::CallbackType;
use crate::modules::gateway::ApiClient;
use crate::modules::payments::models::{generate_reference_no, CreateEmoneyPayment};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// E-wallet payments (OVO, DANA, ShopeePay, ...)
pub struct EmoneyService {
    client: Arc<ApiClient>,
    create_endpoint: String,
    status_endpoint: String,
    callback_url: String,
}

impl EmoneyService {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            client,
            create_endpoint: config.endpoints.emoney_create.clone(),
            status_endpoint: config.endpoints.emoney_inquiry.clone(),
            callback_url: config.callback_url(CallbackType::Emoney.route_segment()),
        }
    }

    pub async fn create_payment(&self, request: &CreateEmoneyPayment) -> Result<Value> {
        info!(
            amount = %request.amount,
            product_code = %request.product_code,
            "Creating e-money payment"
        );

        let response = self
            .client
            .post(&self.create_endpoint, &request.to_payload(&self.callback_url))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create e-money payment"))?;

        info!(
            reference_no = response["referenceNo"].as_str().unwrap_or_default(),
            "E-money payment created"
        );
        Ok(response)
    }

    pub async fn inquiry_status(&self, original_partner_reference_no: &str) -> Result<Value> {
        debug!(partner_reference_no = original_partner_reference_no, "Inquiring e-money status");

        self.client
            .post(
                &self.status_endpoint,
                &json!({ "originalPartnerReferenceNo": original_partner_reference_no }),
            )
            .await
    }

    pub fn generate_reference_no(&self) -> String {
        generate_reference_no("EMY", 8)
    }
}
