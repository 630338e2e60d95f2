use crate::config::PakaiLinkConfig;
use crate::core::Result;
use crate::modules::gateway::ApiClient;
use crate::modules::payments::models::random_reference;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Sub-merchant onboarding for QRIS and DANA
///
/// `merchant_data` and `owner_data` are passed through untouched; their
/// shape is defined by the provider's registration forms.
pub struct MerchantService {
    client: Arc<ApiClient>,
    qris_endpoint: String,
    dana_endpoint: String,
}

impl MerchantService {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            client,
            qris_endpoint: config.endpoints.merchant_qris_registration.clone(),
            dana_endpoint: config.endpoints.merchant_dana_registration.clone(),
        }
    }

    pub async fn register_qris_merchant(
        &self,
        merchant_data: &Value,
        owner_data: &Value,
        partner_reference_no: Option<&str>,
    ) -> Result<Value> {
        self.register("QRIS", &self.qris_endpoint, merchant_data, owner_data, partner_reference_no)
            .await
    }

    pub async fn register_dana_merchant(
        &self,
        merchant_data: &Value,
        owner_data: &Value,
        partner_reference_no: Option<&str>,
    ) -> Result<Value> {
        self.register("DANA", &self.dana_endpoint, merchant_data, owner_data, partner_reference_no)
            .await
    }

    async fn register(
        &self,
        scheme: &str,
        endpoint: &str,
        merchant_data: &Value,
        owner_data: &Value,
        partner_reference_no: Option<&str>,
    ) -> Result<Value> {
        info!(
            scheme = scheme,
            merchant_name = merchant_data["merchantName"].as_str().unwrap_or_default(),
            "Registering merchant"
        );

        let payload = json!({
            "partnerReferenceNo": partner_reference_no
                .map(str::to_string)
                .unwrap_or_else(|| random_reference(40)),
            "merchantData": merchant_data,
            "ownerData": owner_data,
        });

        let response = self
            .client
            .post(endpoint, &payload)
            .await
            .inspect_err(|e| error!(scheme = scheme, error = %e, "Failed to register merchant"))?;

        info!(
            scheme = scheme,
            merchant_name = response["detailData"]["merchantName"].as_str().unwrap_or_default(),
            "Merchant registered successfully"
        );
        Ok(response)
    }
}
