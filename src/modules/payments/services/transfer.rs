use crate::config::PakaiLinkConfig;
use crate::core::Result;
use crate::modules::callbacks::models::CallbackType;
use crate::modules::gateway::ApiClient;
use crate::modules::payments::models::{generate_reference_no, TransferToBank};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Disbursements to bank accounts
pub struct TransferService {
    client: Arc<ApiClient>,
    inquiry_endpoint: String,
    transfer_endpoint: String,
    status_endpoint: String,
    callback_url: String,
}

impl TransferService {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            client,
            inquiry_endpoint: config.endpoints.transfer_inquiry.clone(),
            transfer_endpoint: config.endpoints.transfer_to_bank.clone(),
            status_endpoint: config.endpoints.transfer_status.clone(),
            callback_url: config.callback_url(CallbackType::Transfer.route_segment()),
        }
    }

    /// Resolve the beneficiary name; the response carries the session id for the transfer
    pub async fn inquiry_account(&self, request: &TransferToBank) -> Result<Value> {
        info!(
            bank_code = %request.beneficiary_bank_code,
            bank = request.bank().map(|b| b.label()).unwrap_or("unknown"),
            "Inquiring bank account"
        );

        let response = self
            .client
            .post(&self.inquiry_endpoint, &request.to_inquiry_payload())
            .await?;

        info!(
            account_name = response["beneficiaryAccountName"].as_str().unwrap_or("unknown"),
            "Bank account inquiry successful"
        );
        Ok(response)
    }

    pub async fn transfer_to_bank(&self, request: &TransferToBank) -> Result<Value> {
        info!(
            bank_code = %request.beneficiary_bank_code,
            bank = request.bank().map(|b| b.label()).unwrap_or("unknown"),
            amount = %request.amount,
            "Transferring to bank"
        );

        let response = self
            .client
            .post(&self.transfer_endpoint, &request.to_payload(&self.callback_url))
            .await
            .inspect_err(|e| error!(error = %e, "Bank transfer failed"))?;

        info!(
            reference_no = response["referenceNo"].as_str().unwrap_or_default(),
            "Bank transfer submitted"
        );
        Ok(response)
    }

    pub async fn inquiry_status(&self, original_partner_reference_no: &str) -> Result<Value> {
        debug!(partner_reference_no = original_partner_reference_no, "Inquiring transfer status");

        self.client
            .post(
                &self.status_endpoint,
                &json!({ "originalPartnerReferenceNo": original_partner_reference_no }),
            )
            .await
    }

    pub fn generate_reference_no(&self) -> String {
        generate_reference_no("TRF", 8)
    }
}
