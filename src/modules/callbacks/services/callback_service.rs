use super::event_bus::EventPublisher;
use crate::core::{AppError, Result};
use crate::modules::callbacks::models::{
    CallbackPayload, CallbackReceived, CallbackResponse, CallbackType, PaymentEvent,
};
use crate::modules::signature::SignatureService;
use actix_web::http::StatusCode;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

pub const CODE_SUCCESS: &str = "2000000";
pub const CODE_BAD_REQUEST: &str = "4000000";
pub const CODE_MISSING_HEADER: &str = "4010000";
pub const CODE_INVALID_SIGNATURE: &str = "4010001";
pub const CODE_INTERNAL_ERROR: &str = "5000000";

/// Verifies inbound callbacks and turns them into payment events
///
/// Pipeline per callback: headers present -> signature over the raw bytes ->
/// decode into the typed record -> publish. A failure at any stage stops the
/// pipeline before the next one runs.
pub struct CallbackService {
    signer: Arc<SignatureService>,
    publisher: Arc<dyn EventPublisher>,
}

impl CallbackService {
    pub fn new(signer: Arc<SignatureService>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { signer, publisher }
    }

    /// Verify, decode and publish one callback, returning the typed event
    ///
    /// `raw_body` must be the bytes exactly as received; the signature is
    /// checked against them, never against a re-encoded copy.
    pub fn handle_callback(
        &self,
        kind: CallbackType,
        raw_body: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> Result<PaymentEvent> {
        let (signature, timestamp) = match (non_empty(signature), non_empty(timestamp)) {
            (Some(signature), Some(timestamp)) => (signature, timestamp),
            (signature, _) => {
                let missing = if signature.is_none() {
                    "X-SIGNATURE"
                } else {
                    "X-TIMESTAMP"
                };
                error!(callback_type = %kind, header = missing, "Callback rejected, missing header");
                return Err(AppError::MissingHeader(missing.to_string()));
            }
        };

        let payload: Option<Value> = serde_json::from_slice(raw_body).ok();
        self.publish_audit(kind, payload.as_ref(), signature, false);

        if !self
            .signer
            .verify_callback_signature(signature, raw_body, timestamp)
        {
            error!(
                callback_type = %kind,
                timestamp = timestamp,
                "Invalid callback signature"
            );
            return Err(AppError::InvalidSignature);
        }

        self.publish_audit(kind, payload.as_ref(), signature, true);
        info!(callback_type = %kind, "Callback signature validated");

        let payload = payload.ok_or_else(|| {
            AppError::MalformedBody(format!("{} callback body is not valid JSON", kind))
        })?;
        let record = CallbackPayload::parse(kind, &payload)?;

        info!(
            callback_type = %kind,
            partner_reference_no = record.partner_reference_no(),
            amount = %record.amount_value(),
            status = record.status_code(),
            "Callback processed"
        );

        let event = PaymentEvent::from_callback(record, payload);
        self.publisher.publish(event.clone());

        Ok(event)
    }

    fn publish_audit(&self, kind: CallbackType, payload: Option<&Value>, signature: &str, is_valid: bool) {
        self.publisher
            .publish(PaymentEvent::CallbackReceived(CallbackReceived {
                callback_type: kind,
                payload: payload.cloned().unwrap_or(Value::Null),
                is_valid,
                signature: Some(signature.to_string()),
                received_at: Utc::now(),
            }));
    }
}

/// HTTP status and provider envelope for a failed callback
pub fn error_response(
    err: &AppError,
    kind: CallbackType,
    raw_body: &[u8],
) -> (StatusCode, CallbackResponse) {
    let reference = serde_json::from_slice::<Value>(raw_body)
        .ok()
        .and_then(|payload| kind.reference_in(&payload));

    let (status, code, message) = match err {
        AppError::MissingHeader(_) => (
            StatusCode::UNAUTHORIZED,
            CODE_MISSING_HEADER,
            "Invalid signature or timestamp".to_string(),
        ),
        AppError::InvalidSignature => (
            StatusCode::UNAUTHORIZED,
            CODE_INVALID_SIGNATURE,
            "Signature verification failed".to_string(),
        ),
        AppError::MalformedBody(_) | AppError::Validation(_) | AppError::Json(_) => {
            (StatusCode::BAD_REQUEST, CODE_BAD_REQUEST, err.to_string())
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            CODE_INTERNAL_ERROR,
            "Internal server error".to_string(),
        ),
    };

    (status, CallbackResponse::error(code, message, reference))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
