use super::callback_data::{
    CallbackPayload, CallbackType, EmoneyCallback, QrisCallback, RetailCallback, TopupCallback,
    TransferCallback, VirtualAccountCallback,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Audit record published around signature verification
///
/// Sent once with `is_valid = false` when a callback arrives and once more
/// with `is_valid = true` after its signature checks out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackReceived {
    pub callback_type: CallbackType,
    pub payload: Value,
    pub is_valid: bool,
    pub signature: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Domain events emitted by the callback pipeline
///
/// Typed variants carry the decoded record plus the original JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PaymentEvent {
    CallbackReceived(CallbackReceived),
    VirtualAccountPaid {
        data: VirtualAccountCallback,
        payload: Value,
    },
    QrisPaymentReceived {
        data: QrisCallback,
        payload: Value,
    },
    EmoneyPaymentReceived {
        data: EmoneyCallback,
        payload: Value,
    },
    TransferCompleted {
        data: TransferCallback,
        payload: Value,
    },
    RetailPaymentReceived {
        data: RetailCallback,
        payload: Value,
    },
    TopupCompleted {
        data: TopupCallback,
        payload: Value,
    },
}

impl PaymentEvent {
    /// Typed event for a verified, decoded callback
    pub fn from_callback(record: CallbackPayload, payload: Value) -> Self {
        match record {
            CallbackPayload::VirtualAccount(data) => PaymentEvent::VirtualAccountPaid { data, payload },
            CallbackPayload::Qris(data) => PaymentEvent::QrisPaymentReceived { data, payload },
            CallbackPayload::Emoney(data) => PaymentEvent::EmoneyPaymentReceived { data, payload },
            CallbackPayload::Transfer(data) => PaymentEvent::TransferCompleted { data, payload },
            CallbackPayload::Retail(data) => PaymentEvent::RetailPaymentReceived { data, payload },
            CallbackPayload::Topup(data) => PaymentEvent::TopupCompleted { data, payload },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaymentEvent::CallbackReceived(_) => "callback_received",
            PaymentEvent::VirtualAccountPaid { .. } => "virtual_account_paid",
            PaymentEvent::QrisPaymentReceived { .. } => "qris_payment_received",
            PaymentEvent::EmoneyPaymentReceived { .. } => "emoney_payment_received",
            PaymentEvent::TransferCompleted { .. } => "transfer_completed",
            PaymentEvent::RetailPaymentReceived { .. } => "retail_payment_received",
            PaymentEvent::TopupCompleted { .. } => "topup_completed",
        }
    }

    /// Decoded record, `None` for the audit event
    pub fn record(&self) -> Option<CallbackPayload> {
        let record = match self {
            PaymentEvent::CallbackReceived(_) => return None,
            PaymentEvent::VirtualAccountPaid { data, .. } => {
                CallbackPayload::VirtualAccount(data.clone())
            }
            PaymentEvent::QrisPaymentReceived { data, .. } => CallbackPayload::Qris(data.clone()),
            PaymentEvent::EmoneyPaymentReceived { data, .. } => {
                CallbackPayload::Emoney(data.clone())
            }
            PaymentEvent::TransferCompleted { data, .. } => CallbackPayload::Transfer(data.clone()),
            PaymentEvent::RetailPaymentReceived { data, .. } => {
                CallbackPayload::Retail(data.clone())
            }
            PaymentEvent::TopupCompleted { data, .. } => CallbackPayload::Topup(data.clone()),
        };
        Some(record)
    }

    /// Original JSON body of the callback
    pub fn payload(&self) -> &Value {
        match self {
            PaymentEvent::CallbackReceived(audit) => &audit.payload,
            PaymentEvent::VirtualAccountPaid { payload, .. }
            | PaymentEvent::QrisPaymentReceived { payload, .. }
            | PaymentEvent::EmoneyPaymentReceived { payload, .. }
            | PaymentEvent::TransferCompleted { payload, .. }
            | PaymentEvent::RetailPaymentReceived { payload, .. }
            | PaymentEvent::TopupCompleted { payload, .. } => payload,
        }
    }
}
