use crate::core::timezone::{format_snap_timestamp, snap_timestamp_after, utc_to_jakarta};
use crate::core::Amount;
use super::BankCode;
use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

/// `<PREFIX>-YYYYmmddHHMMSS-<suffix_len upper alnum>` in Jakarta time
pub fn generate_reference_no(prefix: &str, suffix_len: usize) -> String {
    let stamp = utc_to_jakarta(Utc::now()).format("%Y%m%d%H%M%S");
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(suffix_len)
        .map(char::from)
        .collect();
    format!("{}-{}-{}", prefix, stamp, suffix.to_uppercase())
}

/// Random mixed-case alphanumeric reference for inquiry calls
pub fn random_reference(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn snap_date_or(value: Option<DateTime<Utc>>, default_after: Duration) -> String {
    match value {
        Some(at) => format_snap_timestamp(at),
        None => snap_timestamp_after(default_after),
    }
}

/// Defaults first, caller-provided `additionalInfo` keys override them
fn merge_additional_info(defaults: Value, extra: &Map<String, Value>) -> Value {
    let mut merged = match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in extra {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

fn amount_json(amount: Decimal) -> Value {
    json!(Amount::idr(amount))
}

/// Input for creating a virtual account
#[derive(Debug, Clone, Default)]
pub struct CreateVirtualAccount {
    pub amount: Decimal,
    pub customer_name: String,
    pub bank_code: String,
    pub customer_no: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
    pub partner_reference_no: Option<String>,
    pub additional_info: Map<String, Value>,
}

impl CreateVirtualAccount {
    pub fn with_bank(mut self, bank: BankCode) -> Self {
        self.bank_code = bank.into();
        self
    }

    /// Typed bank, when the code is a known one
    pub fn bank(&self) -> Option<BankCode> {
        self.bank_code.parse().ok()
    }

    pub fn to_payload(&self, callback_url: &str) -> Value {
        let reference = self
            .partner_reference_no
            .clone()
            .unwrap_or_else(|| generate_reference_no("VA", 8));
        let customer_no = self.customer_no.clone().unwrap_or_else(|| {
            let skip = reference.chars().count().saturating_sub(15);
            reference.chars().skip(skip).collect()
        });

        json!({
            "partnerReferenceNo": reference,
            "customerNo": customer_no,
            "virtualAccountName": self.customer_name,
            "virtualAccountPhone": self.phone,
            "virtualAccountEmail": self.email,
            "expiredDate": snap_date_or(self.expired_at, Duration::hours(24)),
            "totalAmount": amount_json(self.amount),
            "additionalInfo": merge_additional_info(
                json!({ "callbackUrl": callback_url, "bankCode": self.bank_code }),
                &self.additional_info,
            ),
        })
    }
}

/// Input for generating a dynamic QRIS
#[derive(Debug, Clone, Default)]
pub struct GenerateQris {
    pub merchant_id: String,
    pub amount: Decimal,
    pub partner_reference_no: Option<String>,
    pub store_id: Option<String>,
    pub terminal_id: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub additional_info: Map<String, Value>,
}

impl GenerateQris {
    pub fn to_payload(&self, callback_url: &str) -> Value {
        json!({
            "merchantId": self.merchant_id,
            "storeId": self.store_id.as_deref().unwrap_or("PAKAILINK"),
            "terminalId": self
                .terminal_id
                .clone()
                .unwrap_or_else(|| format!("ID{}", Utc::now().timestamp())),
            "partnerReferenceNo": self
                .partner_reference_no
                .clone()
                .unwrap_or_else(|| generate_reference_no("QRIS", 8)),
            "amount": amount_json(self.amount),
            "validityPeriod": snap_date_or(self.valid_until, Duration::hours(1)),
            "additionalInfo": merge_additional_info(
                json!({ "callbackUrl": callback_url }),
                &self.additional_info,
            ),
        })
    }
}

/// Input for an e-wallet payment
#[derive(Debug, Clone, Default)]
pub struct CreateEmoneyPayment {
    pub amount: Decimal,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub product_code: String,
    pub emoney_phone: String,
    pub partner_reference_no: Option<String>,
    pub customer_email: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
    pub bill_title: Option<String>,
    pub additional_info: Map<String, Value>,
}

impl CreateEmoneyPayment {
    pub fn to_payload(&self, callback_url: &str) -> Value {
        json!({
            "partnerReferenceNo": self
                .partner_reference_no
                .clone()
                .unwrap_or_else(|| generate_reference_no("EMY", 8)),
            "customerId": self.customer_id,
            "customerName": self.customer_name,
            "customerPhone": self.customer_phone,
            "customerEmail": self.customer_email,
            "expiredDate": snap_date_or(self.expired_at, Duration::hours(24)),
            "totalAmount": amount_json(self.amount),
            "additionalInfo": merge_additional_info(
                json!({
                    "productCode": self.product_code,
                    "emoneyPhone": self.emoney_phone,
                    "billTitle": self.bill_title.as_deref().unwrap_or("Payment Order"),
                    "callbackUrl": callback_url,
                }),
                &self.additional_info,
            ),
        })
    }
}

/// Input for a modern retail (minimarket) payment code
#[derive(Debug, Clone, Default)]
pub struct CreateRetailPayment {
    pub amount: Decimal,
    pub customer_id: String,
    pub customer_name: String,
    pub product_code: String,
    pub partner_reference_no: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
    pub remark: Option<String>,
    pub additional_info: Map<String, Value>,
}

impl CreateRetailPayment {
    pub fn to_payload(&self, callback_url: &str) -> Value {
        json!({
            "partnerReferenceNo": self
                .partner_reference_no
                .clone()
                .unwrap_or_else(|| generate_reference_no("RTL", 8)),
            "customerId": self.customer_id,
            "customerName": self.customer_name,
            "customerPhone": self.customer_phone,
            "customerEmail": self.customer_email,
            "expiredDate": snap_date_or(self.expired_at, Duration::hours(24)),
            "totalAmount": amount_json(self.amount),
            "additionalInfo": merge_additional_info(
                json!({
                    "productCode": self.product_code,
                    "remark": self.remark.as_deref().unwrap_or_default(),
                    "callbackUrl": callback_url,
                }),
                &self.additional_info,
            ),
        })
    }
}

/// Input for a disbursement to a bank account
#[derive(Debug, Clone, Default)]
pub struct TransferToBank {
    pub beneficiary_bank_code: String,
    pub beneficiary_account_number: String,
    pub amount: Decimal,
    pub partner_reference_no: Option<String>,
    /// Session id returned by the account inquiry
    pub session_id: Option<String>,
    pub remark: Option<String>,
    pub additional_info: Map<String, Value>,
}

impl TransferToBank {
    pub fn with_bank(mut self, bank: BankCode) -> Self {
        self.beneficiary_bank_code = bank.into();
        self
    }

    /// Typed beneficiary bank, when the code is a known one
    pub fn bank(&self) -> Option<BankCode> {
        self.beneficiary_bank_code.parse().ok()
    }

    fn reference(&self) -> String {
        self.partner_reference_no
            .clone()
            .unwrap_or_else(|| generate_reference_no("TRF", 8))
    }

    /// Body for the bank account inquiry that precedes a transfer
    pub fn to_inquiry_payload(&self) -> Value {
        json!({
            "partnerReferenceNo": self.reference(),
            "beneficiaryAccountNumber": self.beneficiary_account_number,
            "amount": amount_json(self.amount),
            "additionalInfo": {
                "beneficiaryBankCode": self.beneficiary_bank_code,
            },
        })
    }

    pub fn to_payload(&self, callback_url: &str) -> Value {
        let session_id = self.session_id.clone().unwrap_or_else(|| {
            format!("INQ{:07}", rand::rng().random_range(1..=9_999_999u32))
        });

        json!({
            "partnerReferenceNo": self.reference(),
            "beneficiaryAccountNumber": self.beneficiary_account_number,
            "beneficiaryBankCode": self.beneficiary_bank_code,
            "sessionId": session_id,
            "amount": amount_json(self.amount),
            "additionalInfo": merge_additional_info(
                json!({
                    "callbackUrl": callback_url,
                    "remark": self.remark.as_deref().unwrap_or_default(),
                }),
                &self.additional_info,
            ),
        })
    }
}

/// Input for an e-wallet top-up
#[derive(Debug, Clone, Default)]
pub struct TopupPayment {
    pub amount: Decimal,
    pub customer_number: String,
    pub product_code: String,
    /// Session id returned by the customer inquiry
    pub session_id: String,
    pub partner_reference_no: Option<String>,
    pub additional_info: Map<String, Value>,
}

impl TopupPayment {
    pub fn to_payload(&self, callback_url: &str) -> Value {
        json!({
            "partnerReferenceNo": self
                .partner_reference_no
                .clone()
                .unwrap_or_else(|| generate_reference_no("TOP", 8)),
            "customerNumber": self.customer_number,
            "productCode": self.product_code,
            "sessionId": self.session_id,
            "amount": amount_json(self.amount),
            "additionalInfo": merge_additional_info(
                json!({ "callbackUrl": callback_url }),
                &self.additional_info,
            ),
        })
    }
}
