use crate::core::{AppError, Amount, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Callback kinds PakaiLink posts to the receiver, one route each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackType {
    VirtualAccount,
    Qris,
    Emoney,
    Transfer,
    Retail,
    Topup,
}

impl CallbackType {
    pub const ALL: [CallbackType; 6] = [
        CallbackType::VirtualAccount,
        CallbackType::Qris,
        CallbackType::Emoney,
        CallbackType::Transfer,
        CallbackType::Retail,
        CallbackType::Topup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackType::VirtualAccount => "virtual_account",
            CallbackType::Qris => "qris",
            CallbackType::Emoney => "emoney",
            CallbackType::Transfer => "transfer",
            CallbackType::Retail => "retail",
            CallbackType::Topup => "topup",
        }
    }

    /// Path segment under the callback prefix
    pub fn route_segment(&self) -> &'static str {
        match self {
            CallbackType::VirtualAccount => "virtual-account",
            other => other.as_str(),
        }
    }

    pub fn from_route_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.route_segment() == segment)
    }

    /// Best-effort partner reference lookup on an unverified or unparsed body
    pub fn reference_in(&self, payload: &Value) -> Option<String> {
        let lookup = |source: &Value, field: &str| {
            source
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        match self {
            CallbackType::Qris | CallbackType::Emoney => {
                lookup(payload, "originalPartnerReferenceNo")
            }
            CallbackType::Retail | CallbackType::Topup => payload
                .get("transactionData")
                .and_then(|nested| lookup(nested, "partnerReferenceNo"))
                .or_else(|| lookup(payload, "partnerReferenceNo")),
            CallbackType::VirtualAccount | CallbackType::Transfer => {
                lookup(payload, "partnerReferenceNo")
            }
        }
    }
}

impl fmt::Display for CallbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CallbackType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.route_segment() == s)
            .ok_or_else(|| format!("Unknown callback type: {}", s))
    }
}

/// Outcome of a two-digit provider status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Pending,
    Failed,
}

impl TransactionStatus {
    /// `"00"` success, `"01"` pending, anything else failed
    pub fn from_code(code: &str) -> Self {
        match code {
            "00" => TransactionStatus::Success,
            "01" => TransactionStatus::Pending,
            _ => TransactionStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == TransactionStatus::Success
    }

    pub fn is_pending(&self) -> bool {
        *self == TransactionStatus::Pending
    }

    pub fn is_failed(&self) -> bool {
        *self == TransactionStatus::Failed
    }
}

/// Treat an explicit JSON `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_amount<'de, D>(deserializer: D) -> std::result::Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Amount>::deserialize(deserializer)?.unwrap_or_else(empty_amount))
}

fn empty_amount() -> Amount {
    Amount {
        value: String::new(),
        currency: "IDR".to_string(),
    }
}

fn default_callback_type() -> String {
    "settlement".to_string()
}

fn nullable_callback_type<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_callback_type))
}

fn nested_decimal(map: &Map<String, Value>, path: &[&str]) -> Option<Decimal> {
    let (last, parents) = path.split_last()?;
    let mut current = map;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }

    match current.get(*last)? {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn nested_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn currency_of(amount: &Amount) -> &str {
    if amount.currency.is_empty() {
        "IDR"
    } else {
        &amount.currency
    }
}

/// Virtual account payment notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualAccountCallback {
    #[serde(default, deserialize_with = "nullable")]
    pub partner_service_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub virtual_account_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub virtual_account_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub partner_reference_no: String,
    #[serde(default = "empty_amount", deserialize_with = "nullable_amount")]
    pub amount: Amount,
    #[serde(default, deserialize_with = "nullable")]
    pub latest_transaction_status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub transaction_status_desc: String,
    #[serde(default)]
    pub inquiry_request_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Map<String, Value>,
    #[serde(default)]
    pub trx_date_time: Option<String>,
    #[serde(default)]
    pub payment_flag_reason: Option<Value>,
}

impl VirtualAccountCallback {
    pub fn status(&self) -> TransactionStatus {
        TransactionStatus::from_code(&self.latest_transaction_status)
    }

    pub fn amount_value(&self) -> Decimal {
        self.amount.decimal_value()
    }

    pub fn currency(&self) -> &str {
        currency_of(&self.amount)
    }

    /// Paying bank, from `additionalInfo.bankCd`
    pub fn bank_code(&self) -> Option<&str> {
        nested_str(&self.additional_info, "bankCd")
    }

    /// Reason text, whether sent as a plain string or an `{english, indonesia}` object
    pub fn payment_flag_reason(&self) -> Option<String> {
        match self.payment_flag_reason.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map
                .get("english")
                .or_else(|| map.get("indonesia"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

/// QRIS MPM payment notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrisCallback {
    #[serde(default, deserialize_with = "nullable")]
    pub original_partner_reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub original_reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub merchant_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sub_merchant_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub external_store_id: String,
    #[serde(default = "empty_amount", deserialize_with = "nullable_amount")]
    pub amount: Amount,
    #[serde(default, deserialize_with = "nullable")]
    pub latest_transaction_status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub transaction_status_desc: String,
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Map<String, Value>,
}

impl QrisCallback {
    pub fn status(&self) -> TransactionStatus {
        TransactionStatus::from_code(&self.latest_transaction_status)
    }

    pub fn amount_value(&self) -> Decimal {
        self.amount.decimal_value()
    }

    pub fn currency(&self) -> &str {
        currency_of(&self.amount)
    }

    pub fn qr_content(&self) -> Option<&str> {
        nested_str(&self.additional_info, "qrContent")
    }
}

/// E-wallet payment notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoneyCallback {
    #[serde(default, deserialize_with = "nullable")]
    pub original_partner_reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub original_reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub merchant_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub channel_id: String,
    #[serde(default = "empty_amount", deserialize_with = "nullable_amount")]
    pub amount: Amount,
    #[serde(default, deserialize_with = "nullable")]
    pub latest_transaction_status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub transaction_status_desc: String,
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Map<String, Value>,
}

impl EmoneyCallback {
    pub fn status(&self) -> TransactionStatus {
        TransactionStatus::from_code(&self.latest_transaction_status)
    }

    pub fn amount_value(&self) -> Decimal {
        self.amount.decimal_value()
    }

    pub fn currency(&self) -> &str {
        currency_of(&self.amount)
    }

    /// Display name of the wallet channel
    pub fn channel_name(&self) -> &str {
        match self.channel_id.as_str() {
            "GOPAY" => "GoPay",
            "OVO" => "OVO",
            "DANA" => "DANA",
            "SHOPEEPAY" => "ShopeePay",
            "LINKAJA" => "LinkAja",
            other => other,
        }
    }
}

/// Disbursement (transfer to bank) result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCallback {
    #[serde(default, deserialize_with = "nullable")]
    pub partner_reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub beneficiary_bank_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub beneficiary_account_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub beneficiary_account_name: String,
    #[serde(default = "empty_amount", deserialize_with = "nullable_amount")]
    pub amount: Amount,
    #[serde(default, deserialize_with = "nullable")]
    pub latest_transaction_status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub transaction_status_desc: String,
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Map<String, Value>,
}

impl TransferCallback {
    pub fn status(&self) -> TransactionStatus {
        TransactionStatus::from_code(&self.latest_transaction_status)
    }

    pub fn amount_value(&self) -> Decimal {
        self.amount.decimal_value()
    }

    pub fn currency(&self) -> &str {
        currency_of(&self.amount)
    }
}

/// Modern retail (minimarket) payment notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailCallback {
    #[serde(default, deserialize_with = "nullable")]
    pub partner_reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_name: String,
    #[serde(
        default = "default_callback_type",
        deserialize_with = "nullable_callback_type"
    )]
    pub callback_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub payment_flag_status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub payment_flag_reason: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub paid_amount: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub fee_amount: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub credit_balance: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Map<String, Value>,
}

impl RetailCallback {
    pub fn status(&self) -> TransactionStatus {
        TransactionStatus::from_code(&self.payment_flag_status)
    }

    pub fn paid_amount_value(&self) -> Decimal {
        nested_decimal(&self.paid_amount, &["value"]).unwrap_or(Decimal::ZERO)
    }

    pub fn fee_amount_value(&self) -> Decimal {
        nested_decimal(&self.fee_amount, &["value"]).unwrap_or(Decimal::ZERO)
    }

    pub fn credit_balance_value(&self) -> Decimal {
        nested_decimal(&self.credit_balance, &["value"]).unwrap_or(Decimal::ZERO)
    }

    /// Merchant balance after settlement, from `additionalInfo.balance.value`
    pub fn balance(&self) -> Option<Decimal> {
        nested_decimal(&self.additional_info, &["balance", "value"])
    }
}

/// E-wallet top-up result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupCallback {
    #[serde(default, deserialize_with = "nullable")]
    pub partner_reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub account_number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub account_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub reference_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub payment_flag_status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub payment_flag_reason: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub paid_amount: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub fee_amount: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Map<String, Value>,
}

impl TopupCallback {
    pub fn status(&self) -> TransactionStatus {
        TransactionStatus::from_code(&self.payment_flag_status)
    }

    pub fn paid_amount_value(&self) -> Decimal {
        nested_decimal(&self.paid_amount, &["value"]).unwrap_or(Decimal::ZERO)
    }

    pub fn fee_amount_value(&self) -> Decimal {
        nested_decimal(&self.fee_amount, &["value"]).unwrap_or(Decimal::ZERO)
    }

    pub fn balance(&self) -> Option<Decimal> {
        nested_decimal(&self.additional_info, &["balance", "value"])
    }
}

/// A verified callback body decoded into its type-specific record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CallbackPayload {
    VirtualAccount(VirtualAccountCallback),
    Qris(QrisCallback),
    Emoney(EmoneyCallback),
    Transfer(TransferCallback),
    Retail(RetailCallback),
    Topup(TopupCallback),
}

impl CallbackPayload {
    /// Decode a JSON object into the record for `kind`
    ///
    /// Missing fields take their defaults. Retail and top-up bodies may wrap
    /// the record in a `transactionData` object.
    pub fn parse(kind: CallbackType, payload: &Value) -> Result<Self> {
        if !payload.is_object() {
            return Err(AppError::MalformedBody(format!(
                "{} callback payload must be a JSON object",
                kind
            )));
        }

        let unwrap_nested = |value: &Value| -> Value {
            match value.get("transactionData") {
                Some(nested) if nested.is_object() => nested.clone(),
                _ => value.clone(),
            }
        };

        let malformed =
            |e: serde_json::Error| AppError::MalformedBody(format!("Invalid {} callback: {}", kind, e));

        let parsed = match kind {
            CallbackType::VirtualAccount => CallbackPayload::VirtualAccount(
                serde_json::from_value(payload.clone()).map_err(malformed)?,
            ),
            CallbackType::Qris => {
                CallbackPayload::Qris(serde_json::from_value(payload.clone()).map_err(malformed)?)
            }
            CallbackType::Emoney => {
                CallbackPayload::Emoney(serde_json::from_value(payload.clone()).map_err(malformed)?)
            }
            CallbackType::Transfer => CallbackPayload::Transfer(
                serde_json::from_value(payload.clone()).map_err(malformed)?,
            ),
            CallbackType::Retail => CallbackPayload::Retail(
                serde_json::from_value(unwrap_nested(payload)).map_err(malformed)?,
            ),
            CallbackType::Topup => CallbackPayload::Topup(
                serde_json::from_value(unwrap_nested(payload)).map_err(malformed)?,
            ),
        };

        Ok(parsed)
    }

    pub fn callback_type(&self) -> CallbackType {
        match self {
            CallbackPayload::VirtualAccount(_) => CallbackType::VirtualAccount,
            CallbackPayload::Qris(_) => CallbackType::Qris,
            CallbackPayload::Emoney(_) => CallbackType::Emoney,
            CallbackPayload::Transfer(_) => CallbackType::Transfer,
            CallbackPayload::Retail(_) => CallbackType::Retail,
            CallbackPayload::Topup(_) => CallbackType::Topup,
        }
    }

    /// Reference echoed back in the acknowledgement
    pub fn partner_reference_no(&self) -> &str {
        match self {
            CallbackPayload::VirtualAccount(data) => &data.partner_reference_no,
            CallbackPayload::Qris(data) => &data.original_partner_reference_no,
            CallbackPayload::Emoney(data) => &data.original_partner_reference_no,
            CallbackPayload::Transfer(data) => &data.partner_reference_no,
            CallbackPayload::Retail(data) => &data.partner_reference_no,
            CallbackPayload::Topup(data) => &data.partner_reference_no,
        }
    }

    pub fn status_code(&self) -> &str {
        match self {
            CallbackPayload::VirtualAccount(data) => &data.latest_transaction_status,
            CallbackPayload::Qris(data) => &data.latest_transaction_status,
            CallbackPayload::Emoney(data) => &data.latest_transaction_status,
            CallbackPayload::Transfer(data) => &data.latest_transaction_status,
            CallbackPayload::Retail(data) => &data.payment_flag_status,
            CallbackPayload::Topup(data) => &data.payment_flag_status,
        }
    }

    pub fn status(&self) -> TransactionStatus {
        TransactionStatus::from_code(self.status_code())
    }

    /// Transaction amount; paid amount for retail and top-up
    pub fn amount_value(&self) -> Decimal {
        match self {
            CallbackPayload::VirtualAccount(data) => data.amount_value(),
            CallbackPayload::Qris(data) => data.amount_value(),
            CallbackPayload::Emoney(data) => data.amount_value(),
            CallbackPayload::Transfer(data) => data.amount_value(),
            CallbackPayload::Retail(data) => data.paid_amount_value(),
            CallbackPayload::Topup(data) => data.paid_amount_value(),
        }
    }
}
