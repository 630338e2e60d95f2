use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Indonesian bank codes accepted for virtual accounts and disbursements
///
/// Request structs keep the code as a plain string so codes outside this
/// list still go through; this enum is the typed way to fill them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BankCode {
    #[serde(rename = "002")]
    Bri,
    #[serde(rename = "008")]
    Mandiri,
    #[serde(rename = "009")]
    Bni,
    #[serde(rename = "011")]
    Danamon,
    #[serde(rename = "013")]
    Permata,
    #[serde(rename = "014")]
    Bca,
    #[serde(rename = "016")]
    Maybank,
    #[serde(rename = "019")]
    Panin,
    #[serde(rename = "022")]
    Cimb,
    #[serde(rename = "028")]
    Ocbc,
    #[serde(rename = "200")]
    Btn,
    #[serde(rename = "147")]
    Muamalat,
    #[serde(rename = "451")]
    Bsi,
    #[serde(rename = "536")]
    BcaSyariah,
    #[serde(rename = "490")]
    Neo,
    #[serde(rename = "542")]
    Jago,
    #[serde(rename = "535")]
    Seabank,
}

impl BankCode {
    pub const ALL: [BankCode; 17] = [
        BankCode::Bri,
        BankCode::Mandiri,
        BankCode::Bni,
        BankCode::Danamon,
        BankCode::Permata,
        BankCode::Bca,
        BankCode::Maybank,
        BankCode::Panin,
        BankCode::Cimb,
        BankCode::Ocbc,
        BankCode::Btn,
        BankCode::Muamalat,
        BankCode::Bsi,
        BankCode::BcaSyariah,
        BankCode::Neo,
        BankCode::Jago,
        BankCode::Seabank,
    ];

    /// Banks most customers pick from
    pub const POPULAR: [BankCode; 6] = [
        BankCode::Bri,
        BankCode::Mandiri,
        BankCode::Bni,
        BankCode::Bca,
        BankCode::Cimb,
        BankCode::Permata,
    ];

    /// Three-digit clearing code
    pub fn code(&self) -> &'static str {
        match self {
            BankCode::Bri => "002",
            BankCode::Mandiri => "008",
            BankCode::Bni => "009",
            BankCode::Danamon => "011",
            BankCode::Permata => "013",
            BankCode::Bca => "014",
            BankCode::Maybank => "016",
            BankCode::Panin => "019",
            BankCode::Cimb => "022",
            BankCode::Ocbc => "028",
            BankCode::Btn => "200",
            BankCode::Muamalat => "147",
            BankCode::Bsi => "451",
            BankCode::BcaSyariah => "536",
            BankCode::Neo => "490",
            BankCode::Jago => "542",
            BankCode::Seabank => "535",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BankCode::Bri => "Bank BRI",
            BankCode::Mandiri => "Bank Mandiri",
            BankCode::Bni => "Bank BNI",
            BankCode::Danamon => "Bank Danamon",
            BankCode::Permata => "Bank Permata",
            BankCode::Bca => "Bank BCA",
            BankCode::Maybank => "Maybank",
            BankCode::Panin => "Bank Panin",
            BankCode::Cimb => "Bank CIMB Niaga",
            BankCode::Ocbc => "Bank OCBC NISP",
            BankCode::Btn => "Bank BTN",
            BankCode::Muamalat => "Bank Muamalat",
            BankCode::Bsi => "Bank Syariah Indonesia",
            BankCode::BcaSyariah => "Bank BCA Syariah",
            BankCode::Neo => "Bank Neo",
            BankCode::Jago => "Bank Jago",
            BankCode::Seabank => "SeaBank Indonesia",
        }
    }

    pub fn is_syariah(&self) -> bool {
        matches!(self, BankCode::Muamalat | BankCode::Bsi | BankCode::BcaSyariah)
    }

    pub fn is_digital(&self) -> bool {
        matches!(self, BankCode::Neo | BankCode::Jago | BankCode::Seabank)
    }

    /// `(code, label)` pairs for building a bank picker
    pub fn options() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|bank| (bank.code(), bank.label())).collect()
    }
}

impl fmt::Display for BankCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BankCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|bank| bank.code() == code)
            .ok_or_else(|| format!("Unknown bank code: {}", s))
    }
}

impl From<BankCode> for String {
    fn from(bank: BankCode) -> Self {
        bank.code().to_string()
    }
}
