use serde::{Deserialize, Serialize};

/// Body returned to PakaiLink for every callback, success or not
///
/// `partnerReferenceNo` is always present; it is `null` when the reference
/// could not be read from a rejected body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub response_code: String,
    pub response_message: String,
    pub partner_reference_no: Option<String>,
}

impl CallbackResponse {
    pub fn success(partner_reference_no: impl Into<String>) -> Self {
        Self {
            response_code: "2000000".to_string(),
            response_message: "Success".to_string(),
            partner_reference_no: Some(partner_reference_no.into()),
        }
    }

    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        partner_reference_no: Option<String>,
    ) -> Self {
        Self {
            response_code: code.into(),
            response_message: message.into(),
            partner_reference_no,
        }
    }
}
