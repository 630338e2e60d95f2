use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://rising-dev.pakailink.id";
pub const DEFAULT_TOKEN_KEY: &str = "pakailink:access_token";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 840;

/// Merchant credentials and key material issued by PakaiLink
#[derive(Debug, Clone, Deserialize)]
pub struct PakaiLinkConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub partner_id: String,
    pub channel_id: String,
    pub merchant_id: Option<String>,
    pub account_no: Option<String>,
    pub private_key_path: PathBuf,
    pub public_key_path: Option<PathBuf>,
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub endpoints: EndpointsConfig,
    pub callbacks: CallbackConfig,
}

/// Outbound HTTP behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts for transient failures (connect errors, 5xx, 429)
    pub retry_times: u32,
    /// Fixed delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

/// Access token cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds a token stays cached; must be below the server-side expiry
    pub token_ttl_secs: u64,
    pub token_key: String,
}

/// Inbound callback settings
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackConfig {
    pub enabled: bool,
    pub prefix: String,
    /// Public URL the provider posts callbacks to
    pub base_url: String,
}

/// Provider endpoint paths, overridable when PakaiLink moves an API
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    pub b2b_token: String,
    pub va_create: String,
    pub va_inquiry_status: String,
    pub qris_generate: String,
    pub qris_inquiry: String,
    pub emoney_create: String,
    pub emoney_inquiry: String,
    pub retail_create: String,
    pub retail_inquiry: String,
    pub transfer_inquiry: String,
    pub transfer_to_bank: String,
    pub transfer_status: String,
    pub topup_inquiry: String,
    pub topup_payment: String,
    pub topup_status: String,
    pub balance_inquiry: String,
    pub balance_history: String,
    pub merchant_qris_registration: String,
    pub merchant_dana_registration: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry_times: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl CacheConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: "/api/pakailink/callbacks".to_string(),
            base_url: "http://localhost:8080/api/pakailink/callbacks".to_string(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            b2b_token: "/snap/v1.0/access-token/b2b".to_string(),
            va_create: "/snap/v1.0/transfer-va/create-va".to_string(),
            va_inquiry_status: "/snap/v1.0/transfer-va/create-va-status".to_string(),
            qris_generate: "/snap/v1.0/qr/qr-mpm-generate".to_string(),
            qris_inquiry: "/snap/v1.0/qr/qr-mpm-status".to_string(),
            emoney_create: "/snap/v1.0/payment/emoney".to_string(),
            emoney_inquiry: "/snap/v1.0/payment/emoney-status".to_string(),
            retail_create: "/snap/v1.0/payment/modern-retail".to_string(),
            retail_inquiry: "/snap/v1.0/payment/modern-retail/status".to_string(),
            transfer_inquiry: "/snap/v1.0/emoney/bank-account-inquiry".to_string(),
            transfer_to_bank: "/snap/v1.0/emoney/transfer-bank".to_string(),
            transfer_status: "/snap/v1.0/emoney/transfer-bank/status".to_string(),
            topup_inquiry: "/snap/v1.0/emoney/account-inquiry".to_string(),
            topup_payment: "/snap/v1.0/emoney/topup".to_string(),
            topup_status: "/snap/v1.0/emoney/topup/status".to_string(),
            balance_inquiry: "/snap/v1.0/balance-inquiry".to_string(),
            balance_history: "/snap/v1.0/balance-history".to_string(),
            merchant_qris_registration: "/snap/v1.0/registration/qris".to_string(),
            merchant_dana_registration: "/snap/v1.0/registration/dana".to_string(),
        }
    }
}

impl PakaiLinkConfig {
    /// Minimal configuration with defaults for everything but the credentials
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        private_key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            partner_id: String::new(),
            channel_id: String::new(),
            merchant_id: None,
            account_no: None,
            private_key_path: private_key_path.into(),
            public_key_path: None,
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
            endpoints: EndpointsConfig::default(),
            callbacks: CallbackConfig::default(),
        }
    }

    /// Load PakaiLink settings from `PAKAILINK_*` environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = EndpointsConfig::default();

        Ok(PakaiLinkConfig {
            base_url: env::var("PAKAILINK_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            client_id: required("PAKAILINK_CLIENT_ID")?,
            client_secret: required("PAKAILINK_CLIENT_SECRET")?,
            partner_id: env::var("PAKAILINK_PARTNER_ID").unwrap_or_default(),
            channel_id: env::var("PAKAILINK_CHANNEL_ID").unwrap_or_default(),
            merchant_id: env::var("PAKAILINK_MERCHANT_ID").ok(),
            account_no: env::var("PAKAILINK_ACCOUNT_NO").ok(),
            private_key_path: env::var("PAKAILINK_PRIVATE_KEY_PATH")
                .unwrap_or_else(|_| "storage/keys/pakailink_private.pem".to_string())
                .into(),
            public_key_path: env::var("PAKAILINK_PUBLIC_KEY_PATH").ok().map(PathBuf::from),
            http: HttpConfig {
                timeout_secs: parsed("PAKAILINK_TIMEOUT", 30)?,
                retry_times: parsed("PAKAILINK_RETRY_TIMES", 3)?,
                retry_delay_ms: parsed("PAKAILINK_RETRY_DELAY", 1000)?,
            },
            cache: CacheConfig {
                token_ttl_secs: parsed("PAKAILINK_TOKEN_TTL", DEFAULT_TOKEN_TTL_SECS)?,
                token_key: env::var("PAKAILINK_TOKEN_KEY")
                    .unwrap_or_else(|_| DEFAULT_TOKEN_KEY.to_string()),
            },
            endpoints: EndpointsConfig {
                b2b_token: endpoint("PAKAILINK_ENDPOINT_B2B_TOKEN", defaults.b2b_token),
                va_create: endpoint("PAKAILINK_ENDPOINT_VA_CREATE", defaults.va_create),
                va_inquiry_status: endpoint(
                    "PAKAILINK_ENDPOINT_VA_INQUIRY",
                    defaults.va_inquiry_status,
                ),
                qris_generate: endpoint("PAKAILINK_ENDPOINT_QRIS_GENERATE", defaults.qris_generate),
                qris_inquiry: endpoint("PAKAILINK_ENDPOINT_QRIS_INQUIRY", defaults.qris_inquiry),
                emoney_create: endpoint("PAKAILINK_ENDPOINT_EMONEY_CREATE", defaults.emoney_create),
                emoney_inquiry: endpoint(
                    "PAKAILINK_ENDPOINT_EMONEY_INQUIRY",
                    defaults.emoney_inquiry,
                ),
                retail_create: endpoint("PAKAILINK_ENDPOINT_RETAIL_CREATE", defaults.retail_create),
                retail_inquiry: endpoint(
                    "PAKAILINK_ENDPOINT_RETAIL_INQUIRY",
                    defaults.retail_inquiry,
                ),
                transfer_inquiry: endpoint(
                    "PAKAILINK_ENDPOINT_TRANSFER_INQUIRY",
                    defaults.transfer_inquiry,
                ),
                transfer_to_bank: endpoint(
                    "PAKAILINK_ENDPOINT_TRANSFER_BANK",
                    defaults.transfer_to_bank,
                ),
                transfer_status: endpoint(
                    "PAKAILINK_ENDPOINT_TRANSFER_STATUS",
                    defaults.transfer_status,
                ),
                topup_inquiry: endpoint("PAKAILINK_ENDPOINT_TOPUP_INQUIRY", defaults.topup_inquiry),
                topup_payment: endpoint("PAKAILINK_ENDPOINT_TOPUP_PAYMENT", defaults.topup_payment),
                topup_status: endpoint("PAKAILINK_ENDPOINT_TOPUP_STATUS", defaults.topup_status),
                balance_inquiry: endpoint(
                    "PAKAILINK_ENDPOINT_BALANCE_INQUIRY",
                    defaults.balance_inquiry,
                ),
                balance_history: endpoint(
                    "PAKAILINK_ENDPOINT_BALANCE_HISTORY",
                    defaults.balance_history,
                ),
                merchant_qris_registration: endpoint(
                    "PAKAILINK_ENDPOINT_MERCHANT_QRIS",
                    defaults.merchant_qris_registration,
                ),
                merchant_dana_registration: endpoint(
                    "PAKAILINK_ENDPOINT_MERCHANT_DANA",
                    defaults.merchant_dana_registration,
                ),
            },
            callbacks: CallbackConfig {
                enabled: parsed("PAKAILINK_CALLBACKS_ENABLED", true)?,
                prefix: env::var("PAKAILINK_CALLBACKS_PREFIX")
                    .unwrap_or_else(|_| "/api/pakailink/callbacks".to_string()),
                base_url: env::var("PAKAILINK_CALLBACK_BASE_URL").unwrap_or_else(|_| {
                    let app_url = env::var("APP_URL")
                        .unwrap_or_else(|_| "http://localhost:8080".to_string());
                    format!("{}/api/pakailink/callbacks", app_url.trim_end_matches('/'))
                }),
            },
        })
    }

    /// Validate PakaiLink settings
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(AppError::Configuration(
                "PakaiLink client id and secret must not be empty".to_string(),
            ));
        }

        if self.http.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "PAKAILINK_TIMEOUT must be greater than 0".to_string(),
            ));
        }

        if self.http.retry_times == 0 {
            return Err(AppError::Configuration(
                "PAKAILINK_RETRY_TIMES must be at least 1".to_string(),
            ));
        }

        if self.cache.token_ttl_secs == 0 {
            return Err(AppError::Configuration(
                "Token cache TTL must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Callback URL for a given payment type path segment
    pub fn callback_url(&self, segment: &str) -> String {
        format!("{}/{}", self.callbacks.base_url.trim_end_matches('/'), segment)
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AppError::Configuration(format!("{} not set", key)))
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", key))),
        Err(_) => Ok(default),
    }
}

fn endpoint(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}
