use super::token_store::TokenStore;
use crate::config::PakaiLinkConfig;
use crate::core::timezone::snap_timestamp_now;
use crate::core::{AppError, Result};
use crate::modules::signature::SignatureService;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Server-side token lifetime assumed when `expiresIn` is absent
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 900;

const TOKEN_PREVIEW_CHARS: usize = 20;

/// Debug view of the cached token, safe to expose on a health endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub has_token: bool,
    pub token_preview: Option<String>,
    pub cache_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<Value>,
}

impl TokenResponse {
    /// `expiresIn` arrives either as a number or a numeric string
    fn expires_in_secs(&self) -> Option<u64> {
        match self.expires_in.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Obtains, caches and refreshes the SNAP B2B access token
///
/// Token state per process: no token -> cached -> (TTL elapsed) -> no token.
/// Fetches are single-flight: concurrent callers on a cold cache wait for
/// the request already in flight instead of issuing their own.
pub struct AuthService {
    signer: Arc<SignatureService>,
    store: Arc<dyn TokenStore>,
    client: Client,
    base_url: String,
    client_id: String,
    token_endpoint: String,
    cache_key: String,
    cache_ttl: Duration,
    fetch_lock: Mutex<()>,
}

impl AuthService {
    pub fn new(
        config: &PakaiLinkConfig,
        signer: Arc<SignatureService>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http.timeout())
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            signer,
            store,
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            token_endpoint: config.endpoints.b2b_token.clone(),
            cache_key: config.cache.token_key.clone(),
            cache_ttl: config.cache.token_ttl(),
            fetch_lock: Mutex::new(()),
        })
    }

    /// Cached token, or a freshly fetched one on a cache miss
    pub async fn get_access_token(&self) -> Result<String> {
        if let Some(token) = self.store.get(&self.cache_key).await {
            debug!("Using cached B2B access token");
            return Ok(token);
        }

        let _guard = self.fetch_lock.lock().await;

        // Another caller may have filled the cache while we waited for the lock
        if let Some(token) = self.store.get(&self.cache_key).await {
            debug!("Using B2B access token fetched by a concurrent caller");
            return Ok(token);
        }

        debug!("Generating new B2B access token");
        self.fetch_and_store().await
    }

    /// Drop the cached token and always fetch a new one
    pub async fn refresh_token(&self) -> Result<String> {
        info!("Refreshing B2B access token");

        let _guard = self.fetch_lock.lock().await;
        self.store.forget(&self.cache_key).await;
        self.fetch_and_store().await
    }

    /// Replace `rejected` after the provider refused it
    ///
    /// Callers that saw the same token rejected at once share one fetch: once
    /// the lock is held, a cached token that differs from `rejected` was
    /// already refreshed by someone else and is returned as is.
    pub async fn refresh_token_if_stale(&self, rejected: &str) -> Result<String> {
        let _guard = self.fetch_lock.lock().await;

        if let Some(token) = self.store.get(&self.cache_key).await {
            if token != rejected {
                debug!("Using B2B access token refreshed by a concurrent caller");
                return Ok(token);
            }
        }

        info!("Refreshing rejected B2B access token");
        self.store.forget(&self.cache_key).await;
        self.fetch_and_store().await
    }

    /// True when no usable token is cached
    pub async fn is_token_expired(&self) -> bool {
        !self.store.has(&self.cache_key).await
    }

    pub async fn clear_token(&self) {
        debug!("Clearing cached token");
        self.store.forget(&self.cache_key).await;
    }

    pub async fn token_info(&self) -> TokenInfo {
        let token = self.store.get(&self.cache_key).await;

        TokenInfo {
            has_token: token.is_some(),
            token_preview: token.map(|t| {
                let preview: String = t.chars().take(TOKEN_PREVIEW_CHARS).collect();
                format!("{}...", preview)
            }),
            cache_key: self.cache_key.clone(),
        }
    }

    async fn fetch_and_store(&self) -> Result<String> {
        let timestamp = snap_timestamp_now();
        let signature = self.signer.sign_asymmetric(&self.client_id, &timestamp)?;
        let url = format!("{}{}", self.base_url, self.token_endpoint);

        info!(url = %url, client_id = %self.client_id, "Requesting B2B access token");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-CLIENT-KEY", &self.client_id)
            .header("X-TIMESTAMP", &timestamp)
            .header("X-SIGNATURE", &signature)
            .json(&json!({ "grantType": "client_credentials" }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "B2B token request failed");
                AppError::Connection(format!("PakaiLink token endpoint unreachable: {}", e))
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Connection(format!("Failed to read token response: {}", e)))?;

        if !(200..300).contains(&status) {
            error!(status = status, body = %body, "Failed to obtain B2B access token");
            return Err(AppError::authentication(
                status,
                format!("Failed to obtain B2B access token: {}", body),
            ));
        }

        let data: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Token response is not valid JSON");
            AppError::authentication(status, format!("Invalid token response: {}", e))
        })?;

        let expires_in = data.expires_in_secs().unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let access_token = data
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                error!("Invalid token response: missing accessToken");
                AppError::authentication(status, "Invalid token response: missing accessToken")
            })?;

        let ttl = cache_ttl_for(self.cache_ttl, expires_in);
        if ttl < self.cache_ttl {
            warn!(
                configured_ttl = self.cache_ttl.as_secs(),
                expires_in = expires_in,
                "Configured token TTL is not below server expiry, clamping"
            );
        }

        info!(expires_in = expires_in, ttl = ttl.as_secs(), "B2B access token obtained successfully");

        self.store.put(&self.cache_key, access_token.clone(), ttl).await;

        Ok(access_token)
    }
}

/// Cache TTL strictly below the server-reported expiry
fn cache_ttl_for(configured: Duration, expires_in_secs: u64) -> Duration {
    let ceiling = Duration::from_secs(expires_in_secs.saturating_sub(1));
    configured.min(ceiling)
}
