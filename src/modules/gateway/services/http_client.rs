use crate::config::PakaiLinkConfig;
use crate::core::timezone::snap_timestamp_now;
use crate::core::{AppError, Result};
use crate::modules::auth::AuthService;
use crate::modules::signature::SignatureService;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{
    default_on_request_failure, Jitter, RetryTransientMiddleware, Retryable, RetryableStrategy,
};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// Numeric, strictly increasing `X-EXTERNAL-ID` values
///
/// Values are `epoch_millis * 1000 + jitter`; when two calls land on the same
/// value the later one is bumped past the last issued id, so ids never repeat
/// within a process.
#[derive(Debug, Default)]
pub struct ExternalIdGenerator {
    last: AtomicU64,
}

impl ExternalIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let candidate = millis * 1000 + rand::rng().random_range(0..1000u64);

        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(current + 1);
            match self
                .last
                .compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return next.to_string(),
                Err(observed) => current = observed,
            }
        }
    }
}

/// Transport retry classification
///
/// Connection failures, 5xx and 429 are transient. Every other response,
/// 408 included, goes straight back to the caller.
pub struct SnapRetryStrategy;

impl RetryableStrategy for SnapRetryStrategy {
    fn handle(
        &self,
        res: &std::result::Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(response) => retryable_status(response.status()),
            Err(error) => default_on_request_failure(error),
        }
    }
}

fn retryable_status(status: StatusCode) -> Option<Retryable> {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Some(Retryable::Transient)
    } else if status.is_success() {
        None
    } else {
        Some(Retryable::Fatal)
    }
}

/// Position in the refresh-on-401 sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    AfterRefresh,
}

/// Signed SNAP API client
///
/// Every call carries a bearer token from [`AuthService`] and an HMAC-SHA512
/// `X-SIGNATURE`. Connection failures, 5xx and 429 are retried by the
/// transport with a fixed delay. A 401 triggers one token refresh and one
/// re-signed attempt outside that retry loop.
pub struct ApiClient {
    auth: Arc<AuthService>,
    signer: Arc<SignatureService>,
    client: ClientWithMiddleware,
    base_url: String,
    partner_id: String,
    channel_id: String,
    external_ids: ExternalIdGenerator,
}

impl ApiClient {
    pub fn new(
        config: &PakaiLinkConfig,
        auth: Arc<AuthService>,
        signer: Arc<SignatureService>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let delay = config.http.retry_delay();
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(delay, delay)
            .jitter(Jitter::None)
            .build_with_max_retries(config.http.retry_times.saturating_sub(1));

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                SnapRetryStrategy,
            ))
            .build();

        Ok(Self {
            auth,
            signer,
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            partner_id: config.partner_id.clone(),
            channel_id: config.channel_id.clone(),
            external_ids: ExternalIdGenerator::new(),
        })
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }

    /// GET with an optional query string; the query is part of the signed path
    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        let path = with_query(endpoint, query)?;
        self.request(Method::GET, &path, None, &[]).await
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, endpoint, Some(body), &[]).await
    }

    pub async fn put(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, endpoint, Some(body), &[]).await
    }

    pub async fn delete(&self, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        self.request(Method::DELETE, endpoint, body, &[]).await
    }

    /// Send a signed request and return the decoded JSON response
    ///
    /// `extra_headers` are applied after the SNAP headers, so a caller header
    /// with the same name replaces the computed one (last write wins).
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        extra_headers: &[(&str, &str)],
    ) -> Result<Value> {
        let body_json = match body {
            Some(value) => serde_json::to_string(value)?,
            None => String::new(),
        };
        let extra = build_extra_headers(extra_headers)?;

        let mut token = self.auth.get_access_token().await?;
        let mut attempt = Attempt::First;

        loop {
            let response = self
                .send_signed(&method, endpoint, &body_json, &token, &extra)
                .await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return self.handle_response(endpoint, response).await;
            }

            match attempt {
                Attempt::First => {
                    warn!(endpoint = endpoint, "Received 401, refreshing token and retrying once");
                    token = self.auth.refresh_token_if_stale(&token).await?;
                    attempt = Attempt::AfterRefresh;
                }
                Attempt::AfterRefresh => {
                    let body = response.text().await.unwrap_or_default();
                    error!(endpoint = endpoint, body = %body, "Request still unauthorized after token refresh");
                    return Err(AppError::authentication(
                        StatusCode::UNAUTHORIZED.as_u16(),
                        format!("Unauthorized after token refresh: {}", body),
                    ));
                }
            }
        }
    }

    async fn send_signed(
        &self,
        method: &Method,
        endpoint: &str,
        body_json: &str,
        token: &str,
        extra: &HeaderMap,
    ) -> Result<reqwest::Response> {
        let timestamp = snap_timestamp_now();
        let external_id = self.external_ids.next_id();
        let signed = self
            .signer
            .sign_request(method.as_str(), endpoint, token, body_json, &timestamp)?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-timestamp", header_value(&timestamp)?);
        headers.insert("x-partner-id", header_value(&self.partner_id)?);
        headers.insert("x-external-id", header_value(&external_id)?);
        headers.insert("channel-id", header_value(&self.channel_id)?);
        headers.insert("x-signature", header_value(&signed.signature)?);
        for (name, value) in extra {
            headers.insert(name.clone(), value.clone());
        }

        let url = format!("{}{}", self.base_url, endpoint);
        info!(
            http_method = %method,
            url = %url,
            external_id = %external_id,
            "PakaiLink API request"
        );

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if !signed.body.is_empty() {
            builder = builder.body(signed.body);
        }

        builder.send().await.map_err(|e| {
            error!(url = %url, error = %e, "PakaiLink API request failed");
            AppError::Connection(format!("Request to {} failed: {}", endpoint, e))
        })
    }

    async fn handle_response(&self, endpoint: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Connection(format!("Failed to read response body: {}", e)))?;

        debug!(endpoint = endpoint, status = status.as_u16(), "PakaiLink API response");

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Object(Map::new()));
            }
            return Ok(serde_json::from_str(&text)?);
        }

        let (code, message) = provider_error(&text);
        error!(
            endpoint = endpoint,
            status = status.as_u16(),
            provider_code = %code,
            provider_message = %message,
            "PakaiLink API error"
        );

        Err(AppError::api(status.as_u16(), code, message))
    }
}

/// Provider error code and message from an error body
///
/// Falls back from `responseCode`/`responseMessage` to `code`/`message`.
pub fn provider_error(body: &str) -> (String, String) {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |primary: &str, fallback: &str| {
        parsed.as_ref().and_then(|v| {
            v.get(primary)
                .or_else(|| v.get(fallback))
                .and_then(|f| match f {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
        })
    };

    (
        field("responseCode", "code").unwrap_or_else(|| "UNKNOWN".to_string()),
        field("responseMessage", "message").unwrap_or_else(|| "Unknown error".to_string()),
    )
}

fn with_query(endpoint: &str, query: &[(&str, &str)]) -> Result<String> {
    if query.is_empty() {
        return Ok(endpoint.to_string());
    }

    let mut encoder = reqwest::Url::parse("http://localhost/")
        .map_err(|e| AppError::internal(format!("Query encoder: {}", e)))?;
    encoder.query_pairs_mut().extend_pairs(query);
    Ok(format!("{}?{}", endpoint, encoder.query().unwrap_or_default()))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::validation(format!("Invalid header value: {}", value)))
}

fn build_extra_headers(extra_headers: &[(&str, &str)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in extra_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| AppError::validation(format!("Invalid header name: {}", name)))?;
        headers.insert(name, header_value(value)?);
    }
    Ok(headers)
}
