// Shared setup for the PakaiLink integration tests
//
// Outbound calls go to a wiremock server standing in for the PakaiLink API.
// RSA fixtures under tests/fixtures form one key pair (PKCS#8 and PKCS#1
// encodings of the same private key).
#![allow(dead_code)]

use pakailink::config::PakaiLinkConfig;
use pakailink::modules::auth::{AuthService, InMemoryTokenStore, TokenStore};
use pakailink::modules::gateway::ApiClient;
use pakailink::modules::signature::SignatureService;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const PARTNER_ID: &str = "PARTNER-001";
pub const CHANNEL_ID: &str = "95221";
pub const TOKEN_PATH: &str = "/snap/v1.0/access-token/b2b";
pub const CALLBACK_BASE_URL: &str = "https://merchant.test/api/pakailink/callbacks";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Config pointing at `base_url` with fast retries
pub fn test_config(base_url: &str) -> PakaiLinkConfig {
    let mut config = PakaiLinkConfig::new(
        base_url,
        CLIENT_ID,
        CLIENT_SECRET,
        fixture_path("test_private_key.pem"),
    );
    config.partner_id = PARTNER_ID.to_string();
    config.channel_id = CHANNEL_ID.to_string();
    config.public_key_path = Some(fixture_path("test_public_key.pem"));
    config.account_no = Some("1234567890".to_string());
    config.http.timeout_secs = 5;
    config.http.retry_times = 3;
    config.http.retry_delay_ms = 10;
    config.callbacks.base_url = CALLBACK_BASE_URL.to_string();
    config
}

pub fn test_signer() -> Arc<SignatureService> {
    Arc::new(
        SignatureService::new(fixture_path("test_private_key.pem"), CLIENT_SECRET)
            .with_public_key(fixture_path("test_public_key.pem")),
    )
}

/// Fully wired client stack against a mock server
pub struct TestStack {
    pub config: PakaiLinkConfig,
    pub signer: Arc<SignatureService>,
    pub store: Arc<InMemoryTokenStore>,
    pub auth: Arc<AuthService>,
    pub client: Arc<ApiClient>,
}

impl TestStack {
    pub fn new(server: &MockServer) -> Self {
        Self::with_config(test_config(&server.uri()))
    }

    pub fn with_config(config: PakaiLinkConfig) -> Self {
        let signer = test_signer();
        let store = Arc::new(InMemoryTokenStore::new());
        let auth = Arc::new(
            AuthService::new(&config, signer.clone(), store.clone() as Arc<dyn TokenStore>)
                .unwrap(),
        );
        let client = Arc::new(ApiClient::new(&config, auth.clone(), signer.clone()).unwrap());

        Self {
            config,
            signer,
            store,
            auth,
            client,
        }
    }
}

pub fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "responseCode": "2007300",
        "responseMessage": "Successful",
        "accessToken": token,
        "tokenType": "Bearer",
        "expiresIn": "900"
    }))
}

/// Token endpoint that always hands out `token`
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response(token))
        .mount(server)
        .await;
}

/// Header value of a recorded request as a string
pub fn header(request: &wiremock::Request, name: &str) -> String {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
