use crate::core::{AppError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::Value;
use sha2::{Digest, Sha256, Sha512};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

type HmacSha512 = Hmac<Sha512>;

/// Outgoing request material after symmetric signing
///
/// `body` is the exact minified JSON that must be transmitted; the signature
/// covers its hash, so any re-serialization invalidates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: String,
    pub path: String,
    pub access_token: String,
    pub body: String,
    pub body_hash: String,
    pub timestamp: String,
    pub signature: String,
}

/// SNAP signature engine
///
/// - asymmetric (RSA PKCS#1 v1.5 + SHA-256) over `clientId|timestamp` for the B2B token request
/// - symmetric (HMAC-SHA512) over `METHOD:path:token:bodyHash:timestamp` for API calls
/// - HMAC-SHA512 over `rawBody + timestamp` for inbound callbacks
pub struct SignatureService {
    private_key_path: PathBuf,
    public_key_path: Option<PathBuf>,
    client_secret: String,
}

impl SignatureService {
    pub fn new(private_key_path: impl Into<PathBuf>, client_secret: impl Into<String>) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            public_key_path: None,
            client_secret: client_secret.into(),
        }
    }

    pub fn with_public_key(mut self, public_key_path: impl Into<PathBuf>) -> Self {
        self.public_key_path = Some(public_key_path.into());
        self
    }

    /// Sign `"{client_id}|{timestamp}"` with the merchant's RSA private key
    pub fn sign_asymmetric(&self, client_id: &str, timestamp: &str) -> Result<String> {
        debug!(client_id = client_id, timestamp = timestamp, "Generating asymmetric signature");

        let string_to_sign = format!("{}|{}", client_id, timestamp);
        let private_key = load_private_key(&self.private_key_path)?;
        let signing_key = SigningKey::<Sha256>::new(private_key);

        let signature = signing_key
            .try_sign(string_to_sign.as_bytes())
            .map_err(|e| {
                error!(error = %e, "Failed to generate asymmetric signature");
                AppError::Signing(format!("Failed to generate signature: {}", e))
            })?;

        debug!("Asymmetric signature generated successfully");
        Ok(STANDARD.encode(signature.to_bytes()))
    }

    /// Verify an asymmetric signature with the configured public key
    pub fn verify_asymmetric(
        &self,
        client_id: &str,
        timestamp: &str,
        signature: &str,
    ) -> Result<bool> {
        let path = self
            .public_key_path
            .as_deref()
            .ok_or_else(|| AppError::KeyLoad("Public key path not configured".to_string()))?;
        let public_key = load_public_key(path)?;
        let verifying_key = VerifyingKey::<Sha256>::new(public_key);

        let Ok(raw) = STANDARD.decode(signature) else {
            return Ok(false);
        };
        let Ok(signature) = Signature::try_from(raw.as_slice()) else {
            return Ok(false);
        };

        let string_to_sign = format!("{}|{}", client_id, timestamp);
        Ok(verifying_key
            .verify(string_to_sign.as_bytes(), &signature)
            .is_ok())
    }

    /// HMAC-SHA512 over `"{METHOD}:{path}:{token}:{sha256(minified body)}:{timestamp}"`
    pub fn sign_symmetric(
        &self,
        method: &str,
        path: &str,
        access_token: &str,
        body_json: &str,
        timestamp: &str,
    ) -> Result<String> {
        Ok(self
            .sign_request(method, path, access_token, body_json, timestamp)?
            .signature)
    }

    /// Same as [`sign_symmetric`](Self::sign_symmetric) but keeps the signed material
    pub fn sign_request(
        &self,
        method: &str,
        path: &str,
        access_token: &str,
        body_json: &str,
        timestamp: &str,
    ) -> Result<SignedRequest> {
        let method = method.to_uppercase();
        debug!(http_method = %method, endpoint_url = path, timestamp = timestamp, "Generating symmetric signature");

        let body = minify_json(body_json)?;
        let body_hash = body_hash(&body);
        let string_to_sign = format!(
            "{}:{}:{}:{}:{}",
            method, path, access_token, body_hash, timestamp
        );

        let mut mac = self.mac();
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        debug!(body_hash = %body_hash, "Symmetric signature generated successfully");

        Ok(SignedRequest {
            method,
            path: path.to_string(),
            access_token: access_token.to_string(),
            body,
            body_hash,
            timestamp: timestamp.to_string(),
            signature,
        })
    }

    /// HMAC-SHA512 over the raw callback body directly followed by the timestamp
    pub fn generate_callback_signature(&self, raw_body: &[u8], timestamp: &str) -> String {
        STANDARD.encode(self.callback_mac(raw_body, timestamp).finalize().into_bytes())
    }

    /// Constant-time check of a callback signature; any failure yields `false`
    pub fn verify_callback_signature(
        &self,
        received_signature: &str,
        raw_body: &[u8],
        timestamp: &str,
    ) -> bool {
        debug!(timestamp = timestamp, "Validating callback signature");

        let received = match STANDARD.decode(received_signature) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "Callback signature is not valid base64");
                return false;
            }
        };

        let is_valid = self
            .callback_mac(raw_body, timestamp)
            .verify_slice(&received)
            .is_ok();

        debug!(is_valid = is_valid, "Callback signature validation result");
        is_valid
    }

    fn callback_mac(&self, raw_body: &[u8], timestamp: &str) -> HmacSha512 {
        let mut mac = self.mac();
        mac.update(raw_body);
        mac.update(timestamp.as_bytes());
        mac
    }

    fn mac(&self) -> HmacSha512 {
        match HmacSha512::new_from_slice(self.client_secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts keys of any length"),
        }
    }
}

/// Re-serialize a JSON document without insignificant whitespace
///
/// Field order is preserved. An empty (or all-whitespace) body minifies to `""`.
pub fn minify_json(body_json: &str) -> Result<String> {
    if body_json.trim().is_empty() {
        return Ok(String::new());
    }

    let value: Value = serde_json::from_str(body_json)
        .map_err(|e| AppError::MalformedBody(format!("Invalid JSON in request body: {}", e)))?;

    Ok(serde_json::to_string(&value)?)
}

/// Lowercase hex SHA-256 of the minified body
pub fn body_hash(minified_body: &str) -> String {
    hex::encode(Sha256::digest(minified_body.as_bytes()))
}

fn load_private_key(path: &Path) -> Result<RsaPrivateKey> {
    let pem = std::fs::read_to_string(path).map_err(|e| {
        AppError::KeyLoad(format!("Private key file not found: {} ({})", path.display(), e))
    })?;

    RsaPrivateKey::from_pkcs8_pem(&pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
        .map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to load private key");
            AppError::KeyLoad(format!("Failed to load private key: {}", e))
        })
}

fn load_public_key(path: &Path) -> Result<RsaPublicKey> {
    let pem = std::fs::read_to_string(path).map_err(|e| {
        AppError::KeyLoad(format!("Public key file not found: {} ({})", path.display(), e))
    })?;

    RsaPublicKey::from_public_key_pem(&pem)
        .map_err(|e| AppError::KeyLoad(format!("Failed to load public key: {}", e)))
}
