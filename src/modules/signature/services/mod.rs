pub mod signature_service;

pub use signature_service::{body_hash, minify_json, SignatureService, SignedRequest};
