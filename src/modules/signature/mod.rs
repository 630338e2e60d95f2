pub mod services;

pub use services::{body_hash, minify_json, SignatureService, SignedRequest};
