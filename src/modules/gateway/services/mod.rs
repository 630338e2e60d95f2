pub mod http_client;

pub use http_client::{provider_error, ApiClient, ExternalIdGenerator};
