pub mod services;

pub use services::{ApiClient, ExternalIdGenerator};
