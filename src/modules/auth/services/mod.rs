pub mod auth_service;
pub mod token_store;

pub use auth_service::{AuthService, TokenInfo};
pub use token_store::{CachedToken, InMemoryTokenStore, TokenStore};
