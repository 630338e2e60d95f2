pub mod services;

pub use services::{AuthService, CachedToken, InMemoryTokenStore, TokenInfo, TokenStore};
