//! PakaiLink SNAP Payment Gateway Library
//!
//! Signs and sends requests to the PakaiLink SNAP API (virtual accounts,
//! QRIS, e-money, retail, transfers, top-ups and balance), and verifies the
//! callbacks PakaiLink posts back.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use core::{AppError, Result};
pub use modules::auth::{AuthService, InMemoryTokenStore, TokenStore};
pub use modules::callbacks::{BroadcastEventBus, CallbackService, PaymentEvent};
pub use modules::gateway::ApiClient;
pub use modules::payments::PaymentServices;
pub use modules::signature::SignatureService;
