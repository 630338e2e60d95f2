pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::CallbackController;
pub use models::{CallbackPayload, CallbackResponse, CallbackType, PaymentEvent, TransactionStatus};
pub use services::{BroadcastEventBus, CallbackService, EventPublisher};
