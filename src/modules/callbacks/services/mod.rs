pub mod callback_service;
pub mod event_bus;

pub use callback_service::{error_response, CallbackService};
pub use event_bus::{BroadcastEventBus, EventPublisher};
