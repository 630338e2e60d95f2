pub mod callback_data;
pub mod callback_response;
pub mod events;

pub use callback_data::{
    CallbackPayload, CallbackType, EmoneyCallback, QrisCallback, RetailCallback, TopupCallback,
    TransactionStatus, TransferCallback, VirtualAccountCallback,
};
pub use callback_response::CallbackResponse;
pub use events::{CallbackReceived, PaymentEvent};
