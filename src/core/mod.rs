pub mod currency;
pub mod error;
pub mod timezone;

pub use currency::{Amount, Currency};
pub use error::{AppError, Result};
