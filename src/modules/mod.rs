pub mod auth;
pub mod callbacks;
pub mod gateway;
pub mod health;
pub mod payments;
pub mod signature;
