pub mod access;
pub mod api;
pub mod client;
pub mod history;
pub mod session;
pub mod staging;
pub mod token_store;
pub mod validation;
