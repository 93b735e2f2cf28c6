pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod session;
pub mod transport;
