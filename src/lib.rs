pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod security;
pub mod services;

// Re-export main components for easier use
pub use api::rest::{AppState, RestApi};
pub use config::Config;
pub use db::Stores;
pub use error::Error;
