pub mod app;
pub mod authz;
pub mod client;
pub mod config;
pub mod db;
pub mod docs;
pub mod errors;
pub mod events;
pub mod extract;
pub mod models;
pub mod routes;
pub mod session;

// Re-export commonly used items for tests
pub use app::{create_app, create_app_with_config, AppState};
pub use config::AppConfig;
