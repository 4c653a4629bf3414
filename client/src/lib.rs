pub mod api;
pub mod assets;
pub mod auth_persist;
pub mod backends;
pub mod bridge;
pub mod error;
pub mod identity;
pub mod monitor;
pub mod orchestrator;
pub mod platform;
pub mod push;
