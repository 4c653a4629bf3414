pub mod health;
pub mod middleware;
pub mod poll;
pub mod serde;
pub mod tracing;
