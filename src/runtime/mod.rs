//! Gateway runtime: configuration and the HTTP serving loop.

mod server;
mod config;

pub use server::{GatewayServer, DISPATCH_PATH, HEALTH_PATH};
pub use config::GatewayConfig;
