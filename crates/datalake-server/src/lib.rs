//! # datalake-server
//!
//! Axum `WebSocket` listener that streams typed variables to data lake clients.
//!
//! - Listener: binds the configured address and hands each upgraded
//!   connection to its own task
//! - Stream session: status message, then the full variable set every tick
//! - HTTP endpoints: `/health` and Prometheus `/metrics`
//! - Shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::{ServerConfig, StreamConfig};
pub use errors::ServerError;
pub use server::StreamServer;
