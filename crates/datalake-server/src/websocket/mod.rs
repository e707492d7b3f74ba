//! Per-connection stream sessions and their `WebSocket` plumbing.

pub mod cadence;
pub mod session;
pub mod stream;
pub mod tracker;
