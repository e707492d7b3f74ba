//! # datalake-core
//!
//! Data model shared by the streamer and its clients.
//!
//! - [`variable`]: typed scalar variables and their `name=value` encoding
//! - [`wire`]: parsing frames back into typed variables
//! - [`sampler`]: the fixed demo variable set produced on every tick

#![deny(unsafe_code)]

pub mod sampler;
pub mod variable;
pub mod wire;

pub use sampler::{TickSampler, connected_status, now_millis};
pub use variable::{Variable, VariableKind, VariableValue};
pub use wire::{WireError, parse_message};
