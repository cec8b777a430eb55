//! HTTP surface for Praetorian: wrap/unwrap handlers, request logging, and
//! server lifecycle. The binary in `main.rs` wires these to configuration.

pub mod api;
pub mod config;
pub mod logging;
pub mod server;
mod unwrap;
mod wrap;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{create_router, ApiError, AppState, WrapToken};
