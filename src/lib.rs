//! Minimal HTTP API for a BJJ academy.
//!
//! Serves a single endpoint:
//!
//! ```text
//! GET /  ->  200 {"message":"BJJ Academy API is running!"}
//! ```
//!
//! Everything else gets axum's default 404 or 405.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`api`]: Route table, handler and panic recovery
//! - [`server`]: Binding and serving with graceful shutdown
//! - [`reload`]: Debug-mode restart on rebuild
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod reload;
pub mod server;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
pub use server::{ServeExit, Server};
