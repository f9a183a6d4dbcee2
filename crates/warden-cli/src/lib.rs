//! # warden-cli
//!
//! The `warden` binary:
//! - `warden serve` runs the HTTP API
//! - `warden check` evaluates a single access decision
//! - `warden config` manages the configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod error;

pub use cli::CliArgs;
pub use config::WardenConfig;
pub use error::{Error, Result};
