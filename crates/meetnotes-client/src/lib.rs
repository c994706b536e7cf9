//! Command-line client for the meetnotes server
//!
//! This crate provides the `meetnotes` command-line interface.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod token;

pub use api::ApiClient;
pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use token::{TokenStore, TokenSummary};
