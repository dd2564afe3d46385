//! REST directory client.
//!
//! Implements [`rostersync_directory::DirectoryClient`] over a JSON HTTP API
//! with bearer-token authentication.

pub mod client;
pub mod config;

pub use client::RestDirectoryClient;
pub use config::RestDirectoryConfig;
