//! portsync core — configuration and error types shared across the workspace.

pub mod config;
pub mod error;
