//! sipx CLI library components.
//!
//! This library exposes the command handlers and configuration for testing.

pub mod commands;
pub mod config;
