//! `vlmcap-cli` library crate.
//!
//! Re-exports the command-line modules for testing. The binary
//! entrypoint lives in `main.rs`.

pub mod args;
pub mod commands;
pub mod config;
