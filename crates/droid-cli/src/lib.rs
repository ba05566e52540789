//! # droid-cli
//!
//! Command-line interface for the droid tool server.
//!
//! ## Commands
//!
//! - `droid serve` — Bind a device and serve its tools over MCP
//! - `droid devices` — List devices visible to adb
//! - `droid tools` — Show the tool contract
//! - `droid config` — Show the effective configuration

pub mod commands;

pub use commands::Cli;
