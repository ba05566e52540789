//! # droid-core
//!
//! Core types and traits for the droid Android tool server.
//! This crate defines the shared vocabulary used by every other crate in the workspace:
//! the error taxonomy and the tool contract (definitions, calls, results).

pub mod error;
pub mod tool;

pub use error::{DroidError, Result};
pub use tool::{Tool, ToolCall, ToolExecutor, ToolOutput, ToolResult};
