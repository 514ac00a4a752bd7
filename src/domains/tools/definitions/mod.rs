//! Tool definitions module.
//!
//! One module per server; each tool is a unit struct implementing
//! [`ToolDefinition`](super::ToolDefinition).

pub mod common;
pub mod data;
pub mod document;
pub mod research;
pub mod web;
