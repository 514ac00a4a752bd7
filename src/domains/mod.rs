//! Domains module containing business logic.
//!
//! The tool servers have a single domain: the tools themselves, grouped by
//! the server that exposes them.

pub mod tools;
