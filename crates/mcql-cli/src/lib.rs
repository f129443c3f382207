//! mcql CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `mcql` binary.

pub mod cli;
pub mod input;
pub mod output;
pub mod schema;
pub mod worker;

// Re-export commonly used types
pub use cli::Args;
