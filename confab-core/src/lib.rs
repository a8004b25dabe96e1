//! Confab Core - Shared data structures and configuration
//!
//! This module defines the core types used across the chat service and the
//! research pipeline.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
