//! HTTP request handlers for the Confab web server

pub mod chat;
pub mod health;
pub mod research;
pub mod types;

pub use chat::*;
pub use health::*;
pub use research::*;
pub use types::*;
