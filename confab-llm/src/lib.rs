//! LLM client for the Confab system
//!
//! Provides the `InferenceProvider` trait and a concrete client that speaks
//! the OpenAI-compatible chat completions protocol.

pub mod client;
pub mod provider;

pub use client::{ConfabLlmClient, DEFAULT_SYSTEM_PROMPT};
pub use provider::InferenceProvider;
