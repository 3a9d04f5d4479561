//! # Language-model integration
//!
//! The [`CompletionRequestor`] trait is the seam between the orchestrator and
//! the language-model service; [`providers::OpenAICompletion`] implements it
//! against the OpenAI Chat Completions API.

pub mod providers;
pub mod requestor;

pub use providers::OpenAICompletion;
pub use requestor::{CompletionOutcome, CompletionRequestor};
