//! Language-model service providers.

pub mod openai;

pub use openai::OpenAICompletion;
