//! Answer generation for Websage.
//!
//! Assembles grounding prompts from search results and streams model
//! responses with priority-ordered fallback across model variants.

pub mod error;
pub mod gemini;
pub mod generator;
pub mod prompt;

pub use error::ModelError;
pub use gemini::GeminiClient;
pub use generator::{
    AnswerGenerator, FragmentStream, GenerationState, ModelProvider, FALLBACK_MESSAGE,
};
