//! Error types for model-provider calls.

/// A failed model call, classified for the fallback policy.
///
/// The classification is all the generator needs: a rate limit delays
/// the move to the next variant, anything else advances immediately.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("rate limited: too many requests")]
    RateLimited,
    #[error("model call failed: {0}")]
    Other(String),
}
