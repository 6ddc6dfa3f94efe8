//! Streaming answer generation with model-variant fallback.
//!
//! Tries a fixed priority list of model variants in order. While a
//! variant streams, the running total of generated text is re-emitted
//! after each fragment (cumulative, not delta-encoded). The fallback
//! policy is an explicit state machine so it stays testable without any
//! network provider behind it.

use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tracing::{debug, error, warn};

use crate::error::ModelError;

/// Default delay before moving on after a rate-limited variant.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(2);

/// Final message emitted when every variant has failed.
pub const FALLBACK_MESSAGE: &str = "Could not generate a response. All models failed.";

/// Text fragments (deltas) from one in-flight model call.
pub type FragmentStream = BoxStream<'static, Result<String, ModelError>>;

/// Opens streaming generation calls, one model variant at a time.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Start a streaming call for `prompt` against `variant`.
    async fn open_stream(&self, variant: &str, prompt: &str)
        -> Result<FragmentStream, ModelError>;
}

/// Positions of the fallback state machine.
///
/// `TryVariant(i)` attempts the variant at priority index `i`;
/// `Streaming(i)` pulls fragments from it. Non-empty completion reaches
/// `Done`; empty completion, rate limit, or any other error moves to
/// `TryVariant(i + 1)`. Running past the last variant reaches
/// `Exhausted`, which emits the fallback message and then `Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationState {
    TryVariant(usize),
    Streaming(usize),
    Exhausted,
    Done,
}

/// Drives prioritized variant attempts and yields cumulative partials.
pub struct AnswerGenerator<P> {
    provider: P,
    variants: Vec<String>,
    rate_limit_delay: Duration,
}

impl<P: ModelProvider> AnswerGenerator<P> {
    pub fn new(provider: P, variants: Vec<String>) -> Self {
        Self {
            provider,
            variants,
            rate_limit_delay: RATE_LIMIT_DELAY,
        }
    }

    /// Override the post-rate-limit delay.
    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Stream cumulative partial text for `prompt`.
    ///
    /// Forward-only and consume-once. Each item is the full text
    /// generated so far. The stream ends after the first variant that
    /// completes with non-empty text, or after the fallback message once
    /// every variant has been exhausted. It never fails: per-attempt
    /// problems are logged and absorbed by the fallback policy.
    pub fn generate<'a>(&'a self, prompt: &'a str) -> impl Stream<Item = String> + 'a {
        stream! {
            let mut state = GenerationState::TryVariant(0);
            let mut active: Option<(FragmentStream, String)> = None;

            loop {
                match state {
                    GenerationState::TryVariant(i) => {
                        let Some(variant) = self.variants.get(i) else {
                            state = GenerationState::Exhausted;
                            continue;
                        };
                        debug!(variant = %variant, attempt = i + 1, "Opening model stream");
                        match self.provider.open_stream(variant, prompt).await {
                            Ok(fragments) => {
                                active = Some((fragments, String::new()));
                                state = GenerationState::Streaming(i);
                            }
                            Err(e) => {
                                state = self.advance_on_error(variant, i, &e).await;
                            }
                        }
                    }
                    GenerationState::Streaming(i) => {
                        let Some((fragments, accumulated)) = active.as_mut() else {
                            state = GenerationState::TryVariant(i + 1);
                            continue;
                        };
                        match fragments.next().await {
                            Some(Ok(fragment)) => {
                                accumulated.push_str(&fragment);
                                yield accumulated.clone();
                            }
                            Some(Err(e)) => {
                                let variant = self.variants[i].clone();
                                active = None;
                                state = self.advance_on_error(&variant, i, &e).await;
                            }
                            None => {
                                let complete = !accumulated.trim().is_empty();
                                active = None;
                                state = if complete {
                                    GenerationState::Done
                                } else {
                                    warn!(
                                        variant = %self.variants[i],
                                        "Variant returned no text, trying next"
                                    );
                                    GenerationState::TryVariant(i + 1)
                                };
                            }
                        }
                    }
                    GenerationState::Exhausted => {
                        warn!("All model variants exhausted");
                        yield FALLBACK_MESSAGE.to_string();
                        state = GenerationState::Done;
                    }
                    GenerationState::Done => break,
                }
            }
        }
    }

    /// Log a failed attempt and move to the next variant, delaying first
    /// when the failure was a rate limit.
    async fn advance_on_error(
        &self,
        variant: &str,
        index: usize,
        err: &ModelError,
    ) -> GenerationState {
        match err {
            ModelError::RateLimited => {
                warn!(variant = %variant, "Rate limit hit, delaying before next variant");
                tokio::time::sleep(self.rate_limit_delay).await;
            }
            ModelError::Other(msg) => {
                error!(variant = %variant, error = %msg, "Variant failed");
            }
        }
        GenerationState::TryVariant(index + 1)
    }
}
