//! Gemini streaming provider.
//!
//! Talks to the Generative Language API's `streamGenerateContent`
//! endpoint with `alt=sse` and turns the SSE `data:` lines into text
//! fragments. HTTP 429 is classified as [`ModelError::RateLimited`];
//! everything else that fails becomes [`ModelError::Other`].

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::generator::{FragmentStream, ModelProvider};

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ChunkContent>,
}

#[derive(Deserialize)]
struct ChunkContent {
    #[serde(default)]
    parts: Vec<ChunkPart>,
}

#[derive(Deserialize)]
struct ChunkPart {
    text: Option<String>,
}

// =============================================================================
// GeminiClient
// =============================================================================

/// Client for Gemini's streaming generation endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Concatenated text of every part in a stream chunk.
    fn extract_text(chunk: &StreamChunk) -> String {
        chunk
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

/// SSE payload of a line, if it carries one.
fn data_payload(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data: ").map(str::trim)
}

fn classify(err: reqwest::Error) -> ModelError {
    if err.status() == Some(StatusCode::TOO_MANY_REQUESTS) {
        ModelError::RateLimited
    } else {
        ModelError::Other(err.to_string())
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn open_stream(
        &self,
        variant: &str,
        prompt: &str,
    ) -> Result<FragmentStream, ModelError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.endpoint, variant
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify)?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ModelError::RateLimited);
        }
        let mut response = response.error_for_status().map_err(classify)?;

        let stream = async_stream::stream! {
            let mut buffer = String::new();
            loop {
                let bytes = match response.chunk().await {
                    Ok(Some(bytes)) => bytes,
                    // End of stream is Gemini's completion signal.
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(classify(e));
                        break;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].to_string();
                    buffer.drain(..=pos);
                    let Some(payload) = data_payload(&line) else {
                        continue;
                    };
                    match serde_json::from_str::<StreamChunk>(payload) {
                        Ok(chunk) => {
                            let text = GeminiClient::extract_text(&chunk);
                            if !text.is_empty() {
                                yield Ok(text);
                            }
                        }
                        Err(e) => {
                            debug!(error = %e, "Skipping unparseable stream chunk");
                        }
                    }
                }
            }
        };

        Ok(stream.boxed())
    }
}
