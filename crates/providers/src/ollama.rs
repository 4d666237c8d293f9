//! Ollama generation client — streaming completion over a local endpoint.
//!
//! Speaks the `/api/generate` wire protocol: one POST with `stream: true`,
//! answered by newline-delimited JSON objects `{response, done}`. Fragments
//! are accumulated as they arrive and the cumulative text is pushed to the
//! caller after each one. Malformed lines are logged and skipped — a bad
//! chunk never aborts the stream.
//!
//! The endpoint can be repointed at runtime via [`OllamaClient::set_endpoint`];
//! the new address takes effect on the next request.

use async_trait::async_trait;
use echomind_core::error::GenerationError;
use echomind_core::generation::{GenerationRequest, Generator, TokenSink};
use futures::StreamExt;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Generation runs far longer than a simple request; its timeout is this
/// multiple of the configured request timeout.
const GENERATION_TIMEOUT_MULT: u32 = 6;

/// A client for an Ollama-compatible streaming generation endpoint.
pub struct OllamaClient {
    base_url: RwLock<String>,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new client for `http://{host}:{port}`.
    pub fn new(host: &str, port: u16, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: RwLock::new(format!("http://{host}:{port}")),
            request_timeout,
            client,
        }
    }

    /// Repoint the client at a different endpoint. Takes effect on the next
    /// request; an in-flight stream keeps its original connection.
    pub fn set_endpoint(&self, host: &str, port: u16) {
        let mut url = self
            .base_url
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *url = format!("http://{host}:{port}");
        info!(target: "llm", endpoint = %url, "Generation endpoint updated");
    }

    fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn map_transport_err(url: &str, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(format!("{url}: {e}"))
        } else if e.is_connect() {
            GenerationError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            GenerationError::Network(e.to_string())
        }
    }
}

/// One newline-delimited chunk of a streaming generation response.
#[derive(Debug, Deserialize)]
struct GenChunk {
    #[serde(default)]
    response: String,

    #[serde(default)]
    done: bool,
}

#[async_trait]
impl Generator for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
        on_token: TokenSink<'_>,
    ) -> std::result::Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url());

        let body = serde_json::json!({
            "model": request.model.as_str(),
            "prompt": request.prompt.as_str(),
            "stream": true,
            "options": {
                "num_gpu": request.num_gpu,
                "temperature": request.temperature,
            },
        });

        debug!(
            target: "llm",
            model = %request.model,
            prompt_len = request.prompt.len(),
            "Sending streaming generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.request_timeout * GENERATION_TIMEOUT_MULT)
            .send()
            .await
            .map_err(|e| Self::map_transport_err(&url, e))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(target: "llm", status, body = %error_body, "Generation endpoint returned error");
            return Err(GenerationError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let mut byte_stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut full_text = String::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let bytes = match chunk_result {
                Ok(b) => b,
                Err(e) if e.is_timeout() => {
                    return Err(GenerationError::Timeout(format!("{url}: {e}")));
                }
                Err(e) => {
                    return Err(GenerationError::StreamInterrupted(e.to_string()));
                }
            };

            // Append new bytes to our line buffer, then process complete lines.
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim_end_matches('\r').to_string();
                buffer = buffer[line_end + 1..].to_string();

                if line.is_empty() {
                    continue;
                }

                if consume_line(&line, &mut full_text, &mut *on_token) {
                    debug!(
                        target: "llm",
                        response_len = full_text.len(),
                        "Generation stream complete"
                    );
                    return Ok(full_text);
                }
            }
        }

        // The connection closed without a done marker. A final line may still
        // be buffered without its trailing newline.
        let tail = buffer.trim();
        if !tail.is_empty() {
            consume_line(tail, &mut full_text, &mut *on_token);
        }

        debug!(
            target: "llm",
            response_len = full_text.len(),
            "Generation stream closed by endpoint"
        );
        Ok(full_text)
    }

    async fn health_check(&self) -> std::result::Result<(), GenerationError> {
        let url = format!("{}/api/version", self.base_url());

        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| Self::map_transport_err(&url, e))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(GenerationError::ApiError {
                status_code: status,
                message: format!("version check at {url} failed"),
            });
        }

        let version: serde_json::Value = response.json().await.unwrap_or_default();
        info!(target: "llm", %url, version = %version, "Generation endpoint reachable");
        Ok(())
    }
}

/// Parse one stream line into the running text. Returns `true` when the
/// chunk carries the done marker. Unparseable lines are skipped.
fn consume_line(line: &str, full_text: &mut String, on_token: TokenSink<'_>) -> bool {
    match serde_json::from_str::<GenChunk>(line) {
        Ok(chunk) => {
            full_text.push_str(&chunk.response);
            on_token(full_text);
            chunk.done
        }
        Err(e) => {
            warn!(target: "llm", line = %line, error = %e, "Skipping malformed stream chunk");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_content_chunk() {
        let chunk: GenChunk = serde_json::from_str(r#"{"response":"Hi","done":false}"#).unwrap();
        assert_eq!(chunk.response, "Hi");
        assert!(!chunk.done);
    }

    #[test]
    fn parse_done_chunk() {
        let chunk: GenChunk = serde_json::from_str(r#"{"response":" there","done":true}"#).unwrap();
        assert_eq!(chunk.response, " there");
        assert!(chunk.done);
    }

    #[test]
    fn parse_chunk_with_missing_fields() {
        // Real endpoints add fields like model/created_at and sometimes omit
        // response on the final chunk; both directions must parse.
        let chunk: GenChunk =
            serde_json::from_str(r#"{"model":"gemma3:27b","done":true}"#).unwrap();
        assert_eq!(chunk.response, "");
        assert!(chunk.done);
    }

    #[test]
    fn consume_line_accumulates_and_pushes_cumulative_text() {
        let mut full = String::new();
        let mut seen: Vec<String> = Vec::new();
        let mut sink = |s: &str| seen.push(s.to_string());

        assert!(!consume_line(r#"{"response":"Hi","done":false}"#, &mut full, &mut sink));
        assert!(consume_line(r#"{"response":" there","done":true}"#, &mut full, &mut sink));

        assert_eq!(full, "Hi there");
        assert_eq!(seen, vec!["Hi".to_string(), "Hi there".to_string()]);
    }

    #[test]
    fn consume_line_skips_malformed_chunks() {
        let mut full = String::new();
        let mut calls = 0usize;
        let mut sink = |_: &str| calls += 1;

        assert!(!consume_line("not json at all", &mut full, &mut sink));
        assert!(full.is_empty());

        // The stream continues after a bad line.
        assert!(consume_line(r#"{"response":"ok","done":true}"#, &mut full, &mut sink));
        drop(sink);
        assert_eq!(full, "ok");
        assert_eq!(calls, 1);
    }

    #[test]
    fn endpoint_url_and_runtime_swap() {
        let client = OllamaClient::new("127.0.0.1", 11434, Duration::from_secs(10));
        assert_eq!(client.base_url(), "http://127.0.0.1:11434");

        client.set_endpoint("192.168.45.160", 11435);
        assert_eq!(client.base_url(), "http://192.168.45.160:11435");
    }

    #[test]
    fn generator_name() {
        let client = OllamaClient::new("localhost", 11434, Duration::from_secs(5));
        assert_eq!(client.name(), "ollama");
    }
}
