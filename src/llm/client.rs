//! Completion client: one HTTP path for every provider.
//!
//! DESIGN
//! ======
//! The client validates preconditions, asks the provider's adapter to build
//! the call, performs it, and normalizes the outcome. Buffered providers are
//! read in one piece; streaming providers are decoded record by record, with
//! each partial accumulation pushed to the caller's progress channel.
//!
//! ERROR HANDLING
//! ==============
//! Non-success statuses become `Http` with the provider's own message.
//! A body that parses but yields no text (or does not parse at all) is
//! `EmptyCompletion`. Timeouts are distinguished from other transport errors.

use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, info, warn};

use super::config::GeneratorConfig;
use super::prompt::{SYSTEM_PROMPT, clean_completion};
use super::provider::{ProviderAdapter, RequestParts, extract_provider_message};
use super::stream::{SseDecoder, SseRecord};
use super::types::{DiagramGenerator, GenerationError, GenerationRequest, ProgressSender};

pub struct CompletionClient {
    http: reqwest::Client,
    config: GeneratorConfig,
}

impl CompletionClient {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be constructed.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| GenerationError::Transport(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, config })
    }

    async fn send(
        &self,
        adapter: &dyn ProviderAdapter,
        request: &GenerationRequest,
        progress: Option<&ProgressSender>,
    ) -> Result<String, GenerationError> {
        let endpoint = self.config.endpoint(request.provider);
        let call = adapter.build_request(RequestParts {
            endpoint: &endpoint,
            system: SYSTEM_PROMPT,
            prompt: request.prompt.trim(),
            credential: request.credential.trim(),
            max_tokens: self.config.max_tokens,
        });

        let mut builder = self.http.post(&call.url).json(&call.body);
        for (name, value) in &call.headers {
            builder = builder.header(*name, value);
        }
        if !call.query.is_empty() {
            builder = builder.query(&call.query);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Http { status, provider_message: extract_provider_message(&body) });
        }

        if adapter.supports_streaming() {
            read_stream(adapter, response, progress).await
        } else {
            let body = response.text().await?;
            Ok(adapter.parse_response(&body).unwrap_or_default())
        }
    }
}

#[async_trait::async_trait]
impl DiagramGenerator for CompletionClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
        progress: Option<&ProgressSender>,
    ) -> Result<String, GenerationError> {
        request.validate()?;

        let adapter = request.provider.adapter();
        info!(
            provider = %request.provider,
            streaming = adapter.supports_streaming(),
            prompt_len = request.prompt.len(),
            "llm: generation request"
        );

        let raw = match self.send(adapter, request, progress).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(provider = %request.provider, error = %e, "llm: generation failed");
                return Err(e);
            }
        };

        let text = clean_completion(&raw);
        if text.is_empty() {
            warn!(provider = %request.provider, "llm: empty completion");
            return Err(GenerationError::EmptyCompletion);
        }
        info!(provider = %request.provider, output_len = text.len(), "llm: generation complete");
        Ok(text)
    }
}

/// Accumulate streamed deltas, publishing each partial accumulation.
async fn read_stream(
    adapter: &dyn ProviderAdapter,
    response: reqwest::Response,
    progress: Option<&ProgressSender>,
) -> Result<String, GenerationError> {
    let mut decoder = SseDecoder::new();
    let mut accumulated = String::new();
    let mut chunks = response.bytes_stream();

    let apply = |record: SseRecord, accumulated: &mut String| -> bool {
        match record {
            SseRecord::Done => true,
            SseRecord::Data(json) => {
                if let Some(delta) = adapter.parse_stream_record(&json)
                    && !delta.is_empty()
                {
                    accumulated.push_str(&delta);
                    if let Some(tx) = progress {
                        // Receiver may be gone if the caller stopped listening.
                        let _ = tx.send(accumulated.clone());
                    }
                }
                false
            }
        }
    };

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        for record in decoder.push(&chunk) {
            if apply(record, &mut accumulated) {
                debug!(len = accumulated.len(), "llm: stream finished");
                return Ok(accumulated);
            }
        }
    }
    if let Some(record) = decoder.finish() {
        apply(record, &mut accumulated);
    }
    debug!(len = accumulated.len(), "llm: stream closed without sentinel");
    Ok(accumulated)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
