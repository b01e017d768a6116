/// Chat client for the AI career coach.
///
/// Every call to the hosted chat-completion API goes through `ChatClient`.
/// `OpenRouterClient` is the production implementation; handlers only see the trait.
///
/// Failures never surface as errors to the caller: `advise` returns a readable
/// message instead, and `stream_advice` yields a single `"Error: …"` chunk.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::recommendation::models::RankedResult;

pub mod prompts;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const HTTP_REFERER: &str = "https://github.com/advanced-ai-career-bot";
const X_TITLE: &str = "Advanced AI Career Bot v2.0";

pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Popular OpenRouter models offered to clients.
pub const AVAILABLE_MODELS: [&str; 9] = [
    "anthropic/claude-3.5-sonnet",
    "anthropic/claude-3-opus",
    "openai/gpt-4-turbo",
    "openai/gpt-4o",
    "google/gemini-pro-1.5",
    "meta-llama/llama-3.1-70b-instruct",
    "meta-llama/llama-3.1-405b-instruct",
    "mistralai/mixtral-8x7b-instruct",
    "anthropic/claude-3-haiku",
];

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("chat completion returned no content")]
    EmptyContent,

    #[error("no response data for {0:?}")]
    Timeout(Duration),
}

impl ChatError {
    /// Text shown to the user in place of a reply.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Http(_) | ChatError::Api { .. } | ChatError::Timeout(_) => format!(
                "Error communicating with AI: {self}\n\nPlease check your API key and try again."
            ),
            ChatError::Parse(_) | ChatError::EmptyContent => format!("Unexpected error: {self}"),
        }
    }
}

/// Per-request generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Overrides the client's default model for this call only.
    pub model: Option<String>,
}

impl Default for AdviceOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            model: None,
        }
    }
}

impl AdviceOptions {
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    fn default_model(&self) -> &str;

    /// One complete reply. Transport and API failures come back as user-facing text.
    async fn advise(
        &self,
        prompt: &str,
        context: Option<&RankedResult>,
        options: &AdviceOptions,
    ) -> String;

    /// Reply as incremental text chunks. Dropping the stream cancels the request.
    fn stream_advice(
        &self,
        prompt: &str,
        context: Option<&RankedResult>,
        model: Option<&str>,
    ) -> BoxStream<'static, String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenRouter chat-completions client. No retries: one attempt per call.
///
/// `timeout` bounds a whole completion, but for streams it bounds the wait for
/// the response head and for each body chunk, so long replies are not cut off.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenRouterClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, ChatError> {
        Ok(Self {
            client: Client::builder().connect_timeout(timeout).build()?,
            api_key,
            model,
            base_url: OPENROUTER_API_URL.to_string(),
            timeout,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn request(&self, body: &CompletionRequest<'_>) -> RequestBuilder {
        self.client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", HTTP_REFERER)
            .header("X-Title", X_TITLE)
            .json(body)
    }

    /// Single completion with errors preserved.
    pub async fn try_advise(
        &self,
        prompt: &str,
        context: Option<&RankedResult>,
        options: &AdviceOptions,
    ) -> Result<String, ChatError> {
        let messages = prompts::advice_messages(prompt, context);
        let model = options.model.as_deref().unwrap_or(&self.model);
        let body = CompletionRequest {
            model,
            messages: &messages,
            temperature: Some(options.temperature),
            max_tokens: Some(options.max_tokens),
            stream: false,
        };

        let response = self.request(&body).timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = serde_json::from_slice(&response.bytes().await?)?;
        debug!(model, choices = completion.choices.len(), "chat completion received");

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ChatError::EmptyContent)
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    fn default_model(&self) -> &str {
        &self.model
    }

    async fn advise(
        &self,
        prompt: &str,
        context: Option<&RankedResult>,
        options: &AdviceOptions,
    ) -> String {
        match self.try_advise(prompt, context, options).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("chat completion failed: {e}");
                e.user_message()
            }
        }
    }

    fn stream_advice(
        &self,
        prompt: &str,
        context: Option<&RankedResult>,
        model: Option<&str>,
    ) -> BoxStream<'static, String> {
        let messages = prompts::stream_messages(prompt, context);
        let body = CompletionRequest {
            model: model.unwrap_or(&self.model),
            messages: &messages,
            temperature: None,
            max_tokens: None,
            stream: true,
        };
        let request = self.request(&body);
        let timeout = self.timeout;

        stream::once(async move {
            let response = tokio::time::timeout(timeout, request.send())
                .await
                .map_err(|_| ChatError::Timeout(timeout))??;
            Ok::<_, ChatError>(response.error_for_status()?)
        })
        .flat_map(move |response| match response {
            Ok(response) => sse_deltas(idle_timeout(response.bytes_stream(), timeout)).boxed(),
            Err(e) => {
                warn!("chat stream failed: {e}");
                stream::once(future::ready(format!("Error: {e}"))).boxed()
            }
        })
        .boxed()
    }
}

/// Fails with `ChatError::Timeout` when no chunk arrives within `idle`, then ends.
fn idle_timeout<S, E>(chunks: S, idle: Duration) -> impl Stream<Item = Result<Bytes, ChatError>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ChatError> + Send + 'static,
{
    stream::unfold(Some(chunks.boxed()), move |state| async move {
        let mut chunks = state?;
        match tokio::time::timeout(idle, chunks.next()).await {
            Ok(Some(chunk)) => Some((chunk.map_err(Into::into), Some(chunks))),
            Ok(None) => None,
            Err(_) => Some((Err(ChatError::Timeout(idle)), None)),
        }
    })
}

/// Extracts the content delta from one `data: {...}` line, if any.
fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.trim_end_matches('\r').strip_prefix("data: ")?;
    if data == "[DONE]" {
        return None;
    }
    let chunk: StreamChunk = serde_json::from_str(data).ok()?;
    chunk.choices.into_iter().next()?.delta.content
}

/// Splits a byte stream into lines, carrying partial lines across chunks.
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
    failed: bool,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Content deltas from an OpenRouter SSE body. A transport error mid-stream
/// yields one `"Error: …"` chunk and ends the stream.
fn sse_deltas<S, E>(chunks: S) -> impl Stream<Item = String>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    chunks
        .map(Some)
        .chain(stream::once(future::ready(None)))
        .scan(LineBuffer::default(), |buffer, chunk| {
            if buffer.failed {
                return future::ready(None);
            }
            let out: Vec<String> = match chunk {
                Some(Ok(bytes)) => buffer
                    .push(&bytes)
                    .iter()
                    .filter_map(|line| parse_sse_line(line))
                    .collect(),
                Some(Err(e)) => {
                    buffer.failed = true;
                    vec![format!("Error: {e}")]
                }
                None => buffer.finish().and_then(|line| parse_sse_line(&line)).into_iter().collect(),
            };
            future::ready(Some(out))
        })
        .flat_map(stream::iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    async fn collect(chunks: Vec<Result<Bytes, String>>) -> Vec<String> {
        sse_deltas(stream::iter(chunks)).collect().await
    }

    #[test]
    fn test_parse_sse_line() {
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#),
            Some("Hi".to_string())
        );
        assert_eq!(parse_sse_line("data: [DONE]"), None);
        assert_eq!(parse_sse_line("data: {not json"), None);
        assert_eq!(parse_sse_line(": keep-alive"), None);
        assert_eq!(parse_sse_line(r#"data: {"choices":[]}"#), None);
        assert_eq!(parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#), None);
    }

    #[tokio::test]
    async fn test_deltas_across_chunk_boundaries() {
        let body = format!("{}{}data: [DONE]\n", delta("Learn "), delta("Rust"));
        let (a, b) = body.split_at(10);
        let out = collect(vec![
            Ok(Bytes::from(a.to_string())),
            Ok(Bytes::from(b.to_string())),
        ])
        .await;
        assert_eq!(out, ["Learn ", "Rust"]);
    }

    #[tokio::test]
    async fn test_trailing_line_without_newline() {
        let body = delta("tail");
        let out = collect(vec![Ok(Bytes::from(body.trim_end().to_string()))]).await;
        assert_eq!(out, ["tail"]);
    }

    #[tokio::test]
    async fn test_malformed_lines_skipped() {
        let body = format!("data: {{oops\n\n{}", delta("ok"));
        let out = collect(vec![Ok(Bytes::from(body))]).await;
        assert_eq!(out, ["ok"]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let out = collect(vec![
            Ok(Bytes::from(delta("partial"))),
            Err("connection reset".to_string()),
            Ok(Bytes::from(delta("never"))),
        ])
        .await;
        assert_eq!(out, ["partial", "Error: connection reset"]);
    }

    /// Serves one chunked `text/event-stream` reply, sleeping `gap` before each delta.
    async fn slow_sse_server(deltas: Vec<&'static str>, gap: Duration) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let line = line.to_ascii_lowercase();
                            line.strip_prefix("content-length:")?.trim().parse::<usize>().ok()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let head = "HTTP/1.1 200 OK\r\n\
                        content-type: text/event-stream\r\n\
                        transfer-encoding: chunked\r\n\r\n";
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for content in deltas {
                tokio::time::sleep(gap).await;
                let event = delta(content);
                let chunk = format!("{:x}\r\n{event}\r\n", event.len());
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    return;
                }
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        });
        format!("http://{addr}/chat")
    }

    fn local_client(base_url: String, timeout: Duration) -> OpenRouterClient {
        OpenRouterClient::new("test-key".to_string(), DEFAULT_MODEL.to_string(), timeout)
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_stream_outlives_client_timeout() {
        let url = slow_sse_server(
            vec!["one ", "two ", "three ", "four"],
            Duration::from_millis(250),
        )
        .await;
        let client = local_client(url, Duration::from_millis(700));

        let out: Vec<String> = client.stream_advice("hi", None, None).collect().await;
        assert_eq!(out.concat(), "one two three four");
    }

    #[tokio::test]
    async fn test_stream_stalled_between_chunks_times_out() {
        let url = slow_sse_server(vec!["one ", "two "], Duration::from_millis(1500)).await;
        let client = local_client(url, Duration::from_millis(300));

        let out: Vec<String> = client.stream_advice("hi", None, None).collect().await;
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("Error: no response data"), "{out:?}");
    }

    #[tokio::test]
    async fn test_idle_timeout_passes_chunks_through() {
        let chunks = stream::iter(vec![
            Ok::<_, ChatError>(Bytes::from(delta("a"))),
            Ok(Bytes::from(delta("b"))),
        ]);
        let out: Vec<String> = sse_deltas(idle_timeout(chunks, Duration::from_secs(1)))
            .collect()
            .await;
        assert_eq!(out, ["a", "b"]);
    }

    #[test]
    fn test_user_messages() {
        let api = ChatError::Api {
            status: 401,
            message: "No auth credentials found".to_string(),
        };
        assert_eq!(
            api.user_message(),
            "Error communicating with AI: API error (status 401): No auth credentials found\n\n\
             Please check your API key and try again."
        );
        assert_eq!(
            ChatError::EmptyContent.user_message(),
            "Unexpected error: chat completion returned no content"
        );
    }

    #[test]
    fn test_request_payload_shape() {
        let messages = vec![ChatMessage::user("hi")];
        let body = CompletionRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            temperature: Some(0.7),
            max_tokens: Some(1000),
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "anthropic/claude-3.5-sonnet");
        assert_eq!(json["max_tokens"], 1000);
        assert!(json.get("stream").is_none());

        let streaming = CompletionRequest {
            temperature: None,
            max_tokens: None,
            stream: true,
            ..body
        };
        let json = serde_json::to_value(&streaming).unwrap();
        assert_eq!(json["stream"], true);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_default_options() {
        let options = AdviceOptions::default();
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.max_tokens, 1000);
        assert_eq!(AdviceOptions::with_max_tokens(2000).max_tokens, 2000);
    }
}
