//! Shared fixtures for unit tests: a scripted LLM, a recording tool and a
//! one-shot local HTTP server.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::llms::base_llm::{BaseLLM, CallOptions, LLMMessage, LLMResponse};
use crate::tools::base_tool::BaseTool;
use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::exceptions::{LLMError, ToolError};

/// LLM that replays canned replies and records every request.
#[derive(Debug, Default)]
pub struct ScriptedLLM {
    replies: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<(Vec<LLMMessage>, CallOptions)>>,
}

impl ScriptedLLM {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Content of the last message of request `n`.
    pub fn last_message_of(&self, n: usize) -> String {
        self.requests.lock()[n]
            .0
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BaseLLM for ScriptedLLM {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn call(
        &self,
        messages: &[LLMMessage],
        options: &CallOptions,
    ) -> Result<LLMResponse, LLMError> {
        self.requests
            .lock()
            .push((messages.to_vec(), options.clone()));
        let text = self
            .replies
            .lock()
            .pop_front()
            .ok_or_else(|| LLMError::InvalidResponse {
                provider: "scripted".to_string(),
                message: "script exhausted".to_string(),
            })?;
        Ok(LLMResponse {
            text,
            usage: UsageMetrics {
                total_tokens: 10,
                prompt_tokens: 6,
                completion_tokens: 4,
                successful_requests: 1,
                ..UsageMetrics::default()
            },
        })
    }
}

/// Tool that echoes its input and remembers every call.
#[derive(Debug)]
pub struct EchoTool {
    pub name: String,
    pub calls: Mutex<Vec<String>>,
}

impl EchoTool {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl BaseTool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echoes its input."
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        self.calls.lock().push(input.to_string());
        Ok(format!("echo: {}", input))
    }
}

/// Serve one canned HTTP response per connection, in order, and return the
/// base URL. Each response is `(status, content_type, body)`.
pub async fn serve_responses(responses: Vec<(u16, &'static str, String)>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        for (status, content_type, body) in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            read_request(&mut socket).await;
            let reply = format!(
                "HTTP/1.1 {} X\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}

async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    line.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }
}
