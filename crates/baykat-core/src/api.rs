//! Anthropic API client with a bounded tool-use loop
//!
//! The loop is an explicit state machine: `AwaitingModel` → (`ExecutingTools`
//! →)* `Done`, with a hard turn cap. State transitions are computed by a pure
//! function so termination behavior is unit-testable without the network.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::tools::ToolExecutor;

/// Model used by the specialist agents and the synthesis call. Small and
/// fast; farm questions rarely need more.
pub const DEFAULT_FAST_MODEL: &str = "claude-3-haiku-20240307";

/// Anthropic API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Mask the API key in debug output
        let masked_key = if self.api_key.len() > 7 {
            format!(
                "{}...{}",
                &self.api_key[..3],
                &self.api_key[self.api_key.len() - 4..]
            )
        } else {
            "***".to_string()
        };

        f.debug_struct("ApiClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &masked_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client. `model` defaults to the fast model.
    pub fn new(api_key: String, model: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model: model.unwrap_or_else(|| DEFAULT_FAST_MODEL.to_string()),
            max_tokens: 1024,
        }
    }

    /// Set max tokens for responses
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set a custom base URL (e.g. for proxies or regional endpoints)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Make a single chat request
    pub async fn chat(
        &self,
        messages: &[ApiMessage],
        tools: &[ToolDefinition],
        system: &str,
    ) -> Result<ApiResponse> {
        let url = format!("{}/v1/messages", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": messages,
            "tools": tools,
        });

        debug!(
            "Sending request to Anthropic API with {} messages",
            messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse API response")?;

        debug!(
            "Received response with {} content blocks, stop_reason: {:?}",
            api_response.content.len(),
            api_response.stop_reason
        );

        Ok(api_response)
    }

    /// One request, no tools, text out. Used by the synthesis step.
    pub async fn complete(&self, prompt: &str, system: &str) -> Result<String> {
        let messages = vec![ApiMessage {
            role: "user".to_string(),
            content: MessageContent::Text(prompt.to_string()),
        }];

        let response = self.chat(&messages, &[], system).await?;
        let text = collect_text(&response.content);
        if text.is_empty() {
            return Err(anyhow!("No text response from assistant"));
        }
        Ok(text)
    }

    /// Run the tool-use loop until the model stops asking for tools
    /// (with an overall wall-clock timeout).
    pub async fn run_tool_loop(
        &self,
        initial_message: &str,
        system: &str,
        tools: &[ToolDefinition],
        tool_executor: &dyn ToolExecutor,
    ) -> Result<String> {
        tokio::time::timeout(
            Duration::from_secs(120),
            self.run_tool_loop_inner(initial_message, system, tools, tool_executor),
        )
        .await
        .map_err(|_| anyhow!("Tool loop timed out after 2 minutes"))?
    }

    async fn run_tool_loop_inner(
        &self,
        initial_message: &str,
        system: &str,
        tools: &[ToolDefinition],
        tool_executor: &dyn ToolExecutor,
    ) -> Result<String> {
        const MAX_TOOL_OUTPUT: usize = 20_000;
        const MAX_TURNS: usize = 6;

        let mut conversation: Vec<ApiMessage> = vec![ApiMessage {
            role: "user".to_string(),
            content: MessageContent::Text(initial_message.to_string()),
        }];

        let mut state = LoopState::AwaitingModel;
        let mut last_content: Vec<ContentBlock> = Vec::new();
        let mut turns = 0;

        loop {
            match state {
                LoopState::AwaitingModel => {
                    turns += 1;
                    if turns > MAX_TURNS {
                        warn!("Tool loop exceeded maximum turns ({})", MAX_TURNS);
                        return Err(anyhow!("Tool loop exceeded maximum turns"));
                    }

                    debug!("Tool loop turn {}", turns);
                    let response = self.chat(&conversation, tools, system).await?;

                    conversation.push(ApiMessage {
                        role: "assistant".to_string(),
                        content: MessageContent::Blocks(response.content.clone()),
                    });

                    let has_tool_calls = response
                        .content
                        .iter()
                        .any(|b| matches!(b, ContentBlock::ToolUse { .. }));
                    state = advance(response.stop_reason.as_deref(), has_tool_calls)?;
                    last_content = response.content;
                }
                LoopState::ExecutingTools => {
                    let mut tool_results = Vec::new();

                    for block in &last_content {
                        if let ContentBlock::ToolUse { id, name, input } = block {
                            info!("Executing tool: {}", name);

                            let result = tool_executor.execute(name, input.clone()).await;

                            let mut result_content = match result {
                                Ok(output) => output,
                                Err(e) => {
                                    warn!("Tool {} failed: {}", name, e);
                                    format!("Error: {}", e)
                                }
                            };

                            // Cap oversized tool outputs to keep the context small
                            if result_content.len() > MAX_TOOL_OUTPUT {
                                result_content.truncate(MAX_TOOL_OUTPUT);
                                result_content.push_str("\n[Output truncated]");
                            }

                            tool_results.push(ContentBlock::ToolResult {
                                tool_use_id: id.clone(),
                                content: result_content,
                            });
                        }
                    }

                    conversation.push(ApiMessage {
                        role: "user".to_string(),
                        content: MessageContent::Blocks(tool_results),
                    });

                    state = LoopState::AwaitingModel;
                }
                LoopState::Done => {
                    debug!("Tool loop completed in {} turns", turns);

                    let final_text = collect_text(&last_content);
                    if final_text.is_empty() {
                        return Err(anyhow!("No text response from assistant"));
                    }
                    return Ok(final_text);
                }
            }
        }
    }
}

/// State of the tool-use loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    AwaitingModel,
    ExecutingTools,
    Done,
}

/// Decide the state that follows a model response. Pure: callers feed in the
/// stop reason and whether the response carried tool calls.
fn advance(stop_reason: Option<&str>, has_tool_calls: bool) -> Result<LoopState> {
    match stop_reason {
        Some("tool_use") => {
            if !has_tool_calls {
                return Err(anyhow!("Stop reason was tool_use but no tool calls found"));
            }
            Ok(LoopState::ExecutingTools)
        }
        Some("end_turn") | None => Ok(LoopState::Done),
        Some("max_tokens") => {
            // The answer is cut short but still usable, especially over SMS.
            warn!("Response hit the max_tokens limit, returning truncated text");
            Ok(LoopState::Done)
        }
        Some(other) => Err(anyhow!("Unexpected stop_reason: {}", other)),
    }
}

/// Join the text blocks of a response, newline-separated.
pub(crate) fn collect_text(content: &[ContentBlock]) -> String {
    let mut out = String::new();
    for block in content {
        if let ContentBlock::Text { text } = block {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(text);
        }
    }
    out
}

/// Message in conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: MessageContent,
}

/// Content of a message (simple text or structured blocks)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        source: ImageSource,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

/// Base64 image payload for vision requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

/// Tool definition for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Response from the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
