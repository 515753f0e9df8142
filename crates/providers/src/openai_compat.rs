//! OpenAI-compatible reasoning backend.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any other
//! endpoint exposing an OpenAI-compatible `/v1/chat/completions` API.
//!
//! Tool calls come back as intents only — the engine owns the think/act
//! loop, so the backend is never asked to execute anything itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stepwright_core::error::ReasoningError;
use stepwright_core::message::{Message, ToolCallRequest};
use stepwright_core::reasoning::{ReasoningOutcome, ReasoningPort, ReasoningRequest, ToolSignature};
use tracing::{debug, warn};

/// An OpenAI-compatible reasoning backend.
pub struct OpenAiCompatReasoner {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatReasoner {
    /// Create a new OpenAI-compatible backend.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create an OpenRouter backend (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key, model)
    }

    /// Create an OpenAI backend (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    /// Create an Ollama backend (convenience constructor).
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
            model,
        )
    }

    /// Convert domain messages to OpenAI API format. A `ToolResponses`
    /// message fans out into one API message per response.
    fn to_api_messages(system_prompt: &str, messages: &[Message]) -> Vec<ApiMessage> {
        let mut api_messages = Vec::with_capacity(messages.len() + 1);

        if !system_prompt.is_empty() {
            api_messages.push(ApiMessage {
                role: "system".into(),
                content: Some(system_prompt.to_string()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        for message in messages {
            match message {
                Message::User { text } => api_messages.push(ApiMessage {
                    role: "user".into(),
                    content: Some(text.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                }),
                Message::Assistant { text, tool_calls } => api_messages.push(ApiMessage {
                    role: "assistant".into(),
                    content: Some(text.clone()),
                    tool_calls: if tool_calls.is_empty() {
                        None
                    } else {
                        Some(
                            tool_calls
                                .iter()
                                .map(|tc| ApiToolCall {
                                    id: tc.id.clone(),
                                    r#type: "function".into(),
                                    function: ApiFunction {
                                        name: tc.name.clone(),
                                        arguments: tc.arguments.clone(),
                                    },
                                })
                                .collect(),
                        )
                    },
                    tool_call_id: None,
                }),
                Message::ToolResponses { responses } => {
                    for response in responses {
                        api_messages.push(ApiMessage {
                            role: "tool".into(),
                            content: Some(response.result.clone()),
                            tool_calls: None,
                            tool_call_id: Some(response.id.clone()),
                        });
                    }
                }
            }
        }

        api_messages
    }

    /// Convert tool signatures to OpenAI API format.
    fn to_api_tools(tools: &[ToolSignature]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }
}

#[async_trait]
impl ReasoningPort for OpenAiCompatReasoner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reason(
        &self,
        request: ReasoningRequest,
    ) -> std::result::Result<ReasoningOutcome, ReasoningError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(&request.system_prompt, &request.messages),
            "temperature": request.options.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.options.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        debug!(provider = %self.name, model = %self.model, "Sending reasoning request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReasoningError::Timeout(e.to_string())
                } else {
                    ReasoningError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ReasoningError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ReasoningError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status == 404 {
            return Err(ReasoningError::ModelNotFound(self.model.clone()));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ReasoningError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            ReasoningError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            }
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReasoningError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCallRequest {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        Ok(ReasoningOutcome {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

// --- Wire types ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwright_core::message::ToolResponse;

    #[test]
    fn system_prompt_leads_the_message_list() {
        let api = OpenAiCompatReasoner::to_api_messages(
            "You are helpful.",
            &[Message::user("hi")],
        );
        assert_eq!(api.len(), 2);
        assert_eq!(api[0].role, "system");
        assert_eq!(api[0].content.as_deref(), Some("You are helpful."));
        assert_eq!(api[1].role, "user");
    }

    #[test]
    fn tool_responses_fan_out() {
        let messages = vec![
            Message::assistant_with_calls(
                "",
                vec![
                    ToolCallRequest {
                        id: "c1".into(),
                        name: "read_file".into(),
                        arguments: "{}".into(),
                    },
                    ToolCallRequest {
                        id: "c2".into(),
                        name: "write_file".into(),
                        arguments: "{}".into(),
                    },
                ],
            ),
            Message::tool_responses(vec![
                ToolResponse {
                    id: "c1".into(),
                    name: "read_file".into(),
                    result: "contents".into(),
                },
                ToolResponse {
                    id: "c2".into(),
                    name: "write_file".into(),
                    result: "written".into(),
                },
            ]),
        ];

        let api = OpenAiCompatReasoner::to_api_messages("", &messages);
        assert_eq!(api.len(), 3);
        assert_eq!(api[0].role, "assistant");
        assert_eq!(api[0].tool_calls.as_ref().unwrap().len(), 2);
        assert_eq!(api[1].role, "tool");
        assert_eq!(api[1].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(api[2].tool_call_id.as_deref(), Some("c2"));
    }

    #[test]
    fn assistant_without_calls_omits_the_field() {
        let api = OpenAiCompatReasoner::to_api_messages("", &[Message::assistant("hello")]);
        let json = serde_json::to_string(&api[0]).unwrap();
        assert!(!json.contains("tool_calls"));
    }

    #[test]
    fn tool_signatures_map_to_function_definitions() {
        let tools = vec![ToolSignature {
            name: "terminate".into(),
            description: "Finish the task".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let api = OpenAiCompatReasoner::to_api_tools(&tools);
        assert_eq!(api[0].r#type, "function");
        assert_eq!(api[0].function.name, "terminate");
    }

    #[test]
    fn response_with_tool_calls_parses() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "write_file",
                            "arguments": "{\"name\":\"r.md\",\"content\":\"x\"}"
                        }
                    }]
                }
            }]
        });
        let parsed: ApiResponse = serde_json::from_value(raw).unwrap();
        let message = &parsed.choices[0].message;
        assert!(message.content.is_none());
        assert_eq!(
            message.tool_calls.as_ref().unwrap()[0].function.name,
            "write_file"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend =
            OpenAiCompatReasoner::new("test", "https://example.com/v1/", "key", "model-x");
        assert_eq!(backend.base_url, "https://example.com/v1");
    }
}
