use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use crate::chat::{ChatModel, Message, ModelTurn, ToolCall};
use crate::tools::tool_schemas;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const TEMPERATURE: f64 = 0.5;

/// Blocking OpenAI chat-completions client with the ticket tool schemas
/// bound to every request.
pub struct OpenAiModel {
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OpenAiModel {
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .context("Failed to build OpenAI HTTP client")?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        })
    }
}

fn wire_message(message: &Message) -> Value {
    match message {
        Message::System(content) => json!({ "role": "system", "content": content }),
        Message::User(content) => json!({ "role": "user", "content": content }),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut wire = json!({ "role": "assistant", "content": content });
            if !tool_calls.is_empty() {
                wire["tool_calls"] = Value::Array(
                    tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.args.to_string(),
                                }
                            })
                        })
                        .collect(),
                );
            }
            wire
        }
        Message::Tool {
            content,
            tool_call_id,
        } => json!({ "role": "tool", "content": content, "tool_call_id": tool_call_id }),
    }
}

fn parse_tool_call(value: &Value) -> ToolCall {
    let function = value.get("function").cloned().unwrap_or_else(|| json!({}));
    let args = function
        .get("arguments")
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or(Value::Null);
    ToolCall {
        id: value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        name: function
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        args,
    }
}

impl ChatModel for OpenAiModel {
    fn invoke(&self, messages: &[Message]) -> Result<ModelTurn> {
        let body = json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "messages": messages.iter().map(wire_message).collect::<Vec<_>>(),
            "tools": tool_schemas(),
        });

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("OpenAI request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("OpenAI API error {status}: {body}");
        }

        let data: Value = response.json().context("Invalid JSON from OpenAI")?;
        let message = data
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .cloned()
            .context("OpenAI response missing choices[0].message")?;

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let tool_calls = message
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| calls.iter().map(parse_tool_call).collect())
            .unwrap_or_default();

        Ok(ModelTurn {
            content,
            tool_calls,
        })
    }
}
