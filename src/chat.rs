use anyhow::Result;
use serde_json::Value;

/// A tool invocation requested by the model. The `id` correlates the
/// eventual tool-result message back to this call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// One entry in a stage's (or the selection loop's) conversation history.
/// Append-only for the lifetime of the stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    System(String),
    User(String),
    Assistant {
        content: String,
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        content: String,
        tool_call_id: String,
    },
}

impl Message {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self, Self::Tool { .. })
    }
}

/// What one blocking model invocation produced: free text plus zero or
/// more pending tool calls.
#[derive(Debug, Clone, Default)]
pub struct ModelTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelTurn {
    pub fn into_message(self) -> Message {
        Message::Assistant {
            content: self.content,
            tool_calls: self.tool_calls,
        }
    }
}

/// Opaque model invocation: message history in, text and tool calls out.
/// Single blocking call per turn, no streaming, no retry.
pub trait ChatModel {
    fn invoke(&self, messages: &[Message]) -> Result<ModelTurn>;
}
