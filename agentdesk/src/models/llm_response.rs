use crate::models::ToolCall;

/// Token accounting reported by a provider. Missing counts stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl TokenUsage {
    pub const fn empty() -> Self {
        Self {
            input_tokens: None,
            output_tokens: None,
            total_tokens: None,
        }
    }

    pub const fn partial(
        input_tokens: Option<u32>,
        output_tokens: Option<u32>,
        total_tokens: Option<u32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// One model reply: text, tool calls, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    text: Option<String>,
    tool_calls: Vec<ToolCall>,
    usage: TokenUsage,
}

impl LlmResponse {
    pub fn new(text: Option<String>, tool_calls: Vec<ToolCall>, usage: TokenUsage) -> Self {
        Self {
            text,
            tool_calls,
            usage,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Some(text.into()), Vec::new(), TokenUsage::empty())
    }

    pub fn from_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self::new(None, tool_calls, TokenUsage::empty())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn into_parts(self) -> (Option<String>, Vec<ToolCall>) {
        (self.text, self.tool_calls)
    }
}
