use serde::{Deserialize, Serialize};

/// One step of an agent reply, in the order the agent produced it.
///
/// A reply stream contains any number of thoughts, tool invocations and tool
/// results, and ends with exactly one `FinalAnswer` unless it fails first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Text the model produced alongside tool requests
    ModelThought { text: String },
    /// The model asked for a tool; `query` is empty when the arguments were unusable
    ToolInvoked {
        id: String,
        tool: String,
        query: String,
    },
    ToolResult {
        id: String,
        tool: String,
        output: String,
        is_error: bool,
    },
    FinalAnswer { text: String },
}

impl AgentEvent {
    /// Short name used as the event kind on streaming transports
    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::ModelThought { .. } => "thought",
            AgentEvent::ToolInvoked { .. } => "tool_invoked",
            AgentEvent::ToolResult { .. } => "tool_result",
            AgentEvent::FinalAnswer { .. } => "answer",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, AgentEvent::FinalAnswer { .. })
    }
}
