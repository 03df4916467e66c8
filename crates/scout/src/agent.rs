use anyhow::Result;
use futures::stream::BoxStream;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::event::AgentEvent;
use crate::models::message::{Message, ToolRequest};
use crate::prompt_template::system_prompt;
use crate::providers::base::Provider;
use crate::tools::Toolbox;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Agent integrates a foundational LLM with the lookup tools it may call
pub struct Agent {
    provider: Box<dyn Provider>,
    toolbox: Toolbox,
    max_iterations: usize,
}

impl Agent {
    /// Create a new Agent with the specified provider and tools
    pub fn new(provider: Box<dyn Provider>, toolbox: Toolbox) -> Self {
        Self {
            provider,
            toolbox,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Limit the number of model calls a single reply may make
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Tool name and query for display, falling back to what the model sent
    fn describe_request(&self, request: &ToolRequest) -> (String, String) {
        match &request.tool_call {
            Ok(call) => match self.toolbox.resolve(call) {
                Ok((kind, query)) => (kind.name(), query),
                Err(_) => (
                    call.name.clone(),
                    call.arguments
                        .get("query")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                ),
            },
            Err(_) => (
                request
                    .raw
                    .as_ref()
                    .map(|raw| raw.name.clone())
                    .unwrap_or_else(|| "invalid".to_string()),
                String::new(),
            ),
        }
    }

    /// Dispatch a single tool call to the toolbox
    async fn dispatch_tool_call(&self, request: &ToolRequest) -> AgentResult<String> {
        let call = request.tool_call.clone()?;
        self.toolbox.dispatch(&call).await
    }

    /// Create a stream of the steps the agent takes to answer the conversation.
    ///
    /// The stream ends after a `FinalAnswer`, or with an error if the provider
    /// fails, a lookup fails, or the iteration limit is reached first.
    pub async fn reply(&self, messages: &[Message]) -> Result<BoxStream<'_, Result<AgentEvent>>> {
        let mut messages = messages.to_vec();
        let tools = self.toolbox.tools();
        let system_prompt =
            system_prompt(&tools).map_err(|e| AgentError::Internal(e.to_string()))?;

        Ok(Box::pin(async_stream::try_stream! {
            let mut answered = false;

            for iteration in 0..self.max_iterations {
                tracing::debug!(iteration = iteration + 1, "agent iteration");

                let (response, _usage) = self.provider.complete(
                    &system_prompt,
                    &messages,
                    &tools,
                ).await?;

                let tool_requests: Vec<ToolRequest> =
                    response.tool_requests().into_iter().cloned().collect();
                let text = response.as_concat_text();

                if tool_requests.is_empty() {
                    yield AgentEvent::FinalAnswer { text };
                    answered = true;
                    break;
                }

                if !text.is_empty() {
                    yield AgentEvent::ModelThought { text };
                }

                let described: Vec<(String, String)> = tool_requests
                    .iter()
                    .map(|request| self.describe_request(request))
                    .collect();
                for (request, (tool, query)) in tool_requests.iter().zip(described.iter()) {
                    yield AgentEvent::ToolInvoked {
                        id: request.id.clone(),
                        tool: tool.clone(),
                        query: query.clone(),
                    };
                }

                // Let the invocations reach the consumer before the lookups start
                tokio::task::yield_now().await;

                let futures: Vec<_> = tool_requests
                    .iter()
                    .map(|request| self.dispatch_tool_call(request))
                    .collect();
                let outputs = futures::future::join_all(futures).await;

                let mut message_tool_response = Message::user();
                for ((request, (tool, _)), output) in
                    tool_requests.iter().zip(described.into_iter()).zip(outputs.into_iter())
                {
                    match output {
                        Ok(text) => {
                            yield AgentEvent::ToolResult {
                                id: request.id.clone(),
                                tool,
                                output: text.clone(),
                                is_error: false,
                            };
                            message_tool_response = message_tool_response
                                .with_tool_response(request.id.clone(), Ok(vec![Content::text(text)]));
                        }
                        Err(e) if e.is_recoverable() => {
                            tracing::debug!(tool = %tool, error = %e, "tool call rejected");
                            yield AgentEvent::ToolResult {
                                id: request.id.clone(),
                                tool,
                                output: e.to_string(),
                                is_error: true,
                            };
                            message_tool_response = message_tool_response
                                .with_tool_response(request.id.clone(), Err(e));
                        }
                        Err(e) => {
                            tracing::warn!(tool = %tool, error = %e, "tool call failed");
                            Err(anyhow::Error::from(e))?;
                        }
                    }
                }

                messages.push(response);
                messages.push(message_tool_response);
            }

            if !answered {
                Err(anyhow::Error::from(AgentError::IterationLimit(self.max_iterations)))?;
            }
        }))
    }
}
