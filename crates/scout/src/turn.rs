use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::agent::{Agent, DEFAULT_MAX_ITERATIONS};
use crate::models::event::AgentEvent;
use crate::providers::configs::OpenAiProviderConfig;
use crate::providers::openai::OpenAiProvider;
use crate::session::{ChatEntry, ChatSession};
use crate::tools::{ToolConfig, Toolbox};

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Please enter a question")]
    EmptyPrompt,

    #[error("Please add your OpenAI API key to continue.")]
    MissingCredential,

    #[error("{0}")]
    Agent(#[from] anyhow::Error),

    #[error("The agent stopped without giving an answer")]
    NoAnswer,
}

/// Receives every agent event of a turn as it happens
pub trait EventSink {
    fn send(&mut self, event: &AgentEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&AgentEvent),
{
    fn send(&mut self, event: &AgentEvent) {
        self(event)
    }
}

impl EventSink for mpsc::UnboundedSender<AgentEvent> {
    fn send(&mut self, event: &AgentEvent) {
        // A closed receiver means nobody is watching; the turn still completes
        let _ = mpsc::UnboundedSender::send(self, event.clone());
    }
}

/// Everything needed to build an agent. Agents are cheap and built per turn,
/// so a changed credential takes effect on the next turn.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub provider: OpenAiProviderConfig,
    pub tools: ToolConfig,
    pub max_iterations: usize,
}

impl AgentConfig {
    pub fn new(provider: OpenAiProviderConfig) -> Self {
        Self {
            provider,
            tools: ToolConfig::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Build an agent, preferring `session_key` over the configured key
    pub fn build(&self, session_key: Option<&str>) -> Result<Agent, TurnError> {
        let api_key = resolve_api_key(session_key, Some(&self.provider.api_key))?;
        let provider = OpenAiProvider::new(OpenAiProviderConfig {
            api_key,
            ..self.provider.clone()
        })?;
        let toolbox = Toolbox::from_config(&self.tools).map_err(anyhow::Error::from)?;

        Ok(Agent::new(Box::new(provider), toolbox).with_max_iterations(self.max_iterations))
    }
}

/// A non-blank per-session key wins over the process-wide key
pub fn resolve_api_key(
    session_key: Option<&str>,
    process_key: Option<&str>,
) -> Result<String, TurnError> {
    [session_key, process_key]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(TurnError::MissingCredential)
}

/// Run one turn: record the prompt, let the agent work through the whole
/// conversation, and record its answer.
///
/// On failure the user entry stays in the log but no assistant entry is added.
pub async fn run_turn<S: EventSink>(
    session: &mut ChatSession,
    agent: &Agent,
    prompt: &str,
    mut sink: S,
) -> Result<String, TurnError> {
    if prompt.trim().is_empty() {
        return Err(TurnError::EmptyPrompt);
    }

    session.append(ChatEntry::user(prompt));
    let messages = session.to_messages();
    tracing::debug!(session = %session.id(), context = messages.len(), "starting turn");

    let mut stream = agent.reply(&messages).await?;
    while let Some(event) = stream.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(session = %session.id(), error = %e, "turn failed");
                return Err(TurnError::Agent(e));
            }
        };
        sink.send(&event);

        if let AgentEvent::FinalAnswer { text } = event {
            session.append(ChatEntry::assistant(text.clone()));
            return Ok(text);
        }
    }

    Err(TurnError::NoAnswer)
}
