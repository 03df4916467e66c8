use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use scout::agent::DEFAULT_MAX_ITERATIONS;
use scout::providers::configs::{OpenAiProviderConfig, OPENAI_HOST, OPENAI_MODEL};
use scout::tools::configs::{default_arxiv, default_search, default_wikipedia};
use scout::tools::{LookupConfig, ToolConfig};
use scout::turn::AgentConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_openai_host")]
    pub host: String,
    /// May be absent; sessions can then supply their own key
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default = "default_stream")]
    pub stream: bool,
}

impl ProviderSettings {
    pub fn to_config(&self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.host.clone(),
            api_key: self.api_key.clone().unwrap_or_default(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: self.stream,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    /// Idle time after which a session is dropped
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_sweep_secs")]
    pub sweep_secs: u64,
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_secs.max(1))
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub agent: AgentSettings,
    pub tools: ToolConfig,
    pub session: SessionSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut settings = Self::load_and_validate()?;

        let has_key = settings
            .provider
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !has_key {
            settings.provider.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        Ok(settings)
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            // Provider defaults
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.model", default_model())?
            .set_default("provider.stream", default_stream())?
            // Agent and session defaults
            .set_default("agent.max_iterations", default_max_iterations() as i64)?
            .set_default("session.ttl_secs", default_ttl_secs() as i64)?
            .set_default("session.sweep_secs", default_sweep_secs() as i64)?;

        let builder = lookup_defaults(builder, "search", default_search())?;
        let builder = lookup_defaults(builder, "arxiv", default_arxiv())?;
        let builder = lookup_defaults(builder, "wikipedia", default_wikipedia())?;

        let config = builder
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("SCOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // "missing field `api_key`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            provider: self.provider.to_config(),
            tools: self.tools.clone(),
            max_iterations: self.agent.max_iterations,
        }
    }
}

type Builder = config::builder::ConfigBuilder<config::builder::DefaultState>;

fn lookup_defaults(
    builder: Builder,
    name: &str,
    lookup: LookupConfig,
) -> Result<Builder, ConfigError> {
    Ok(builder
        .set_default(format!("tools.{}.host", name), lookup.host)?
        .set_default(format!("tools.{}.top_k", name), lookup.top_k as i64)?
        .set_default(format!("tools.{}.max_chars", name), lookup.max_chars as i64)?)
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_stream() -> bool {
    true
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_sweep_secs() -> u64 {
    60
}
