use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),

    #[error("Invalid server address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),
}

/// The environment variable that sets a dotted config key,
/// e.g. `provider.api_key` -> `SCOUT_PROVIDER__API_KEY`
pub fn to_env_var(field: &str) -> String {
    format!("SCOUT_{}", field.replace('.', "__").to_uppercase())
}
