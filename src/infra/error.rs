use thiserror::Error;

/// Failures from the process's outer edges: sockets, Postgres, logging and settings.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("listener i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("keydash database unavailable: {message}")]
    Database { message: String },
    #[error("tracing subscriber could not be installed: {0}")]
    Telemetry(String),
    #[error("invalid keydash configuration: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
