//! Error types for Ember

use thiserror::Error;

/// The main error type for Ember operations
#[derive(Debug, Error)]
pub enum EmberError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Instantiation error: {0}")]
    Instantiation(String),

    #[error("Container error: {0}")]
    Container(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Unknown callable '{name}' for {slot}")]
    UnknownCallable { slot: &'static str, name: String },

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },
}

impl EmberError {
    /// True for every error raised while configuring an effect, as opposed
    /// to failures reported by host collaborators during simulation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EmberError::Configuration(_)
                | EmberError::TomlParseError(_)
                | EmberError::MissingCollaborator(_)
                | EmberError::UnknownCallable { .. }
                | EmberError::InvalidEnumValue { .. }
        )
    }
}

/// Result type alias for Ember operations
pub type Result<T> = std::result::Result<T, EmberError>;

impl From<toml::de::Error> for EmberError {
    fn from(err: toml::de::Error) -> Self {
        EmberError::TomlParseError(err.to_string())
    }
}
