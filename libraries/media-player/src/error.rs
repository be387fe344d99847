//! Error types for the player core

use std::fmt;
use thiserror::Error;

/// Parameters accepted by the validated command entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Volume,
    Gain,
    Balance,
    CurrentTime,
    VisualizationMode,
}

impl Parameter {
    /// Attribute name used by the external command channel
    pub fn attribute_name(self) -> &'static str {
        match self {
            Parameter::Volume => "volume",
            Parameter::Gain => "gain",
            Parameter::Balance => "balance",
            Parameter::CurrentTime => "current-time",
            Parameter::VisualizationMode => "equalize-type",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

/// Player errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Value outside its declared range, not numeric, or an unknown mode
    #[error("Invalid {param} value {value:?}: {reason}")]
    InvalidParameter {
        param: Parameter,
        value: String,
        reason: String,
    },

    /// Audio host could not create or wire the signal graph
    #[error("Audio host error: {0}")]
    AudioHost(String),

    /// Media element refused an operation
    #[error("Media error: {0}")]
    Media(String),

    /// Frame scheduler refused a request
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Player is non-functional (graph construction failed or detached)
    #[error("Player unavailable")]
    Unavailable,

    /// Command issued before the player was attached
    #[error("Player not attached")]
    NotAttached,

    /// Unusable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlayerError {
    /// Create an invalid parameter error
    pub fn invalid(param: Parameter, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an audio host error
    pub fn audio_host(msg: impl Into<String>) -> Self {
        Self::AudioHost(msg.into())
    }

    /// Create a media error
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Whether this is a validation failure (command rejected, state untouched)
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_message_names_attribute() {
        let err = PlayerError::invalid(Parameter::CurrentTime, 130.0, "exceeds duration 120");
        assert_eq!(
            err.to_string(),
            "Invalid current-time value \"130\": exceeds duration 120"
        );
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn host_errors_are_not_validation_errors() {
        assert!(!PlayerError::audio_host("no context").is_invalid_parameter());
        assert!(!PlayerError::Unavailable.is_invalid_parameter());
    }
}
