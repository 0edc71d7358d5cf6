use ai_client::AiError;
use thiserror::Error;

/// Why a simulation could not complete. No partial result accompanies any
/// of these.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Rate limited after {attempts} attempts: {message}")]
    RateLimited { attempts: u32, message: String },

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("Could not decode model response: {0}")]
    Decode(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SimulationError {
    /// Classify a provider failure that survived the retry budget.
    pub fn from_ai(err: AiError, attempts: u32) -> Self {
        if err.is_rate_limit() {
            return SimulationError::RateLimited {
                attempts,
                message: err.to_string(),
            };
        }
        match err {
            AiError::EmptyResponse => SimulationError::EmptyResponse,
            AiError::Parse(msg) => SimulationError::Decode(msg),
            AiError::Config(msg) => SimulationError::Config(msg),
            other => SimulationError::Transport(other.to_string()),
        }
    }
}

/// Rejected reply submissions. The conversation is unchanged when one of
/// these is returned.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("No comment at position {0}")]
    UnknownComment(usize),

    #[error("Comment {0} is still awaiting a reaction")]
    ThreadBusy(usize),

    #[error("Reply text is empty")]
    EmptyReply,
}
