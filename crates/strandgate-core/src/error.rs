//! Core error types

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the strand store and its collaborators
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more required codon fields are empty
    #[error("Missing required fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    /// Codon rejected by a validator module
    #[error("Codon rejected: {0}")]
    CodonRejected(String),

    /// The session's strand has reached its codon cap
    #[error("Strand is full")]
    StrandFull,

    /// The store has reached its strand cap
    #[error("Too many sessions")]
    TooManySessions,

    /// Event sink I/O failure (absorbed by callers, never client-facing)
    #[error("Event log write failed: {0}")]
    EventLog(#[from] std::io::Error),
}

impl CoreError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingFields(_) | Self::CodonRejected(_) => 400,
            Self::StrandFull | Self::TooManySessions => 409,
            Self::EventLog(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "missing_fields",
            Self::CodonRejected(_) => "invalid_request_body",
            Self::StrandFull => "strand_full",
            Self::TooManySessions => "too_many_sessions",
            Self::EventLog(_) => "internal_error",
        }
    }
}
