use std::fmt;

use crate::participant::Id;

#[derive(Debug)]
pub enum RegroupError {
    DuplicateIdentity(Id),
    UnknownIdentity(Id),
    InsufficientParticipants(String),
    InvalidPenalty(String),
    MissingStatus,
    InconsistentBounds { min_size: usize, max_size: usize },
    InvalidParameter(String),
    Format(String),
    UnsupportedFormat(String),
    Csv(csv::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
    Other(String),
}

pub type Result<T> = std::result::Result<T, RegroupError>;

impl fmt::Display for RegroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegroupError::DuplicateIdentity(id) => {
                write!(f, "Identity {} appears more than once; identities must be unique", id)
            }
            RegroupError::UnknownIdentity(id) => {
                write!(f, "Identity {} is not indexed by the matchings history", id)
            }
            RegroupError::InsufficientParticipants(e) => write!(f, "Insufficient participants: {}", e),
            RegroupError::InvalidPenalty(e) => write!(f, "Invalid penalty function: {}", e),
            RegroupError::MissingStatus => write!(
                f,
                "Assortative matching was requested but the participant data has no status column"
            ),
            RegroupError::InconsistentBounds { min_size, max_size } => write!(
                f,
                "max_size ({}) must be at least min_size ({}); this can also happen if n_groups is set too small",
                max_size, min_size
            ),
            RegroupError::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
            RegroupError::Format(e) => write!(f, "Format error: {}", e),
            RegroupError::UnsupportedFormat(e) => write!(f, "Unsupported file format: {}", e),
            RegroupError::Csv(e) => write!(f, "CSV error: {}", e),
            RegroupError::Json(e) => write!(f, "JSON error: {}", e),
            RegroupError::Io(e) => write!(f, "IO error: {}", e),
            RegroupError::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for RegroupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegroupError::Csv(e) => Some(e),
            RegroupError::Json(e) => Some(e),
            RegroupError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for RegroupError {
    fn from(err: csv::Error) -> Self {
        RegroupError::Csv(err)
    }
}

impl From<serde_json::Error> for RegroupError {
    fn from(err: serde_json::Error) -> Self {
        RegroupError::Json(err)
    }
}

impl From<std::io::Error> for RegroupError {
    fn from(err: std::io::Error) -> Self {
        RegroupError::Io(err)
    }
}
