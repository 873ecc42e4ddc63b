use super::EntityKind;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {kind} id {id}, ids must be non-negative")]
    InvalidId { kind: EntityKind, id: i64 },

    #[error("Malformed {kind} id \"{raw}\"")]
    MalformedId { kind: EntityKind, raw: String },

    #[error("Track duration must be non-negative, got {0}")]
    NegativeDuration(i64),

    #[error("Malformed track duration \"{0}\"")]
    MalformedDuration(String),

    #[error("User name cannot be empty")]
    EmptyUserName,
}

pub(crate) fn check_id(kind: EntityKind, id: i64) -> Result<i64, ValidationError> {
    if id < 0 {
        return Err(ValidationError::InvalidId { kind, id });
    }
    Ok(id)
}

/// Parses a raw tabular id field into a valid entity id.
pub fn parse_id(kind: EntityKind, raw: &str) -> Result<i64, ValidationError> {
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::MalformedId {
            kind,
            raw: raw.to_string(),
        })?;
    check_id(kind, id)
}
