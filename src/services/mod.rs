//! Use cases on top of the repository.
//!
//! Every function takes the repository handle it works on; records are plain serializable
//! views of the entities.

pub mod albums;
pub mod tracks;
pub mod users;

use crate::model::ValidationError;
use crate::repository::RepositoryError;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Track {0} does not exist")]
    NonExistentTrack(i64),

    #[error("Album {0} does not exist")]
    NonExistentAlbum(i64),

    #[error("Unknown user {0}")]
    UnknownUser(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Search key {0} is invalid")]
    InvalidSearchKey(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i32),

    #[error("User name {0} is already taken")]
    UserNameTaken(String),

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Invalid user name or password")]
    InvalidCredentials,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Password hashing failed: {0}")]
    Hashing(anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Index range of page `page_index` when showing `per_page` items out of `len`.
pub(crate) fn page_bounds(page_index: i64, per_page: usize, len: usize) -> ServiceResult<Range<usize>> {
    if page_index < 0 {
        return Err(ServiceError::InvalidPage(
            "Negative page does not exist.".to_string(),
        ));
    }
    if per_page == 0 {
        return Err(ServiceError::InvalidPage(
            "Pages must hold at least one item.".to_string(),
        ));
    }
    let start = usize::try_from(page_index)
        .ok()
        .and_then(|page| page.checked_mul(per_page))
        .filter(|start| *start < len)
        .ok_or_else(|| ServiceError::InvalidPage("The page does not exist.".to_string()))?;
    Ok(start..len.min(start + per_page))
}
