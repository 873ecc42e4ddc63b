use super::{ServiceError, ServiceResult};
use crate::auth::PasswordHasher;
use crate::model::{normalize_user_name, User, ValidationError};
use crate::repository::Repository;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const MIN_PASSWORD_LENGTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub user_name: String,
}

/// Registers a new user, storing only a salted hash of `password`.
pub fn add_user(
    repo: &dyn Repository,
    hasher: PasswordHasher,
    user_name: &str,
    password: &str,
) -> ServiceResult<()> {
    let user_name = normalize_user_name(user_name);
    if user_name.is_empty() {
        return Err(ValidationError::EmptyUserName.into());
    }
    if repo.get_user(&user_name)?.is_some() {
        return Err(ServiceError::UserNameTaken(user_name));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }

    let password_hash = hasher.hash(password).map_err(ServiceError::Hashing)?;
    repo.add_user(Arc::new(User::new(&user_name, &password_hash)?))?;
    debug!("Registered user {}", user_name);
    Ok(())
}

pub fn get_user(repo: &dyn Repository, user_name: &str) -> ServiceResult<Option<UserRecord>> {
    Ok(repo.get_user(user_name)?.map(|u| UserRecord {
        user_name: u.user_name().to_string(),
    }))
}

pub fn authenticate(
    repo: &dyn Repository,
    hasher: PasswordHasher,
    user_name: &str,
    password: &str,
) -> ServiceResult<UserRecord> {
    let user = repo
        .get_user(user_name)?
        .ok_or_else(|| ServiceError::UnknownUser(normalize_user_name(user_name)))?;
    let matches = hasher
        .verify(password, user.password())
        .map_err(ServiceError::Hashing)?;
    if !matches {
        return Err(ServiceError::InvalidCredentials);
    }
    Ok(UserRecord {
        user_name: user.user_name().to_string(),
    })
}
