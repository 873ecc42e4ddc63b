//! Password hashing for catalog users.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod catalog_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    /// Hashes with a fresh random salt. The result is a PHC string that embeds the salt.
    pub fn hash(plain: &[u8]) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash_string = Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify(plain: &[u8], target_hash: &str) -> Result<bool> {
        let password_hash = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain, &password_hash)
            .is_ok())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordHasher {
    #[default]
    Argon2,
}

impl FromStr for PasswordHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(PasswordHasher::Argon2),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl fmt::Display for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHasher::Argon2 => write!(f, "argon2"),
        }
    }
}

impl PasswordHasher {
    pub fn hash(&self, plain: &str) -> Result<String> {
        match self {
            PasswordHasher::Argon2 => catalog_argon2::hash(plain.as_bytes()),
        }
    }

    /// Fails only when `target_hash` is not a hash this hasher understands.
    pub fn verify(&self, plain: &str, target_hash: &str) -> Result<bool> {
        match self {
            PasswordHasher::Argon2 => catalog_argon2::verify(plain.as_bytes(), target_hash),
        }
    }
}
