//! Password digests

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use std::str::FromStr;

mod account_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    /// Argon2id with a fresh random salt, encoded as a PHC string.
    pub fn hash(plain: &[u8]) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash_string = Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain_pw, &password_hash)
            .is_ok())
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum CredentialHasher {
    #[default]
    Argon2,
    #[cfg(feature = "test-fast-hasher")]
    TestFast,
}

impl FromStr for CredentialHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(CredentialHasher::Argon2),
            #[cfg(feature = "test-fast-hasher")]
            "test_fast" => Ok(CredentialHasher::TestFast),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl std::fmt::Display for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialHasher::Argon2 => write!(f, "argon2"),
            #[cfg(feature = "test-fast-hasher")]
            CredentialHasher::TestFast => write!(f, "test_fast"),
        }
    }
}

impl CredentialHasher {
    pub fn digest(&self, password: &str) -> Result<PasswordDigest> {
        let hash = match self {
            CredentialHasher::Argon2 => account_argon2::hash(password.as_bytes())?,
            #[cfg(feature = "test-fast-hasher")]
            CredentialHasher::TestFast => {
                // Plain hex, no work factor
                let hex: String = password
                    .as_bytes()
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect();
                format!("$testfast$test_salt${}", hex)
            }
        };
        Ok(PasswordDigest {
            hasher: *self,
            hash,
        })
    }
}

/// What gets persisted in place of a password. The hasher travels with the
/// hash so records written under one configuration still verify under another.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct PasswordDigest {
    pub hasher: CredentialHasher,
    pub hash: String,
}

impl PasswordDigest {
    pub fn verify(&self, password: &str) -> Result<bool> {
        match self.hasher {
            CredentialHasher::Argon2 => account_argon2::verify(password.as_bytes(), &self.hash),
            #[cfg(feature = "test-fast-hasher")]
            CredentialHasher::TestFast => {
                if let Some(hex) = self
                    .hash
                    .strip_prefix("$testfast$")
                    .and_then(|s| s.split('$').nth(1))
                {
                    let decoded: Vec<u8> = (0..hex.len())
                        .step_by(2)
                        .filter_map(|i| hex.get(i..i + 2))
                        .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
                        .collect();
                    Ok(decoded == password.as_bytes())
                } else {
                    Ok(false)
                }
            }
        }
    }
}
