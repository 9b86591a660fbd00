//! Authentication tokens and password credentials

use anyhow::{bail, Result};
use rand::Rng;
use rand_distr::Alphanumeric;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// Length of generated session tokens.
pub const AUTH_TOKEN_LENGTH: usize = 64;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct AuthTokenValue(pub String);

#[derive(Clone, Debug)]
pub struct AuthToken {
    pub user_id: usize,
    pub created: SystemTime,
    pub last_used: Option<SystemTime>,
    pub value: AuthTokenValue,
}

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let random_string: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(AUTH_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}

mod moodwave_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash(plain: &[u8], b64_salt: &str) -> Result<String> {
        let salt = SaltString::from_b64(b64_salt).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string())
    }

    pub fn verify(plain_pw: &[u8], target_hash: &str) -> Result<bool> {
        let password_hash = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain_pw, &password_hash)
            .is_ok())
    }
}

/// Password hashing scheme, stored by name next to each hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialsHasher {
    Argon2,
}

impl FromStr for CredentialsHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(CredentialsHasher::Argon2),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl fmt::Display for CredentialsHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsHasher::Argon2 => f.write_str("argon2"),
        }
    }
}

impl CredentialsHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            CredentialsHasher::Argon2 => moodwave_argon2::generate_b64_salt(),
        }
    }

    pub fn hash(&self, plain: &[u8], b64_salt: &str) -> Result<String> {
        match self {
            CredentialsHasher::Argon2 => moodwave_argon2::hash(plain, b64_salt),
        }
    }

    /// The argon2 PHC string embeds its salt, so the stored salt is not
    /// needed to verify.
    pub fn verify(&self, plain_pw: &str, target_hash: &str) -> Result<bool> {
        match self {
            CredentialsHasher::Argon2 => moodwave_argon2::verify(plain_pw.as_bytes(), target_hash),
        }
    }
}

#[derive(Clone, Debug)]
pub struct UsernamePasswordCredentials {
    pub user_id: usize,
    pub salt: String,
    pub hash: String,
    pub hasher: CredentialsHasher,

    pub created: SystemTime,
    pub last_tried: Option<SystemTime>,
    pub last_used: Option<SystemTime>,
}

impl UsernamePasswordCredentials {
    pub fn new_hashed(user_id: usize, password: &str) -> Result<Self> {
        let hasher = CredentialsHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(Self {
            user_id,
            salt,
            hash,
            hasher,
            created: SystemTime::now(),
            last_tried: None,
            last_used: None,
        })
    }

    pub fn verify(&self, password: &str) -> Result<bool> {
        self.hasher.verify(password, &self.hash)
    }
}

#[derive(Clone, Debug)]
pub struct UserAuthCredentials {
    pub user_id: usize,
    pub username_password: Option<UsernamePasswordCredentials>,
}
