use super::{
    AuthToken, AuthTokenValue, UserAuthCredentials, UserStore, UsernamePasswordCredentials,
};
use anyhow::{bail, Context, Result};
use std::time::SystemTime;
use tracing::{debug, info};

pub struct UserManager {
    user_store: Box<dyn UserStore>,
}

impl UserManager {
    pub fn new(user_store: Box<dyn UserStore>) -> Self {
        Self { user_store }
    }

    pub fn add_user<T: AsRef<str>>(&self, user_handle: T) -> Result<usize> {
        let user_handle = user_handle.as_ref().trim();
        if user_handle.is_empty() {
            bail!("The user handle cannot be empty.")
        }
        if self.user_store.get_user_id(user_handle).is_some() {
            bail!("User handle already exists.");
        }

        let user_id = self.user_store.create_user(user_handle)?;
        info!("Created user {} with id {}", user_handle, user_id);
        Ok(user_id)
    }

    pub fn get_user_handle(&self, user_id: usize) -> Option<String> {
        self.user_store.get_user_handle(user_id)
    }

    pub fn get_all_user_handles(&self) -> Result<Vec<String>> {
        self.user_store.get_all_user_handles()
    }

    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Option<AuthToken> {
        self.user_store.get_user_auth_token(value)
    }

    pub fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()> {
        self.user_store
            .update_user_auth_token_last_used_timestamp(value)
    }

    pub fn get_user_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>> {
        self.user_store.get_all_user_auth_tokens(user_handle)
    }

    pub fn generate_auth_token(&self, credentials: &UserAuthCredentials) -> Result<AuthToken> {
        let token = AuthToken {
            user_id: credentials.user_id,
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        };
        self.user_store.add_user_auth_token(token.clone())?;
        Ok(token)
    }

    /// Deletes `token` if it belongs to `user_id`. Returns whether a token was removed.
    pub fn delete_auth_token(&self, user_id: usize, token: &AuthTokenValue) -> Result<bool> {
        match self.user_store.get_user_auth_token(token) {
            Some(existing) if existing.user_id == user_id => {
                Ok(self.user_store.delete_user_auth_token(token).is_some())
            }
            Some(_) => bail!("Auth token does not belong to user {}", user_id),
            None => Ok(false),
        }
    }

    /// Checks the password of `user_handle` without recording the attempt.
    pub fn check_password(&self, user_handle: &str, password: &str) -> Result<bool> {
        let credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        match credentials.username_password {
            Some(password_credentials) => password_credentials.verify(password),
            None => Ok(false),
        }
    }

    /// Verifies the password and, on success, issues a fresh auth token.
    /// Unknown users and wrong passwords both yield `Ok(None)`.
    pub fn login(&self, user_handle: &str, password: &str) -> Result<Option<AuthToken>> {
        let Some(credentials) = self.user_store.get_user_auth_credentials(user_handle) else {
            debug!("Login attempt for unknown user {}", user_handle);
            return Ok(None);
        };
        let Some(password_credentials) = credentials.username_password.as_ref() else {
            debug!("User {} has no password credentials", user_handle);
            return Ok(None);
        };

        let verified = password_credentials.verify(password)?;
        self.user_store
            .touch_password_credentials(credentials.user_id, verified)?;
        if !verified {
            return Ok(None);
        }
        self.generate_auth_token(&credentials).map(Some)
    }

    pub fn create_password_credentials(&self, user_handle: &str, password: &str) -> Result<()> {
        let mut credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        if credentials.username_password.is_some() {
            bail!(
                "User with handle {} already has password credentials. Maybe you want to modify it?",
                user_handle
            );
        }
        credentials.username_password = Some(UsernamePasswordCredentials::new_hashed(
            credentials.user_id,
            password,
        )?);
        self.user_store.update_user_auth_credentials(credentials)
    }

    pub fn update_password_credentials(&self, user_handle: &str, password: &str) -> Result<()> {
        let mut credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        if credentials.username_password.is_none() {
            bail!(
                "Cannot update password of user with handle {} since it never had one.",
                user_handle
            );
        }
        credentials.username_password = Some(UsernamePasswordCredentials::new_hashed(
            credentials.user_id,
            password,
        )?);
        self.user_store.update_user_auth_credentials(credentials)
    }

    pub fn delete_password_credentials(&self, user_handle: &str) -> Result<()> {
        let mut credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        credentials.username_password = None;
        self.user_store.update_user_auth_credentials(credentials)
    }
}
