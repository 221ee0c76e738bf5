//! Signup and signin over a [`UserDirectory`] and an [`Encoder`].
//!
//! The service holds no state of its own. Every call is a single attempt:
//! directory failures propagate, nothing is retried. Plaintext passwords and
//! derived keys never reach the log.
use super::*;
use std::future::Future;
use std::time::Duration;

pub struct AuthService<D, E = Scrypt> {
    directory: D,
    encoder: E,
    timeout: Duration,
}

impl<D, E> AuthService<D, E>
where
    D: UserDirectory,
    E: Encoder + Clone + Send + 'static,
{
    pub fn new(directory: D, encoder: E) -> Self {
        Self {
            directory,
            encoder,
            timeout: Config::default().timeout(),
        }
    }
    /// Bounds each directory call. Key derivation is not bounded.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Registers a new user under `email`, storing a salted hash of `password`.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if !self.within(self.directory.find(email)).await?.is_empty() {
            log::debug!("signup refused, email in use");
            return Err(AuthError::EmailInUse);
        }
        let stored = self.encode(password).await?;
        let user = self.within(self.directory.create(email, &stored)).await?;
        log::info!("signed up user {}", user.id());
        Ok(user)
    }

    /// Returns the user registered under `email` if `password` matches.
    pub async fn signin(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .within(self.directory.find(email))
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::UserNotFound)?;
        match self.verify(password, user.password()).await {
            Ok(true) => {
                log::info!("signed in user {}", user.id());
                Ok(user)
            }
            Ok(false) => {
                log::debug!("signin refused for user {}", user.id());
                Err(AuthError::InvalidCredential)
            }
            Err(AuthError::MalformedStoredCredential) => {
                log::error!("stored credential of user {} is malformed", user.id());
                Err(AuthError::MalformedStoredCredential)
            }
            Err(e) => Err(e),
        }
    }

    /// Users registered under `email`.
    pub async fn find(&self, email: &str) -> Result<Vec<User>, AuthError> {
        self.within(self.directory.find(email)).await
    }
    pub async fn lookup(&self, id: ID<User>) -> Result<Option<User>, AuthError> {
        self.within(self.directory.lookup(id)).await
    }
    /// Changes profile fields. Moving onto a taken email fails `EmailInUse`.
    pub async fn update(&self, id: ID<User>, patch: &UserPatch) -> Result<Option<User>, AuthError> {
        self.within(self.directory.update(id, patch)).await
    }
    pub async fn remove(&self, id: ID<User>) -> Result<Option<User>, AuthError> {
        let removed = self.within(self.directory.remove(id)).await?;
        if removed.is_some() {
            log::info!("removed user {}", id);
        }
        Ok(removed)
    }

    async fn within<T, F>(&self, call: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => {
                log::warn!("user directory did not answer within {:?}", self.timeout);
                Err(AuthError::Timeout)
            }
        }
    }

    async fn encode(&self, password: &str) -> Result<String, AuthError> {
        let encoder = self.encoder.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || encoder.encode(&password))
            .await
            .map_err(|e| AuthError::Kdf(e.to_string()))?
    }

    async fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let encoder = self.encoder.clone();
        let password = password.to_string();
        let stored = stored.to_string();
        tokio::task::spawn_blocking(move || encoder.verify(&password, &stored))
            .await
            .map_err(|e| AuthError::Kdf(e.to_string()))?
    }
}
