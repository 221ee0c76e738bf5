/// Failures reported by a [`UserDirectory`](crate::UserDirectory).
#[derive(Debug)]
pub enum StoreError {
    /// Another user already holds this email.
    Conflict,
    /// The storage backend failed.
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict => write!(f, "email already stored"),
            Self::Backend(e) => write!(f, "storage backend: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conflict => None,
            Self::Backend(e) => Some(e.as_ref()),
        }
    }
}

#[cfg(feature = "database")]
impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        match e.code() {
            Some(code) if *code == tokio_postgres::error::SqlState::UNIQUE_VIOLATION => {
                Self::Conflict
            }
            _ => Self::Backend(Box::new(e)),
        }
    }
}

/// Failures of signup and signin.
#[derive(Debug)]
pub enum AuthError {
    /// Signup with an email the directory already holds.
    EmailInUse,
    /// Signin with an email the directory does not hold.
    UserNotFound,
    /// Signin with the wrong password.
    InvalidCredential,
    /// Stored password field is not `<salt>.<hash>`. Data fault, not user error.
    MalformedStoredCredential,
    /// The directory did not answer in time.
    Timeout,
    /// Key derivation could not run.
    Kdf(String),
    Store(StoreError),
}

impl AuthError {
    /// Whether the caller can fix this by changing their input.
    pub fn recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmailInUse | Self::UserNotFound | Self::InvalidCredential
        )
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailInUse => write!(f, "email in use"),
            Self::UserNotFound => write!(f, "user not found"),
            Self::InvalidCredential => write!(f, "invalid credential"),
            Self::MalformedStoredCredential => write!(f, "malformed stored credential"),
            Self::Timeout => write!(f, "user directory timed out"),
            Self::Kdf(s) => write!(f, "key derivation failed: {}", s),
            Self::Store(e) => write!(f, "user directory: {}", e),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

/// A uniqueness conflict at create time means a concurrent signup won the race.
impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => Self::EmailInUse,
            e => Self::Store(e),
        }
    }
}
