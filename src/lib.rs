//! User accounts with salted scrypt credentials.
//!
//! Signup stores a `"<hex salt>.<hex key>"` representation of the password,
//! signin re-derives the key and compares in constant time.
//!
//! ## Core
//!
//! - [`password`]: scrypt encoding and verification, the [`Encoder`] seam
//! - [`UserDirectory`]: storage capability the service depends on
//! - [`AuthService`]: signup and signin over a directory and an encoder
//! - [`AuthError`]: typed failures of the above
//!
//! ## Adapters
//!
//! - [`Memory`]: process-local directory
//! - `postgres`: `Arc<tokio_postgres::Client>` as a directory (feature `database`)
//! - [`Server`]: actix-web routes under `/auth` with cookie sessions (feature `server`)
mod config;
mod directory;
mod dto;
mod error;
mod id;
pub mod password;
mod service;
mod user;

pub use config::*;
pub use directory::*;
pub use dto::*;
pub use error::*;
pub use id::*;
pub use password::Encoder;
pub use password::Scrypt;
pub use service::*;
pub use user::*;

#[cfg(feature = "database")]
mod postgres;
#[cfg(feature = "database")]
pub use postgres::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod logging;
#[cfg(feature = "server")]
mod server;
#[cfg(feature = "server")]
mod session;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use logging::*;
#[cfg(feature = "server")]
pub use server::*;
#[cfg(feature = "server")]
pub use session::*;
