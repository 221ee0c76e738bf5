//! Salted scrypt credentials.
//!
//! Stored representation is `"<hex salt>.<hex key>"`: 8 random salt bytes
//! as 16 hex characters, a dot, and the 32-byte derived key as 64 hex
//! characters. Every constant below is part of that format. Changing any of
//! them makes every existing stored credential unverifiable.
use super::*;

/// Random salt length before hex encoding.
pub const SALT_BYTES: usize = 8;
/// Derived key length before hex encoding.
pub const KEY_BYTES: usize = 32;
/// scrypt cost, N = 2^14.
pub const SCRYPT_LOG_N: u8 = 14;
/// scrypt block size.
pub const SCRYPT_R: u32 = 8;
/// scrypt parallelism.
pub const SCRYPT_P: u32 = 1;
/// Separates salt from key in the stored representation.
pub const SEPARATOR: char = '.';

/// Turns plaintext passwords into stored representations and back into a
/// yes or no. Implementations must be deterministic in `verify` and must
/// never log their inputs.
pub trait Encoder {
    fn encode(&self, password: &str) -> Result<String, AuthError>;
    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError>;
}

/// The production encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scrypt;

impl Encoder for Scrypt {
    fn encode(&self, password: &str) -> Result<String, AuthError> {
        encode(password)
    }
    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        verify(password, stored)
    }
}

fn salt() -> String {
    use rand::Rng;
    let ref mut bytes = [0u8; SALT_BYTES];
    rand::rng().fill(bytes);
    hex::encode(bytes)
}

/// The salt goes into the KDF as its hex text, not as raw bytes.
fn derive(password: &str, salt: &str) -> Result<[u8; KEY_BYTES], AuthError> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_BYTES)
        .map_err(|e| AuthError::Kdf(e.to_string()))?;
    let mut key = [0u8; KEY_BYTES];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut key)
        .map_err(|e| AuthError::Kdf(e.to_string()))?;
    Ok(key)
}

/// Salts and hashes a plaintext password. Any string is accepted,
/// the empty one included.
pub fn encode(password: &str) -> Result<String, AuthError> {
    let salt = salt();
    let key = derive(password, &salt)?;
    Ok(format!("{}{}{}", salt, SEPARATOR, hex::encode(key)))
}

/// Checks a plaintext password against a stored representation.
pub fn verify(password: &str, stored: &str) -> Result<bool, AuthError> {
    let (salt, expected) = split(stored)?;
    let expected = hex::decode(expected)
        .ok()
        .filter(|bytes| bytes.len() == KEY_BYTES)
        .ok_or(AuthError::MalformedStoredCredential)?;
    let derived = derive(password, salt)?;
    Ok(constant_time_eq(&derived, &expected))
}

/// Splits `<salt>.<hash>`, requiring exactly one separator and two non-empty parts.
fn split(stored: &str) -> Result<(&str, &str), AuthError> {
    match stored.split_once(SEPARATOR) {
        Some((salt, hash))
            if !salt.is_empty() && !hash.is_empty() && !hash.contains(SEPARATOR) =>
        {
            Ok((salt, hash))
        }
        _ => Err(AuthError::MalformedStoredCredential),
    }
}

/// Comparison time depends only on the lengths, never on where the bytes differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
