use super::*;
use actix_web::HttpRequest;
use actix_web::cookie::Cookie;
use actix_web::cookie::CookieJar;
use actix_web::cookie::Key;
use actix_web::cookie::SameSite;

/// Name of the cookie carrying the session.
pub const SESSION_COOKIE: &str = "session";

/// Issues and reads the encrypted cookie that remembers who signed in.
/// The cookie holds only the user id; clients can neither read nor forge it.
#[derive(Clone)]
pub struct Sessions {
    key: Key,
}

impl Sessions {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.secret() {
            Some(secret) => Ok(Self::new(Key::try_from(secret)?)),
            None => {
                log::warn!("SESSION_SECRET unset, sessions will not survive a restart");
                Ok(Self::new(Key::generate()))
            }
        }
    }

    /// Cookie that signs `user` in.
    pub fn issue(&self, user: ID<User>) -> Cookie<'static> {
        let mut jar = CookieJar::new();
        jar.private_mut(&self.key).add(
            Cookie::build(SESSION_COOKIE, user.to_string())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish(),
        );
        jar.get(SESSION_COOKIE)
            .cloned()
            .unwrap_or_else(Self::clear)
    }

    /// User id of the request's session, if it carries a valid one.
    pub fn read(&self, req: &HttpRequest) -> Option<ID<User>> {
        let mut jar = CookieJar::new();
        jar.add_original(req.cookie(SESSION_COOKIE)?);
        jar.private(&self.key)
            .get(SESSION_COOKIE)?
            .value()
            .parse()
            .ok()
    }

    /// Cookie that ends the session.
    pub fn clear() -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
        cookie.make_removal();
        cookie
    }
}
