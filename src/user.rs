use super::*;

/// Registered account. The password field holds the stored
/// representation produced by [`password::encode`], never plaintext.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct User {
    id: ID<Self>,
    email: String,
    password: String,
}

impl User {
    pub fn new(id: ID<Self>, email: String, password: String) -> Self {
        Self {
            id,
            email,
            password,
        }
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn password(&self) -> &str {
        &self.password
    }
    /// Applies a profile patch. The password field is not patchable.
    pub fn patch(&mut self, patch: &UserPatch) {
        if let Some(ref email) = patch.email {
            self.email = email.clone();
        }
    }
}

impl Unique for User {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
