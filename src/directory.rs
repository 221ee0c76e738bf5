use super::*;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage of user records, keyed by id and looked up by email.
/// Abstracts the backend away from the authentication flow.
///
/// Implementations should reject a second user with the same email with
/// [`StoreError::Conflict`]; the service's find-then-create check alone
/// does not hold under concurrent signups.
#[allow(async_fn_in_trait)]
pub trait UserDirectory {
    async fn find(&self, email: &str) -> Result<Vec<User>, StoreError>;
    async fn create(&self, email: &str, password: &str) -> Result<User, StoreError>;
    async fn lookup(&self, id: ID<User>) -> Result<Option<User>, StoreError>;
    async fn update(&self, id: ID<User>, patch: &UserPatch) -> Result<Option<User>, StoreError>;
    async fn remove(&self, id: ID<User>) -> Result<Option<User>, StoreError>;
}

/// Process-local directory. Clones share the same records.
#[derive(Debug, Default, Clone)]
pub struct Memory {
    users: Arc<RwLock<Vec<User>>>,
}

impl Memory {
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

impl UserDirectory for Memory {
    async fn find(&self, email: &str) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|u| u.email() == email)
            .cloned()
            .collect())
    }

    async fn create(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email() == email) {
            return Err(StoreError::Conflict);
        }
        let user = User::new(ID::default(), email.to_string(), password.to_string());
        users.push(user.clone());
        Ok(user)
    }

    async fn lookup(&self, id: ID<User>) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn update(&self, id: ID<User>, patch: &UserPatch) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        if let Some(ref email) = patch.email {
            if users.iter().any(|u| u.email() == email && u.id() != id) {
                return Err(StoreError::Conflict);
            }
        }
        Ok(users.iter_mut().find(|u| u.id() == id).map(|user| {
            user.patch(patch);
            user.clone()
        }))
    }

    async fn remove(&self, id: ID<User>) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        Ok(users
            .iter()
            .position(|u| u.id() == id)
            .map(|i| users.remove(i)))
    }
}
