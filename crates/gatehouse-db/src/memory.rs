//! In-process [`UserRepository`] for development without a database and for
//! tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use gatehouse_models::{NewUser, User, UserUpdate};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::repository::{RepositoryError, UserRepository};

#[derive(Debug, Default)]
struct Store {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: RwLock<Store>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.store.read().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let store = self.store.read();
        Ok(store
            .by_email
            .get(email)
            .and_then(|id| store.users.get(id))
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut store = self.store.write();
        if store.by_email.contains_key(&new_user.email) {
            return Err(RepositoryError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };

        store.by_email.insert(user.email.clone(), user.id);
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User, RepositoryError> {
        let mut store = self.store.write();
        let Store { users, by_email } = &mut *store;

        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        if let Some(email) = &update.email
            && *email != user.email
        {
            if by_email.contains_key(email) {
                return Err(RepositoryError::DuplicateEmail);
            }
            by_email.remove(&user.email);
            by_email.insert(email.clone(), id);
        }

        update.apply_to(user, Utc::now());
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut store = self.store.write();
        match store.users.remove(&id) {
            Some(user) => {
                store.by_email.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
