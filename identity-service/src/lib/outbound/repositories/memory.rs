use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::AuthError;

/// Process-local credential store.
///
/// Used when no database is configured and in tests. The uniqueness check and
/// the write happen under one write lock, so two concurrent inserts of the same
/// username can never both succeed.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: HashMap<UserId, User>,
    ids_by_username: HashMap<Username, UserId>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let mut state = self.state.write().await;

        if state.ids_by_username.contains_key(&user.username) {
            return Err(AuthError::UsernameAlreadyExists(user.username.to_string()));
        }

        state.last_id += 1;
        let created = User {
            id: UserId(state.last_id),
            username: user.username,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };

        state
            .ids_by_username
            .insert(created.username.clone(), created.id);
        state.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AuthError> {
        let state = self.state.read().await;

        Ok(state
            .ids_by_username
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn update_username(&self, id: UserId, username: &Username) -> Result<User, AuthError> {
        let mut state = self.state.write().await;
        let State {
            users,
            ids_by_username,
            ..
        } = &mut *state;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AuthError::NotFound(id.to_string()))?;

        if let Some(owner) = ids_by_username.get(username) {
            if *owner != id {
                return Err(AuthError::UsernameAlreadyExists(username.to_string()));
            }
        }

        ids_by_username.remove(&user.username);
        ids_by_username.insert(username.clone(), id);
        user.username = username.clone();

        Ok(user.clone())
    }

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), AuthError> {
        let mut state = self.state.write().await;

        match state.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(())
            }
            None => Err(AuthError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: Username::new(name.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repository = InMemoryUserRepository::new();

        let first = repository.create(new_user("alice")).await.unwrap();
        let second = repository.create(new_user("bob")).await.unwrap();

        assert_eq!(first.id, UserId(1));
        assert_eq!(second.id, UserId(2));
        assert_eq!(repository.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_duplicate_username() {
        let repository = InMemoryUserRepository::new();

        repository.create(new_user("alice")).await.unwrap();
        let result = repository.create(new_user("alice")).await;

        assert_eq!(
            result.unwrap_err(),
            AuthError::UsernameAlreadyExists("alice".to_string())
        );
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_of_same_username() {
        let repository = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move { repository.create(new_user("alice")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_id_and_username() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(new_user("alice")).await.unwrap();

        assert_eq!(
            repository.find_by_id(created.id).await.unwrap(),
            Some(created.clone())
        );
        assert_eq!(
            repository
                .find_by_username(&Username::new("alice".to_string()).unwrap())
                .await
                .unwrap(),
            Some(created)
        );
        assert_eq!(repository.find_by_id(UserId(42)).await.unwrap(), None);
    }

    fn username(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_update_username_renames_and_frees_old_username() {
        let repository = InMemoryUserRepository::new();
        let user = repository.create(new_user("alice")).await.unwrap();

        let renamed = repository
            .update_username(user.id, &username("alicia"))
            .await
            .unwrap();

        assert_eq!(renamed.username, username("alicia"));
        assert_eq!(renamed.password_hash, user.password_hash);
        assert_eq!(
            repository.find_by_username(&username("alice")).await.unwrap(),
            None
        );
        assert!(repository.create(new_user("alice")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_username_to_taken_username() {
        let repository = InMemoryUserRepository::new();
        let alice = repository.create(new_user("alice")).await.unwrap();
        repository.create(new_user("bob")).await.unwrap();

        let result = repository.update_username(alice.id, &username("bob")).await;

        assert_eq!(
            result.unwrap_err(),
            AuthError::UsernameAlreadyExists("bob".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_password_hash_keeps_username() {
        let repository = InMemoryUserRepository::new();
        let alice = repository.create(new_user("alice")).await.unwrap();
        repository
            .update_username(alice.id, &username("alicia"))
            .await
            .unwrap();

        repository
            .update_password_hash(alice.id, "$argon2id$new_hash")
            .await
            .unwrap();

        let stored = repository.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.username, username("alicia"));
        assert_eq!(stored.password_hash, "$argon2id$new_hash");
    }

    #[tokio::test]
    async fn test_updates_of_missing_user() {
        let repository = InMemoryUserRepository::new();

        assert_eq!(
            repository
                .update_username(UserId(9), &username("nobody"))
                .await
                .unwrap_err(),
            AuthError::NotFound("9".to_string())
        );
        assert_eq!(
            repository
                .update_password_hash(UserId(9), "$argon2id$test_hash")
                .await
                .unwrap_err(),
            AuthError::NotFound("9".to_string())
        );
    }
}
