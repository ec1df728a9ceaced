//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::operations;
use crate::domain::user::{
    validate_create_input, validate_required, validate_update_input, CreateUserInput,
    UpdateUserInput, User, UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::store::{handle_not_found_error, EMAIL_EXISTS};

const USER_ID_EXISTS: &str = "User ID already exists";

#[derive(Debug, Clone)]
struct Entry {
    /// Insertion sequence, breaks ties between equal creation times
    seq: u64,
    user: User,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, Entry>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, String>,
    next_seq: u64,
}

impl State {
    /// Store a new user; refuses an id or email that is already taken
    fn insert(&mut self, user: User) -> Result<(), DomainError> {
        if self.email_index.contains_key(user.email()) {
            return Err(DomainError::conflict(EMAIL_EXISTS));
        }

        if self.users.contains_key(user.id().as_str()) {
            return Err(DomainError::conflict(USER_ID_EXISTS));
        }

        let id = user.id().as_str().to_string();
        let seq = self.next_seq;

        self.next_seq += 1;
        self.email_index.insert(user.email().to_string(), id.clone());
        self.users.insert(id, Entry { seq, user });
        Ok(())
    }
}

/// In-memory implementation of UserRepository
///
/// All checks and writes for one operation happen under a single write
/// lock, so email uniqueness holds under concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users, kept in the given order
    ///
    /// Fails with `Conflict` when two users share an email or an id.
    pub fn with_users(users: Vec<User>) -> Result<Self, DomainError> {
        let mut state = State::default();

        for user in users {
            state.insert(user)?;
        }

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Remove every user
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.users.clear();
        state.email_index.clear();
        state.next_seq = 0;
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, input))]
    async fn create(&self, input: &CreateUserInput) -> Result<User, DomainError> {
        validate_create_input(input)?;

        let mut state = self.state.write().await;

        let user = User::new(&input.name, &input.email);
        state.insert(user.clone())?;

        debug!(user_id = %user.id(), "Created user");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<User, DomainError> {
        validate_required(id, "User ID")?;

        let state = self.state.read().await;

        state
            .users
            .get(id)
            .map(|entry| entry.user.clone())
            .ok_or_else(|| handle_not_found_error(operations::FIND_BY_ID, None))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let state = self.state.read().await;

        let mut entries: Vec<&Entry> = state.users.values().collect();
        entries.sort_by_key(|entry| (entry.user.created_at(), entry.seq));

        Ok(entries.into_iter().map(|entry| entry.user.clone()).collect())
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: &str, input: &UpdateUserInput) -> Result<User, DomainError> {
        validate_required(id, "User ID")?;
        validate_update_input(input)?;

        let mut state = self.state.write().await;

        let old_email = match state.users.get(id) {
            Some(entry) => entry.user.email().to_string(),
            None => return Err(handle_not_found_error(operations::UPDATE, None)),
        };

        if let Some(email) = &input.email {
            let taken = state
                .email_index
                .get(email)
                .is_some_and(|owner| owner.as_str() != id);

            if taken {
                return Err(DomainError::conflict(EMAIL_EXISTS));
            }

            if *email != old_email {
                state.email_index.remove(&old_email);
                state.email_index.insert(email.clone(), id.to_string());
            }
        }

        let entry = state
            .users
            .get_mut(id)
            .ok_or_else(|| handle_not_found_error(operations::UPDATE, None))?;
        entry.user.apply(input);

        debug!(user_id = %id, "Updated user");
        Ok(entry.user.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        validate_required(id, "User ID")?;

        let mut state = self.state.write().await;

        if let Some(entry) = state.users.remove(id) {
            state.email_index.remove(entry.user.email());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        validate_required(email, "Email")?;

        let state = self.state.read().await;

        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.users.get(id))
            .map(|entry| entry.user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str) -> CreateUserInput {
        CreateUserInput::new(name, email)
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create(&input("John Doe", "john@example.com")).await.unwrap();

        assert_eq!(created.name(), "John Doe");
        assert_eq!(created.email(), "john@example.com");
        assert_eq!(created.created_at(), created.updated_at());

        let found = repo.find_by_id(created.id().as_str()).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(&input("John Doe", "john@example.com")).await.unwrap();

        let err = repo
            .create(&input("Jane Doe", "john@example.com"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert!(err.to_string().contains("Email already exists"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let repo = InMemoryUserRepository::new();

        for bad in [
            input("", "test@example.com"),
            input("Test User", ""),
            input("Test User", "invalid-email"),
        ] {
            let err = repo.create(&bad).await.unwrap_err();
            assert!(err.is_validation(), "{bad:?} should fail validation");
        }

        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_find_by_id_unknown() {
        let repo = InMemoryUserRepository::new();

        let err = repo.find_by_id("non-existent-id").await.unwrap_err();
        assert!(err.is_not_found());

        let err = repo.find_by_id("").await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(&input("John Doe", "john@example.com")).await.unwrap();

        let found = repo.find_by_email("john@example.com").await.unwrap();
        assert_eq!(found, Some(created));

        let missing = repo.find_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_name_only() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(&input("John Doe", "john@example.com")).await.unwrap();

        let updated = repo
            .update(created.id().as_str(), &UpdateUserInput::new().with_name("Jane Doe"))
            .await
            .unwrap();

        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.name(), "Jane Doe");
        assert_eq!(updated.email(), "john@example.com");
        assert_eq!(updated.created_at(), created.created_at());
        assert!(updated.updated_at() > created.updated_at());
    }

    #[tokio::test]
    async fn test_update_email_reindexes() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(&input("John Doe", "john@example.com")).await.unwrap();

        repo.update(
            created.id().as_str(),
            &UpdateUserInput::new().with_email("johnny@example.com"),
        )
        .await
        .unwrap();

        assert!(repo.find_by_email("john@example.com").await.unwrap().is_none());
        assert!(repo.find_by_email("johnny@example.com").await.unwrap().is_some());

        // The old address is free again
        repo.create(&input("Other John", "john@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create(&input("User 1", "user1@example.com")).await.unwrap();
        let user2 = repo.create(&input("User 2", "user2@example.com")).await.unwrap();

        let err = repo
            .update(
                user2.id().as_str(),
                &UpdateUserInput::new().with_email("user1@example.com"),
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Own email is not a conflict
        let same = repo
            .update(
                user2.id().as_str(),
                &UpdateUserInput::new().with_email("user2@example.com"),
            )
            .await
            .unwrap();
        assert_eq!(same.email(), "user2@example.com");
    }

    #[tokio::test]
    async fn test_update_validation_and_not_found() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(&input("John Doe", "john@example.com")).await.unwrap();

        let err = repo
            .update(created.id().as_str(), &UpdateUserInput::new().with_name(""))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = repo
            .update("non-existent-id", &UpdateUserInput::new().with_name("Jane Doe"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(&input("John Doe", "john@example.com")).await.unwrap();

        assert!(repo.delete(created.id().as_str()).await.unwrap());
        assert!(repo.find_by_id(created.id().as_str()).await.unwrap_err().is_not_found());
        assert!(repo.find_by_email("john@example.com").await.unwrap().is_none());

        assert!(!repo.delete("non-existent-id").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all_preserves_creation_order() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.find_all().await.unwrap().is_empty());

        let mut created = Vec::new();
        for i in 1..=5 {
            created.push(
                repo.create(&input(&format!("User {i}"), &format!("user{i}@example.com")))
                    .await
                    .unwrap(),
            );
        }

        assert_eq!(repo.find_all().await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_with_users_and_clear() {
        let users = vec![
            User::new("User 1", "user1@example.com"),
            User::new("User 2", "user2@example.com"),
        ];

        let repo = InMemoryUserRepository::with_users(users.clone()).unwrap();

        assert_eq!(repo.len().await, 2);
        assert_eq!(
            repo.find_by_email("user2@example.com").await.unwrap().as_ref(),
            Some(&users[1])
        );

        repo.clear().await;
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_with_users_rejects_shared_email() {
        let users = vec![
            User::new("User A", "dup@example.com"),
            User::new("User B", "dup@example.com"),
        ];

        let err = InMemoryUserRepository::with_users(users).unwrap_err();

        assert_eq!(err, DomainError::conflict(EMAIL_EXISTS));
    }

    #[tokio::test]
    async fn test_with_users_rejects_shared_id() {
        let first = User::new("User A", "a@example.com");
        let same_id = User::restore(
            first.id().clone(),
            "User B",
            "b@example.com",
            first.created_at(),
            first.updated_at(),
        );

        let err = InMemoryUserRepository::with_users(vec![first, same_id]).unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_seeded_email_stays_indexed_after_other_delete() {
        let a = User::new("User A", "a@example.com");
        let b = User::new("User B", "b@example.com");
        let repo = InMemoryUserRepository::with_users(vec![a.clone(), b.clone()]).unwrap();

        assert!(repo.delete(b.id().as_str()).await.unwrap());

        assert_eq!(repo.find_by_email("a@example.com").await.unwrap(), Some(a));
        let err = repo
            .create(&input("User C", "a@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_email() {
        let repo = InMemoryUserRepository::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create(&input(&format!("User {i}"), "race@example.com")).await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repo.len().await, 1);
    }
}
