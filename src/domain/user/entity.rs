//! User entity and related types

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque user identifier, generated once at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier read back from the store
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current time at the precision the store keeps (microseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Persisted user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id; both timestamps are set to now
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = now();

        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from persisted state
    pub fn restore(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply an update: present fields replace stored ones, absent fields
    /// are kept. `updated_at` always advances.
    pub fn apply(&mut self, input: &UpdateUserInput) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }

        if let Some(email) = &input.email {
            self.email = email.clone();
        }

        self.touch();
    }

    // updated_at must move forward even when the clock has not ticked
    fn touch(&mut self) {
        let now = now();

        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Input for creating a user; both fields are required
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
}

impl CreateUserInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Input for updating a user
///
/// `None` leaves the stored value unchanged. `Some("")` is not "clear the
/// field", it is rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UpdateUserInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("John Doe", "john@example.com");

        assert!(!user.id().as_str().is_empty());
        assert_eq!(user.name(), "John Doe");
        assert_eq!(user.email(), "john@example.com");
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = User::new("User 1", "user1@example.com");
        let b = User::new("User 2", "user2@example.com");

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_timestamps_have_microsecond_precision() {
        let user = User::new("John Doe", "john@example.com");

        assert_eq!(user.created_at().timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_apply_name_only() {
        let mut user = User::new("John Doe", "john@example.com");
        let before = user.updated_at();

        user.apply(&UpdateUserInput::new().with_name("Jane Doe"));

        assert_eq!(user.name(), "Jane Doe");
        assert_eq!(user.email(), "john@example.com");
        assert!(user.updated_at() > before);
        assert!(user.updated_at() >= user.created_at());
    }

    #[test]
    fn test_apply_advances_updated_at_on_repeated_calls() {
        let mut user = User::new("John Doe", "john@example.com");
        let mut previous = user.updated_at();

        for _ in 0..5 {
            user.apply(&UpdateUserInput::new());
            assert!(user.updated_at() > previous);
            previous = user.updated_at();
        }
    }

    #[test]
    fn test_user_serialization() {
        let user = User::new("John Doe", "john@example.com");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "john@example.com");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
