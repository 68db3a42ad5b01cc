//! services/api/src/credentials.rs
//!
//! The credential store: registration and login verification on top of the
//! `DatabaseService` port. Passwords are hashed with argon2 using a
//! per-call random salt; verification runs through argon2's constant-time
//! verifier.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use docuchat_core::domain::User;
use docuchat_core::ports::{CoreError, CoreResult, DatabaseService};
use std::sync::Arc;
use uuid::Uuid;

/// Verifies login attempts and creates accounts.
///
/// A failed login reports the same `InvalidCredentials` error whether the
/// username is unknown or the password is wrong, so the login endpoint
/// cannot be used to enumerate usernames.
#[derive(Clone)]
pub struct CredentialStore {
    db: Arc<dyn DatabaseService>,
}

impl CredentialStore {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Registers a new user. Fails with `DuplicateUsername` if the
    /// (case-sensitive) username is already taken.
    pub async fn register(&self, username: &str, password: &str) -> CoreResult<User> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CoreError::Database(format!("failed to hash password: {}", e)))?
            .to_string();

        self.db.create_user(username, &password_hash).await
    }

    /// Checks a username/password pair and returns the user's id on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> CoreResult<Uuid> {
        let creds = self.db.get_user_by_username(username).await.map_err(|e| match e {
            // Keep real database failures visible; everything else is a
            // uniform credential failure.
            CoreError::Database(_) => e,
            _ => CoreError::InvalidCredentials,
        })?;

        let parsed_hash = PasswordHash::new(&creds.password_hash)
            .map_err(|e| CoreError::Database(format!("stored password hash is corrupt: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| CoreError::InvalidCredentials)?;

        Ok(creds.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use docuchat_core::domain::{QueryRecord, UserCredentials};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// An in-memory stand-in for the Postgres adapter.
    #[derive(Default)]
    struct FakeDb {
        users: Mutex<HashMap<String, UserCredentials>>,
    }

    #[async_trait]
    impl DatabaseService for FakeDb {
        async fn create_user(&self, username: &str, password_hash: &str) -> CoreResult<User> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(username) {
                return Err(CoreError::DuplicateUsername);
            }
            let user_id = Uuid::new_v4();
            users.insert(
                username.to_string(),
                UserCredentials {
                    user_id,
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                },
            );
            Ok(User {
                id: user_id,
                username: username.to_string(),
            })
        }

        async fn get_user_by_username(&self, username: &str) -> CoreResult<UserCredentials> {
            self.users
                .lock()
                .unwrap()
                .get(username)
                .cloned()
                .ok_or(CoreError::InvalidCredentials)
        }

        async fn create_auth_session(
            &self,
            _session_id: &str,
            _user_id: Uuid,
            _expires_at: DateTime<Utc>,
        ) -> CoreResult<()> {
            Ok(())
        }

        async fn validate_auth_session(&self, _session_id: &str) -> CoreResult<Uuid> {
            Err(CoreError::InvalidCredentials)
        }

        async fn delete_auth_session(&self, _session_id: &str) -> CoreResult<()> {
            Ok(())
        }

        async fn append_query(
            &self,
            _user_id: Uuid,
            _question: &str,
            _answer: &str,
        ) -> CoreResult<QueryRecord> {
            unimplemented!("not used by credential tests")
        }

        async fn list_queries(&self, _user_id: Uuid) -> CoreResult<Vec<QueryRecord>> {
            unimplemented!("not used by credential tests")
        }
    }

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(FakeDb::default()))
    }

    #[tokio::test]
    async fn register_then_authenticate_round_trip() {
        let store = store();
        let user = store.register("alice", "P@ss1").await.unwrap();
        let user_id = store.authenticate("alice", "P@ss1").await.unwrap();
        assert_eq!(user.id, user_id);
    }

    #[tokio::test]
    async fn wrong_password_fails() {
        let store = store();
        store.register("alice", "P@ss1").await.unwrap();
        let err = store.authenticate("alice", "P@ss2").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn single_character_change_fails() {
        let store = store();
        store.register("bob", "correct horse").await.unwrap();
        let err = store.authenticate("bob", "correct hors3").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_user_fails_like_wrong_password() {
        let store = store();
        store.register("alice", "P@ss1").await.unwrap();

        let unknown = store.authenticate("mallory", "P@ss1").await.unwrap_err();
        let wrong = store.authenticate("alice", "nope").await.unwrap_err();
        assert!(matches!(unknown, CoreError::InvalidCredentials));
        assert!(matches!(wrong, CoreError::InvalidCredentials));
        // Same user-visible message either way.
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn duplicate_registration_fails_and_first_account_survives() {
        let store = store();
        store.register("alice", "P@ss1").await.unwrap();
        let err = store.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateUsername));

        // Original credentials still valid.
        store.authenticate("alice", "P@ss1").await.unwrap();
    }

    #[tokio::test]
    async fn username_is_case_sensitive() {
        let store = store();
        store.register("Alice", "P@ss1").await.unwrap();
        let err = store.authenticate("alice", "P@ss1").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn stored_hash_is_salted_and_not_the_password() {
        let store = store();
        store.register("carol", "hunter2").await.unwrap();
        let creds = store.db.get_user_by_username("carol").await.unwrap();
        assert!(creds.password_hash.starts_with("$argon2"));
        assert!(!creds.password_hash.contains("hunter2"));
    }
}
