//! crates/docuchat_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{QueryRecord, User, UserCredentials};

//=========================================================================================
// Core Error and Result Types
//=========================================================================================

/// The error taxonomy shared by every component of the application.
///
/// Adapters map their library errors into one of these kinds; the HTTP layer
/// converts each kind into a user-visible message at a single boundary so
/// that no external failure can take the process down.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("That username is already taken")]
    DuplicateUsername,

    /// Covers both unknown-username and wrong-password so that a failed
    /// login never reveals whether the username exists.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("No documents have been trained yet")]
    NoIndex,

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Inserts a new user row. A unique-constraint violation on the
    /// username maps to `CoreError::DuplicateUsername`.
    async fn create_user(&self, username: &str, password_hash: &str) -> CoreResult<User>;

    /// Looks up a user's stored credentials by exact (case-sensitive)
    /// username. A miss maps to `CoreError::InvalidCredentials`.
    async fn get_user_by_username(&self, username: &str) -> CoreResult<UserCredentials>;

    // --- Auth Sessions ---

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()>;

    /// Returns the user id for a live (unexpired) auth session.
    async fn validate_auth_session(&self, session_id: &str) -> CoreResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> CoreResult<()>;

    // --- Query History ---

    /// Appends one question/answer exchange for the given user.
    async fn append_query(
        &self,
        user_id: Uuid,
        question: &str,
        answer: &str,
    ) -> CoreResult<QueryRecord>;

    /// Returns the user's history, most recent first.
    async fn list_queries(&self, user_id: Uuid) -> CoreResult<Vec<QueryRecord>>;
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Computes one embedding vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>>;
}

#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Composes an answer to a question grounded in the provided context.
    async fn answer(&self, question: &str, context: &str) -> CoreResult<String>;
}
