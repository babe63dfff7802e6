//! User store contract.
//!
//! Persistence is an external collaborator: this crate only defines the
//! contract it consumes. Implementations (in-memory, Postgres) live in
//! `keygate-infra`.
//!
//! The store is the source of truth for email uniqueness among *active*
//! identities. The credential service performs a best-effort pre-check, but
//! two signups racing on the same email must be resolved here, atomically,
//! surfacing [`StoreError::Conflict`].

use async_trait::async_trait;
use thiserror::Error;

use keygate_core::{Identity, IdentityUpdate, NewIdentity, UserId};

/// Store-level failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (active email taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced identity does not exist.
    #[error("not found")]
    NotFound,

    /// Infrastructure failure (connection, query). Never retried here.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence contract for identity records.
///
/// Guarantees required of implementations:
/// - `create` assigns the id and `created_at`/`updated_at`, and rejects an
///   email already held by an active identity with [`StoreError::Conflict`].
/// - A deleted identity's email may be reused by a new active one.
/// - `update` bumps `updated_at` and re-checks email uniqueness on change.
/// - `mark_deleted` sets `deleted_at` without removing the record.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up by (normalized) email. With `include_deleted` false, only
    /// active identities match.
    async fn find_by_email(
        &self,
        email: &str,
        include_deleted: bool,
    ) -> Result<Option<Identity>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError>;

    async fn create(&self, new: NewIdentity) -> Result<Identity, StoreError>;

    async fn update(&self, id: UserId, changes: IdentityUpdate) -> Result<Identity, StoreError>;

    async fn mark_deleted(&self, id: UserId) -> Result<(), StoreError>;

    /// All active identities, ordered by id.
    async fn list_active(&self) -> Result<Vec<Identity>, StoreError>;

    /// All soft-deleted identities, ordered by id.
    async fn list_deleted(&self) -> Result<Vec<Identity>, StoreError>;
}
