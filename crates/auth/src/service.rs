//! Credential service: signup/signin orchestration and token resolution.
//!
//! Within a call, steps are strictly sequential (lookup → hash/verify →
//! issue). Across calls there is no ordering guarantee: the store's
//! uniqueness constraint is the source of truth for racing signups.

use std::sync::Arc;

use keygate_core::{Identity, IdentityView, NewIdentity, UserId};

use crate::password::{hash_password, verify_password};
use crate::store::{StoreError, UserStore};
use crate::token::TokenService;
use crate::AuthError;

/// Signup request fields, pre-validated for shape by the caller.
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub level: Option<i32>,
}

/// Orchestrates the user store, password hasher, and token service.
pub struct CredentialService<S: ?Sized> {
    store: Arc<S>,
    tokens: Arc<TokenService>,
}

impl<S> CredentialService<S>
where
    S: UserStore + ?Sized,
{
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Register a new identity and return a bearer token for it.
    pub async fn signup(&self, signup: NewSignup) -> Result<(String, IdentityView), AuthError> {
        let identity = self.create_identity(signup).await?;
        self.issue_for(&identity)
    }

    /// Create an identity without issuing a token (admin-style create).
    pub async fn register(&self, signup: NewSignup) -> Result<IdentityView, AuthError> {
        Ok(self.create_identity(signup).await?.into())
    }

    /// The email lookup here is a best-effort pre-check; a store-level
    /// conflict from a racing signup also maps to `DuplicateEmail`.
    async fn create_identity(&self, signup: NewSignup) -> Result<Identity, AuthError> {
        let new = NewIdentity::new(
            &signup.email,
            String::new(),
            signup.first_name,
            signup.last_name,
            signup.level,
        )
        .map_err(|e| AuthError::Validation(e.to_string()))?;

        if self
            .store
            .find_by_email(&new.email, false)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(&signup.password)?;
        let new = NewIdentity { password_hash, ..new };

        let identity = match self.store.create(new).await {
            Ok(identity) => identity,
            Err(StoreError::Conflict(_)) => return Err(AuthError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(user_id = %identity.id, "identity created");
        Ok(identity)
    }

    /// Authenticate an email/password pair and return a bearer token.
    ///
    /// The lookup includes deleted identities so that a soft-deleted
    /// account with the correct password gets `AccountDisabled` rather
    /// than the anti-enumeration `InvalidCredentials`.
    pub async fn signin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, IdentityView), AuthError> {
        let email = email.trim().to_lowercase();

        let identity = self
            .store
            .find_by_email(&email, true)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if identity.is_deleted() {
            return Err(AuthError::AccountDisabled);
        }

        if !verify_password(password, &identity.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_for(&identity)
    }

    /// Resolve a bearer token into a live, sanitized identity.
    ///
    /// The subject is re-resolved against the store rather than trusted
    /// from the payload: the account may have been deleted or re-leveled
    /// since issuance. The returned view carries the *current* level.
    pub async fn resolve_token(&self, token: &str) -> Result<IdentityView, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::Unauthenticated)?;

        let identity = self
            .store
            .find_by_id(claims.subject())
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if identity.is_deleted() {
            return Err(AuthError::Unauthenticated);
        }

        Ok(identity.into())
    }

    /// Look up a live identity by id (used by guards and admin reads).
    pub async fn find_live(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        match self.store.find_by_id(id).await? {
            Some(identity) if !identity.is_deleted() => Ok(Some(identity)),
            _ => Ok(None),
        }
    }

    fn issue_for(&self, identity: &Identity) -> Result<(String, IdentityView), AuthError> {
        let token = self
            .tokens
            .issue(identity.id, &identity.email, identity.level)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok((token, identity.into()))
    }
}
