//! In-memory user store (dev/test).
//!
//! A single mutex over the whole table makes check-then-insert atomic, so
//! the active-email uniqueness constraint holds under concurrent signups.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use keygate_auth::{StoreError, UserStore};
use keygate_core::{Identity, IdentityUpdate, NewIdentity, UserId};

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Table>,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Identity>,
    next_id: i64,
}

impl Table {
    fn active_email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.rows
            .iter()
            .any(|i| i.email == email && !i.is_deleted() && Some(i.id) != except)
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(
        &self,
        email: &str,
        include_deleted: bool,
    ) -> Result<Option<Identity>, StoreError> {
        let table = self.inner.lock().expect("user store poisoned");
        // Newest row wins: after a deleted identity's email is reused, the
        // inclusive lookup must resolve the new active owner, not the
        // stale deleted row.
        Ok(table
            .rows
            .iter()
            .filter(|i| i.email == email && (include_deleted || !i.is_deleted()))
            .last()
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        let table = self.inner.lock().expect("user store poisoned");
        Ok(table.rows.iter().find(|i| i.id == id).cloned())
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        let mut table = self.inner.lock().expect("user store poisoned");

        if table.active_email_taken(&new.email, None) {
            return Err(StoreError::Conflict(format!(
                "active identity already holds email {}",
                new.email
            )));
        }

        table.next_id += 1;
        let now = Utc::now();
        let identity = Identity {
            id: UserId::new(table.next_id),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            level: new.level,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.push(identity.clone());
        Ok(identity)
    }

    async fn update(&self, id: UserId, changes: IdentityUpdate) -> Result<Identity, StoreError> {
        let mut table = self.inner.lock().expect("user store poisoned");

        if let Some(email) = &changes.email {
            if table.active_email_taken(email, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "active identity already holds email {email}"
                )));
            }
        }

        let row = table
            .rows
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(email) = changes.email {
            row.email = email;
        }
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash;
        }
        if let Some(first_name) = changes.first_name {
            row.first_name = Some(first_name);
        }
        if let Some(last_name) = changes.last_name {
            row.last_name = Some(last_name);
        }
        if let Some(level) = changes.level {
            row.level = level;
        }
        row.updated_at = Utc::now();

        Ok(row.clone())
    }

    async fn mark_deleted(&self, id: UserId) -> Result<(), StoreError> {
        let mut table = self.inner.lock().expect("user store poisoned");
        let row = table
            .rows
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound)?;

        row.deleted_at = Some(Utc::now());
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Identity>, StoreError> {
        let table = self.inner.lock().expect("user store poisoned");
        Ok(table.rows.iter().filter(|i| !i.is_deleted()).cloned().collect())
    }

    async fn list_deleted(&self) -> Result<Vec<Identity>, StoreError> {
        let table = self.inner.lock().expect("user store poisoned");
        Ok(table.rows.iter().filter(|i| i.is_deleted()).cloned().collect())
    }
}
