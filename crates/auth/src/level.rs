//! Level-based authorization policy.
//!
//! Levels are a simple ordered scale: higher = more privileged. No role
//! sets, no per-resource ACLs. Operations declare a minimum level in an
//! explicit registry (the original system used reflective handler
//! metadata); an undeclared operation is unrestricted, subject to the
//! identity guard still requiring authentication.

use std::collections::HashMap;

use crate::AuthError;

/// Registry mapping operation identifiers to a minimum required level.
#[derive(Debug, Clone, Default)]
pub struct LevelPolicy {
    required: HashMap<&'static str, i32>,
}

impl LevelPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a minimum level for an operation.
    pub fn require(mut self, operation: &'static str, level: i32) -> Self {
        self.required.insert(operation, level);
        self
    }

    /// The declared minimum level for an operation, if any.
    pub fn required_level(&self, operation: &str) -> Option<i32> {
        self.required.get(operation).copied()
    }

    /// Check an authenticated identity's level against an operation.
    ///
    /// `identity_level` is `None` when no identity was attached to the call:
    /// that means the identity guard did not run first, which is a wiring
    /// bug — fail closed with `Unauthenticated` rather than silently allow.
    pub fn check(&self, operation: &str, identity_level: Option<i32>) -> Result<(), AuthError> {
        let level = identity_level.ok_or(AuthError::Unauthenticated)?;
        match self.required_level(operation) {
            Some(required) => check_level(level, required),
            None => Ok(()),
        }
    }
}

/// Compare a resolved identity's level against a requirement.
pub fn check_level(identity_level: i32, required: i32) -> Result<(), AuthError> {
    if identity_level >= required {
        Ok(())
    } else {
        Err(AuthError::InsufficientLevel { required })
    }
}
