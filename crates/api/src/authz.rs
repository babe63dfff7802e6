//! Level guard: per-operation minimum-level checks.

use keygate_auth::{AuthError, LevelPolicy};

use crate::context::CurrentUser;

/// Operation name for the user report endpoint.
pub const OP_USERS_REPORT: &str = "users.report";

/// Default level requirements for guarded operations.
pub fn level_policy() -> LevelPolicy {
    LevelPolicy::new().require(OP_USERS_REPORT, 4)
}

/// Check the caller's current level against the operation's requirement.
///
/// Operations with no registered requirement pass for any authenticated
/// caller; a missing caller fails closed.
pub fn require_level(
    policy: &LevelPolicy,
    operation: &str,
    user: Option<&CurrentUser>,
) -> Result<(), AuthError> {
    policy.check(operation, user.map(|u| u.level()))
}
