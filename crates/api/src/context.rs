//! Per-request identity context.

use keygate_core::{IdentityView, UserId};

/// The authenticated caller, re-resolved from the store for this request.
///
/// Inserted into request extensions by the identity guard; handlers behind
/// the guard can rely on it being present.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub IdentityView);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }

    /// Authorization level as stored right now, not as captured in the token.
    pub fn level(&self) -> i32 {
        self.0.level
    }

    pub fn view(&self) -> &IdentityView {
        &self.0
    }
}
