//! In-memory admin session with absolute expiry.

use crate::constants::ADMIN_SESSION_MS;

/// Admin login flag. Never persisted; a reload always starts logged out.
///
/// `logged_in` is only observable as `true` while `now < expires_at_ms`.
/// Expiry is enforced on read: the first check at or after the deadline
/// clears the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminSession {
    logged_in: bool,
    expires_at_ms: i64,
}

impl AdminSession {
    pub fn login(&mut self, now_ms: i64) {
        self.logged_in = true;
        self.expires_at_ms = now_ms + ADMIN_SESSION_MS;
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        self.expires_at_ms = 0;
    }

    /// Current login state, clearing it if the deadline has passed.
    pub fn is_logged_in(&mut self, now_ms: i64) -> bool {
        if !self.logged_in {
            return false;
        }
        if self.expires_at_ms != 0 && now_ms >= self.expires_at_ms {
            tracing::debug!(session.expired_at = self.expires_at_ms, "admin session expired");
            self.logout();
            return false;
        }
        true
    }

    #[must_use]
    pub fn expires_at_ms(&self) -> i64 {
        self.expires_at_ms
    }
}
