//! Admin login: lockout check, credential verification, session.

use crate::lockout::{LockoutLedger, LockoutState, lockout_duration_ms};
use crate::phonebook::lifecycle::Phonebook;
use crate::{PhonebookError, Result};

impl Phonebook {
    /// Whether login should be offered at all.
    #[must_use]
    pub fn is_admin_configured(&self) -> bool {
        self.credential.is_configured()
    }

    /// Persisted lockout state as of now.
    #[must_use]
    pub fn lockout_state(&self) -> LockoutState {
        LockoutLedger::new(self.store.as_ref()).load()
    }

    /// Attempts an admin login.
    ///
    /// Order of checks: configuration, active lock (the credential is not
    /// consulted while locked), empty input (not counted as a failure),
    /// then verification. A failure is recorded in the lockout ledger; a
    /// success clears it and starts a session.
    pub fn login(&mut self, candidate: &str) -> Result<()> {
        if !self.credential.is_configured() {
            return Err(PhonebookError::CredentialNotConfigured);
        }
        let now = self.clock.now_ms();
        let ledger = LockoutLedger::new(self.store.as_ref());
        let state = ledger.load();
        if state.is_locked(now) {
            tracing::info!(
                lockout.failures = state.failure_count,
                lockout.remaining_ms = state.remaining_ms(now),
                "admin login refused while locked"
            );
            return Err(PhonebookError::Locked {
                remaining_ms: state.remaining_ms(now),
            });
        }
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(PhonebookError::MissingPassword);
        }

        if !self.credential.verify(candidate, &self.hasher) {
            let next = ledger.record_failure(state, now);
            return Err(PhonebookError::VerificationFailure {
                locked_for_ms: lockout_duration_ms(next.failure_count),
            });
        }

        ledger.clear();
        self.session.login(now);
        tracing::info!(
            session.expires_at = self.session.expires_at_ms(),
            "admin login succeeded"
        );
        Ok(())
    }

    /// Whether an admin session is active. Expired sessions are cleared.
    pub fn is_admin(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.session.is_logged_in(now)
    }

    /// Session deadline in epoch ms, zero when logged out.
    #[must_use]
    pub fn session_expires_at(&self) -> i64 {
        self.session.expires_at_ms()
    }

    /// Ends the session and drops the working copy.
    pub fn logout(&mut self) {
        self.session.logout();
        self.workspace = None;
        tracing::info!("admin logged out");
    }

    /// Leaving the admin area ends the session like an explicit logout.
    pub fn leave_admin(&mut self) {
        if self.session.expires_at_ms() != 0 || self.workspace.is_some() {
            self.logout();
        }
    }

    /// Gate for every privileged operation. On refusal the working copy is
    /// dropped, since it is unreachable until the next login.
    pub(crate) fn require_admin(&mut self) -> Result<()> {
        if self.is_admin() {
            return Ok(());
        }
        self.workspace = None;
        Err(PhonebookError::AdminRequired)
    }
}
