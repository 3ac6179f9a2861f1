//! Brute-force lockout: escalating backoff persisted across reloads.
//!
//! The failure counter never decays on its own. Only the lock window expires,
//! and expiry is checked by the reader. A successful login is the only reset.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::ADMIN_LOCK_KEY;
use crate::store::KvStore;
use crate::Result;

/// Failures tolerated before the first lock.
pub const LOCKOUT_THRESHOLD: u32 = 5;

/// Lock duration for `failures` consecutive failures. Zero means not locked.
#[must_use]
pub fn lockout_duration_ms(failures: u32) -> i64 {
    match failures {
        0..5 => 0,
        5..8 => 30 * 1000,
        8..11 => 2 * 60 * 1000,
        11..15 => 10 * 60 * 1000,
        _ => 60 * 60 * 1000,
    }
}

/// Human-readable duration: `45s`, `2m 5s`, `1h 30m`.
#[must_use]
pub fn format_duration(ms: i64) -> String {
    let seconds = ((ms.max(0) as f64) / 1000.0).round() as i64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    let rem_seconds = seconds % 60;
    if minutes < 60 {
        return if rem_seconds > 0 {
            format!("{minutes}m {rem_seconds}s")
        } else {
            format!("{minutes}m")
        };
    }
    let hours = minutes / 60;
    let rem_minutes = minutes % 60;
    if rem_minutes > 0 {
        format!("{hours}h {rem_minutes}m")
    } else {
        format!("{hours}h")
    }
}

/// Persisted lockout state. `(0, 0)` is the initial state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutState {
    #[serde(rename = "fails")]
    pub failure_count: u32,
    /// Zero, or an instant that was in the future when written.
    #[serde(rename = "lockedUntil")]
    pub locked_until_ms: i64,
}

impl LockoutState {
    #[must_use]
    pub fn is_locked(&self, now_ms: i64) -> bool {
        self.locked_until_ms != 0 && now_ms < self.locked_until_ms
    }

    /// Time left in the lock window, zero when not locked.
    #[must_use]
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        if self.is_locked(now_ms) {
            self.locked_until_ms - now_ms
        } else {
            0
        }
    }

    /// State after one more failed attempt at `now_ms`.
    #[must_use]
    pub fn record_failure(self, now_ms: i64) -> Self {
        let failure_count = self.failure_count.saturating_add(1);
        let duration = lockout_duration_ms(failure_count);
        let locked_until_ms = if failure_count >= LOCKOUT_THRESHOLD && duration > 0 {
            now_ms + duration
        } else {
            0
        };
        Self {
            failure_count,
            locked_until_ms,
        }
    }

    /// Lenient decode: bad or missing fields read as zero, fractions are floored.
    fn from_json(text: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) else {
            return Self::default();
        };
        let read = |key: &str| -> f64 {
            map.get(key)
                .and_then(Value::as_f64)
                .filter(|value| value.is_finite())
                .map_or(0.0, |value| value.floor().max(0.0))
        };
        Self {
            failure_count: read("fails").min(f64::from(u32::MAX)) as u32,
            locked_until_ms: read("lockedUntil").min(i64::MAX as f64) as i64,
        }
    }
}

/// Reads and writes [`LockoutState`] under its store key.
///
/// Storage failures are logged and absorbed: the lockout is a UX throttle,
/// so a blocked store degrades to "never locked" rather than breaking login.
pub struct LockoutLedger<'a> {
    store: &'a dyn KvStore,
}

impl<'a> LockoutLedger<'a> {
    #[must_use]
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn load(&self) -> LockoutState {
        match self.store.get(ADMIN_LOCK_KEY) {
            Ok(Some(raw)) => LockoutState::from_json(&raw),
            Ok(None) => LockoutState::default(),
            Err(err) => {
                tracing::warn!(error = %err, "lockout state unreadable; treating as clear");
                LockoutState::default()
            }
        }
    }

    pub fn save(&self, state: LockoutState) -> Result<()> {
        let payload = serde_json::to_string(&state)?;
        self.store.set(ADMIN_LOCK_KEY, &payload)
    }

    /// Increments the failure count and persists it. Returns the new state.
    #[must_use]
    pub fn record_failure(&self, previous: LockoutState, now_ms: i64) -> LockoutState {
        let next = previous.record_failure(now_ms);
        if let Err(err) = self.save(next) {
            tracing::warn!(error = %err, "could not persist lockout state");
        }
        tracing::info!(
            lockout.failures = next.failure_count,
            lockout.locked_until = next.locked_until_ms,
            "admin login failed"
        );
        next
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.remove(ADMIN_LOCK_KEY) {
            tracing::warn!(error = %err, "could not clear lockout state");
        }
    }
}
