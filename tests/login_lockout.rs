//! End-to-end admin login: digest credential, escalating lockout, session expiry.

use std::sync::Arc;

use phonebook_core::{
    ADMIN_LOCK_KEY, ADMIN_SESSION_MS, AdminConfig, Clock, DataSource, DigestPrimitive,
    LockoutState, ManualClock, MemoryStore, Phonebook, PhonebookError, Result, Sha256Digest,
    SoftSha256,
};

const START_MS: i64 = 1_700_000_000_000;

fn digest_config(salt: &str, password: &str) -> AdminConfig {
    let digest = Sha256Digest::software_only().digest_hex(&format!("{salt}:{password}"));
    AdminConfig::with_digest(salt, digest)
}

fn open(config: &AdminConfig, store: &MemoryStore, clock: &ManualClock) -> Phonebook {
    Phonebook::open_with(
        &DataSource::empty(),
        config,
        Box::new(store.clone()),
        Arc::new(clock.clone()),
        Sha256Digest::detect(),
    )
}

#[test]
fn lockout_then_recovery_scenario() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START_MS);
    let mut phonebook = open(&digest_config("s1", "correcthorse"), &store, &clock);
    assert!(phonebook.is_admin_configured());

    for attempt in 1..=5 {
        let err = phonebook.login("wrong").unwrap_err();
        assert!(
            matches!(err, PhonebookError::VerificationFailure { .. }),
            "attempt {attempt}: {err}"
        );
        assert_eq!(phonebook.lockout_state().failure_count, attempt);
    }
    let locked = phonebook.lockout_state();
    assert_eq!(locked.locked_until_ms, START_MS + 30_000);

    // Correct password while locked: refused before verification, counter unchanged.
    let err = phonebook.login("correcthorse").unwrap_err();
    assert!(matches!(err, PhonebookError::Locked { remaining_ms: 30_000 }));
    assert_eq!(phonebook.lockout_state(), locked);
    assert!(!phonebook.is_admin());

    clock.advance(29_999);
    assert_eq!(phonebook.login("correcthorse").unwrap_err().code(), "locked");

    clock.advance(1);
    phonebook.login("correcthorse").unwrap();
    assert_eq!(phonebook.lockout_state(), LockoutState::default());
    assert_eq!(store.peek(ADMIN_LOCK_KEY), None);
    assert!(phonebook.is_admin());
    assert_eq!(
        phonebook.session_expires_at(),
        START_MS + 30_000 + ADMIN_SESSION_MS
    );

    clock.advance(ADMIN_SESSION_MS - 1);
    assert!(phonebook.is_admin());
    clock.advance(1);
    assert!(!phonebook.is_admin());
}

#[test]
fn lockout_survives_reopen_but_session_does_not() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START_MS);
    let config = digest_config("s1", "correcthorse");

    let mut phonebook = open(&config, &store, &clock);
    for _ in 0..8 {
        let _ = phonebook.login("wrong");
        clock.advance(3_600_000);
    }
    phonebook.login("correcthorse").unwrap();
    phonebook.logout();
    for _ in 0..7 {
        clock.advance(30_000);
        let _ = phonebook.login("wrong");
    }
    assert_eq!(phonebook.lockout_state().failure_count, 7);

    let mut reopened = open(&config, &store, &clock);
    assert!(!reopened.is_admin());
    let state = reopened.lockout_state();
    assert_eq!(state.failure_count, 7);
    assert!(state.is_locked(clock.now_ms()));

    clock.advance(30_000);
    let err = reopened.login("still wrong").unwrap_err();
    assert_eq!(err.to_string(), "wrong password; locked for 2m");
}

#[test]
fn prefixed_uppercase_digest_is_accepted() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START_MS);
    let hex = Sha256Digest::software_only().digest_hex("pepper:open sesame");
    let config = AdminConfig::with_digest("pepper", format!("  sha256:{}  ", hex.to_uppercase()));
    let mut phonebook = open(&config, &store, &clock);
    phonebook.login("open sesame").unwrap();
}

#[test]
fn digest_mode_ignores_plaintext_password() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START_MS);
    let mut config = digest_config("s1", "correcthorse");
    config.password = "plaintext-password".into();
    let mut phonebook = open(&config, &store, &clock);
    assert!(phonebook.login("plaintext-password").is_err());

    let mut other_salt = digest_config("s2", "correcthorse");
    other_salt.password_salt = "s1".into();
    let mut phonebook = open(&other_salt, &MemoryStore::new(), &clock);
    assert!(phonebook.login("correcthorse").is_err());
}

struct FailingBackend;

impl DigestPrimitive for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn digest(&self, _input: &[u8]) -> Result<[u8; 32]> {
        Err(PhonebookError::DigestComputationFailure {
            reason: "backend unavailable".into(),
        })
    }
}

#[test]
fn failing_digest_backend_falls_back_silently() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START_MS);
    let hasher = Sha256Digest::with_primary(Box::new(FailingBackend));
    assert_eq!(hasher.digest_bytes(b"abc"), SoftSha256::hash(b"abc"));
    let mut phonebook = Phonebook::open_with(
        &DataSource::empty(),
        &digest_config("s1", "correcthorse"),
        Box::new(store),
        Arc::new(clock),
        hasher,
    );
    phonebook.login("correcthorse").unwrap();
}
