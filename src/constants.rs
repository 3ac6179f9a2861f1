//! Storage keys, reserved field names, and timing constants.

/// Store key holding the admin override payload (`{data, savedAt}`).
pub const STORAGE_OVERRIDE_KEY: &str = "phonebook_override_v1";
/// Store key holding the login lockout state (`{fails, lockedUntil}`).
pub const ADMIN_LOCK_KEY: &str = "phonebook_admin_lock_v1";
/// Store key holding the UI theme preference.
pub const THEME_KEY: &str = "phonebook_theme";

/// Reserved record field that carries group membership.
pub const GROUP_FIELD: &str = "__group";
/// Record field that holds a photo data URL.
pub const PHOTO_FIELD: &str = "Photo";
/// Reserved top-level key of a map-of-groups payload that carries metadata.
pub const META_KEY: &str = "meta";
/// Bucket name used on export for records without a group.
pub const UNCATEGORIZED_GROUP: &str = "uncategorized";

/// Published placeholder that never counts as a configured password.
pub const DEFAULT_ADMIN_PASSWORD: &str = "CHANGE_THIS_PASSWORD";
/// Minimum length (in characters) of an acceptable plaintext password.
pub const MIN_PLAINTEXT_PASSWORD_CHARS: usize = 8;
/// Optional prefix on configured digests.
pub const DIGEST_PREFIX: &str = "sha256:";

/// Lifetime of an admin session.
pub const ADMIN_SESSION_MS: i64 = 10 * 60 * 1000;

/// Number of records sampled when collecting field keys.
pub const KEY_SCAN_LIMIT: usize = 200;
