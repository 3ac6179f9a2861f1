#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::useless_vec,
        clippy::uninlined_format_args,
        clippy::cast_possible_truncation,
        clippy::float_cmp,
        clippy::cast_precision_loss
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Strategic lint exceptions - these are allowed project-wide for pragmatic reasons:
//
// Documentation lints: Many internal/self-documenting functions don't need extensive docs.
// Public APIs should still have proper documentation.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Cast safety: epoch milliseconds, failure counts, and record counts are all far
// below the ranges where these casts lose information.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
//
// Style/complexity:
#![allow(clippy::too_many_lines)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::similar_names)]
//
// Pattern matching: These pedantic lints often suggest changes that reduce clarity.
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]
//
// Low-value pedantic lints that add noise:
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::case_sensitive_file_extension_comparisons)]
#![allow(clippy::unreadable_literal)] // Hash constants read better as plain hex
#![allow(clippy::many_single_char_names)] // Compression-function working variables
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unnecessary_wraps)]

//! Client-side trust and persistence core for a contact directory with an
//! embedded admin editing mode.
//!
//! There is no server: credential checks, brute-force lockout, the admin
//! session, and the local override that lets edits survive a reload all run
//! against a local key/value store. See [`Phonebook`] for the entry point.

/// The phonebook-core crate version (matches `Cargo.toml`).
pub const PHONEBOOK_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod baseline;
pub mod clock;
pub mod config;
pub mod constants;
pub mod credential;
pub mod digest;
pub mod error;
pub mod export;
pub mod fields;
pub mod generator;
pub mod lockout;
pub mod normalize;
pub mod override_store;
pub mod phonebook;
pub mod preferences;
pub mod session;
pub mod store;
pub mod text;
pub mod types;

pub use baseline::{DataSource, parse_data_source, render_data_source};
pub use clock::{Clock, ManualClock, SystemClock, iso_timestamp};
pub use config::AdminConfig;
pub use constants::*;
pub use credential::{Credential, normalize_digest_text};
#[cfg(feature = "native-digest")]
pub use digest::NativeSha256;
pub use digest::{DigestPrimitive, Sha256Digest, SoftSha256, SoftSha256State};
pub use error::{PhonebookError, Result};
pub use export::{
    EXPORT_SOURCE, RENAMED_META_GROUP, export_data_source, export_json, export_payload,
};
pub use fields::{FieldRoles, collect_keys, find_key, sanitize_phone};
pub use generator::{
    SourceRows, parse_rows, read_source_rows, read_xlsx_lines, render_generated_source, split_csv,
};
pub use lockout::{
    LOCKOUT_THRESHOLD, LockoutLedger, LockoutState, format_duration, lockout_duration_ms,
};
pub use normalize::{RawDataset, compute_groups, normalize};
pub use override_store::{OverridePayload, OverrideStore};
pub use phonebook::Phonebook;
pub use preferences::{Theme, load_theme, save_theme};
pub use session::AdminSession;
pub use store::{FileStore, KvStore, MemoryStore};
pub use text::natural_cmp;
pub use types::{Dataset, Group, Meta, Record};
