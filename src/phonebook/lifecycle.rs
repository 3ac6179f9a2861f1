//! Startup and reload of the active dataset.
//!
//! Responsibilities:
//! - Normalize the shipped baseline once.
//! - Let a stored override replace the baseline records wholesale.
//! - Recompute groups and pick the timestamp shown to the user.

use std::sync::Arc;

use crate::baseline::DataSource;
use crate::clock::{Clock, SystemClock};
use crate::config::AdminConfig;
use crate::credential::Credential;
use crate::digest::Sha256Digest;
use crate::fields::FieldRoles;
use crate::normalize::compute_groups;
use crate::override_store::{OverridePayload, OverrideStore};
use crate::preferences::{Theme, load_theme, save_theme};
use crate::session::AdminSession;
use crate::store::KvStore;
use crate::types::{Dataset, Group, Record};
use crate::Result;

/// Admin working copy: a deep copy of the active records plus the field
/// names offered for editing.
#[derive(Debug, Clone, Default)]
pub(crate) struct Workspace {
    pub(crate) records: Vec<Record>,
    pub(crate) keys: Vec<String>,
}

/// Primary handle for a phone book instance.
///
/// Holds the immutable baseline, the active dataset (baseline or override),
/// the resolved credential, the in-memory admin session, and the admin
/// working copy while one exists.
pub struct Phonebook {
    pub(crate) store: Box<dyn KvStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) hasher: Sha256Digest,
    pub(crate) credential: Credential,
    pub(crate) hide_admin_entry: bool,
    pub(crate) baseline: Dataset,
    pub(crate) active: Dataset,
    pub(crate) override_active: bool,
    pub(crate) roles: FieldRoles,
    pub(crate) session: AdminSession,
    pub(crate) workspace: Option<Workspace>,
}

impl std::fmt::Debug for Phonebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phonebook")
            .field("credential", &self.credential)
            .field("digest", &self.hasher)
            .field("records", &self.active.records.len())
            .field("override_active", &self.override_active)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Phonebook {
    /// Opens with the system clock and the best available digest backend.
    pub fn open(baseline: &DataSource, config: &AdminConfig, store: impl KvStore + 'static) -> Self {
        Self::open_with(
            baseline,
            config,
            Box::new(store),
            Arc::new(SystemClock),
            Sha256Digest::detect(),
        )
    }

    pub fn open_with(
        baseline: &DataSource,
        config: &AdminConfig,
        store: Box<dyn KvStore>,
        clock: Arc<dyn Clock>,
        hasher: Sha256Digest,
    ) -> Self {
        let credential = Credential::from_config(config);
        let baseline = baseline.to_dataset();
        let mut phonebook = Self {
            store,
            clock,
            hasher,
            credential,
            hide_admin_entry: config.hide_admin_entry,
            active: baseline.clone(),
            baseline,
            override_active: false,
            roles: FieldRoles::default(),
            session: AdminSession::default(),
            workspace: None,
        };
        phonebook.reload();
        tracing::info!(
            phonebook.records = phonebook.active.records.len(),
            phonebook.groups = phonebook.active.groups.len(),
            phonebook.override_active = phonebook.override_active,
            phonebook.credential = ?phonebook.credential,
            "phonebook opened"
        );
        phonebook
    }

    /// Re-runs the startup sequence against the store.
    ///
    /// The admin working copy is discarded; the session is kept.
    pub fn reload(&mut self) {
        let payload = OverrideStore::new(self.store.as_ref()).load();
        self.override_active = payload.is_some();
        self.active = match payload {
            Some(payload) => apply_override(&self.baseline, payload),
            None => self.baseline.clone(),
        };
        self.roles = FieldRoles::for_records(&self.active.records);
        self.workspace = None;
    }

    /// The dataset currently shown to users.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.active
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.active.records
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.active.groups
    }

    /// `savedAt` of the active override, else the baseline `generatedAt`.
    #[must_use]
    pub fn updated_at(&self) -> Option<&str> {
        self.active.updated_at.as_deref()
    }

    #[must_use]
    pub fn baseline(&self) -> &Dataset {
        &self.baseline
    }

    #[must_use]
    pub fn has_override(&self) -> bool {
        self.override_active
    }

    #[must_use]
    pub fn field_roles(&self) -> &FieldRoles {
        &self.roles
    }

    #[must_use]
    pub fn hide_admin_entry(&self) -> bool {
        self.hide_admin_entry
    }

    #[must_use]
    pub fn theme(&self) -> Option<Theme> {
        load_theme(self.store.as_ref())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        save_theme(self.store.as_ref(), theme)
    }

    /// Makes `payload` the active dataset after a successful save.
    pub(crate) fn activate_override(&mut self, payload: OverridePayload) {
        self.active = apply_override(&self.baseline, payload);
        self.override_active = true;
        self.roles = FieldRoles::for_records(&self.active.records);
    }
}

/// Override records replace the baseline records. Groups are recomputed and
/// only replace the baseline groups when the override has any; `savedAt`
/// replaces the baseline timestamp when present.
fn apply_override(baseline: &Dataset, payload: OverridePayload) -> Dataset {
    let groups = compute_groups(&payload.data);
    Dataset {
        groups: if groups.is_empty() {
            baseline.groups.clone()
        } else {
            groups
        },
        records: payload.data,
        meta: baseline.meta.clone(),
        updated_at: payload.saved_at.or_else(|| baseline.updated_at.clone()),
    }
}
