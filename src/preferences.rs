//! UI theme preference.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::constants::THEME_KEY;
use crate::store::KvStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Accepts the JSON form (`"dark"`) and the legacy bare form (`dark`).
    fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok().or_else(|| match raw.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        })
    }
}

/// Stored theme, or `None` when unset, unreadable, or unrecognized.
#[must_use]
pub fn load_theme(store: &dyn KvStore) -> Option<Theme> {
    match store.get(THEME_KEY) {
        Ok(Some(raw)) => Theme::decode(&raw),
        Ok(None) => None,
        Err(err) => {
            tracing::debug!(error = %err, "theme preference unreadable");
            None
        }
    }
}

pub fn save_theme(store: &dyn KvStore, theme: Theme) -> Result<()> {
    store.set(THEME_KEY, &serde_json::to_string(&theme)?)
}
