use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// Longest label that fits under a rendered QR image.
pub const MAX_LABEL_LEN: usize = 58;

/// The persisted access-control record for one shareable identifier.
///
/// Invariants, enforced by the store at write time:
/// - `is_container == true` implies `snapshot` and `container_id` are set
/// - `is_container == false` implies `target_url` is set
/// - `expiration`, once in the past at resolution time, makes the document
///   permanently unresolvable; nothing deletes it automatically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub id: String,
    pub is_container: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    #[serde(default)]
    pub total_item_count: u64,
    #[serde(default = "default_show_overlay")]
    pub show_overlay: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_show_overlay() -> bool {
    true
}

impl PolicyDocument {
    /// An empty note means no note was configured.
    pub fn requires_note(&self) -> bool {
        self.note.as_deref().is_some_and(|note| !note.is_empty())
    }

    pub fn requires_password(&self) -> bool {
        self.password
            .as_deref()
            .is_some_and(|password| !password.is_empty())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| now > expiration)
    }
}

/// What a new policy grants access to.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyTarget {
    /// A single item: a storage file or an arbitrary external link.
    Item { url: String },
    /// A container, snapshotted at creation time.
    Container { container_id: String },
}

/// Caller-supplied fields for a new policy document.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyInput {
    pub target: PolicyTarget,
    pub display_name: Option<String>,
    pub note: Option<String>,
    pub password: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
    pub label: Option<String>,
    pub show_overlay: bool,
}

impl PolicyInput {
    pub fn new(target: PolicyTarget) -> Self {
        Self {
            target,
            display_name: None,
            note: None,
            password: None,
            expiration: None,
            label: None,
            show_overlay: true,
        }
    }
}

/// Partial update for an existing policy.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it. `id` and
/// `created_at` are never updatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyPatch {
    pub note: Option<Option<String>>,
    pub password: Option<Option<String>>,
    pub expiration: Option<Option<DateTime<Utc>>>,
    pub label: Option<Option<String>>,
    pub target_url: Option<Option<String>>,
    pub show_overlay: Option<bool>,
}
