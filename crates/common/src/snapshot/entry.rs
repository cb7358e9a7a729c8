use serde::{Deserialize, Serialize};

/// Node kind within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Container,
}

/// One node in a materialized folder snapshot.
///
/// `children` is `Some` exactly when the node is a container: an empty list
/// means the container was fetched and is known empty (or was truncated at
/// the depth bound). `fetch_error` marks a container whose contents could
/// not be fetched; such a node keeps `children = Some(vec![])` so the rest
/// of the tree stays navigable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
    pub link: String,
    pub depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SnapshotEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl SnapshotEntry {
    pub fn file(id: String, name: String, link: String, depth: u32) -> Self {
        Self {
            id,
            name,
            kind: EntryKind::File,
            link,
            depth,
            children: None,
            fetch_error: None,
        }
    }

    pub fn container(id: String, name: String, link: String, depth: u32) -> Self {
        Self {
            id,
            name,
            kind: EntryKind::Container,
            link,
            depth,
            children: Some(Vec::new()),
            fetch_error: None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, EntryKind::Container)
    }

    pub fn children(&self) -> &[SnapshotEntry] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// One leaf file in a flattened snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub name: String,
    pub url: String,
}

/// A materialized, point-in-time copy of a container's contents.
///
/// Nested snapshots preserve the tree; flat snapshots keep only leaf files,
/// for the simpler persistence shape used by virtual link trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "entries", rename_all = "snake_case")]
pub enum Snapshot {
    Nested(Vec<SnapshotEntry>),
    Flat(Vec<FlatEntry>),
}

impl Snapshot {
    /// Count of all entries, including nested descendants.
    pub fn total_items(&self) -> u64 {
        match self {
            Snapshot::Nested(entries) => count_entries(entries),
            Snapshot::Flat(entries) => entries.len() as u64,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Snapshot::Nested(_))
    }
}

/// Recursively count every node (containers and files) across all depths.
pub fn count_entries(entries: &[SnapshotEntry]) -> u64 {
    entries
        .iter()
        .map(|entry| 1 + count_entries(entry.children()))
        .sum()
}
