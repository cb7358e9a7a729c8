//! Offline navigation over a resolved snapshot.
//!
//! Once the gate has released a folder snapshot, all browsing happens here:
//! drill-down, back, and breadcrumbs are pure in-memory tree walks over the
//! snapshot taken at share time. No storage calls ever happen after
//! resolution.

use crate::snapshot::{FlatEntry, Snapshot, SnapshotEntry};

/// Fallback root label when a policy has neither label nor display name.
pub const DEFAULT_ROOT_LABEL: &str = "Folder Contents";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    id: String,
    name: String,
}

/// Result of opening an entry in the active listing.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenOutcome {
    /// The entry was a container; the navigator moved into it.
    Entered,
    /// The entry was a file; embed it. The navigator did not move.
    Preview(SnapshotEntry),
    /// No entry with that id in the active listing.
    NotFound,
}

/// In-memory tree walker with a history stack and breadcrumb trail.
#[derive(Debug, Clone)]
pub struct Navigator {
    root_label: String,
    root: Vec<SnapshotEntry>,
    stack: Vec<Frame>,
}

fn adapt_flat(entries: &[FlatEntry]) -> Vec<SnapshotEntry> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            SnapshotEntry::file(
                format!("flat-{}", index),
                entry.name.clone(),
                entry.url.clone(),
                0,
            )
        })
        .collect()
}

impl Navigator {
    pub fn new(root_label: impl Into<String>, snapshot: &Snapshot) -> Self {
        let root = match snapshot {
            Snapshot::Nested(entries) => entries.clone(),
            Snapshot::Flat(entries) => adapt_flat(entries),
        };
        Self {
            root_label: root_label.into(),
            root,
            stack: Vec::new(),
        }
    }

    /// The listing at the current location.
    pub fn current(&self) -> &[SnapshotEntry] {
        let mut listing: &[SnapshotEntry] = &self.root;
        for frame in &self.stack {
            match listing.iter().find(|entry| entry.id == frame.id) {
                Some(entry) => listing = entry.children(),
                None => return &[],
            }
        }
        listing
    }

    /// Open an entry from the active listing by id.
    pub fn open(&mut self, id: &str) -> OpenOutcome {
        let Some(entry) = self.current().iter().find(|entry| entry.id == id).cloned() else {
            return OpenOutcome::NotFound;
        };
        if entry.is_container() {
            self.stack.push(Frame {
                id: entry.id.clone(),
                name: entry.name.clone(),
            });
            OpenOutcome::Entered
        } else {
            OpenOutcome::Preview(entry)
        }
    }

    /// Pop one history frame. Popping at the root is a no-op.
    pub fn back(&mut self) -> bool {
        self.stack.pop().is_some()
    }

    /// Jump straight back to the snapshot root.
    pub fn to_root(&mut self) {
        self.stack.clear();
    }

    pub fn at_root(&self) -> bool {
        self.stack.is_empty()
    }

    /// Root label followed by the container names along the history stack.
    pub fn breadcrumbs(&self) -> Vec<String> {
        let mut crumbs = Vec::with_capacity(self.stack.len() + 1);
        crumbs.push(self.root_label.clone());
        crumbs.extend(self.stack.iter().map(|frame| frame.name.clone()));
        crumbs
    }

    /// `/`-joined container names from the root; empty at the root itself.
    pub fn path(&self) -> String {
        self.stack
            .iter()
            .map(|frame| frame.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let mut folder =
            SnapshotEntry::container("c1".into(), "folderB".into(), "link".into(), 0);
        folder.children = Some(vec![SnapshotEntry::file(
            "f2".into(),
            "fileC".into(),
            "link".into(),
            1,
        )]);
        Snapshot::Nested(vec![
            SnapshotEntry::file("f1".into(), "fileA".into(), "link".into(), 0),
            folder,
        ])
    }

    #[test]
    fn test_open_file_is_preview_without_movement() {
        let mut nav = Navigator::new("root", &snapshot());
        let outcome = nav.open("f1");
        assert!(matches!(outcome, OpenOutcome::Preview(entry) if entry.name == "fileA"));
        assert!(nav.at_root());
    }

    #[test]
    fn test_open_container_pushes_one_frame() {
        let mut nav = Navigator::new("root", &snapshot());
        assert_eq!(nav.open("c1"), OpenOutcome::Entered);
        assert_eq!(nav.breadcrumbs(), vec!["root", "folderB"]);
        assert_eq!(nav.path(), "folderB");
        assert_eq!(nav.current().len(), 1);
    }

    #[test]
    fn test_back_beyond_root_is_noop() {
        let mut nav = Navigator::new("root", &snapshot());
        nav.open("c1");
        assert!(nav.back());
        assert!(!nav.back());
        assert!(!nav.back());
        assert_eq!(nav.breadcrumbs(), vec!["root"]);
        assert_eq!(nav.current().len(), 2);
    }

    #[test]
    fn test_flat_snapshot_adapts_to_file_rows() {
        let flat = Snapshot::Flat(vec![
            FlatEntry {
                name: "pano.jpg".into(),
                url: "https://example.com/pano".into(),
            },
            FlatEntry {
                name: "walkthrough".into(),
                url: "https://example.com/walk".into(),
            },
        ]);
        let mut nav = Navigator::new("tour", &flat);
        assert_eq!(nav.current().len(), 2);
        let outcome = nav.open("flat-1");
        assert!(
            matches!(outcome, OpenOutcome::Preview(entry) if entry.link == "https://example.com/walk")
        );
    }
}
