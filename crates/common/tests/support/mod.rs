//! Shared test utilities for the core integration tests
#![allow(dead_code)]

use common::storage::{MemoryStorageProvider, ROOT_CONTAINER_ID};

/// Seed a chain of nested containers `depth` levels deep under the root,
/// each level holding one file. Returns the ids of the chain containers,
/// outermost first.
pub fn seed_deep_chain(storage: &MemoryStorageProvider, depth: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(depth);
    let mut parent = ROOT_CONTAINER_ID.to_string();
    for level in 0..depth {
        let container = storage.add_container(&parent, &format!("level{}", level));
        storage.add_file(&container, &format!("file{}.txt", level));
        ids.push(container.clone());
        parent = container;
    }
    ids
}
