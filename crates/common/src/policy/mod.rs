/**
 * Policy documents and their store.
 *  A policy document is the persisted access-control record behind one
 *  shareable identifier: target resource, optional note / password /
 *  expiration / label, and (for containers) the folder snapshot taken
 *  at share time.
 */
mod document;
mod mint;
mod store;

pub use document::{PolicyDocument, PolicyInput, PolicyPatch, PolicyTarget, MAX_LABEL_LEN};
pub use mint::{mint_id, ID_LEN};
pub use store::{
    default_collections, CollectionSpec, PolicyError, PolicyKind, PolicyStore, ResolutionContext,
};
