//! The access gate
//!
//! The enforcement step between locating a policy document and releasing
//! its target. A visit moves through an explicit state machine:
//!
//! ```text
//! Loading --> NotFound
//!         --> Expired
//!         --> Gated(note?, password?) --> Authorized --> Resolved
//!         ------------------------------^ (no note, no password)
//! ```
//!
//! - **Expiration** is evaluated against resolution time; a past expiration
//!   makes the id permanently inert, with no automatic deletion.
//! - **Note acknowledgement** is a single unvalidated action.
//! - **Password verification** is an exact-equality check with unlimited
//!   attempts and a transient mismatch message ([`PASSWORD_ERROR_TTL`]).
//! - **Resolution** releases the direct link, the preview address, or the
//!   stored folder snapshot, and appends a best-effort access-log record.

mod audit;
mod machine;

pub use audit::{AuditLog, AuditRecord, AUDIT_COLLECTION, AUDIT_ROW_LIMIT};
pub use machine::{
    AccessGate, GateError, GateSession, GateState, Resolution, ResolvedTarget, PASSWORD_ERROR_TTL,
};
