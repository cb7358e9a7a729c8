use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::docstore::DocumentStore;
use crate::locator::{self, ResourceKind};
use crate::policy::{PolicyDocument, PolicyError, PolicyStore, ResolutionContext};
use crate::snapshot::Snapshot;
use crate::storage::StorageProvider;

use super::audit::{AuditLog, AuditRecord};

/// How long a password-mismatch message stays visible before the caller
/// should clear it.
pub const PASSWORD_ERROR_TTL: Duration = Duration::from_secs(5);

const PASSWORD_MISMATCH_MESSAGE: &str = "Incorrect password. Please try again.";

/// What a resolved identifier grants access to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedTarget {
    /// A storage file, embeddable through its preview address.
    File {
        url: String,
        preview_url: Option<String>,
    },
    /// An arbitrary external link, handed through as-is.
    Link { url: String },
    /// A container, served from the stored snapshot without any further
    /// storage calls.
    Folder { snapshot: Snapshot },
}

/// The released resource plus the context fixed at lookup time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub id: String,
    /// Label to render over the released content (label, else the stored
    /// display name).
    pub display_label: Option<String>,
    pub target: ResolvedTarget,
    pub context: ResolutionContext,
}

/// Gate state for one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Loading,
    /// No document in any collection. Indistinguishable from a deleted id.
    NotFound,
    /// The policy exists but its expiration has passed. Permanent.
    Expired,
    /// Waiting on note acknowledgement and/or a correct password.
    Gated {
        note: Option<String>,
        needs_password: bool,
    },
    Authorized,
    Resolved(Resolution),
}

#[derive(thiserror::Error, Debug)]
pub enum GateError<DE, SE> {
    #[error(transparent)]
    Policy(#[from] PolicyError<DE, SE>),
    #[error("resolution attempted before authorization")]
    NotAuthorized,
    #[error("container policy {0} has no snapshot")]
    MissingSnapshot(String),
    #[error("policy {0} has no target")]
    MissingTarget(String),
}

/// Per-visit state machine: `Loading -> NotFound | Expired | Gated ->
/// Authorized -> Resolved`.
///
/// A session lives for one page view; nothing about authorization is
/// persisted, so a reload starts over at `Loading`.
#[derive(Debug, Clone)]
pub struct GateSession {
    state: GateState,
    policy: Option<PolicyDocument>,
    context: Option<ResolutionContext>,
    note_acknowledged: bool,
    password_ok: bool,
    password_error: Option<String>,
}

impl GateSession {
    fn terminal(state: GateState) -> Self {
        Self {
            state,
            policy: None,
            context: None,
            note_acknowledged: false,
            password_ok: false,
            password_error: None,
        }
    }

    fn gated(policy: PolicyDocument, context: ResolutionContext) -> Self {
        let mut session = Self {
            state: GateState::Loading,
            policy: Some(policy),
            context: Some(context),
            note_acknowledged: false,
            password_ok: false,
            password_error: None,
        };
        session.recompute();
        session
    }

    fn recompute(&mut self) {
        let Some(policy) = &self.policy else {
            return;
        };
        let needs_note = policy.requires_note() && !self.note_acknowledged;
        let needs_password = policy.requires_password() && !self.password_ok;
        self.state = if needs_note || needs_password {
            GateState::Gated {
                note: if needs_note { policy.note.clone() } else { None },
                needs_password,
            }
        } else {
            GateState::Authorized
        };
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn policy(&self) -> Option<&PolicyDocument> {
        self.policy.as_ref()
    }

    pub fn context(&self) -> Option<&ResolutionContext> {
        self.context.as_ref()
    }

    /// The transient password-mismatch message, if one is showing. Callers
    /// clear it after [`PASSWORD_ERROR_TTL`].
    pub fn password_error(&self) -> Option<&str> {
        self.password_error.as_deref()
    }

    pub fn clear_password_error(&mut self) {
        self.password_error = None;
    }

    /// Acknowledge the note. A single action with no validation; always
    /// succeeds, and is a no-op when no note gates this policy.
    pub fn acknowledge_note(&mut self) {
        self.note_acknowledged = true;
        if matches!(self.state, GateState::Gated { .. }) {
            self.recompute();
        }
    }

    /// Compare an attempt against the stored password. A mismatch keeps the
    /// session gated and surfaces a transient message; attempts are
    /// unlimited.
    pub fn submit_password(&mut self, attempt: &str) -> bool {
        self.password_error = None;
        let Some(policy) = &self.policy else {
            return false;
        };
        if !matches!(self.state, GateState::Gated { .. }) {
            return false;
        }
        if policy.password.as_deref() == Some(attempt) {
            self.password_ok = true;
            self.recompute();
            true
        } else {
            self.password_error = Some(PASSWORD_MISMATCH_MESSAGE.to_string());
            false
        }
    }

    fn set_resolved(&mut self, resolution: Resolution) {
        self.state = GateState::Resolved(resolution);
    }
}

/// The enforcement step between locating a policy and releasing its target.
#[derive(Debug, Clone)]
pub struct AccessGate<D: DocumentStore, S: StorageProvider> {
    store: PolicyStore<D, S>,
    audit: AuditLog<D>,
}

impl<D: DocumentStore, S: StorageProvider> AccessGate<D, S> {
    pub fn new(store: PolicyStore<D, S>, audit: AuditLog<D>) -> Self {
        Self { store, audit }
    }

    pub fn store(&self) -> &PolicyStore<D, S> {
        &self.store
    }

    /// Load a policy and start a session, evaluating expiration against the
    /// current time.
    pub async fn load(&self, id: &str) -> Result<GateSession, GateError<D::Error, S::Error>> {
        self.load_at(id, Utc::now()).await
    }

    /// As [`AccessGate::load`], with an explicit resolution time.
    pub async fn load_at(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<GateSession, GateError<D::Error, S::Error>> {
        let (policy, context) = match self.store.get(id).await {
            Ok(found) => found,
            Err(PolicyError::NotFound(_)) => return Ok(GateSession::terminal(GateState::NotFound)),
            Err(err) => return Err(err.into()),
        };
        if policy.is_expired(now) {
            return Ok(GateSession::terminal(GateState::Expired));
        }
        Ok(GateSession::gated(policy, context))
    }

    /// Release the target for an authorized session.
    ///
    /// On success the session moves to `Resolved` and an access-log record
    /// is written best-effort: a failed audit write is logged and swallowed,
    /// never blocking the resolution itself.
    pub async fn resolve(
        &self,
        session: &mut GateSession,
        visitor: Option<&str>,
    ) -> Result<Resolution, GateError<D::Error, S::Error>> {
        if !matches!(session.state(), GateState::Authorized) {
            return Err(GateError::NotAuthorized);
        }
        let policy = session.policy().ok_or(GateError::NotAuthorized)?.clone();
        let context = session.context().ok_or(GateError::NotAuthorized)?.clone();

        let target = if policy.is_container {
            let snapshot = policy
                .snapshot
                .clone()
                .ok_or_else(|| GateError::MissingSnapshot(policy.id.clone()))?;
            ResolvedTarget::Folder { snapshot }
        } else {
            let url = policy
                .target_url
                .clone()
                .ok_or_else(|| GateError::MissingTarget(policy.id.clone()))?;
            let classification = locator::classify(&url);
            match classification.kind {
                ResourceKind::File => ResolvedTarget::File {
                    url,
                    preview_url: classification.preview_url,
                },
                _ => ResolvedTarget::Link { url },
            }
        };

        let display_label = policy
            .label
            .clone()
            .filter(|label| !label.is_empty())
            .or_else(|| policy.display_name.clone());

        let resolution = Resolution {
            id: policy.id.clone(),
            display_label: display_label.clone(),
            target,
            context: context.clone(),
        };

        let record = AuditRecord {
            qr_id: policy.id.clone(),
            qr_name: display_label,
            visitor: visitor.map(|v| v.to_string()),
            is_container: policy.is_container,
            source: context.collection.clone(),
            timestamp: Utc::now(),
        };
        if let Err(err) = self.audit.record(&record).await {
            tracing::warn!("failed to write access log for {}: {}", policy.id, err);
        }

        session.set_resolved(resolution.clone());
        Ok(resolution)
    }
}
