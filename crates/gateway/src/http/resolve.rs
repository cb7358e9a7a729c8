//! Handlers for the `/qr/{id}` resolution surface.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use common::gate::{GateSession, GateState, Resolution, PASSWORD_ERROR_TTL};

use crate::state::State as GatewayState;

// the same message covers "never existed" and "deleted"
const NOT_FOUND_MESSAGE: &str = "QR code not found or expired.";
const EXPIRED_MESSAGE: &str = "QR code is expired.";

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GateResponse {
    NotFound {
        message: &'static str,
    },
    Expired {
        message: &'static str,
    },
    Gated {
        requires_password: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_ttl_seconds: Option<u64>,
    },
    Resolved {
        resolution: Resolution,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveRequest {
    pub password: Option<String>,
    #[serde(default)]
    pub acknowledge_note: bool,
    pub visitor: Option<String>,
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    tracing::error!("gate failure: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "status": "error" })),
    )
        .into_response()
}

fn gated_response(session: &GateSession, with_error: bool) -> Response {
    let GateState::Gated {
        note,
        needs_password,
    } = session.state()
    else {
        return internal_error("gated response for non-gated session");
    };
    let policy = session.policy();
    let error = if with_error {
        session.password_error().map(|message| message.to_string())
    } else {
        None
    };
    let error_ttl_seconds = error.as_ref().map(|_| PASSWORD_ERROR_TTL.as_secs());
    Json(GateResponse::Gated {
        requires_password: *needs_password,
        note: note.clone(),
        label: policy.and_then(|p| p.label.clone()),
        expires_at: policy.and_then(|p| p.expiration),
        error,
        error_ttl_seconds,
    })
    .into_response()
}

fn resolved_response(resolution: Resolution) -> Response {
    Json(GateResponse::Resolved { resolution }).into_response()
}

/// `GET /qr/{id}` - gate status. Ungated policies resolve immediately, with
/// zero interaction required.
#[instrument(skip(state))]
pub async fn status_handler(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    let mut session = match state.gate().load(&id).await {
        Ok(session) => session,
        Err(err) => return internal_error(err),
    };

    match session.state().clone() {
        GateState::NotFound => (
            StatusCode::NOT_FOUND,
            Json(GateResponse::NotFound {
                message: NOT_FOUND_MESSAGE,
            }),
        )
            .into_response(),
        GateState::Expired => (
            StatusCode::GONE,
            Json(GateResponse::Expired {
                message: EXPIRED_MESSAGE,
            }),
        )
            .into_response(),
        GateState::Gated { .. } => gated_response(&session, false),
        GateState::Authorized => match state.gate().resolve(&mut session, None).await {
            Ok(resolution) => resolved_response(resolution),
            Err(err) => internal_error(err),
        },
        GateState::Loading | GateState::Resolved(_) => {
            internal_error("unexpected gate state after load")
        }
    }
}

/// `POST /qr/{id}` - submit note acknowledgement and/or a password attempt,
/// and receive the released target once the gate opens.
#[instrument(skip(state, request))]
pub async fn resolve_handler(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Response {
    let mut session = match state.gate().load(&id).await {
        Ok(session) => session,
        Err(err) => return internal_error(err),
    };

    match session.state() {
        GateState::NotFound => {
            return (
                StatusCode::NOT_FOUND,
                Json(GateResponse::NotFound {
                    message: NOT_FOUND_MESSAGE,
                }),
            )
                .into_response()
        }
        GateState::Expired => {
            return (
                StatusCode::GONE,
                Json(GateResponse::Expired {
                    message: EXPIRED_MESSAGE,
                }),
            )
                .into_response()
        }
        _ => {}
    }

    if request.acknowledge_note {
        session.acknowledge_note();
    }
    if let Some(password) = &request.password {
        session.submit_password(password);
    }

    match session.state().clone() {
        GateState::Authorized => {
            match state
                .gate()
                .resolve(&mut session, request.visitor.as_deref())
                .await
            {
                Ok(resolution) => resolved_response(resolution),
                Err(err) => internal_error(err),
            }
        }
        GateState::Gated { .. } => gated_response(&session, true),
        _ => internal_error("unexpected gate state after submission"),
    }
}
