//! The access gate: one decision per request, before any handler runs.

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info, warn};

use crate::access::{Decision, evaluate};
use crate::middleware::auth::{SessionRead, read_session};
use crate::state::AppState;

/// Reads the session, evaluates the access policy and either forwards the
/// request (with the verified claims in its extensions) or answers with a
/// redirect or a JSON rejection.
///
/// Invalid tokens are logged by failure kind and treated as absent. Only the
/// path is logged, never the query string or the token.
pub async fn access_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let session = match read_session(req.headers(), &state.auth_config) {
        SessionRead::Valid(claims) => Some(claims),
        SessionRead::Absent => None,
        SessionRead::Invalid(err) => {
            warn!(path = %path, reason = err.kind(), "Ignoring invalid session token");
            None
        }
    };

    let evaluation = evaluate(&state.access_policy, &path, query.as_deref(), session.as_ref());

    info!(
        path = %path,
        outcome = evaluation.outcome.as_str(),
        subject_id = session.as_ref().map(|s| s.id.as_str()),
        role = session.as_ref().map(|s| s.role.as_str()),
        "Access decision"
    );

    match evaluation.decision {
        Decision::Continue => {
            if let Some(claims) = session {
                req.extensions_mut().insert(claims);
            }
            next.run(req).await
        }
        Decision::RedirectTo {
            location,
            preserve_callback,
        } => {
            // The callback embeds the original query, so only the target path is logged.
            let target = location.split('?').next().unwrap_or_default();
            debug!(target_path = %target, preserve_callback, "Redirecting");
            Redirect::temporary(&location).into_response()
        }
        Decision::RejectWithStatus { status, body } => (status, Json(body)).into_response(),
    }
}
