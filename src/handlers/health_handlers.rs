//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the tracker registry is reachable

use crate::services::tracker_service::ObjectTracker;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::{collections::HashMap, time::Duration};
use tokio::time::timeout;

/// How long readiness waits for the registry lock before reporting failure.
const READY_LOCK_TIMEOUT: Duration = Duration::from_millis(500);

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that acquires the tracker's registry lock within
/// `READY_LOCK_TIMEOUT` and reports how many objects are tracked.
///
/// HTTP 200 when the check passes, HTTP 503 when the lock is held too long.
pub async fn readyz(State(tracker): State<ObjectTracker>) -> impl IntoResponse {
    let (tracked, registry_check) = match timeout(READY_LOCK_TIMEOUT, tracker.count()).await {
        Ok(count) => (Some(count), (true, None::<String>)),
        Err(_) => (
            None,
            (
                false,
                Some(format!(
                    "registry lock not acquired within {}ms",
                    READY_LOCK_TIMEOUT.as_millis()
                )),
            ),
        ),
    };

    let overall_ok = registry_check.0;

    let mut checks = HashMap::new();
    checks.insert(
        "registry",
        CheckStatus {
            ok: registry_check.0,
            error: registry_check.1,
        },
    );

    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        tracked_objects: tracked,
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    tracked_objects: Option<usize>,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
