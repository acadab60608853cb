//! Defines routes for tracked-object operations.
//!
//! ## Structure
//! - **Collection endpoints**
//!   - `POST   /objects` — register an object
//!   - `GET    /objects` — list objects (supports `?stage=queued|processing|done|failed`)
//!
//! - **Object-level endpoints**
//!   - `GET    /objects/{id}` — flattened record
//!   - `DELETE /objects/{id}` — stop tracking
//!   - `POST   /objects/{id}/start` — processing started
//!   - `POST   /objects/{id}/finish` — processing finished
//!   - `POST   /objects/{id}/retry` — failed attempt, requeue
//!   - `GET    /objects/{id}/metadata` — metadata pairs
//!   - `PUT    /objects/{id}/metadata` — merge metadata pairs

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        object_handlers::{
            delete_object, finish_processing, get_metadata, get_object, list_objects,
            put_metadata, record_retry, register_object, start_processing,
        },
    },
    services::tracker_service::ObjectTracker,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all tracking routes.
///
/// The router carries shared state (`ObjectTracker`) to all handlers.
pub fn routes() -> Router<ObjectTracker> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Collection routes
        .route("/objects", post(register_object).get(list_objects))
        // Object-level routes
        .route("/objects/{id}", get(get_object).delete(delete_object))
        .route("/objects/{id}/start", post(start_processing))
        .route("/objects/{id}/finish", post(finish_processing))
        .route("/objects/{id}/retry", post(record_retry))
        .route(
            "/objects/{id}/metadata",
            get(get_metadata).put(put_metadata),
        )
}
