//! HTTP handlers for tracked-object operations.
//! Every record leaves the service in its flattened form and all state
//! changes are delegated to `ObjectTracker`.

use crate::{
    errors::AppError,
    models::metadata::CustomMetadata,
    services::tracker_service::{FinishProcessing, NewObject, ObjectTracker, Stage},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

type Flattened = Json<Map<String, Value>>;

/// Query params accepted by `GET /objects`.
#[derive(Debug, Deserialize, Default)]
pub struct ListObjectsQuery {
    pub stage: Option<Stage>,
}

/// `POST /objects` — register a newly ingested object.
pub async fn register_object(
    State(tracker): State<ObjectTracker>,
    Json(payload): Json<NewObject>,
) -> impl IntoResponse {
    let info = tracker.register(payload).await;
    (StatusCode::CREATED, Json(info.flatten()))
}

/// `GET /objects` — list tracked objects, supports `?stage=`.
pub async fn list_objects(
    State(tracker): State<ObjectTracker>,
    Query(q): Query<ListObjectsQuery>,
) -> Json<Vec<Map<String, Value>>> {
    let objects = tracker.list(q.stage).await;
    Json(objects.iter().map(|info| info.flatten()).collect())
}

/// `GET /objects/{id}`
pub async fn get_object(
    State(tracker): State<ObjectTracker>,
    Path(id): Path<Uuid>,
) -> Result<Flattened, AppError> {
    let info = tracker.get(id).await?;
    Ok(Json(info.flatten()))
}

/// `DELETE /objects/{id}` — stop tracking an object.
pub async fn delete_object(
    State(tracker): State<ObjectTracker>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracker.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /objects/{id}/start`
pub async fn start_processing(
    State(tracker): State<ObjectTracker>,
    Path(id): Path<Uuid>,
) -> Result<Flattened, AppError> {
    let info = tracker.start_processing(id).await?;
    Ok(Json(info.flatten()))
}

/// `POST /objects/{id}/finish` — body carries `file_hash` and `download_time`.
pub async fn finish_processing(
    State(tracker): State<ObjectTracker>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FinishProcessing>,
) -> Result<Flattened, AppError> {
    let info = tracker.finish_processing(id, payload).await?;
    Ok(Json(info.flatten()))
}

/// `POST /objects/{id}/retry`
pub async fn record_retry(
    State(tracker): State<ObjectTracker>,
    Path(id): Path<Uuid>,
) -> Result<Flattened, AppError> {
    let info = tracker.record_retry(id).await?;
    Ok(Json(info.flatten()))
}

/// `PUT /objects/{id}/metadata` — merge a list of `{key, value}` pairs.
pub async fn put_metadata(
    State(tracker): State<ObjectTracker>,
    Path(id): Path<Uuid>,
    Json(pairs): Json<Vec<CustomMetadata>>,
) -> Result<Flattened, AppError> {
    let info = tracker.merge_metadata(id, pairs).await?;
    Ok(Json(info.flatten()))
}

/// `GET /objects/{id}/metadata` — metadata as a list of flattened pairs.
pub async fn get_metadata(
    State(tracker): State<ObjectTracker>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Map<String, Value>>>, AppError> {
    let info = tracker.get(id).await?;
    let pairs = info
        .custom_metadata
        .as_ref()
        .map(CustomMetadata::from_map)
        .unwrap_or_default();
    Ok(Json(pairs.iter().map(CustomMetadata::flatten).collect()))
}
