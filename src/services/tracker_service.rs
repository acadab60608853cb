//! src/services/tracker_service.rs
//!
//! ObjectTracker — in-memory registry that owns `ObjectInfo` records and
//! applies lifecycle mutations (start, finish, retry) on behalf of the
//! processing pipeline. Records stay passive; all staging rules live here.

use crate::models::{metadata::CustomMetadata, object::ObjectInfo};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("object `{0}` not found")]
    ObjectNotFound(Uuid),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Processing stage, inferred from which fields of a record are populated.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Queued,
    Processing,
    Done,
    Failed,
}

/// Descriptor fields supplied when an object is first registered.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct NewObject {
    pub bucket_name: Option<String>,
    pub object_name: Option<String>,
    pub location: Option<String>,
    pub format: Option<String>,
    pub file_size_kb: i64,
    /// Metadata as a flat map.
    pub custom_metadata: Option<HashMap<String, String>>,
    /// Metadata as key/value pairs, merged over `custom_metadata`.
    pub metadata: Vec<CustomMetadata>,
}

/// Results reported by the pipeline when processing completes.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct FinishProcessing {
    pub file_hash: Option<String>,
    pub download_time: f64,
}

/// Shared handle to the tracked records.
///
/// Cloning is cheap; all clones see the same registry. The lock provides
/// the mutual exclusion the records themselves do not.
#[derive(Clone)]
pub struct ObjectTracker {
    objects: Arc<RwLock<HashMap<Uuid, ObjectInfo>>>,

    /// Retry count beyond which an unfinished object is reported as failed.
    pub max_retries: u32,
}

impl ObjectTracker {
    pub fn new(max_retries: u32) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            max_retries,
        }
    }

    /// Infer the stage of a record.
    ///
    /// A finished record is `Done` regardless of retries, and a running one
    /// (start time without end time) is `Processing` even past the retry
    /// limit. Only an idle record with more than `max_retries` retries is
    /// `Failed`.
    pub fn stage_of(&self, info: &ObjectInfo) -> Stage {
        if info.end_processing_time.is_some() {
            Stage::Done
        } else if info.start_processing_time.is_some() {
            Stage::Processing
        } else if info.num_of_retries > self.max_retries {
            Stage::Failed
        } else {
            Stage::Queued
        }
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &RwLock<HashMap<Uuid, ObjectInfo>> {
        &self.objects
    }

    /// Number of records currently tracked.
    pub async fn count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Construct and store a fresh record for a newly ingested object.
    pub async fn register(&self, new: NewObject) -> ObjectInfo {
        let mut info = ObjectInfo::new().with_file_size_kb(new.file_size_kb);
        info.bucket_name = new.bucket_name;
        info.object_name = new.object_name;
        info.location = new.location;
        info.format = new.format;
        info.custom_metadata = new.custom_metadata;
        if !new.metadata.is_empty() {
            info.custom_metadata
                .get_or_insert_with(HashMap::new)
                .extend(CustomMetadata::collect_map(new.metadata));
        }

        info!(
            id = %info.id,
            bucket = info.bucket_name.as_deref().unwrap_or(""),
            object = info.object_name.as_deref().unwrap_or(""),
            "registered object"
        );

        self.objects.write().await.insert(info.id, info.clone());
        info
    }

    pub async fn get(&self, id: Uuid) -> TrackerResult<ObjectInfo> {
        self.objects
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// List records ordered by `in_time`, optionally restricted to one stage.
    pub async fn list(&self, stage: Option<Stage>) -> Vec<ObjectInfo> {
        let objects = self.objects.read().await;
        let mut listed: Vec<ObjectInfo> = objects
            .values()
            .filter(|info| stage.is_none_or(|s| self.stage_of(info) == s))
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.in_time.cmp(&b.in_time).then(a.id.cmp(&b.id)));
        listed
    }

    pub async fn remove(&self, id: Uuid) -> TrackerResult<ObjectInfo> {
        let removed = self.objects.write().await.remove(&id);
        match removed {
            Some(info) => {
                debug!(id = %id, "removed object");
                Ok(info)
            }
            None => Err(not_found(id)),
        }
    }

    /// Mark processing as started now. Any earlier end time is cleared.
    pub async fn start_processing(&self, id: Uuid) -> TrackerResult<ObjectInfo> {
        self.update(id, |info| {
            info.start_processing_time = Some(Utc::now());
            info.end_processing_time = None;
        })
        .await
        .inspect(|info| info!(id = %id, retries = info.num_of_retries, "processing started"))
    }

    /// Mark processing as finished now and record the pipeline's results.
    pub async fn finish_processing(
        &self,
        id: Uuid,
        result: FinishProcessing,
    ) -> TrackerResult<ObjectInfo> {
        self.update(id, |info| {
            info.end_processing_time = Some(Utc::now());
            info.download_time = result.download_time;
            if result.file_hash.is_some() {
                info.file_hash = result.file_hash;
            }
        })
        .await
        .inspect(|info| {
            info!(
                id = %id,
                download_time = info.download_time,
                "processing finished"
            )
        })
    }

    /// Count a failed attempt and put the object back in the queue.
    pub async fn record_retry(&self, id: Uuid) -> TrackerResult<ObjectInfo> {
        let info = self
            .update(id, |info| {
                info.num_of_retries = info.num_of_retries.saturating_add(1);
                info.start_processing_time = None;
                info.end_processing_time = None;
            })
            .await?;

        if self.stage_of(&info) == Stage::Failed {
            warn!(id = %id, retries = info.num_of_retries, "retry limit exceeded");
        } else {
            debug!(id = %id, retries = info.num_of_retries, "retry recorded");
        }
        Ok(info)
    }

    /// Insert or overwrite metadata entries, creating the map if unset.
    pub async fn merge_metadata(
        &self,
        id: Uuid,
        pairs: Vec<CustomMetadata>,
    ) -> TrackerResult<ObjectInfo> {
        self.update(id, |info| {
            info.custom_metadata
                .get_or_insert_with(HashMap::new)
                .extend(CustomMetadata::collect_map(pairs));
        })
        .await
    }

    async fn update<F>(&self, id: Uuid, apply: F) -> TrackerResult<ObjectInfo>
    where
        F: FnOnce(&mut ObjectInfo),
    {
        let mut objects = self.objects.write().await;
        let info = objects.get_mut(&id).ok_or_else(|| not_found(id))?;
        apply(info);
        Ok(info.clone())
    }
}

fn not_found(id: Uuid) -> TrackerError {
    warn!(id = %id, "object not tracked");
    TrackerError::ObjectNotFound(id)
}
