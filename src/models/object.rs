//! Represents the transfer/processing descriptor of one tracked object.

use crate::models::metadata::CustomMetadata;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Tracks one object (file) from ingestion through processing.
///
/// The record is passive: every field is public and may be set at any time,
/// in any order. Stage transitions are applied by `ObjectTracker`, never here.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectInfo {
    /// Unique identifier, generated per instance.
    ///
    /// Held as a `Uuid` and flattened to its hyphenated string, so callers
    /// overriding it must supply a UUID rather than an arbitrary string.
    pub id: Uuid,

    /// Logical storage container name.
    pub bucket_name: Option<String>,

    /// Logical object name within the bucket.
    pub object_name: Option<String>,

    /// Resolved physical location or URI.
    pub location: Option<String>,

    /// Content format tag (file extension or MIME type).
    pub format: Option<String>,

    /// Size in kilobytes.
    pub file_size_kb: i64,

    /// When this record was constructed.
    pub in_time: DateTime<Utc>,

    pub start_processing_time: Option<DateTime<Utc>>,

    pub end_processing_time: Option<DateTime<Utc>>,

    /// Download duration in seconds.
    pub download_time: f64,

    /// Content hash, set by the processing pipeline.
    pub file_hash: Option<String>,

    pub num_of_retries: u32,

    /// User-defined metadata as a flat key/value map.
    pub custom_metadata: Option<HashMap<String, String>>,
}

impl ObjectInfo {
    /// Create a record with a fresh id and `in_time` captured now.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            bucket_name: None,
            object_name: None,
            location: None,
            format: None,
            file_size_kb: 0,
            in_time: Utc::now(),
            start_processing_time: None,
            end_processing_time: None,
            download_time: 0.0,
            file_hash: None,
            num_of_retries: 0,
            custom_metadata: None,
        }
    }

    pub fn with_file_size_kb(mut self, file_size_kb: i64) -> Self {
        self.file_size_kb = file_size_kb;
        self
    }

    /// Flatten into a string-keyed mapping, one entry per field.
    ///
    /// Timestamps are rendered as RFC 3339 strings in UTC. An unset
    /// `custom_metadata` is emitted as an empty object, never null.
    pub fn flatten(&self) -> Map<String, Value> {
        let custom_metadata: Map<String, Value> = self
            .custom_metadata
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let mut map = Map::with_capacity(13);
        map.insert("id".into(), Value::String(self.id.to_string()));
        map.insert("bucket_name".into(), opt_string(&self.bucket_name));
        map.insert("object_name".into(), opt_string(&self.object_name));
        map.insert("location".into(), opt_string(&self.location));
        map.insert("format".into(), opt_string(&self.format));
        map.insert("file_size_kb".into(), Value::from(self.file_size_kb));
        map.insert("in_time".into(), Value::String(timestamp(&self.in_time)));
        map.insert(
            "start_processing_time".into(),
            opt_timestamp(&self.start_processing_time),
        );
        map.insert(
            "end_processing_time".into(),
            opt_timestamp(&self.end_processing_time),
        );
        // Non-finite durations have no JSON form and come out as null.
        map.insert("download_time".into(), Value::from(self.download_time));
        map.insert("file_hash".into(), opt_string(&self.file_hash));
        map.insert("num_of_retries".into(), Value::from(self.num_of_retries));
        map.insert("custom_metadata".into(), Value::Object(custom_metadata));
        map
    }
}

/// Setters for callers assembling records by hand.
#[cfg_attr(not(test), allow(dead_code))]
impl ObjectInfo {
    pub fn with_bucket_name(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    pub fn with_object_name(mut self, object_name: impl Into<String>) -> Self {
        self.object_name = Some(object_name.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the metadata map directly.
    pub fn with_custom_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.custom_metadata = Some(metadata);
        self
    }

    /// Sets the metadata map from key/value pairs. Later duplicates win.
    pub fn with_metadata_pairs<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = CustomMetadata>,
    {
        self.custom_metadata = Some(CustomMetadata::collect_map(pairs));
        self
    }
}

impl Default for ObjectInfo {
    fn default() -> Self {
        Self::new()
    }
}

fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn opt_timestamp(ts: &Option<DateTime<Utc>>) -> Value {
    ts.as_ref()
        .map(|t| Value::String(timestamp(t)))
        .unwrap_or(Value::Null)
}

fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::{collections::HashSet, thread, time::Duration};

    const FIELDS: [&str; 13] = [
        "id",
        "bucket_name",
        "object_name",
        "location",
        "format",
        "file_size_kb",
        "in_time",
        "start_processing_time",
        "end_processing_time",
        "download_time",
        "file_hash",
        "num_of_retries",
        "custom_metadata",
    ];

    #[test]
    fn defaults_are_zero_and_null() {
        let info = ObjectInfo::new();
        assert_eq!(info.file_size_kb, 0);
        assert_eq!(info.download_time, 0.0);
        assert_eq!(info.num_of_retries, 0);
        assert!(info.custom_metadata.is_none());

        let map = info.flatten();
        for key in [
            "bucket_name",
            "object_name",
            "location",
            "format",
            "start_processing_time",
            "end_processing_time",
            "file_hash",
        ] {
            assert_eq!(map[key], Value::Null, "{key} should be null");
        }
        assert_eq!(map["file_size_kb"], json!(0));
        assert_eq!(map["download_time"], json!(0.0));
        assert_eq!(map["num_of_retries"], json!(0));
    }

    #[test]
    fn flatten_emits_every_field() {
        let map = ObjectInfo::new().flatten();
        assert_eq!(map.len(), FIELDS.len());
        for key in FIELDS {
            assert!(map.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn unset_custom_metadata_flattens_to_empty_object() {
        let info = ObjectInfo::new();
        assert_eq!(info.flatten()["custom_metadata"], json!({}));
        // normalization happens at flatten time only
        assert!(info.custom_metadata.is_none());
    }

    #[test]
    fn set_custom_metadata_is_emitted() {
        let info = ObjectInfo::new().with_custom_metadata(HashMap::from([
            ("team".to_string(), "ingest".to_string()),
            ("tier".to_string(), "gold".to_string()),
        ]));

        assert_eq!(
            info.flatten()["custom_metadata"],
            json!({"team": "ingest", "tier": "gold"})
        );
    }

    #[test]
    fn metadata_pairs_build_the_map() {
        let info = ObjectInfo::new().with_metadata_pairs(vec![
            CustomMetadata::new("origin", "sftp"),
            ("origin", "s3").into(),
        ]);

        assert_eq!(info.flatten()["custom_metadata"], json!({"origin": "s3"}));
    }

    #[test]
    fn ids_are_unique_per_instance() {
        let ids: HashSet<Uuid> = (0..1000).map(|_| ObjectInfo::new().id).collect();
        assert_eq!(ids.len(), 1000);

        let a = ObjectInfo::default();
        let b = ObjectInfo::default();
        assert_ne!(a.flatten()["id"], b.flatten()["id"]);
    }

    #[test]
    fn in_time_is_captured_per_construction() {
        let first = ObjectInfo::new();
        thread::sleep(Duration::from_millis(5));
        let second = ObjectInfo::new();

        assert!(second.in_time > first.in_time);
        assert_ne!(first.flatten()["in_time"], second.flatten()["in_time"]);
    }

    #[test]
    fn metadata_maps_are_not_shared() {
        let mut a = ObjectInfo::new().with_custom_metadata(HashMap::new());
        let b = a.clone();

        if let Some(meta) = a.custom_metadata.as_mut() {
            meta.insert("k".into(), "v".into());
        }

        assert_eq!(b.flatten()["custom_metadata"], json!({}));
        assert_eq!(a.flatten()["custom_metadata"], json!({"k": "v"}));
    }

    #[test]
    fn flatten_is_idempotent_and_pure() {
        let info = ObjectInfo::new()
            .with_bucket_name("raw")
            .with_metadata_pairs(vec![CustomMetadata::new("a", "b")]);
        let before = info.clone();

        assert_eq!(info.flatten(), info.flatten());
        assert_eq!(info, before);
    }

    #[test]
    fn timestamps_render_as_rfc3339() {
        let mut info = ObjectInfo::new();
        info.start_processing_time = Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap());

        let map = info.flatten();
        assert_eq!(
            map["start_processing_time"],
            json!("2024-05-01T08:30:00.000000Z")
        );
        let in_time = map["in_time"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(in_time).is_ok());
    }

    #[test]
    fn end_before_start_is_accepted() {
        let mut info = ObjectInfo::new();
        let now = Utc::now();
        info.end_processing_time = Some(now);
        info.start_processing_time = Some(now + chrono::Duration::seconds(10));

        let map = info.flatten();
        assert!(map["end_processing_time"].is_string());
        assert!(map["start_processing_time"].is_string());
    }

    #[test]
    fn populated_record_flattens_expected_values() {
        let mut info = ObjectInfo::new()
            .with_bucket_name("raw")
            .with_object_name("a.csv")
            .with_file_size_kb(120);

        let map = info.flatten();
        assert_eq!(map["bucket_name"], json!("raw"));
        assert_eq!(map["object_name"], json!("a.csv"));
        assert_eq!(map["file_size_kb"], json!(120));
        assert_eq!(map["custom_metadata"], json!({}));
        assert!(map["id"].is_string());
        assert!(map["in_time"].is_string());

        info.location = Some("s3://raw/a.csv".into());
        info.format = Some("csv".into());
        info.download_time = 1.5;
        info.file_hash = Some("9e107d9d372bb6826bd81d3542a419d6".into());
        info.num_of_retries = 2;

        let map = info.flatten();
        assert_eq!(map["location"], json!("s3://raw/a.csv"));
        assert_eq!(map["format"], json!("csv"));
        assert_eq!(map["download_time"], json!(1.5));
        assert_eq!(map["file_hash"], json!("9e107d9d372bb6826bd81d3542a419d6"));
        assert_eq!(map["num_of_retries"], json!(2));
    }

    #[test]
    fn caller_supplied_id_flattens_as_hyphenated_string() {
        let mut info = ObjectInfo::new();
        info.id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();

        assert_eq!(
            info.flatten()["id"],
            json!("67e55044-10b1-426f-9247-bb680e5fe0c8")
        );
    }
}
