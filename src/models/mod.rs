//! Core data records for object tracking.
//!
//! Both records are plain data carriers. Each flattens into a
//! `serde_json::Map` for transport to logs, queues, or HTTP responses.

pub mod metadata;
pub mod object;
