//! User-defined key/value metadata attached to tracked objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single key/value metadata entry.
///
/// Keys are not required to be unique; when several pairs share a key and are
/// folded into an object's metadata map, the last one wins.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CustomMetadata {
    /// Metadata key (e.g. "source-system").
    pub key: String,

    /// Metadata value as plain text.
    pub value: String,
}

impl CustomMetadata {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Flatten into a mapping with exactly the `key` and `value` entries.
    pub fn flatten(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(2);
        map.insert("key".into(), Value::String(self.key.clone()));
        map.insert("value".into(), Value::String(self.value.clone()));
        map
    }

    /// Fold a collection of pairs into the flat map stored on `ObjectInfo`.
    pub fn collect_map<I>(pairs: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = CustomMetadata>,
    {
        pairs.into_iter().map(|m| (m.key, m.value)).collect()
    }

    /// Expand a flat metadata map back into pairs, sorted by key.
    pub fn from_map(map: &HashMap<String, String>) -> Vec<CustomMetadata> {
        let mut pairs: Vec<_> = map
            .iter()
            .map(|(k, v)| CustomMetadata::new(k.clone(), v.clone()))
            .collect();
        pairs.sort_by(|a, b| a.key.cmp(&b.key));
        pairs
    }
}

impl<K, V> From<(K, V)> for CustomMetadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}
