//! Index definitions the agent builds on replica sets
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::AutomationConfig;
use crate::error::{AutomationError, AutomationResult};

/// One `[field, direction]` pair; direction is `1`, `-1` or a named type such as `"text"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexKey(pub String, pub Value);

impl IndexKey {
    pub fn new<V: Into<Value>>(field: &str, direction: V) -> Self {
        IndexKey(field.to_string(), direction.into())
    }

    pub fn field(&self) -> &str {
        &self.0
    }

    pub fn direction(&self) -> &Value {
        &self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    /// Ordered; `[["a", 1], ["b", 1]]` differs from `[["b", 1], ["a", 1]]`
    pub key: Vec<IndexKey>,
    pub rs_name: String,
    pub db_name: String,
    pub collection_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IndexConfig {
    pub fn new(db_name: &str, collection_name: &str, rs_name: &str, key: Vec<IndexKey>) -> Self {
        Self {
            key,
            rs_name: rs_name.to_string(),
            db_name: db_name.to_string(),
            collection_name: collection_name.to_string(),
            options: None,
            collation: None,
            extra: Map::new(),
        }
    }

    /// Same database, collection, replica set and key list, field by field in order
    pub fn is_same_index(&self, other: &IndexConfig) -> bool {
        self.db_name == other.db_name
            && self.collection_name == other.collection_name
            && self.rs_name == other.rs_name
            && self.key.len() == other.key.len()
            && self
                .key
                .iter()
                .zip(&other.key)
                .all(|(a, b)| a.field() == b.field() && a.direction() == b.direction())
    }
}

/// Register an index unless an identical one exists
pub fn add_index_config(
    out: Option<&mut AutomationConfig>,
    index: IndexConfig,
) -> AutomationResult<()> {
    let out = out.ok_or(AutomationError::NotInitialized)?;

    if out.index_configs.iter().any(|existing| existing.is_same_index(&index)) {
        return Err(AutomationError::IndexAlreadyExists {
            database: index.db_name,
            collection: index.collection_name,
            rs_name: index.rs_name,
        });
    }

    info!(
        db = %index.db_name,
        collection = %index.collection_name,
        rs = %index.rs_name,
        "adding index config"
    );
    out.index_configs.push(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_fixtures::replica_set_config;

    fn test_index(keys: &[(&str, i32)]) -> IndexConfig {
        let key = keys.iter().map(|(f, d)| IndexKey::new(f, *d)).collect();
        IndexConfig::new("test", "users", "myReplicaSet", key)
    }

    #[test]
    fn test_add_index_config() {
        let mut config = replica_set_config();
        add_index_config(Some(&mut config), test_index(&[("email", 1)])).unwrap();
        assert_eq!(config.index_configs.len(), 1);
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let mut config = replica_set_config();
        add_index_config(Some(&mut config), test_index(&[("a", 1), ("b", -1)])).unwrap();

        let err = add_index_config(Some(&mut config), test_index(&[("a", 1), ("b", -1)]))
            .unwrap_err();

        assert!(matches!(err, AutomationError::IndexAlreadyExists { .. }));
        assert_eq!(config.index_configs.len(), 1);
    }

    #[test]
    fn test_key_order_and_direction_matter() {
        let mut config = replica_set_config();
        add_index_config(Some(&mut config), test_index(&[("a", 1), ("b", 1)])).unwrap();
        add_index_config(Some(&mut config), test_index(&[("b", 1), ("a", 1)])).unwrap();
        add_index_config(Some(&mut config), test_index(&[("a", 1), ("b", -1)])).unwrap();
        add_index_config(Some(&mut config), test_index(&[("a", 1)])).unwrap();
        assert_eq!(config.index_configs.len(), 4);
    }

    #[test]
    fn test_other_collection_is_distinct() {
        let mut config = replica_set_config();
        add_index_config(Some(&mut config), test_index(&[("a", 1)])).unwrap();

        let mut other = test_index(&[("a", 1)]);
        other.collection_name = "orders".to_string();
        add_index_config(Some(&mut config), other).unwrap();
        assert_eq!(config.index_configs.len(), 2);
    }

    #[test]
    fn test_uninitialized_document() {
        let err = add_index_config(None, test_index(&[("a", 1)])).unwrap_err();
        assert!(matches!(err, AutomationError::NotInitialized));
    }

    #[test]
    fn test_index_key_wire_form() {
        let index = IndexConfig::new("test", "docs", "rs0", vec![IndexKey::new("body", "text")]);
        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value["key"], serde_json::json!([["body", "text"]]));
        assert_eq!(value["rsName"], "rs0");
        assert_eq!(value["collectionName"], "docs");
    }
}
