//! Automation configuration document model
//!
//! The structs follow the JSON wire form consumed by the automation agent.
//! Only the fields the operations touch are typed; everything else is kept in
//! flattened `extra` maps so unmodelled settings survive a load/save cycle.
pub mod auth;
pub mod index;
pub mod process;
pub mod topology;

pub use auth::{Auth, MongoDBUser, Role, ScramShaCreds};
pub use index::{add_index_config, IndexConfig, IndexKey};
pub use process::{Net, Process, ProcessArgs, ProcessType};
pub use topology::{remove_by_cluster_name, Member, ReplicaSet, Shard, ShardingConfig};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AutomationResult;

/// Root of the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationConfig {
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub processes: Vec<Process>,
    #[serde(default)]
    pub replica_sets: Vec<ReplicaSet>,
    #[serde(default)]
    pub sharding: Vec<ShardingConfig>,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub monitoring_versions: Vec<ConfigVersion>,
    #[serde(default)]
    pub backup_versions: Vec<ConfigVersion>,
    #[serde(default)]
    pub index_configs: Vec<IndexConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Agent version bound to a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigVersion {
    pub name: String,
    pub hostname: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AutomationConfig {
    pub fn from_json(json: &str) -> AutomationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> AutomationResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> AutomationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `deploymentAuthMechanisms` must be present, even if empty
    pub fn ensure_deployment_auth_mechanisms(&mut self) {
        self.auth.deployment_auth_mechanisms.get_or_insert_with(Vec::new);
    }

    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.name == name)
    }

    pub fn replica_set(&self, id: &str) -> Option<&ReplicaSet> {
        self.replica_sets.iter().find(|rs| rs.id == id)
    }

    pub fn sharded_cluster(&self, name: &str) -> Option<&ShardingConfig> {
        self.sharding.iter().find(|s| s.name == name)
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::sharded_config;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_round_trip_keeps_unknown_fields() {
        let json = r#"{
            "version": 7,
            "options": {"downloadBase": "/var/lib/mongodb-mms-automation"},
            "processes": [{
                "name": "rs0_0", "processType": "mongod", "hostname": "db0",
                "args2_6": {"net": {"port": 27017}, "storage": {"dbPath": "/data/rs0_0"}},
                "logRotate": {"sizeThresholdMB": 1000}
            }],
            "replicaSets": [{"_id": "rs0", "protocolVersion": "1",
                "members": [{"_id": 0, "host": "rs0_0", "priority": 1, "votes": 1}]}],
            "sharding": [],
            "auth": {"disabled": true, "autoAuthMechanisms": [], "usersWanted": [], "usersDeleted": []},
            "monitoringVersions": [{"name": "6.6.2.464", "hostname": "db0", "baseUrl": null}],
            "backupVersions": [],
            "indexConfigs": []
        }"#;

        let config = AutomationConfig::from_json(json).unwrap();
        assert_eq!(config.version, 7);
        assert_eq!(config.processes[0].address(), "db0:27017");
        assert_eq!(config.replica_set("rs0").unwrap().members[0].host, "rs0_0");

        let reparsed: Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(reparsed["options"], original["options"]);
        assert_eq!(reparsed["processes"][0]["logRotate"], original["processes"][0]["logRotate"]);
        assert_eq!(
            reparsed["processes"][0]["args2_6"]["storage"],
            original["processes"][0]["args2_6"]["storage"]
        );
        assert_eq!(reparsed["replicaSets"][0]["members"][0]["votes"], 1);
        assert_eq!(reparsed["monitoringVersions"][0]["baseUrl"], Value::Null);
    }

    #[test]
    fn test_ensure_deployment_auth_mechanisms() {
        let mut config = AutomationConfig::default();
        assert!(config.auth.deployment_auth_mechanisms.is_none());

        config.ensure_deployment_auth_mechanisms();
        assert_eq!(config.auth.deployment_auth_mechanisms, Some(Vec::new()));

        config.auth.deployment_auth_mechanisms = Some(vec!["SCRAM-SHA-256".to_string()]);
        config.ensure_deployment_auth_mechanisms();
        assert_eq!(
            config.auth.deployment_auth_mechanisms,
            Some(vec!["SCRAM-SHA-256".to_string()])
        );
    }

    #[test]
    fn test_lookups() {
        let config = sharded_config();
        assert!(config.sharded_cluster("myCluster").is_some());
        assert!(config.sharded_cluster("myShard_0").is_none());
        assert!(config.replica_set("configRS").is_some());
        assert_eq!(config.process("myCluster_mongos_1").unwrap().port(), 27031);
    }
}
