//! Replica sets, sharded clusters and their removal
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::AutomationConfig;

/// Replica set, addressed by `_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSet {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Back-reference from a replica set to a `Process::name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: i64,
    pub host: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sharded cluster, addressed by `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardingConfig {
    pub name: String,
    /// Config server replica set id
    pub config_server_replica: String,
    #[serde(default)]
    pub shards: Vec<Shard>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shard {
    #[serde(rename = "_id")]
    pub id: String,
    /// Replica set id backing this shard
    pub rs: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReplicaSet {
    pub fn new<I, S>(id: &str, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = hosts
            .into_iter()
            .enumerate()
            .map(|(i, host)| Member {
                id: i as i64,
                host: host.into(),
                extra: Map::new(),
            })
            .collect();
        Self {
            id: id.to_string(),
            members,
            extra: Map::new(),
        }
    }
}

impl ShardingConfig {
    pub fn new<I, S>(name: &str, config_server_replica: &str, shard_replica_sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let shards = shard_replica_sets
            .into_iter()
            .map(|rs| {
                let rs = rs.into();
                Shard {
                    id: rs.clone(),
                    rs,
                    extra: Map::new(),
                }
            })
            .collect();
        Self {
            name: name.to_string(),
            config_server_replica: config_server_replica.to_string(),
            shards,
            extra: Map::new(),
        }
    }
}

/// Remove a replica set or a sharded cluster, and the processes that belonged to it.
///
/// Only the document is edited; nothing is shut down first. For a sharded cluster the
/// shard replica sets, the config server replica set and the attached mongos processes
/// all go. An unknown name leaves the topology untouched.
pub fn remove_by_cluster_name(out: &mut AutomationConfig, name: &str) {
    out.ensure_deployment_auth_mechanisms();
    let removed_rs = remove_replica_set(out, name);
    let removed_sharded = remove_sharded_cluster(out, name);
    if removed_rs || removed_sharded {
        info!(cluster = name, "removed cluster from automation config");
    } else {
        debug!(cluster = name, "no replica set or sharded cluster to remove");
    }
}

fn remove_replica_set(out: &mut AutomationConfig, id: &str) -> bool {
    let Some(i) = out.replica_sets.iter().position(|rs| rs.id == id) else {
        return false;
    };
    let rs = out.replica_sets.remove(i);
    out.processes
        .retain(|p| !rs.members.iter().any(|m| m.host == p.name));
    debug!(replica_set = id, members = rs.members.len(), "removed replica set");
    true
}

fn remove_sharded_cluster(out: &mut AutomationConfig, name: &str) -> bool {
    let Some(i) = out.sharding.iter().position(|s| s.name == name) else {
        return false;
    };
    let sharding = out.sharding.remove(i);
    for shard in &sharding.shards {
        remove_replica_set(out, &shard.rs);
    }
    remove_replica_set(out, &sharding.config_server_replica);
    out.processes.retain(|p| !p.is_router_of(name));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_fixtures::{replica_set_config, sharded_config};

    #[test]
    fn test_remove_replica_set() {
        let mut config = replica_set_config();
        config.processes.push(crate::core::Process::new_mongod(
            "other".to_string(),
            "host9".to_string(),
            27017,
        ));

        remove_by_cluster_name(&mut config, "myReplicaSet");

        assert!(config.replica_sets.is_empty());
        assert_eq!(config.processes.len(), 1);
        assert_eq!(config.processes[0].name, "other");
        assert_eq!(config.auth.deployment_auth_mechanisms, Some(Vec::new()));
    }

    #[test]
    fn test_remove_sharded_cluster() {
        let mut config = sharded_config();
        let mut unrelated = replica_set_config();
        config.replica_sets.append(&mut unrelated.replica_sets);
        config.processes.append(&mut unrelated.processes);

        remove_by_cluster_name(&mut config, "myCluster");

        assert!(config.sharding.is_empty());
        assert_eq!(config.replica_sets.len(), 1);
        assert_eq!(config.replica_sets[0].id, "myReplicaSet");
        assert!(config
            .processes
            .iter()
            .all(|p| p.name.starts_with("myReplicaSet")));
    }

    #[test]
    fn test_remove_unknown_cluster_is_noop() {
        let mut config = sharded_config();
        let before = config.clone();

        remove_by_cluster_name(&mut config, "nope");

        assert_eq!(config.processes, before.processes);
        assert_eq!(config.replica_sets, before.replica_sets);
        assert_eq!(config.sharding, before.sharding);
    }
}
