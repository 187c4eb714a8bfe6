//! Cascading apply of a per-process effect over a named cluster
use std::fmt;
use tracing::{debug, warn};

use super::selector::ProcessSelector;
use crate::core::{AutomationConfig, Process, ReplicaSet, ShardingConfig};
use crate::error::AutomationResult;

/// Timestamp fields stamped by lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    LastRestart,
    LastResync,
    LastCompact,
}

impl TimestampField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampField::LastRestart => "lastRestart",
            TimestampField::LastResync => "lastResync",
            TimestampField::LastCompact => "lastCompact",
        }
    }
}

/// Side effect applied to every process in scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Disabled(bool),
    ManualMode(bool),
    Stamp { field: TimestampField, value: String },
}

impl Effect {
    /// Whether mongos processes of a sharded cluster are in scope
    pub fn reaches_routers(&self) -> bool {
        match self {
            Effect::Disabled(_) | Effect::ManualMode(_) => true,
            Effect::Stamp { field, .. } => *field == TimestampField::LastRestart,
        }
    }

    pub fn apply_to(&self, process: &mut Process) {
        match self {
            Effect::Disabled(disabled) => process.disabled = *disabled,
            Effect::ManualMode(manual) => process.manual_mode = *manual,
            Effect::Stamp { field, value } => {
                let slot = match field {
                    TimestampField::LastRestart => &mut process.last_restart,
                    TimestampField::LastResync => &mut process.last_resync,
                    TimestampField::LastCompact => &mut process.last_compact,
                };
                *slot = Some(value.clone());
            }
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Disabled(v) => write!(f, "disabled={}", v),
            Effect::ManualMode(v) => write!(f, "manualMode={}", v),
            Effect::Stamp { field, value } => write!(f, "{}={}", field.as_str(), value),
        }
    }
}

/// Apply `effect` to the cluster called `cluster_name`.
///
/// The name is tried as a replica set id first, then as a sharded cluster name.
/// A sharded cluster covers its shards, its config server replica set and, when
/// the effect reaches routers, its mongos processes. With a non-empty `selector`
/// only processes whose `host:port` it names are touched; names it never matched
/// fail the call after the cascade, without undoing the processes already changed.
/// A name matching no cluster is a no-op. A name that is both a replica set id and
/// the name of an unrelated sharded cluster applies to both, replica set first.
///
/// Returns the number of processes the effect was applied to.
pub fn apply(
    out: &mut AutomationConfig,
    cluster_name: &str,
    effect: &Effect,
    selector: &mut ProcessSelector,
) -> AutomationResult<usize> {
    out.ensure_deployment_auth_mechanisms();

    let AutomationConfig {
        processes,
        replica_sets,
        sharding,
        ..
    } = out;
    let mut cascade = Cascade {
        processes,
        replica_sets,
        sharding,
        effect,
        selector: &mut *selector,
        applied: 0,
    };

    let found = cascade.replica_set(cluster_name) | cascade.sharded_cluster(cluster_name);
    if !found {
        warn!(cluster = cluster_name, "no replica set or sharded cluster with this name");
    }

    let applied = cascade.applied;
    selector.finish()?;
    Ok(applied)
}

struct Cascade<'a> {
    processes: &'a mut [Process],
    replica_sets: &'a [ReplicaSet],
    sharding: &'a [ShardingConfig],
    effect: &'a Effect,
    selector: &'a mut ProcessSelector,
    applied: usize,
}

impl<'a> Cascade<'a> {
    fn replica_set(&mut self, id: &str) -> bool {
        let replica_sets = self.replica_sets;
        let Some(rs) = replica_sets.iter().find(|rs| rs.id == id) else {
            return false;
        };
        for member in &rs.members {
            // members without a process are orphans and skipped
            if let Some(process) = self.processes.iter_mut().find(|p| p.name == member.host) {
                if touch(self.effect, self.selector, process) {
                    self.applied += 1;
                }
            }
        }
        true
    }

    fn sharded_cluster(&mut self, name: &str) -> bool {
        let sharding = self.sharding;
        let Some(cluster) = sharding.iter().find(|s| s.name == name) else {
            return false;
        };
        for shard in &cluster.shards {
            self.replica_set(&shard.rs);
        }
        self.replica_set(&cluster.config_server_replica);

        if self.effect.reaches_routers() {
            for process in self.processes.iter_mut().filter(|p| p.is_router_of(name)) {
                if touch(self.effect, self.selector, process) {
                    self.applied += 1;
                }
            }
        }
        true
    }
}

fn touch(effect: &Effect, selector: &mut ProcessSelector, process: &mut Process) -> bool {
    let address = process.address();
    if !selector.matches(&address) {
        return false;
    }
    selector.confirm(&address);
    effect.apply_to(process);
    debug!(process = %process.name, %address, %effect, "applied effect");
    true
}
