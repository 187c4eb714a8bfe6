//! Lifecycle operations on clusters
//!
//! Every operation resolves a cluster name through [`engine::apply`] and changes
//! one field on each process in scope:
//! - shutdown / startup: `disabled`
//! - suspend / resume: `manualMode`
//! - restart: `lastRestart`
//! - start initial sync: `lastResync` (mongos untouched)
//! - reclaim free space: `lastCompact` (mongos untouched)
pub mod engine;
pub mod selector;

pub use engine::{Effect, TimestampField};
pub use selector::ProcessSelector;

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::info;

use crate::core::AutomationConfig;
use crate::error::AutomationResult;
use crate::utils;

/// Filter selecting every process of the cluster
pub const ALL_PROCESSES: &[&str] = &[];

/// Lifecycle command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shutdown,
    Startup,
    Restart,
    StartInitialSync,
    ReclaimFreeSpace,
    Suspend,
    Resume,
}

impl Action {
    /// The per-process effect, stamping `at` (or now) for timestamp actions
    pub fn effect(&self, at: Option<DateTime<Utc>>) -> Effect {
        let stamp = |field| Effect::Stamp {
            field,
            value: utils::timestamp(at),
        };
        match self {
            Action::Shutdown => Effect::Disabled(true),
            Action::Startup => Effect::Disabled(false),
            Action::Suspend => Effect::ManualMode(true),
            Action::Resume => Effect::ManualMode(false),
            Action::Restart => stamp(TimestampField::LastRestart),
            Action::StartInitialSync => stamp(TimestampField::LastResync),
            Action::ReclaimFreeSpace => stamp(TimestampField::LastCompact),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Shutdown => "shutdown",
            Action::Startup => "startup",
            Action::Restart => "restart",
            Action::StartInitialSync => "start initial sync",
            Action::ReclaimFreeSpace => "reclaim free space",
            Action::Suspend => "suspend",
            Action::Resume => "resume",
        };
        f.write_str(name)
    }
}

/// Run `action` on a cluster, narrowed to `processes` (`host:port`) when non-empty
pub fn run<S: AsRef<str>>(
    out: &mut AutomationConfig,
    action: Action,
    cluster_name: &str,
    processes: &[S],
    at: Option<DateTime<Utc>>,
) -> AutomationResult<()> {
    let effect = action.effect(at);
    let mut selector = ProcessSelector::new(processes);
    let applied = engine::apply(out, cluster_name, &effect, &mut selector)?;
    info!(
        action = %action,
        cluster = cluster_name,
        processes = applied,
        "lifecycle operation applied"
    );
    Ok(())
}

pub fn shutdown<S: AsRef<str>>(
    out: &mut AutomationConfig,
    cluster_name: &str,
    processes: &[S],
) -> AutomationResult<()> {
    run(out, Action::Shutdown, cluster_name, processes, None)
}

pub fn startup<S: AsRef<str>>(
    out: &mut AutomationConfig,
    cluster_name: &str,
    processes: &[S],
) -> AutomationResult<()> {
    run(out, Action::Startup, cluster_name, processes, None)
}

pub fn restart<S: AsRef<str>>(
    out: &mut AutomationConfig,
    cluster_name: &str,
    processes: &[S],
    at: Option<DateTime<Utc>>,
) -> AutomationResult<()> {
    run(out, Action::Restart, cluster_name, processes, at)
}

pub fn start_initial_sync<S: AsRef<str>>(
    out: &mut AutomationConfig,
    cluster_name: &str,
    processes: &[S],
    at: Option<DateTime<Utc>>,
) -> AutomationResult<()> {
    run(out, Action::StartInitialSync, cluster_name, processes, at)
}

pub fn reclaim_free_space<S: AsRef<str>>(
    out: &mut AutomationConfig,
    cluster_name: &str,
    processes: &[S],
    at: Option<DateTime<Utc>>,
) -> AutomationResult<()> {
    run(out, Action::ReclaimFreeSpace, cluster_name, processes, at)
}

/// Put processes in manual mode so the agent stops converging them
pub fn suspend<S: AsRef<str>>(
    out: &mut AutomationConfig,
    cluster_name: &str,
    processes: &[S],
) -> AutomationResult<()> {
    run(out, Action::Suspend, cluster_name, processes, None)
}

pub fn resume<S: AsRef<str>>(
    out: &mut AutomationConfig,
    cluster_name: &str,
    processes: &[S],
) -> AutomationResult<()> {
    run(out, Action::Resume, cluster_name, processes, None)
}
