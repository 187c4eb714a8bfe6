//! Process filter for cluster-wide operations
use std::collections::HashSet;
use tracing::warn;

use crate::error::{AutomationError, AutomationResult};

/// Explicit subset of `host:port` addresses narrowing an operation.
///
/// Keeps the requested addresses apart from the ones confirmed during a run, so
/// the unmatched ones are a set difference once the run ends. An empty selector
/// selects every process.
#[derive(Debug, Clone, Default)]
pub struct ProcessSelector {
    /// Requested addresses in first-seen order, without duplicates
    requested: Vec<String>,
    lookup: HashSet<String>,
    confirmed: HashSet<String>,
}

impl ProcessSelector {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selector = Self::default();
        for address in addresses {
            let address = address.as_ref();
            if selector.lookup.insert(address.to_string()) {
                selector.requested.push(address.to_string());
            }
        }
        selector
    }

    /// Selects every process
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requested.len()
    }

    /// Whether the process at `address` is in scope
    pub fn matches(&self, address: &str) -> bool {
        self.is_empty() || self.lookup.contains(address)
    }

    /// Record that a requested address resolved to a process
    pub fn confirm(&mut self, address: &str) {
        if self.lookup.contains(address) {
            self.confirmed.insert(address.to_string());
        }
    }

    /// Requested addresses never confirmed, in request order
    pub fn unmatched(&self) -> Vec<String> {
        self.requested
            .iter()
            .filter(|a| !self.confirmed.contains(*a))
            .cloned()
            .collect()
    }

    /// `Err(ProcessesNotFound)` if any requested address was never confirmed
    pub fn finish(&self) -> AutomationResult<()> {
        let unmatched = self.unmatched();
        if unmatched.is_empty() {
            return Ok(());
        }
        warn!(processes = ?unmatched, "requested processes not found");
        Err(AutomationError::ProcessesNotFound {
            processes: unmatched,
        })
    }
}
