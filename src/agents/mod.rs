//! Backup and monitoring agent bindings
use serde_json::Map;
use std::fmt;
use tracing::info;

use crate::core::{AutomationConfig, ConfigVersion};
use crate::error::{AutomationError, AutomationResult};

pub const DEFAULT_BACKUP_VERSION: &str = "6.6.2.464";
pub const DEFAULT_MONITORING_VERSION: &str = "6.6.2.464";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Backup,
    Monitoring,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Backup => write!(f, "backup"),
            AgentKind::Monitoring => write!(f, "monitoring"),
        }
    }
}

impl AgentKind {
    fn versions<'a>(&self, out: &'a mut AutomationConfig) -> &'a mut Vec<ConfigVersion> {
        match self {
            AgentKind::Backup => &mut out.backup_versions,
            AgentKind::Monitoring => &mut out.monitoring_versions,
        }
    }
}

pub fn enable_backup(out: &mut AutomationConfig, hostname: &str) -> AutomationResult<()> {
    enable(out, AgentKind::Backup, hostname, DEFAULT_BACKUP_VERSION)
}

pub fn enable_backup_with(
    out: &mut AutomationConfig,
    hostname: &str,
    version: &str,
) -> AutomationResult<()> {
    enable(out, AgentKind::Backup, hostname, version)
}

pub fn disable_backup(out: &mut AutomationConfig, hostname: &str) -> AutomationResult<()> {
    disable(out, AgentKind::Backup, hostname)
}

pub fn enable_monitoring(out: &mut AutomationConfig, hostname: &str) -> AutomationResult<()> {
    enable(out, AgentKind::Monitoring, hostname, DEFAULT_MONITORING_VERSION)
}

pub fn enable_monitoring_with(
    out: &mut AutomationConfig,
    hostname: &str,
    version: &str,
) -> AutomationResult<()> {
    enable(out, AgentKind::Monitoring, hostname, version)
}

pub fn disable_monitoring(out: &mut AutomationConfig, hostname: &str) -> AutomationResult<()> {
    disable(out, AgentKind::Monitoring, hostname)
}

/// Bind an agent to `hostname`; at most one entry per host
pub fn enable(
    out: &mut AutomationConfig,
    agent: AgentKind,
    hostname: &str,
    version: &str,
) -> AutomationResult<()> {
    let versions = agent.versions(out);
    if versions.iter().any(|v| v.hostname == hostname) {
        return Err(AutomationError::AgentAlreadyEnabled {
            agent,
            hostname: hostname.to_string(),
        });
    }
    versions.push(ConfigVersion {
        name: version.to_string(),
        hostname: hostname.to_string(),
        extra: Map::new(),
    });
    info!(%agent, hostname, version, "agent enabled");
    Ok(())
}

pub fn disable(out: &mut AutomationConfig, agent: AgentKind, hostname: &str) -> AutomationResult<()> {
    let versions = agent.versions(out);
    let i = versions
        .iter()
        .position(|v| v.hostname == hostname)
        .ok_or_else(|| AutomationError::AgentNotFound {
            agent,
            hostname: hostname.to_string(),
        })?;
    versions.remove(i);
    info!(%agent, hostname, "agent disabled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_fixtures::replica_set_config;

    #[test]
    fn test_enable_backup() {
        let mut config = replica_set_config();
        enable_backup(&mut config, "host1").unwrap();
        assert_eq!(config.backup_versions.len(), 1);
        assert_eq!(config.backup_versions[0].hostname, "host1");
        assert_eq!(config.backup_versions[0].name, DEFAULT_BACKUP_VERSION);
        assert!(config.monitoring_versions.is_empty());
    }

    #[test]
    fn test_enable_twice_conflicts() {
        let mut config = replica_set_config();
        enable_monitoring(&mut config, "host1").unwrap();
        let err = enable_monitoring_with(&mut config, "host1", "7.0.0.1").unwrap_err();
        assert!(matches!(
            err,
            AutomationError::AgentAlreadyEnabled {
                agent: AgentKind::Monitoring,
                ..
            }
        ));
        assert_eq!(config.monitoring_versions.len(), 1);
    }

    #[test]
    fn test_disable() {
        let mut config = replica_set_config();
        enable_backup(&mut config, "host1").unwrap();
        enable_backup_with(&mut config, "host2", "7.0.0.1").unwrap();

        disable_backup(&mut config, "host1").unwrap();
        assert_eq!(config.backup_versions.len(), 1);
        assert_eq!(config.backup_versions[0].name, "7.0.0.1");

        let err = disable_backup(&mut config, "host1").unwrap_err();
        assert!(matches!(err, AutomationError::AgentNotFound { .. }));
    }

    #[test]
    fn test_monitoring_and_backup_independent() {
        let mut config = replica_set_config();
        enable_backup(&mut config, "host1").unwrap();
        let err = disable_monitoring(&mut config, "host1").unwrap_err();
        assert!(matches!(
            err,
            AutomationError::AgentNotFound {
                agent: AgentKind::Monitoring,
                ..
            }
        ));
        assert_eq!(config.backup_versions.len(), 1);
    }
}
