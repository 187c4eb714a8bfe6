//! mongod / mongos process entries
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of server process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    Mongod,
    Mongos,
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessType::Mongod => write!(f, "mongod"),
            ProcessType::Mongos => write!(f, "mongos"),
        }
    }
}

/// One process of the deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// Unique key, referenced by `Member::host`
    pub name: String,
    pub process_type: ProcessType,
    pub hostname: String,
    /// Owning sharded cluster, only meaningful for mongos
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub manual_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_restart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_resync: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_compact: Option<String>,
    #[serde(rename = "args2_6", default)]
    pub args: ProcessArgs,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Startup options; only the port is modelled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessArgs {
    #[serde(default)]
    pub net: Net,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_port() -> u16 {
    27017
}

impl Default for Net {
    fn default() -> Self {
        Self {
            port: default_port(),
            extra: Map::new(),
        }
    }
}

impl Process {
    pub fn new_mongod(name: String, hostname: String, port: u16) -> Self {
        Self::new(name, ProcessType::Mongod, hostname, port, None)
    }

    pub fn new_mongos(name: String, hostname: String, port: u16, cluster: String) -> Self {
        Self::new(name, ProcessType::Mongos, hostname, port, Some(cluster))
    }

    fn new(
        name: String,
        process_type: ProcessType,
        hostname: String,
        port: u16,
        cluster: Option<String>,
    ) -> Self {
        Self {
            name,
            process_type,
            hostname,
            cluster,
            disabled: false,
            manual_mode: false,
            last_restart: None,
            last_resync: None,
            last_compact: None,
            args: ProcessArgs {
                net: Net {
                    port,
                    extra: Map::new(),
                },
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    pub fn port(&self) -> u16 {
        self.args.net.port
    }

    /// `hostname:port`, the form process filters are written in
    pub fn address(&self) -> String {
        crate::utils::host_port(&self.hostname, self.port())
    }

    /// Whether this is a router attached to the named sharded cluster
    pub fn is_router_of(&self, cluster_name: &str) -> bool {
        self.cluster.as_deref() == Some(cluster_name)
    }
}
