//! mongoconf - in-memory editor for MongoDB automation configuration documents
//!
//! An automation agent polls the document and converges the deployment to it.
//! This crate produces the next consistent document state for:
//! 1. Lifecycle commands on a replica set or sharded cluster (shutdown, startup,
//!    restart, initial sync, reclaim free space, suspend, resume), optionally
//!    narrowed to explicit `host:port` processes
//! 2. Authentication commands (enable mechanisms, add/remove users, SCRAM credentials)
//! 3. Backup/monitoring agent bindings, index registration and cluster removal
//!
//! All operations are synchronous and take the document by exclusive reference.
//! Callers serialize access to a given document.
pub mod agents;
pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod lifecycle;
pub mod utils;

pub use crate::core::AutomationConfig;
pub use crate::error::{AutomationError, AutomationResult, ErrorKind};
pub use crate::lifecycle::{Action, ProcessSelector, ALL_PROCESSES};
