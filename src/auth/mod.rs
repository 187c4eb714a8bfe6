//! Authentication management for automation documents
//!
//! Turns on deployment-wide authentication, bootstraps the automation agent's
//! own identity, and maintains the wanted-user list. Credential derivation
//! lives in [`scram`].
pub mod scram;

use tracing::{debug, info};

use crate::core::{AutomationConfig, MongoDBUser};
use crate::error::{AutomationError, AutomationResult};
use crate::utils::random::{random_alphanumeric, random_base64};

pub use scram::{derive_credentials, derive_credentials_with_salt, ScramMechanism};

pub const MONGODB_CR: &str = "MONGODB-CR";
pub const SCRAM_SHA_256: &str = "SCRAM-SHA-256";

pub const DEFAULT_KEYFILE: &str = "/var/lib/mongodb-mms-automation/keyfile";
pub const DEFAULT_KEYFILE_WINDOWS: &str = "%SystemDrive%\\MMSAutomation\\versions\\keyfile";

const AGENT_USERNAME_LENGTH: usize = 10;
const AGENT_PASSWORD_LENGTH: usize = 22;
/// 375 random bytes encode to a 500 character key
const KEY_BYTES: usize = 375;

/// Keyfile locations used when the document has none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefaults {
    pub keyfile: String,
    pub keyfile_windows: String,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            keyfile: DEFAULT_KEYFILE.to_string(),
            keyfile_windows: DEFAULT_KEYFILE_WINDOWS.to_string(),
        }
    }
}

/// Enable authentication with the given mechanisms.
///
/// Mechanisms are applied in order. The first unsupported one returns
/// [`AutomationError::UnsupportedMechanism`]; the ones before it stay applied and
/// no agent identity is generated. Each mechanism is added once to both the
/// deployment and the agent mechanism lists. SCRAM-SHA-256 becomes the agent's
/// mechanism unless one is already set.
pub fn enable_mechanism<S: AsRef<str>>(
    out: &mut AutomationConfig,
    mechanisms: &[S],
) -> AutomationResult<()> {
    enable_mechanism_with(out, mechanisms, &AgentDefaults::default())
}

/// Same as [`enable_mechanism`] with explicit keyfile defaults
pub fn enable_mechanism_with<S: AsRef<str>>(
    out: &mut AutomationConfig,
    mechanisms: &[S],
    defaults: &AgentDefaults,
) -> AutomationResult<()> {
    out.auth.disabled = false;

    for mechanism in mechanisms {
        let mechanism = mechanism.as_ref();
        if mechanism != MONGODB_CR && mechanism != SCRAM_SHA_256 {
            return Err(AutomationError::unsupported_mechanism(mechanism));
        }

        if mechanism == SCRAM_SHA_256 && out.auth.auto_auth_mechanism.is_empty() {
            out.auth.auto_auth_mechanism = mechanism.to_string();
        }

        let deployment = out.auth.deployment_auth_mechanisms.get_or_insert_with(Vec::new);
        push_unique(deployment, mechanism);
        push_unique(&mut out.auth.auto_auth_mechanisms, mechanism);
    }

    if out.auth.auto_user.is_empty() && out.auth.auto_pwd.is_empty() {
        set_agent_user(out)?;
    }
    set_key_file(out, defaults)?;

    info!(
        mechanisms = ?out.auth.deployment_auth_mechanisms,
        "authentication enabled"
    );
    Ok(())
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

fn set_agent_user(out: &mut AutomationConfig) -> AutomationResult<()> {
    let user = random_alphanumeric(AGENT_USERNAME_LENGTH, "agent username")?;
    let pwd = random_alphanumeric(AGENT_PASSWORD_LENGTH, "agent password")?;
    debug!(user = %user, "generated automation agent identity");
    out.auth.auto_user = user;
    out.auth.auto_pwd = pwd;
    Ok(())
}

fn set_key_file(out: &mut AutomationConfig, defaults: &AgentDefaults) -> AutomationResult<()> {
    if out.auth.key.is_empty() {
        out.auth.key = random_base64(KEY_BYTES, "shared key")?;
    }
    if out.auth.keyfile.is_empty() {
        out.auth.keyfile = defaults.keyfile.clone();
    }
    if out.auth.keyfile_windows.is_empty() {
        out.auth.keyfile_windows = defaults.keyfile_windows.clone();
    }
    Ok(())
}

/// Append a wanted user.
///
/// (username, database) uniqueness is not checked here.
pub fn add_user(out: &mut AutomationConfig, user: MongoDBUser) {
    debug!(user = %user.username, db = %user.database, "adding user");
    out.auth.users_wanted.push(user);
}

/// Remove the wanted user identified by (username, database), keeping the order of the rest
pub fn remove_user(
    out: &mut AutomationConfig,
    username: &str,
    database: &str,
) -> AutomationResult<()> {
    let i = out
        .auth
        .users_wanted
        .iter()
        .position(|u| u.is(username, database))
        .ok_or_else(|| AutomationError::user_not_found(username, database))?;
    out.auth.users_wanted.remove(i);
    debug!(user = username, db = database, "removed user");
    Ok(())
}

/// Derive both SCRAM credential sets for `user` from `password`.
///
/// SCRAM-SHA-256 is derived first, then SCRAM-SHA-1; the user is only
/// modified once both succeed.
pub fn configure_scram_credentials(user: &mut MongoDBUser, password: &str) -> AutomationResult<()> {
    let sha256 = derive_credentials(SCRAM_SHA_256, &user.username, password)?;
    let sha1 = derive_credentials(MONGODB_CR, &user.username, password)?;
    user.scram_sha256_creds = Some(sha256);
    user.scram_sha1_creds = Some(sha1);
    Ok(())
}
