//! Authentication settings and database users
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Deployment-wide authentication block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    #[serde(default)]
    pub disabled: bool,
    /// Absent and empty are distinct for the agent consuming the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_auth_mechanisms: Option<Vec<String>>,
    #[serde(default)]
    pub auto_auth_mechanisms: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auto_auth_mechanism: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auto_user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auto_pwd: String,
    /// Shared key material written to the keyfile
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyfile: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyfile_windows: String,
    #[serde(default)]
    pub users_wanted: Vec<MongoDBUser>,
    #[serde(default)]
    pub users_deleted: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Database user, keyed by (username, database)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoDBUser {
    #[serde(rename = "user")]
    pub username: String,
    #[serde(rename = "db")]
    pub database: String,
    #[serde(default)]
    pub mechanisms: Vec<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub authentication_restrictions: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scram_sha1_creds: Option<ScramShaCreds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scram_sha256_creds: Option<ScramShaCreds>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub role: String,
    #[serde(rename = "db")]
    pub database: String,
}

/// Derived SCRAM secrets, never edited by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScramShaCreds {
    pub iteration_count: u32,
    /// base64
    pub salt: String,
    /// base64
    pub stored_key: String,
    /// base64
    pub server_key: String,
}

impl MongoDBUser {
    pub fn new(username: &str, database: &str) -> Self {
        Self {
            username: username.to_string(),
            database: database.to_string(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: &str, database: &str) -> Self {
        self.roles.push(Role {
            role: role.to_string(),
            database: database.to_string(),
        });
        self
    }

    pub fn is(&self, username: &str, database: &str) -> bool {
        self.username == username && self.database == database
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_form() {
        let user = MongoDBUser::new("alice", "admin").with_role("readWrite", "test");
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["user"], "alice");
        assert_eq!(value["db"], "admin");
        assert_eq!(value["roles"][0]["role"], "readWrite");
        assert_eq!(value["roles"][0]["db"], "test");
        assert!(value.get("scramSha1Creds").is_none());
    }

    #[test]
    fn test_auth_distinguishes_absent_mechanisms() {
        let auth: Auth = serde_json::from_str(r#"{"disabled": true}"#).unwrap();
        assert_eq!(auth.deployment_auth_mechanisms, None);
        assert!(serde_json::to_value(&auth)
            .unwrap()
            .get("deploymentAuthMechanisms")
            .is_none());

        let auth: Auth =
            serde_json::from_str(r#"{"disabled": true, "deploymentAuthMechanisms": []}"#).unwrap();
        assert_eq!(auth.deployment_auth_mechanisms, Some(Vec::new()));
        assert_eq!(
            serde_json::to_value(&auth).unwrap()["deploymentAuthMechanisms"],
            serde_json::json!([])
        );
    }
}
