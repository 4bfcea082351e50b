//! Raw host config types, deserialized from the AppHost JSON file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub name: String,
    /// Name inside the server; defaults to `name`.
    #[serde(default)]
    pub database_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    /// Name of a parameter holding the connection-string user.
    #[serde(default)]
    pub user_parameter: Option<String>,
    /// Name of a parameter holding the password; generated when omitted.
    #[serde(default)]
    pub password_parameter: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub root_password: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub legacy_auth: bool,
    #[serde(default)]
    pub databases: Vec<DatabaseConfig>,
}

/// All host config in one struct.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Parameter values by parameter name.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Seed for the secret store (e.g. `Parameters:firebird-password`).
    #[serde(default)]
    pub secrets: HashMap<String, String>,
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}
