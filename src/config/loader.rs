//! Load host config from a JSON file or the environment, and apply it to a builder.

use crate::config::{validate, HostConfig};
use crate::error::{ConfigError, HostingError};
use crate::firebird::{FirebirdBuilderExt, FirebirdOptions, FirebirdServerBuilderExt};
use crate::model::{ApplicationBuilder, ParameterResource};
use crate::store::SecretStore;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Env prefix for parameter values, e.g. `Parameters__firebird-password=...`.
pub const PARAMETER_ENV_PREFIX: &str = "Parameters__";

/// Config file path. From env `FIREBIRD_HOSTING_CONFIG`, default `apphost.json`.
pub fn config_path() -> String {
    std::env::var("FIREBIRD_HOSTING_CONFIG").unwrap_or_else(|_| "apphost.json".into())
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<HostConfig, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let config: HostConfig =
        serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), servers = config.servers.len(), "config loaded");
    Ok(config)
}

/// Parameter values from `Parameters__<name>` variables. Prefix match is case-insensitive.
pub fn parameters_from_env() -> HashMap<String, String> {
    parameters_from_vars(std::env::vars())
}

fn parameters_from_vars(vars: impl IntoIterator<Item = (String, String)>) -> HashMap<String, String> {
    let prefix_len = PARAMETER_ENV_PREFIX.len();
    vars.into_iter()
        .filter(|(k, _)| {
            k.len() > prefix_len
                && k.is_char_boundary(prefix_len)
                && k[..prefix_len].eq_ignore_ascii_case(PARAMETER_ENV_PREFIX)
        })
        .map(|(k, v)| (k[prefix_len..].to_string(), v))
        .collect()
}

impl HostConfig {
    /// Environment values override file values.
    pub fn merge_parameters(&mut self, overrides: HashMap<String, String>) {
        self.parameters.extend(overrides);
    }

    /// A builder wired to this config's parameter values and secrets.
    pub fn builder(&self) -> ApplicationBuilder {
        ApplicationBuilder::with_configuration(self.parameters.clone(), SecretStore::from_map(self.secrets.clone()))
    }
}

/// Validate `config`, then register every server and database it declares.
pub fn apply(config: &HostConfig, app: &mut ApplicationBuilder) -> Result<(), HostingError> {
    validate(config)?;
    for server in &config.servers {
        let user = server
            .user_parameter
            .as_deref()
            .map(|name| parameter(app, name, false))
            .transpose()?;
        let password = server
            .password_parameter
            .as_deref()
            .map(|name| parameter(app, name, true))
            .transpose()?;

        let mut builder = app.add_firebird(
            &server.name,
            FirebirdOptions {
                user,
                password,
                port: server.port,
            },
        )?;
        if let Some(user) = &server.user {
            builder = builder.with_user(user);
        }
        if let Some(password) = &server.password {
            builder = builder.with_password(password);
        }
        if let Some(password) = &server.root_password {
            builder = builder.with_root_password(password);
        }
        if let Some(tz) = &server.time_zone {
            builder = builder.with_time_zone(tz);
        }
        if server.legacy_auth {
            builder = builder.use_legacy_auth();
        }
        for db in &server.databases {
            builder.add_database(app, &db.name, db.database_name.as_deref())?;
        }
    }
    Ok(())
}

/// Servers may share a parameter; the first declaration registers it.
fn parameter(app: &mut ApplicationBuilder, name: &str, secret: bool) -> Result<Arc<ParameterResource>, HostingError> {
    match app.parameter(name) {
        Some(existing) => Ok(existing),
        None => app.add_parameter(name, secret),
    }
}
