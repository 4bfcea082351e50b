//! Config validation: resource names and per-server uniqueness.

use crate::config::HostConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

const MAX_NAME_LENGTH: usize = 64;
const NAME_PATTERN: &str = "^[A-Za-z][A-Za-z0-9-]*$";

/// ASCII letter first, then letters, digits, and single hyphens; no trailing hyphen.
pub fn validate_resource_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid("must be at most 64 characters"));
    }
    let re = Regex::new(NAME_PATTERN).map_err(|e| ConfigError::Validation(e.to_string()))?;
    if !re.is_match(name) {
        return Err(invalid("must start with a letter and contain only letters, digits, and hyphens"));
    }
    if name.contains("--") {
        return Err(invalid("must not contain consecutive hyphens"));
    }
    if name.ends_with('-') {
        return Err(invalid("must not end with a hyphen"));
    }
    Ok(())
}

pub fn validate(config: &HostConfig) -> Result<(), ConfigError> {
    let mut server_names = HashSet::new();
    for server in &config.servers {
        validate_resource_name(&server.name)?;
        if !server_names.insert(server.name.as_str()) {
            return Err(ConfigError::Duplicate {
                kind: "server",
                name: server.name.clone(),
            });
        }
        if server.port == Some(0) {
            return Err(ConfigError::Validation(format!(
                "server {}: port must be between 1 and 65535",
                server.name
            )));
        }
        for parameter in [&server.user_parameter, &server.password_parameter].into_iter().flatten() {
            validate_resource_name(parameter)?;
        }

        let mut database_names = HashSet::new();
        for db in &server.databases {
            validate_resource_name(&db.name)?;
            if !database_names.insert(db.name.to_lowercase()) {
                return Err(ConfigError::DuplicateDatabase {
                    server: server.name.clone(),
                    database: db.name.clone(),
                });
            }
            if db.database_name.as_deref() == Some("") {
                return Err(ConfigError::Validation(format!(
                    "server {}: database {} has an empty database_name",
                    server.name, db.name
                )));
            }
        }
    }
    Ok(())
}
