//! Typed errors for registration, configuration, and connection-string resolution.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid resource name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },
    #[error("database '{database}' is already declared on server '{server}'")]
    DuplicateDatabase { server: String, database: String },
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum HostingError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("resource '{0}' already exists in the application model")]
    DuplicateResource(String),
    #[error("endpoint '{endpoint}' already exists on resource '{resource}'")]
    DuplicateEndpoint { resource: String, endpoint: String },
    #[error("endpoint '{endpoint}' not found on resource '{resource}'")]
    EndpointNotFound { resource: String, endpoint: String },
    #[error("ConnectionStringAvailableEvent was published for the '{0}' resource but the connection string was null.")]
    ConnectionStringUnavailable(String),
    #[error("parameter '{0}' has no configured value and no default")]
    MissingParameterValue(String),
    #[error("operation cancelled")]
    Cancelled,
}

impl HostingError {
    /// Errors that mean the application model itself is wrong and startup must halt.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            HostingError::Config(_)
                | HostingError::DuplicateResource(_)
                | HostingError::DuplicateEndpoint { .. }
                | HostingError::ConnectionStringUnavailable(_)
                | HostingError::MissingParameterValue(_)
        )
    }
}
