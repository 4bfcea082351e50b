//! Firebird hosting: declare a Firebird server container and its databases in an
//! application model, with deferred connection strings and container environment wiring.

pub mod config;
pub mod error;
pub mod firebird;
pub mod manifest;
pub mod model;
pub mod store;

pub use config::{apply, config_path, load_from_path, parameters_from_env, HostConfig};
pub use error::{ConfigError, HostingError};
pub use firebird::{
    FirebirdBuilderExt, FirebirdDatabaseResource, FirebirdOptions, FirebirdServerBuilderExt, FirebirdServerResource,
};
pub use manifest::Manifest;
pub use model::{
    AllocatedEndpoint, ApplicationBuilder, ApplicationModel, DistributedApplication, ParameterResource,
    ReferenceExpression, Resource, ResourceBuilder, ResourceWithConnectionString,
};
pub use store::SecretStore;
