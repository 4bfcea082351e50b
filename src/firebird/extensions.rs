//! Registration functions: add a fully configured Firebird server or database in one call.

use crate::config::validate_resource_name;
use crate::error::HostingError;
use crate::firebird::database::FirebirdDatabaseResource;
use crate::firebird::image::*;
use crate::firebird::server::FirebirdServerResource;
use crate::model::{
    require_connection_string, ApplicationBuilder, EndpointAnnotation, EnvironmentValue, ParameterResource, Resource,
    ResourceBuilder,
};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct FirebirdOptions {
    /// Connection-string user; `SYSDBA` when absent.
    pub user: Option<Arc<ParameterResource>>,
    /// Generated as `{name}-password` when absent.
    pub password: Option<Arc<ParameterResource>>,
    /// Host port. The container always listens on 3050.
    pub port: Option<u16>,
}

pub trait FirebirdBuilderExt {
    fn add_firebird(
        &mut self,
        name: &str,
        options: FirebirdOptions,
    ) -> Result<ResourceBuilder<FirebirdServerResource>, HostingError>;
}

impl FirebirdBuilderExt for ApplicationBuilder {
    fn add_firebird(
        &mut self,
        name: &str,
        options: FirebirdOptions,
    ) -> Result<ResourceBuilder<FirebirdServerResource>, HostingError> {
        validate_resource_name(name)?;
        if self.find_resource(name).is_some() {
            return Err(HostingError::DuplicateResource(name.to_string()));
        }
        let password = match options.password {
            Some(password) => password,
            None => self.create_default_password_parameter(&format!("{}-password", name))?,
        };

        let server = Arc::new(FirebirdServerResource::new(name, options.user, password));
        let builder = self
            .add_resource(server.clone())?
            .with_endpoint(EndpointAnnotation::tcp(PRIMARY_ENDPOINT_NAME, options.port, Some(TARGET_PORT)))?
            .with_image(IMAGE, TAG)
            .with_image_registry(REGISTRY);
        self.eventing()
            .subscribe_connection_string_available(&server.qualified_name(), require_connection_string(server.clone()));

        tracing::info!(resource = %name, port = ?options.port, "firebird server registered");
        Ok(builder)
    }
}

pub trait FirebirdServerBuilderExt: Sized {
    fn add_database(
        &self,
        app: &mut ApplicationBuilder,
        name: &str,
        database_name: Option<&str>,
    ) -> Result<ResourceBuilder<FirebirdDatabaseResource>, HostingError>;

    fn with_user(self, user: &str) -> Self;

    fn with_password(self, password: &str) -> Self;

    fn with_root_password(self, password: &str) -> Self;

    fn with_time_zone(self, time_zone: &str) -> Self;

    fn use_legacy_auth(self) -> Self;
}

impl FirebirdServerBuilderExt for ResourceBuilder<FirebirdServerResource> {
    fn add_database(
        &self,
        app: &mut ApplicationBuilder,
        name: &str,
        database_name: Option<&str>,
    ) -> Result<ResourceBuilder<FirebirdDatabaseResource>, HostingError> {
        validate_resource_name(name)?;
        let database_name = database_name.unwrap_or(name);
        let server = self.resource();
        server.add_database(name, database_name)?;

        // The image creates a single database from FIREBIRD_DATABASE; the latest one wins.
        if let Some(previous) = current_database_env(server) {
            if previous != database_name {
                tracing::warn!(
                    resource = %server.name(),
                    previous = %previous,
                    database = %database_name,
                    "FIREBIRD_DATABASE overwritten; only the latest database is created by the container"
                );
            }
        }
        self.clone().with_environment(ENV_DATABASE, database_name);

        let database = Arc::new(FirebirdDatabaseResource::new(name, Some(database_name), server.clone()));
        let builder = app.add_resource(database.clone())?;
        app.eventing().subscribe_connection_string_available(
            &database.qualified_name(),
            require_connection_string(database),
        );
        tracing::info!(resource = %server.name(), database = %name, "firebird database registered");
        Ok(builder)
    }

    fn with_user(self, user: &str) -> Self {
        self.with_environment(ENV_USER, user)
    }

    fn with_password(self, password: &str) -> Self {
        self.with_environment(ENV_PASSWORD, password)
    }

    fn with_root_password(self, password: &str) -> Self {
        self.with_environment(ENV_ROOT_PASSWORD, password)
    }

    fn with_time_zone(self, time_zone: &str) -> Self {
        self.with_environment(ENV_TIME_ZONE, time_zone)
    }

    fn use_legacy_auth(self) -> Self {
        self.with_environment(ENV_USE_LEGACY_AUTH, "true")
    }
}

fn current_database_env(server: &FirebirdServerResource) -> Option<String> {
    server
        .annotations()
        .environment()
        .into_iter()
        .rev()
        .find(|e| e.name == ENV_DATABASE)
        .and_then(|e| match e.value {
            EnvironmentValue::Literal(s) => Some(s),
            EnvironmentValue::Expression(_) => None,
        })
}
