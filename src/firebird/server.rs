//! Firebird server container resource.

use crate::error::ConfigError;
use crate::firebird::image::{DEFAULT_USER_NAME, PRIMARY_ENDPOINT_NAME};
use crate::model::{
    Annotations, EndpointProperty, EndpointReference, ParameterResource, ReferenceExpression, Resource,
    ResourceWithConnectionString,
};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

pub struct FirebirdServerResource {
    name: String,
    annotations: Arc<Annotations>,
    user: Option<Arc<ParameterResource>>,
    password: Arc<ParameterResource>,
    primary_endpoint: EndpointReference,
    /// Lowercased short name -> (short name as declared, database name on the server).
    databases: RwLock<HashMap<String, (String, String)>>,
}

impl FirebirdServerResource {
    pub fn new(
        name: impl Into<String>,
        user: Option<Arc<ParameterResource>>,
        password: Arc<ParameterResource>,
    ) -> Self {
        let name = name.into();
        let annotations = Arc::new(Annotations::default());
        let primary_endpoint = EndpointReference::new(name.clone(), annotations.clone(), PRIMARY_ENDPOINT_NAME);
        FirebirdServerResource {
            name,
            annotations,
            user,
            password,
            primary_endpoint,
            databases: RwLock::new(HashMap::new()),
        }
    }

    pub fn primary_endpoint(&self) -> &EndpointReference {
        &self.primary_endpoint
    }

    pub fn user_parameter(&self) -> Option<&Arc<ParameterResource>> {
        self.user.as_ref()
    }

    pub fn password_parameter(&self) -> &Arc<ParameterResource> {
        &self.password
    }

    /// Record `short_name -> database_name`. Short names compare case-insensitively and
    /// may be declared once per server.
    pub fn add_database(&self, short_name: &str, database_name: &str) -> Result<(), ConfigError> {
        let key = short_name.to_lowercase();
        let mut databases = self.databases.write();
        if databases.contains_key(&key) {
            return Err(ConfigError::DuplicateDatabase {
                server: self.name.clone(),
                database: short_name.to_string(),
            });
        }
        databases.insert(key, (short_name.to_string(), database_name.to_string()));
        Ok(())
    }

    pub fn database_name(&self, short_name: &str) -> Option<String> {
        self.databases
            .read()
            .get(&short_name.to_lowercase())
            .map(|(_, db)| db.clone())
    }

    /// Declared databases as `(short name, database name)`, sorted by short name.
    pub fn databases(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self.databases.read().values().cloned().collect();
        out.sort();
        out
    }

    /// The user parameter when supplied, otherwise the default identity literal.
    pub fn user_name_reference(&self) -> ReferenceExpression {
        match &self.user {
            Some(user) => ReferenceExpression::value(user.clone()),
            None => ReferenceExpression::literal(DEFAULT_USER_NAME),
        }
    }

    fn own_connection_string(&self) -> ReferenceExpression {
        ReferenceExpression::builder()
            .literal("Host=")
            .value(self.primary_endpoint.property(EndpointProperty::Host))
            .literal(";Port=")
            .value(self.primary_endpoint.property(EndpointProperty::Port))
            .literal(";Username=")
            .expression(&self.user_name_reference())
            .literal(";Password=")
            .value(self.password.clone())
            .build()
    }
}

impl Resource for FirebirdServerResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn annotations(&self) -> &Arc<Annotations> {
        &self.annotations
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_connection_string_resource(self: Arc<Self>) -> Option<Arc<dyn ResourceWithConnectionString>> {
        Some(self)
    }
}

impl ResourceWithConnectionString for FirebirdServerResource {
    fn connection_string_expression(&self) -> ReferenceExpression {
        match self.annotations.connection_string_redirect() {
            Some(target) => target.connection_string_expression(),
            None => self.own_connection_string(),
        }
    }
}

impl std::fmt::Debug for FirebirdServerResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebirdServerResource")
            .field("name", &self.name)
            .field("user", &self.user.as_ref().map(|u| u.name().to_string()))
            .field("password", &self.password.name())
            .field("databases", &self.databases())
            .finish()
    }
}
