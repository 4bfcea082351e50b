//! Logical database hosted by a Firebird server.

use crate::firebird::server::FirebirdServerResource;
use crate::model::{Annotations, ConnectionStringReference, ReferenceExpression, Resource, ResourceWithConnectionString};
use std::any::Any;
use std::sync::Arc;

pub struct FirebirdDatabaseResource {
    name: String,
    database_name: String,
    parent: Arc<FirebirdServerResource>,
    annotations: Arc<Annotations>,
}

impl FirebirdDatabaseResource {
    /// `database_name` defaults to `name`.
    pub fn new(name: impl Into<String>, database_name: Option<&str>, parent: Arc<FirebirdServerResource>) -> Self {
        let name = name.into();
        let database_name = database_name.map(str::to_string).unwrap_or_else(|| name.clone());
        FirebirdDatabaseResource {
            name,
            database_name,
            parent,
            annotations: Arc::new(Annotations::default()),
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn parent(&self) -> &Arc<FirebirdServerResource> {
        &self.parent
    }
}

impl Resource for FirebirdDatabaseResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn annotations(&self) -> &Arc<Annotations> {
        &self.annotations
    }

    fn parent_name(&self) -> Option<&str> {
        Some(self.parent.name())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_connection_string_resource(self: Arc<Self>) -> Option<Arc<dyn ResourceWithConnectionString>> {
        Some(self)
    }
}

impl ResourceWithConnectionString for FirebirdDatabaseResource {
    fn connection_string_expression(&self) -> ReferenceExpression {
        ReferenceExpression::builder()
            .value(ConnectionStringReference::new(self.parent.clone()))
            .literal(";Database=")
            .literal(self.database_name.clone())
            .build()
    }
}

impl std::fmt::Debug for FirebirdDatabaseResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebirdDatabaseResource")
            .field("name", &self.name)
            .field("database_name", &self.database_name)
            .field("parent", &self.parent.name())
            .finish()
    }
}
