//! Resource traits shared by everything that lives in the application graph.

use crate::error::HostingError;
use crate::model::annotation::Annotations;
use crate::model::expression::{ReferenceExpression, ValueProvider};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub trait Resource: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn annotations(&self) -> &Arc<Annotations>;

    /// Owning resource, if any. Names are unique within a parent's scope.
    fn parent_name(&self) -> Option<&str> {
        None
    }

    /// Identity within the graph: `parent/name` for children, `name` otherwise.
    fn qualified_name(&self) -> String {
        match self.parent_name() {
            Some(parent) => format!("{}/{}", parent, self.name()),
            None => self.name().to_string(),
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn as_connection_string_resource(self: Arc<Self>) -> Option<Arc<dyn ResourceWithConnectionString>> {
        None
    }
}

#[async_trait]
pub trait ResourceWithConnectionString: Resource {
    fn connection_string_expression(&self) -> ReferenceExpression;

    /// Redirect annotations take precedence over the resource's own expression.
    async fn get_connection_string(&self, cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
        if let Some(target) = self.annotations().connection_string_redirect() {
            return target.get_connection_string(cancel).await;
        }
        self.connection_string_expression().get_value(cancel).await
    }
}

/// `{name.connectionString}` placeholder for a resource's connection string.
pub struct ConnectionStringReference {
    resource: Arc<dyn ResourceWithConnectionString>,
}

impl ConnectionStringReference {
    pub fn new(resource: Arc<dyn ResourceWithConnectionString>) -> Arc<dyn ValueProvider> {
        Arc::new(ConnectionStringReference { resource })
    }
}

#[async_trait]
impl ValueProvider for ConnectionStringReference {
    fn value_expression(&self) -> String {
        format!("{{{}.connectionString}}", self.resource.qualified_name())
    }

    async fn get_value(&self, cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
        self.resource.get_connection_string(cancel).await
    }
}
