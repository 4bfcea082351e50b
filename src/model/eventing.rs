//! Per-resource event subscriptions.

use crate::error::HostingError;
use crate::model::resource::ResourceWithConnectionString;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Raised by the host once a resource's connection string can be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionStringAvailableEvent {
    pub resource: String,
}

pub type EventHandler = Arc<
    dyn Fn(ConnectionStringAvailableEvent, CancellationToken) -> BoxFuture<'static, Result<(), HostingError>>
        + Send
        + Sync,
>;

#[derive(Clone, Default)]
pub struct Eventing {
    handlers: Arc<RwLock<HashMap<String, Vec<EventHandler>>>>,
}

impl Eventing {
    pub fn new() -> Self {
        Eventing::default()
    }

    /// Subscribe to [`ConnectionStringAvailableEvent`] for one resource (by qualified name).
    pub fn subscribe_connection_string_available<F, Fut>(&self, resource: &str, handler: F)
    where
        F: Fn(ConnectionStringAvailableEvent, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HostingError>> + Send + 'static,
    {
        let handler: EventHandler = Arc::new(move |event, cancel| handler(event, cancel).boxed());
        self.handlers
            .write()
            .entry(resource.to_string())
            .or_default()
            .push(handler);
    }

    pub fn subscriber_count(&self, resource: &str) -> usize {
        self.handlers.read().get(resource).map(Vec::len).unwrap_or(0)
    }

    /// Run the resource's handlers in subscription order; the first failure stops the rest.
    pub async fn publish_connection_string_available(
        &self,
        resource: &str,
        cancel: &CancellationToken,
    ) -> Result<(), HostingError> {
        let handlers: Vec<EventHandler> = self.handlers.read().get(resource).cloned().unwrap_or_default();
        let event = ConnectionStringAvailableEvent {
            resource: resource.to_string(),
        };
        tracing::debug!(resource = %resource, handlers = handlers.len(), "publishing connection string available");
        for handler in handlers {
            handler(event.clone(), cancel.clone()).await?;
        }
        Ok(())
    }
}

/// Handler that resolves `resource`'s connection string and fails when it is absent,
/// so a broken dependency chain halts startup instead of surfacing at runtime.
pub fn require_connection_string<R>(
    resource: Arc<R>,
) -> impl Fn(ConnectionStringAvailableEvent, CancellationToken) -> BoxFuture<'static, Result<(), HostingError>>
       + Send
       + Sync
       + 'static
where
    R: ResourceWithConnectionString + ?Sized,
{
    move |_event, cancel| {
        let resource = resource.clone();
        async move {
            match resource.get_connection_string(&cancel).await? {
                Some(_) => Ok(()),
                None => {
                    let name = resource.qualified_name();
                    tracing::error!(resource = %name, "connection string unavailable");
                    Err(HostingError::ConnectionStringUnavailable(name))
                }
            }
        }
        .boxed()
    }
}
