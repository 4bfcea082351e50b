//! The finalized application model and the host-side operations on it.

use crate::error::HostingError;
use crate::model::eventing::Eventing;
use crate::model::parameter::ParameterResource;
use crate::model::resource::{Resource, ResourceWithConnectionString};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct ApplicationModel {
    resources: Vec<Arc<dyn Resource>>,
    parameters: Vec<Arc<ParameterResource>>,
}

impl ApplicationModel {
    pub(crate) fn new(resources: Vec<Arc<dyn Resource>>, parameters: Vec<Arc<ParameterResource>>) -> Self {
        ApplicationModel { resources, parameters }
    }

    pub fn resources(&self) -> &[Arc<dyn Resource>] {
        &self.resources
    }

    pub fn parameters(&self) -> &[Arc<ParameterResource>] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Arc<ParameterResource>> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn find(&self, qualified_name: &str) -> Option<&Arc<dyn Resource>> {
        self.resources.iter().find(|r| r.qualified_name() == qualified_name)
    }

    /// All resources of concrete type `T`, in registration order.
    pub fn resources_of<T: Resource>(&self) -> Vec<Arc<T>> {
        self.resources
            .iter()
            .filter_map(|r| r.clone().into_any().downcast::<T>().ok())
            .collect()
    }

    pub fn connection_string_resources(&self) -> Vec<Arc<dyn ResourceWithConnectionString>> {
        self.resources
            .iter()
            .filter_map(|r| r.clone().as_connection_string_resource())
            .collect()
    }
}

pub struct DistributedApplication {
    model: ApplicationModel,
    eventing: Eventing,
}

impl DistributedApplication {
    pub(crate) fn new(model: ApplicationModel, eventing: Eventing) -> Self {
        DistributedApplication { model, eventing }
    }

    pub fn model(&self) -> &ApplicationModel {
        &self.model
    }

    pub fn eventing(&self) -> &Eventing {
        &self.eventing
    }

    /// Fire the connection-string-available event for every resource exposing a
    /// connection string. Stops at the first handler error.
    pub async fn publish_connection_strings(&self, cancel: &CancellationToken) -> Result<(), HostingError> {
        for resource in self.model.connection_string_resources() {
            let name = resource.qualified_name();
            self.eventing
                .publish_connection_string_available(&name, cancel)
                .await?;
            tracing::info!(resource = %name, "connection string available");
        }
        Ok(())
    }
}
