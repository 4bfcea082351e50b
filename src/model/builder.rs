//! Application builder and per-resource builder handles.

use crate::config::validate_resource_name;
use crate::error::HostingError;
use crate::model::annotation::{
    Annotation, ContainerImageAnnotation, EnvironmentAnnotation, EnvironmentValue,
};
use crate::model::application::{ApplicationModel, DistributedApplication};
use crate::model::endpoint::EndpointAnnotation;
use crate::model::eventing::Eventing;
use crate::model::expression::ReferenceExpression;
use crate::model::parameter::{GeneratedPassword, ParameterDefault, ParameterResource};
use crate::model::resource::{Resource, ResourceWithConnectionString};
use crate::store::SecretStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the resource graph while it is being composed. Single-threaded by contract:
/// registration happens before [`ApplicationBuilder::build`] hands the model to the host.
#[derive(Default)]
pub struct ApplicationBuilder {
    resources: Vec<Arc<dyn Resource>>,
    parameters: Vec<Arc<ParameterResource>>,
    parameter_values: HashMap<String, String>,
    secrets: SecretStore,
    eventing: Eventing,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        ApplicationBuilder::default()
    }

    /// Builder whose parameters resolve from `parameter_values` and whose generated
    /// secrets start from `secrets`.
    pub fn with_configuration(parameter_values: HashMap<String, String>, secrets: SecretStore) -> Self {
        ApplicationBuilder {
            parameter_values,
            secrets,
            ..ApplicationBuilder::default()
        }
    }

    pub fn set_parameter_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameter_values.insert(name.into(), value.into());
    }

    pub fn eventing(&self) -> &Eventing {
        &self.eventing
    }

    pub fn secrets(&self) -> &SecretStore {
        &self.secrets
    }

    pub fn resources(&self) -> &[Arc<dyn Resource>] {
        &self.resources
    }

    pub fn parameters(&self) -> &[Arc<ParameterResource>] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<Arc<ParameterResource>> {
        self.parameters.iter().find(|p| p.name() == name).cloned()
    }

    pub fn find_resource(&self, qualified_name: &str) -> Option<&Arc<dyn Resource>> {
        self.resources.iter().find(|r| r.qualified_name() == qualified_name)
    }

    pub fn add_resource<R: Resource>(&mut self, resource: Arc<R>) -> Result<ResourceBuilder<R>, HostingError> {
        validate_resource_name(resource.name())?;
        let exists = self
            .resources
            .iter()
            .any(|r| r.name() == resource.name() && r.parent_name() == resource.parent_name());
        if exists {
            return Err(HostingError::DuplicateResource(resource.qualified_name()));
        }
        tracing::debug!(resource = %resource.qualified_name(), "resource added");
        self.resources.push(resource.clone());
        Ok(ResourceBuilder { resource })
    }

    /// Register a parameter whose value comes from configuration.
    pub fn add_parameter(&mut self, name: &str, secret: bool) -> Result<Arc<ParameterResource>, HostingError> {
        self.register_parameter(name, secret, None)
    }

    /// Secret parameter defaulting to a generated password that is kept in the secret
    /// store, so it stays the same for every evaluation in this host.
    pub fn create_default_password_parameter(&mut self, name: &str) -> Result<Arc<ParameterResource>, HostingError> {
        let default = ParameterDefault::UserSecret {
            key: format!("Parameters:{}", name),
            generate: GeneratedPassword::default(),
        };
        self.register_parameter(name, true, Some(default))
    }

    fn register_parameter(
        &mut self,
        name: &str,
        secret: bool,
        default: Option<ParameterDefault>,
    ) -> Result<Arc<ParameterResource>, HostingError> {
        validate_resource_name(name)?;
        if self.parameters.iter().any(|p| p.name() == name) {
            return Err(HostingError::DuplicateResource(name.to_string()));
        }
        let parameter = Arc::new(ParameterResource::new(
            name,
            secret,
            self.parameter_values.get(name).cloned(),
            default,
            self.secrets.clone(),
        ));
        tracing::debug!(parameter = %name, secret, "parameter added");
        self.parameters.push(parameter.clone());
        Ok(parameter)
    }

    pub fn build(self) -> DistributedApplication {
        tracing::info!(
            resources = self.resources.len(),
            parameters = self.parameters.len(),
            "application model built"
        );
        DistributedApplication::new(
            ApplicationModel::new(self.resources, self.parameters),
            self.eventing,
        )
    }
}

/// Cloneable handle to a registered resource. Every `with_*` call writes annotations
/// and hands the same handle back for chaining.
pub struct ResourceBuilder<R: ?Sized> {
    resource: Arc<R>,
}

impl<R: ?Sized + std::fmt::Debug> std::fmt::Debug for ResourceBuilder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceBuilder")
            .field("resource", &self.resource)
            .finish()
    }
}

impl<R: ?Sized> Clone for ResourceBuilder<R> {
    fn clone(&self) -> Self {
        ResourceBuilder {
            resource: self.resource.clone(),
        }
    }
}

impl<R: Resource> ResourceBuilder<R> {
    pub fn resource(&self) -> &Arc<R> {
        &self.resource
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn with_endpoint(self, endpoint: EndpointAnnotation) -> Result<Self, HostingError> {
        let annotations = self.resource.annotations();
        if annotations.endpoint(&endpoint.name).is_some() {
            return Err(HostingError::DuplicateEndpoint {
                resource: self.resource.qualified_name(),
                endpoint: endpoint.name,
            });
        }
        annotations.add(Annotation::Endpoint(endpoint));
        Ok(self)
    }

    /// Adjust an endpoint in place, creating a TCP endpoint with that name if missing.
    pub fn with_endpoint_config(self, name: &str, f: impl FnOnce(&mut EndpointAnnotation)) -> Self {
        let annotations = self.resource.annotations();
        if annotations.endpoint(name).is_none() {
            annotations.add(Annotation::Endpoint(EndpointAnnotation::tcp(name, None, None)));
        }
        annotations.update_endpoint(name, f);
        self
    }

    pub fn with_image(self, image: &str, tag: &str) -> Self {
        let registry = self.resource.annotations().container_image().and_then(|c| c.registry);
        self.resource.annotations().set_container_image(ContainerImageAnnotation {
            registry,
            image: image.to_string(),
            tag: Some(tag.to_string()),
        });
        self
    }

    pub fn with_image_registry(self, registry: &str) -> Self {
        let updated = self
            .resource
            .annotations()
            .update_container_image(|c| c.registry = Some(registry.to_string()));
        if !updated {
            tracing::warn!(resource = %self.resource.qualified_name(), "image registry set before an image; ignored");
        }
        self
    }

    pub fn with_environment(self, name: &str, value: impl Into<String>) -> Self {
        self.resource.annotations().add(Annotation::Environment(EnvironmentAnnotation {
            name: name.to_string(),
            value: EnvironmentValue::Literal(value.into()),
        }));
        self
    }

    pub fn with_environment_expression(self, name: &str, value: ReferenceExpression) -> Self {
        self.resource.annotations().add(Annotation::Environment(EnvironmentAnnotation {
            name: name.to_string(),
            value: EnvironmentValue::Expression(value),
        }));
        self
    }

    /// Make this resource's connection string evaluate to `target`'s.
    pub fn with_connection_string_redirect(self, target: Arc<dyn ResourceWithConnectionString>) -> Self {
        self.resource
            .annotations()
            .add(Annotation::ConnectionStringRedirect(target));
        self
    }
}
