//! Endpoint annotations and the deferred references that read them.

use crate::error::HostingError;
use crate::model::annotation::Annotations;
use crate::model::expression::ValueProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

/// Concrete address the host assigned to an endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatedEndpoint {
    pub host: String,
    pub port: u16,
}

impl AllocatedEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        AllocatedEndpoint {
            host: host.into(),
            port,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointAnnotation {
    pub name: String,
    pub protocol: Protocol,
    pub uri_scheme: String,
    pub transport: String,
    /// Host-side port. `None` lets the host pick one.
    pub port: Option<u16>,
    /// Port the container listens on.
    pub target_port: Option<u16>,
    pub is_external: bool,
    pub allocated: Option<AllocatedEndpoint>,
}

impl EndpointAnnotation {
    pub fn tcp(name: impl Into<String>, port: Option<u16>, target_port: Option<u16>) -> Self {
        EndpointAnnotation {
            name: name.into(),
            protocol: Protocol::Tcp,
            uri_scheme: "tcp".into(),
            transport: "tcp".into(),
            port,
            target_port,
            is_external: false,
            allocated: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointProperty {
    Host,
    Port,
}

impl EndpointProperty {
    fn key(self) -> &'static str {
        match self {
            EndpointProperty::Host => "host",
            EndpointProperty::Port => "port",
        }
    }
}

/// Named endpoint on a resource, resolved against the resource's annotations on demand.
#[derive(Clone)]
pub struct EndpointReference {
    resource: String,
    name: String,
    annotations: Arc<Annotations>,
}

impl EndpointReference {
    pub fn new(resource: impl Into<String>, annotations: Arc<Annotations>, name: impl Into<String>) -> Self {
        EndpointReference {
            resource: resource.into(),
            name: name.into(),
            annotations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    pub fn exists(&self) -> bool {
        self.annotations.endpoint(&self.name).is_some()
    }

    pub fn allocated(&self) -> Option<AllocatedEndpoint> {
        self.annotations.endpoint(&self.name).and_then(|e| e.allocated)
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated().is_some()
    }

    pub fn property(&self, property: EndpointProperty) -> Arc<dyn ValueProvider> {
        Arc::new(EndpointPropertyReference {
            endpoint: self.clone(),
            property,
        })
    }
}

impl std::fmt::Debug for EndpointReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointReference")
            .field("resource", &self.resource)
            .field("name", &self.name)
            .finish()
    }
}

struct EndpointPropertyReference {
    endpoint: EndpointReference,
    property: EndpointProperty,
}

#[async_trait]
impl ValueProvider for EndpointPropertyReference {
    fn value_expression(&self) -> String {
        format!(
            "{{{}.bindings.{}.{}}}",
            self.endpoint.resource,
            self.endpoint.name,
            self.property.key()
        )
    }

    async fn get_value(&self, _cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
        let annotation = self
            .endpoint
            .annotations
            .endpoint(&self.endpoint.name)
            .ok_or_else(|| HostingError::EndpointNotFound {
                resource: self.endpoint.resource.clone(),
                endpoint: self.endpoint.name.clone(),
            })?;
        Ok(annotation.allocated.map(|a| match self.property {
            EndpointProperty::Host => a.host,
            EndpointProperty::Port => a.port.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::annotation::Annotation;

    #[tokio::test]
    async fn unallocated_endpoint_is_absent() {
        let annotations = Arc::new(Annotations::default());
        annotations.add(Annotation::Endpoint(EndpointAnnotation::tcp("tcp", None, Some(3050))));
        let endpoint = EndpointReference::new("fb", annotations.clone(), "tcp");
        let host = endpoint.property(EndpointProperty::Host);

        assert_eq!(host.value_expression(), "{fb.bindings.tcp.host}");
        assert_eq!(host.get_value(&CancellationToken::new()).await.unwrap(), None);

        annotations.update_endpoint("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("localhost", 3050)));
        let port = endpoint.property(EndpointProperty::Port);
        assert_eq!(port.get_value(&CancellationToken::new()).await.unwrap().as_deref(), Some("3050"));
        assert!(endpoint.is_allocated());
    }

    #[tokio::test]
    async fn unknown_endpoint_is_an_error() {
        let endpoint = EndpointReference::new("fb", Arc::new(Annotations::default()), "http");
        let err = endpoint
            .property(EndpointProperty::Host)
            .get_value(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HostingError::EndpointNotFound { .. }));
    }
}
