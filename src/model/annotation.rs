//! Metadata attached to resources during the registration phase.

use crate::error::HostingError;
use crate::model::endpoint::EndpointAnnotation;
use crate::model::expression::ReferenceExpression;
use crate::model::resource::ResourceWithConnectionString;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerImageAnnotation {
    pub registry: Option<String>,
    pub image: String,
    pub tag: Option<String>,
}

impl ContainerImageAnnotation {
    /// Full image reference, e.g. `docker.io/firebirdsql/firebird:latest`.
    pub fn reference(&self) -> String {
        let mut out = String::new();
        if let Some(registry) = &self.registry {
            out.push_str(registry);
            out.push('/');
        }
        out.push_str(&self.image);
        if let Some(tag) = &self.tag {
            out.push(':');
            out.push_str(tag);
        }
        out
    }
}

#[derive(Clone, Debug)]
pub enum EnvironmentValue {
    Literal(String),
    Expression(ReferenceExpression),
}

impl EnvironmentValue {
    /// Manifest form: literals as-is, expressions as placeholders.
    pub fn value_expression(&self) -> String {
        match self {
            EnvironmentValue::Literal(s) => s.clone(),
            EnvironmentValue::Expression(e) => e.value_expression(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnvironmentAnnotation {
    pub name: String,
    pub value: EnvironmentValue,
}

#[derive(Clone)]
pub enum Annotation {
    Endpoint(EndpointAnnotation),
    ContainerImage(ContainerImageAnnotation),
    Environment(EnvironmentAnnotation),
    /// Delegates all connection-string evaluation to another resource.
    ConnectionStringRedirect(Arc<dyn ResourceWithConnectionString>),
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Endpoint(e) => f.debug_tuple("Endpoint").field(e).finish(),
            Annotation::ContainerImage(c) => f.debug_tuple("ContainerImage").field(c).finish(),
            Annotation::Environment(e) => f.debug_tuple("Environment").field(e).finish(),
            Annotation::ConnectionStringRedirect(r) => {
                f.debug_tuple("ConnectionStringRedirect").field(&r.qualified_name()).finish()
            }
        }
    }
}

#[derive(Default)]
pub struct Annotations {
    inner: RwLock<Vec<Annotation>>,
}

impl Annotations {
    pub fn add(&self, annotation: Annotation) {
        self.inner.write().push(annotation);
    }

    pub fn snapshot(&self) -> Vec<Annotation> {
        self.inner.read().clone()
    }

    pub fn endpoints(&self) -> Vec<EndpointAnnotation> {
        self.inner
            .read()
            .iter()
            .filter_map(|a| match a {
                Annotation::Endpoint(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn endpoint(&self, name: &str) -> Option<EndpointAnnotation> {
        self.endpoints().into_iter().find(|e| e.name == name)
    }

    /// Returns false when no endpoint with that name exists.
    pub fn update_endpoint(&self, name: &str, f: impl FnOnce(&mut EndpointAnnotation)) -> bool {
        let mut guard = self.inner.write();
        for annotation in guard.iter_mut() {
            if let Annotation::Endpoint(e) = annotation {
                if e.name == name {
                    f(e);
                    return true;
                }
            }
        }
        false
    }

    pub fn container_image(&self) -> Option<ContainerImageAnnotation> {
        self.inner.read().iter().rev().find_map(|a| match a {
            Annotation::ContainerImage(c) => Some(c.clone()),
            _ => None,
        })
    }

    /// Replaces any previous image annotation so a resource carries exactly one.
    pub fn set_container_image(&self, image: ContainerImageAnnotation) {
        let mut guard = self.inner.write();
        guard.retain(|a| !matches!(a, Annotation::ContainerImage(_)));
        guard.push(Annotation::ContainerImage(image));
    }

    pub fn update_container_image(&self, f: impl FnOnce(&mut ContainerImageAnnotation)) -> bool {
        let mut guard = self.inner.write();
        match guard.iter_mut().rev().find_map(|a| match a {
            Annotation::ContainerImage(c) => Some(c),
            _ => None,
        }) {
            Some(image) => {
                f(image);
                true
            }
            None => false,
        }
    }

    pub fn environment(&self) -> Vec<EnvironmentAnnotation> {
        self.inner
            .read()
            .iter()
            .filter_map(|a| match a {
                Annotation::Environment(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn connection_string_redirect(&self) -> Option<Arc<dyn ResourceWithConnectionString>> {
        self.inner.read().iter().rev().find_map(|a| match a {
            Annotation::ConnectionStringRedirect(r) => Some(r.clone()),
            _ => None,
        })
    }

    /// Evaluate environment annotations in insertion order; a later write to the same
    /// name overwrites an earlier one. Expressions that are not available yet are skipped.
    pub async fn environment_values(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, String>, HostingError> {
        let mut values = BTreeMap::new();
        for env in self.environment() {
            let value = match env.value {
                EnvironmentValue::Literal(s) => Some(s),
                EnvironmentValue::Expression(expr) => expr.get_value(cancel).await?,
            };
            match value {
                Some(v) => {
                    values.insert(env.name, v);
                }
                None => {
                    tracing::debug!(variable = %env.name, "environment value not available yet");
                }
            }
        }
        Ok(values)
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.read().iter()).finish()
    }
}
