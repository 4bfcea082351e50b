//! Deployment manifest: every resource and parameter rendered with placeholders, never
//! with resolved values, so secrets stay out of the output.

use crate::firebird::{FirebirdDatabaseResource, FirebirdServerResource};
use crate::model::{ApplicationModel, ParameterResource, Resource, ResourceWithConnectionString};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub resources: BTreeMap<String, ManifestResource>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ManifestResource {
    #[serde(rename = "container.v0", rename_all = "camelCase")]
    Container {
        #[serde(skip_serializing_if = "Option::is_none")]
        connection_string: Option<String>,
        image: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        bindings: BTreeMap<String, Binding>,
    },
    #[serde(rename = "value.v0", rename_all = "camelCase")]
    Value { connection_string: String },
    #[serde(rename = "parameter.v0")]
    Parameter {
        value: String,
        inputs: BTreeMap<String, ParameterInput>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub scheme: String,
    pub protocol: String,
    pub transport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u16>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

#[derive(Debug, Serialize)]
pub struct ParameterInput {
    #[serde(rename = "type")]
    pub type_: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<InputDefault>,
}

#[derive(Debug, Serialize)]
pub struct InputDefault {
    pub generate: GenerateInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInput {
    pub min_length: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub special: bool,
}

pub fn build(model: &ApplicationModel) -> Manifest {
    let mut resources = BTreeMap::new();
    for server in model.resources_of::<FirebirdServerResource>() {
        resources.insert(server.qualified_name(), container_entry(&server));
    }
    for database in model.resources_of::<FirebirdDatabaseResource>() {
        resources.insert(
            database.qualified_name(),
            ManifestResource::Value {
                connection_string: database.connection_string_expression().value_expression(),
            },
        );
    }
    for parameter in model.parameters() {
        resources.insert(parameter.name().to_string(), parameter_entry(parameter));
    }
    Manifest { resources }
}

fn container_entry(server: &FirebirdServerResource) -> ManifestResource {
    let annotations = server.annotations();
    let mut env = BTreeMap::new();
    for e in annotations.environment() {
        env.insert(e.name, e.value.value_expression());
    }
    let bindings = annotations
        .endpoints()
        .into_iter()
        .map(|e| {
            let binding = Binding {
                scheme: e.uri_scheme,
                protocol: e.protocol.as_str().to_string(),
                transport: e.transport,
                port: e.port,
                target_port: e.target_port,
                external: e.is_external,
            };
            (e.name, binding)
        })
        .collect();
    ManifestResource::Container {
        connection_string: Some(server.connection_string_expression().value_expression()),
        image: annotations
            .container_image()
            .map(|c| c.reference())
            .unwrap_or_default(),
        env,
        bindings,
    }
}

fn parameter_entry(parameter: &ParameterResource) -> ManifestResource {
    let default = parameter.default().map(|d| {
        let g = d.generator();
        InputDefault {
            generate: GenerateInput {
                min_length: g.min_length,
                special: g.special,
            },
        }
    });
    let mut inputs = BTreeMap::new();
    inputs.insert(
        "value".to_string(),
        ParameterInput {
            type_: "string",
            secret: parameter.is_secret(),
            default,
        },
    );
    ManifestResource::Parameter {
        value: format!("{{{}.inputs.value}}", parameter.name()),
        inputs,
    }
}
