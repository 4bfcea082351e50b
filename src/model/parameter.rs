//! Named configuration values, optionally secret and optionally generated.

use crate::error::HostingError;
use crate::model::expression::ValueProvider;
use crate::store::SecretStore;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
// No ';', '=', '{', '}' or quotes: generated values end up inside connection strings.
const SPECIAL: &[u8] = b"-_.~!*+()";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedPassword {
    pub min_length: usize,
    pub lower: bool,
    pub upper: bool,
    pub numeric: bool,
    pub special: bool,
}

impl Default for GeneratedPassword {
    fn default() -> Self {
        GeneratedPassword {
            min_length: 22,
            lower: true,
            upper: true,
            numeric: true,
            special: true,
        }
    }
}

impl GeneratedPassword {
    fn classes(&self) -> Vec<&'static [u8]> {
        let mut classes = Vec::with_capacity(4);
        if self.lower {
            classes.push(LOWER);
        }
        if self.upper {
            classes.push(UPPER);
        }
        if self.numeric {
            classes.push(DIGITS);
        }
        if self.special {
            classes.push(SPECIAL);
        }
        if classes.is_empty() {
            classes.push(LOWER);
        }
        classes
    }

    /// At least one character from every enabled class, padded to `min_length`, shuffled.
    pub fn generate(&self) -> String {
        let classes = self.classes();
        let alphabet: Vec<u8> = classes.iter().flat_map(|c| c.iter().copied()).collect();
        let mut rng = rand::thread_rng();
        let length = self.min_length.max(classes.len());

        let mut out: Vec<u8> = classes
            .iter()
            .map(|c| c[rng.gen_range(0..c.len())])
            .collect();
        while out.len() < length {
            out.push(alphabet[rng.gen_range(0..alphabet.len())]);
        }
        out.shuffle(&mut rng);
        out.into_iter().map(char::from).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterDefault {
    /// Fresh value per parameter instance.
    Generate(GeneratedPassword),
    /// Generated once and kept in the secret store under `key`.
    UserSecret { key: String, generate: GeneratedPassword },
}

impl ParameterDefault {
    pub fn generator(&self) -> &GeneratedPassword {
        match self {
            ParameterDefault::Generate(g) => g,
            ParameterDefault::UserSecret { generate, .. } => generate,
        }
    }

    fn get_default_value(&self, store: &SecretStore) -> String {
        match self {
            ParameterDefault::Generate(g) => g.generate(),
            ParameterDefault::UserSecret { key, generate } => {
                store.get_or_insert_with(key, || generate.generate())
            }
        }
    }
}

pub struct ParameterResource {
    name: String,
    secret: bool,
    default: Option<ParameterDefault>,
    configured: Option<String>,
    store: SecretStore,
    value: OnceLock<String>,
}

impl ParameterResource {
    pub fn new(
        name: impl Into<String>,
        secret: bool,
        configured: Option<String>,
        default: Option<ParameterDefault>,
        store: SecretStore,
    ) -> Self {
        ParameterResource {
            name: name.into(),
            secret,
            default,
            configured,
            store,
            value: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    pub fn default(&self) -> Option<&ParameterDefault> {
        self.default.as_ref()
    }

    /// Configured value first, then the default. Resolved once and cached.
    pub fn value(&self) -> Result<String, HostingError> {
        if let Some(v) = self.value.get() {
            return Ok(v.clone());
        }
        let resolved = match (&self.configured, &self.default) {
            (Some(v), _) => v.clone(),
            (None, Some(default)) => {
                tracing::debug!(parameter = %self.name, "using default parameter value");
                default.get_default_value(&self.store)
            }
            (None, None) => return Err(HostingError::MissingParameterValue(self.name.clone())),
        };
        Ok(self.value.get_or_init(|| resolved).clone())
    }
}

impl std::fmt::Debug for ParameterResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterResource")
            .field("name", &self.name)
            .field("secret", &self.secret)
            .field("default", &self.default)
            .finish()
    }
}

#[async_trait]
impl ValueProvider for ParameterResource {
    fn value_expression(&self) -> String {
        format!("{{{}.value}}", self.name)
    }

    async fn get_value(&self, _cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
        self.value().map(Some)
    }
}
