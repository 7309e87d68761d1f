//! Repository auth descriptors read from `composer.json`.
//!
//! Only the `repositories` list is read. Each repository may carry a
//! descriptor under an `<namespace>/env-auth` option:
//!
//! ```json
//! {
//!   "repositories": [
//!     { "type": "composer", "url": "https://repo.example.com",
//!       "options": { "acme/env-auth": "REPO_TOKEN" } },
//!     { "type": "vcs", "url": "https://git.example.com/acme/lib.git",
//!       "options": { "acme/env-auth": { "username": "GIT_USER", "password": "GIT_PASS" } } }
//!   ]
//! }
//! ```
//!
//! Anything that does not fit this shape is skipped rather than rejected.

use crate::error::{Error, Result};
use crate::registry::{host_of, same_host};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Suffix identifying the descriptor option key.
pub const ENV_AUTH_SUFFIX: &str = "/env-auth";

/// Names of the variables holding a repository's credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Descriptor {
    /// A bare string: the name of a variable holding a token.
    Token(String),
    /// Variables holding a username and a password.
    Basic { username: String, password: String },
}

/// One entry of the manifest's `repositories` list.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub url: Option<String>,
    pub options: Map<String, Value>,
}

impl Repository {
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Repository {
            url: object.get("url").and_then(Value::as_str).map(str::to_string),
            options: object
                .get("options")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Decode this repository's descriptor.
    ///
    /// With `options_key` set only that exact key is recognized; otherwise any
    /// `<namespace>/env-auth` key with a non-empty namespace is. Options are
    /// kept in key order, so when several namespaces match the
    /// alphabetically first one wins, not the first one in the document.
    pub fn descriptor(&self, options_key: Option<&str>) -> Option<Descriptor> {
        let value = match options_key {
            Some(key) => self.options.get(key)?,
            None => self
                .options
                .iter()
                .find(|(key, _)| is_env_auth_key(key))
                .map(|(_, value)| value)?,
        };
        Descriptor::deserialize(value).ok()
    }

    /// Hostname of this repository's URL, if it has a parseable one.
    pub fn host(&self) -> Option<String> {
        self.url.as_deref().and_then(|url| host_of(url).ok())
    }
}

/// Check whether an options key names an env-auth descriptor.
pub fn is_env_auth_key(key: &str) -> bool {
    key.strip_suffix(ENV_AUTH_SUFFIX)
        .is_some_and(|namespace| !namespace.is_empty())
}

/// The parts of `composer.json` this crate reads.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub repositories: Vec<Repository>,
}

impl Manifest {
    /// Build from a parsed JSON document.
    ///
    /// `repositories` may be a list or an object keyed by repository name.
    /// A missing key or non-object entries are skipped.
    pub fn from_value(document: &Value) -> Self {
        let repositories = match document.get("repositories") {
            Some(Value::Array(items)) => items.iter().filter_map(Repository::from_value).collect(),
            Some(Value::Object(named)) => named.values().filter_map(Repository::from_value).collect(),
            _ => Vec::new(),
        };
        Manifest { repositories }
    }

    /// Parse a JSON string; malformed input yields an empty manifest.
    pub fn from_json(content: &str) -> Self {
        match serde_json::from_str::<Value>(content) {
            Ok(document) => Self::from_value(&document),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed manifest");
                Self::default()
            }
        }
    }

    /// Load a manifest file.
    ///
    /// Returns `Err` if the file can't be read or isn't valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let document: Value = serde_json::from_str(&content).map_err(|e| Error::ParseJson {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_value(&document))
    }

    /// Load a manifest file, treating any failure as an empty manifest.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "no usable manifest");
            Self::default()
        })
    }

    /// Descriptors keyed by host.
    ///
    /// Repositories without a parseable URL or a recognized descriptor are
    /// skipped. A later repository for the same host replaces an earlier one.
    pub fn descriptors(&self, options_key: Option<&str>) -> BTreeMap<String, Descriptor> {
        let mut result = BTreeMap::new();

        for repository in &self.repositories {
            let Some(descriptor) = repository.descriptor(options_key) else {
                continue;
            };
            let Some(host) = repository.host() else {
                tracing::debug!(url = ?repository.url, "skipping descriptor without a usable URL");
                continue;
            };
            result.insert(host, descriptor);
        }

        result
    }

    /// The first repository whose URL has the same hostname as `url`, with
    /// its host as declared in the manifest and its descriptor.
    ///
    /// Hostnames match case-insensitively. Only repositories that carry a
    /// recognized descriptor are considered.
    pub fn find_descriptor_for_url(
        &self,
        url: &str,
        options_key: Option<&str>,
    ) -> Option<(String, Descriptor)> {
        self.repositories.iter().find_map(|repository| {
            let repository_url = repository.url.as_deref()?;
            if !same_host(repository_url, url) {
                return None;
            }
            let descriptor = repository.descriptor(options_key)?;
            Some((repository.host()?, descriptor))
        })
    }
}
