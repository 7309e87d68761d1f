//! Destinations for resolved credentials.
//!
//! Composer keeps credentials in `auth.json`, one section per scheme:
//!
//! ```json
//! {
//!   "http-basic": { "repo.example.com": { "username": "token", "password": "..." } },
//!   "github-oauth": { "github.com": "..." },
//!   "gitlab-token": { "gitlab.com": "..." }
//! }
//! ```

use crate::auth::{Credential, Scheme};
use crate::error::{Error, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A persisted auth configuration addressed as `<scheme>.<host>`.
pub trait AuthSink {
    /// Store a credential, replacing whatever was stored under the same key.
    fn set(&mut self, scheme: Scheme, host: &str, credential: Credential);

    /// Read back the credential stored under `<scheme>.<host>`.
    fn get(&self, scheme: Scheme, host: &str) -> Option<Credential>;
}

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: BTreeMap<(Scheme, String), Credential>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stored keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = (Scheme, &str)> {
        self.entries
            .keys()
            .map(|(scheme, host)| (*scheme, host.as_str()))
    }
}

impl AuthSink for MemorySink {
    fn set(&mut self, scheme: Scheme, host: &str, credential: Credential) {
        self.entries.insert((scheme, host.to_string()), credential);
    }

    fn get(&self, scheme: Scheme, host: &str) -> Option<Credential> {
        self.entries.get(&(scheme, host.to_string())).cloned()
    }
}

/// A Composer `auth.json` document.
///
/// Sections and keys this crate does not manage are preserved on save.
#[derive(Debug, Clone)]
pub struct AuthJson {
    path: PathBuf,
    document: Map<String, Value>,
}

impl AuthJson {
    /// Load an `auth.json` file.
    ///
    /// A missing file yields an empty document. Returns `Err` if the file
    /// exists but can't be read or isn't a JSON object.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(AuthJson {
                path: path.to_path_buf(),
                document: Map::new(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let document = if content.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&content).map_err(|e| Error::ParseJson {
                path: path.to_path_buf(),
                source: e,
            })?
        };

        Ok(AuthJson {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Write the document back to its path, creating parent directories.
    pub fn save(&self) -> Result<()> {
        let write_err = |e| Error::WriteFile {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let mut content = serde_json::to_string_pretty(&self.document).map_err(|e| {
            Error::ParseJson {
                path: self.path.clone(),
                source: e,
            }
        })?;
        content.push('\n');

        std::fs::write(&self.path, content).map_err(write_err)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw JSON document.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }
}

impl AuthSink for AuthJson {
    fn set(&mut self, scheme: Scheme, host: &str, credential: Credential) {
        let value = match credential {
            Credential::Basic { username, password } => {
                json!({ "username": username, "password": password })
            }
            Credential::Token(token) => Value::String(token),
        };

        let section = self
            .document
            .entry(scheme.config_key())
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(section) = section {
            section.insert(host.to_string(), value);
        }
    }

    fn get(&self, scheme: Scheme, host: &str) -> Option<Credential> {
        let value = self.document.get(scheme.config_key())?.get(host)?;

        match value {
            Value::String(token) => Some(Credential::Token(token.clone())),
            Value::Object(fields) => {
                let username = fields.get("username")?.as_str()?;
                let password = fields.get("password")?.as_str()?;
                Some(Credential::Basic {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            _ => None,
        }
    }
}
