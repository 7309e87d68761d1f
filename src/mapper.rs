//! Mapping of manifest descriptors to concrete authentication entries.

use crate::auth::{AuthHeader, AuthenticationEntry, TokenMode};
use crate::env::EnvironmentSource;
use crate::manifest::{Descriptor, Manifest};
use crate::paths::manifest_path;
use crate::sink::AuthSink;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Options for building a [`CredentialMapper`].
#[derive(Debug, Clone, Default)]
pub struct MapperOptions {
    /// Override current working directory for locating `composer.json`.
    pub cwd: Option<PathBuf>,
    /// Only recognize this exact options key instead of any `<namespace>/env-auth`.
    pub options_key: Option<String>,
    /// How GitHub and GitLab tokens are written to the sink.
    pub token_mode: TokenMode,
}

/// Resolves repository descriptors through an [`EnvironmentSource`] and
/// applies the results to an [`AuthSink`].
///
/// Missing manifests, unrecognized descriptors and unset or empty variables
/// never produce errors; the affected host simply gets no credentials.
///
/// # Examples
///
/// ```
/// use composer_env_auth::{
///     AuthSink, CredentialMapper, EnvOptions, EnvironmentSource, Manifest, MapperOptions,
///     MemorySink, Scheme,
/// };
/// use std::collections::HashMap;
///
/// let system = HashMap::from([("REPO_TOKEN".to_string(), "tok".to_string())]);
/// let env = EnvironmentSource::new(system, EnvOptions { skip_env_file: true, ..Default::default() });
/// let manifest = Manifest::from_json(
///     r#"{"repositories":[{"url":"https://repo.example.com","options":{"acme/env-auth":"REPO_TOKEN"}}]}"#,
/// );
///
/// let mapper = CredentialMapper::new(&env, manifest, MapperOptions::default());
/// let mut sink = MemorySink::new();
/// mapper.resolve_and_apply(&mut sink);
///
/// let stored = sink.get(Scheme::HttpBasic, "repo.example.com").unwrap();
/// assert_eq!(stored.username_password(), Some(("token", "tok")));
/// ```
#[derive(Debug)]
pub struct CredentialMapper<'a> {
    env: &'a EnvironmentSource,
    manifest: Manifest,
    options: MapperOptions,
    activated: bool,
}

impl<'a> CredentialMapper<'a> {
    pub fn new(env: &'a EnvironmentSource, manifest: Manifest, options: MapperOptions) -> Self {
        CredentialMapper {
            env,
            manifest,
            options,
            activated: false,
        }
    }

    /// Build a mapper over `composer.json` in the working directory.
    ///
    /// A missing or malformed manifest yields a mapper with no descriptors.
    pub fn load(env: &'a EnvironmentSource, options: MapperOptions) -> Self {
        let cwd = options
            .cwd
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let manifest = Manifest::load_or_default(&manifest_path(&cwd));
        Self::new(env, manifest, options)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Descriptors keyed by host; later repositories win for the same host.
    pub fn collect_descriptors(&self) -> BTreeMap<String, Descriptor> {
        self.manifest.descriptors(self.options.options_key.as_deref())
    }

    /// Resolve every descriptor into an entry, skipping unresolved ones.
    pub fn resolve(&self) -> Vec<AuthenticationEntry> {
        self.collect_descriptors()
            .iter()
            .filter_map(|(host, descriptor)| {
                let entry = self.resolve_descriptor(host, descriptor);
                if entry.is_none() {
                    tracing::debug!(%host, "credentials not set, skipping");
                }
                entry
            })
            .collect()
    }

    /// Resolve every descriptor and write the results to `sink`.
    ///
    /// Returns the entries that were applied. Calling this again with the
    /// same environment yields the same sink state.
    pub fn resolve_and_apply<S: AuthSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Vec<AuthenticationEntry> {
        let entries = self.resolve();

        for entry in &entries {
            let (scheme, credential) = entry.normalized(self.options.token_mode);
            tracing::debug!(host = %entry.host, %scheme, "applying credentials");
            sink.set(scheme, &entry.host, credential);
        }

        entries
    }

    /// Run [`resolve_and_apply`](Self::resolve_and_apply) once.
    ///
    /// Returns `false` without touching the sink if already activated.
    pub fn activate<S: AuthSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        if self.activated {
            return false;
        }
        let applied = self.resolve_and_apply(sink);
        tracing::debug!(count = applied.len(), "env auth activated");
        self.activated = true;
        true
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// The first repository with the same hostname as `url`, with its descriptor.
    pub fn find_descriptor_for_url(&self, url: &str) -> Option<(String, Descriptor)> {
        self.manifest
            .find_descriptor_for_url(url, self.options.options_key.as_deref())
    }

    /// The header authenticating a request to `url`, if its repository has
    /// resolvable credentials.
    pub fn auth_header_for(&self, url: &str) -> Option<AuthHeader> {
        let (host, descriptor) = self.find_descriptor_for_url(url)?;

        match descriptor {
            Descriptor::Token(var) => {
                let token = self.resolve_var(&var)?;
                Some(AuthHeader::for_token(&host, &token))
            }
            Descriptor::Basic { username, password } => {
                let username = self.resolve_var(&username)?;
                let password = self.resolve_var(&password)?;
                Some(AuthHeader::basic(&username, &password))
            }
        }
    }

    /// Add the auth header for `url` to a request's headers.
    ///
    /// An existing header with the same name is replaced. Returns `false` and
    /// leaves `headers` untouched when no credentials apply.
    pub fn apply_headers(&self, url: &str, headers: &mut Vec<(String, String)>) -> bool {
        let Some(header) = self.auth_header_for(url) else {
            return false;
        };

        headers.retain(|(name, _)| !name.eq_ignore_ascii_case(header.name));
        headers.push((header.name.to_string(), header.value));
        true
    }

    fn resolve_descriptor(
        &self,
        host: &str,
        descriptor: &Descriptor,
    ) -> Option<AuthenticationEntry> {
        match descriptor {
            Descriptor::Token(var) => {
                let token = self.resolve_var(var)?;
                Some(AuthenticationEntry::from_token(host, token))
            }
            Descriptor::Basic { username, password } => {
                let username = self.resolve_var(username)?;
                let password = self.resolve_var(password)?;
                Some(AuthenticationEntry::basic(host, username, password))
            }
        }
    }

    /// Look up a variable, treating an empty value as unset.
    fn resolve_var(&self, name: &str) -> Option<String> {
        self.env.lookup(name).filter(|value| !value.is_empty())
    }
}
