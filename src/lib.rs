//! Composer repository credentials from environment variables.
//!
//! This crate reads per-repository auth descriptors from `composer.json`,
//! resolves the variables they name from the process environment or a
//! project-level `.env` file, and writes the resulting credentials into
//! Composer's auth configuration. Secrets never need to live in
//! version-controlled files.
//!
//! # Quick Start
//!
//! ```no_run
//! use composer_env_auth::{AuthJson, CredentialMapper, EnvironmentSource, MapperOptions};
//! use std::path::Path;
//!
//! let env = EnvironmentSource::global();
//! let mapper = CredentialMapper::load(env, MapperOptions::default());
//!
//! let mut auth = AuthJson::load(Path::new("auth.json"))?;
//! mapper.resolve_and_apply(&mut auth);
//! auth.save()?;
//! # Ok::<(), composer_env_auth::Error>(())
//! ```
//!
//! # Descriptors
//!
//! A repository opts in through an `<namespace>/env-auth` option naming one
//! variable (a token) or two (username and password):
//!
//! ```json
//! {
//!   "repositories": [
//!     { "url": "https://repo.example.com", "options": { "acme/env-auth": "REPO_TOKEN" } },
//!     { "url": "https://git.example.com", "options": {
//!         "acme/env-auth": { "username": "GIT_USER", "password": "GIT_PASS" } } }
//!   ]
//! }
//! ```
//!
//! # Variable Precedence
//!
//! 1. **System** - the process environment
//! 2. **File** - `{projectRoot}/.env`, where the project root is the nearest
//!    ancestor of the working directory containing `composer.json`
//!
//! System values always shadow file values. Empty values count as unset.
//!
//! # Schemes
//!
//! Tokens are classified by hostname: hosts containing `github` map to
//! `github-oauth`, hosts containing `gitlab` to `gitlab-token`, anything else
//! to `http-basic` with username `token`. By default ([`TokenMode::Basic`])
//! every token is written as `http-basic`; [`TokenMode::SchemeSpecific`]
//! writes the GitHub and GitLab sections instead.

mod auth;
mod env;
mod error;
mod manifest;
mod mapper;
mod paths;
pub mod registry;
mod sink;

pub use auth::{
    classify_host, AuthHeader, AuthenticationEntry, Credential, Scheme, TokenMode, TOKEN_USERNAME,
};
pub use env::{
    DotenvLoader, EnvFile, EnvFileLoader, EnvOptions, EnvProvider, EnvironmentSource, SystemEnv,
};
pub use error::{Error, Result};
pub use manifest::{is_env_auth_key, Descriptor, Manifest, Repository, ENV_AUTH_SUFFIX};
pub use mapper::{CredentialMapper, MapperOptions};
pub use paths::{
    composer_home, env_file_path, expand_tilde, find_project_root, global_auth_path, manifest_path,
    project_auth_path, AUTH_FILE, ENV_FILE, MANIFEST_FILE,
};
pub use sink::{AuthJson, AuthSink, MemorySink};
