//! Environment variable lookup backed by the process environment and a
//! project-level `.env` file.
//!
//! System variables always shadow file variables. The `.env` file is located
//! and parsed lazily, at most once per [`EnvironmentSource`].

use crate::error::{Error, Result};
use crate::paths::{env_file_path, find_project_root, ENV_FILE};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

static NO_VARS: LazyLock<HashMap<String, String>> = LazyLock::new(HashMap::new);

static GLOBAL: OnceLock<EnvironmentSource> = OnceLock::new();

/// Read-only source of system-level variables.
pub trait EnvProvider {
    /// Look up a variable by its exact, case-sensitive name.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
///
/// Variables whose value is not valid Unicode are treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvProvider for SystemEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvProvider for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Reads a `.env` file into a name/value mapping.
pub trait EnvFileLoader {
    fn load(&self, path: &Path) -> Result<HashMap<String, String>>;
}

impl<F> EnvFileLoader for F
where
    F: Fn(&Path) -> Result<HashMap<String, String>>,
{
    fn load(&self, path: &Path) -> Result<HashMap<String, String>> {
        self(path)
    }
}

/// Default loader backed by `dotenvy`.
///
/// Parsing never writes to the process environment, so already-defined
/// system variables are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotenvLoader;

impl EnvFileLoader for DotenvLoader {
    fn load(&self, path: &Path) -> Result<HashMap<String, String>> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| dotenv_error(path, e))?;

        let mut vars = HashMap::new();
        for item in iter {
            let (name, value) = item.map_err(|e| dotenv_error(path, e))?;
            vars.insert(name, value);
        }
        Ok(vars)
    }
}

fn dotenv_error(path: &Path, err: dotenvy::Error) -> Error {
    match err {
        dotenvy::Error::Io(source) => Error::ReadFile {
            path: path.to_path_buf(),
            source,
        },
        other => Error::ParseEnv {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

/// Outcome of the single `.env` load attempt.
#[derive(Debug, Clone)]
pub enum EnvFile {
    /// A file was found and parsed.
    Loaded {
        path: PathBuf,
        vars: HashMap<String, String>,
    },
    /// No candidate file exists, or loading was disabled.
    Absent,
    /// A candidate file exists but could not be read or parsed.
    ParseError { path: PathBuf, detail: String },
}

impl EnvFile {
    /// File-derived variables; empty unless the file loaded successfully.
    pub fn vars(&self) -> &HashMap<String, String> {
        match self {
            EnvFile::Loaded { vars, .. } => vars,
            EnvFile::Absent | EnvFile::ParseError { .. } => &NO_VARS,
        }
    }

    /// Path of the candidate file, if one was found.
    pub fn path(&self) -> Option<&Path> {
        match self {
            EnvFile::Loaded { path, .. } | EnvFile::ParseError { path, .. } => Some(path),
            EnvFile::Absent => None,
        }
    }
}

/// Options for locating the `.env` file.
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    /// Override current working directory for project root discovery.
    pub cwd: Option<PathBuf>,
    /// Override the file name looked up in the project root (default: `.env`).
    pub env_file: Option<String>,
    /// Never load a file; only system variables are visible.
    pub skip_env_file: bool,
}

/// Variable lookup with precedence system > file.
///
/// # Examples
///
/// ```
/// use composer_env_auth::{EnvOptions, EnvironmentSource};
/// use std::collections::HashMap;
///
/// let system = HashMap::from([("TOKEN".to_string(), "abc".to_string())]);
/// let env = EnvironmentSource::new(system, EnvOptions { skip_env_file: true, ..Default::default() });
///
/// assert_eq!(env.lookup("TOKEN").as_deref(), Some("abc"));
/// assert_eq!(env.lookup("MISSING"), None);
/// ```
pub struct EnvironmentSource {
    system: Box<dyn EnvProvider + Send + Sync>,
    loader: Box<dyn EnvFileLoader + Send + Sync>,
    options: EnvOptions,
    file: OnceLock<EnvFile>,
}

impl std::fmt::Debug for EnvironmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values may be secrets, only report where they came from
        f.debug_struct("EnvironmentSource")
            .field("options", &self.options)
            .field("file", &self.file.get().and_then(EnvFile::path))
            .finish_non_exhaustive()
    }
}

impl EnvironmentSource {
    /// Create a source over the given system provider.
    pub fn new(system: impl EnvProvider + Send + Sync + 'static, options: EnvOptions) -> Self {
        EnvironmentSource {
            system: Box::new(system),
            loader: Box::new(DotenvLoader),
            options,
            file: OnceLock::new(),
        }
    }

    /// Create a source over the real process environment.
    pub fn from_process() -> Self {
        Self::new(SystemEnv, EnvOptions::default())
    }

    /// The process-wide source, created on first use.
    ///
    /// Its `.env` file is therefore loaded at most once per process.
    pub fn global() -> &'static EnvironmentSource {
        GLOBAL.get_or_init(Self::from_process)
    }

    /// Replace the file loader.
    pub fn with_loader(mut self, loader: impl EnvFileLoader + Send + Sync + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Look up a variable, checking the system environment before the file.
    ///
    /// Empty values are returned as-is.
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.system
            .var(name)
            .or_else(|| self.ensure_loaded().vars().get(name).cloned())
    }

    /// Locate and parse the `.env` file on first call; later calls return the
    /// stored outcome without touching the filesystem.
    pub fn ensure_loaded(&self) -> &EnvFile {
        self.file.get_or_init(|| self.load_file())
    }

    /// File-sourced variables only.
    pub fn all_loaded_variables(&self) -> &HashMap<String, String> {
        self.ensure_loaded().vars()
    }

    /// The explicit result of the load attempt.
    pub fn load_outcome(&self) -> &EnvFile {
        self.ensure_loaded()
    }

    fn load_file(&self) -> EnvFile {
        if self.options.skip_env_file {
            return EnvFile::Absent;
        }

        let cwd = self
            .options
            .cwd
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let root = find_project_root(&cwd);
        let name = self.options.env_file.as_deref().unwrap_or(ENV_FILE);

        let Some(path) = env_file_path(&root, name) else {
            tracing::debug!(root = %root.display(), "no env file found");
            return EnvFile::Absent;
        };

        match self.loader.load(&path) {
            Ok(vars) => {
                tracing::debug!(path = %path.display(), count = vars.len(), "loaded env file");
                EnvFile::Loaded { path, vars }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable env file");
                EnvFile::ParseError {
                    path,
                    detail: e.to_string(),
                }
            }
        }
    }
}
