//! Path resolution for project files.
//!
//! This module handles discovering the project root and the locations of
//! `composer.json`, `.env` and `auth.json`.

use std::path::{Path, PathBuf};

/// File that marks a project root.
pub const MANIFEST_FILE: &str = "composer.json";

/// Environment-definition file looked up in the project root.
pub const ENV_FILE: &str = ".env";

/// Composer's persisted authentication file.
pub const AUTH_FILE: &str = "auth.json";

/// Walk up from the given directory looking for the first directory
/// containing a `composer.json` file.
///
/// Falls back to the starting directory if nothing is found.
pub fn find_project_root(cwd: &Path) -> PathBuf {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join(MANIFEST_FILE).is_file() {
            return current;
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent.to_path_buf();
            }
            _ => break,
        }
    }

    cwd.to_path_buf()
}

/// Get the `.env` candidate inside a project root, if it exists.
pub fn env_file_path(root: &Path, name: &str) -> Option<PathBuf> {
    let path = root.join(name);
    path.is_file().then_some(path)
}

/// Get the path to the manifest in the given directory (`{dir}/composer.json`).
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}

/// Get the path to the project-level `auth.json` (`{root}/auth.json`).
pub fn project_auth_path(root: &Path) -> PathBuf {
    root.join(AUTH_FILE)
}

/// Resolve Composer's home directory.
///
/// `COMPOSER_HOME` wins when set and non-empty. Otherwise this is
/// `{configDir}/composer` (e.g. `~/.config/composer` on Linux).
///
/// Returns `None` if no home can be determined.
pub fn composer_home() -> Option<PathBuf> {
    match std::env::var("COMPOSER_HOME") {
        Ok(home) if !home.is_empty() => Some(expand_tilde(&home)),
        _ => dirs::config_dir().map(|dir| dir.join("composer")),
    }
}

/// Get the path to the global `auth.json` (`{composerHome}/auth.json`).
pub fn global_auth_path() -> Option<PathBuf> {
    composer_home().map(|home| home.join(AUTH_FILE))
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_project_root_with_manifest() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project_dir = temp_dir.path().join("project");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("composer.json"), "{}").unwrap();

        let sub_dir = project_dir.join("src").join("Http");
        std::fs::create_dir_all(&sub_dir).unwrap();

        assert_eq!(find_project_root(&sub_dir), project_dir);
    }

    #[test]
    fn test_find_project_root_is_inclusive() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("composer.json"), "{}").unwrap();

        assert_eq!(find_project_root(temp_dir.path()), temp_dir.path());
    }

    #[test]
    fn test_find_project_root_prefers_nearest() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("composer.json"), "{}").unwrap();
        let nested = temp_dir.path().join("packages").join("inner");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("composer.json"), "{}").unwrap();

        let start = nested.join("src");
        std::fs::create_dir_all(&start).unwrap();

        assert_eq!(find_project_root(&start), nested);
    }

    #[test]
    fn test_find_project_root_ignores_manifest_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project_dir = temp_dir.path().join("project");
        std::fs::create_dir_all(project_dir.join("composer.json")).unwrap();

        // A directory named like the marker does not count
        let result = find_project_root(&project_dir);
        assert_eq!(result, project_dir);
    }

    #[test]
    fn test_find_project_root_fallback() {
        let temp_dir = tempfile::tempdir().unwrap();
        let empty_dir = temp_dir.path().join("empty");
        std::fs::create_dir_all(&empty_dir).unwrap();

        assert_eq!(find_project_root(&empty_dir), empty_dir);
    }

    #[test]
    fn test_env_file_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(env_file_path(temp_dir.path(), ".env"), None);

        std::fs::write(temp_dir.path().join(".env"), "A=1\n").unwrap();
        assert_eq!(
            env_file_path(temp_dir.path(), ".env"),
            Some(temp_dir.path().join(".env"))
        );
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(expand_tilde("~/foo/bar"), home.join("foo/bar"));
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(
            expand_tilde("/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_manifest_and_auth_paths() {
        let root = PathBuf::from("/home/user/project");
        assert_eq!(
            manifest_path(&root),
            PathBuf::from("/home/user/project/composer.json")
        );
        assert_eq!(
            project_auth_path(&root),
            PathBuf::from("/home/user/project/auth.json")
        );
    }

    #[test]
    fn test_composer_home_resolution() {
        // Single test so the variable is never changed concurrently
        let saved = std::env::var_os("COMPOSER_HOME");

        std::env::set_var("COMPOSER_HOME", "/opt/composer-home");
        assert_eq!(composer_home(), Some(PathBuf::from("/opt/composer-home")));
        assert_eq!(
            global_auth_path(),
            Some(PathBuf::from("/opt/composer-home/auth.json"))
        );

        std::env::set_var("COMPOSER_HOME", "");
        let fallback = dirs::config_dir().map(|dir| dir.join("composer"));
        assert_eq!(composer_home(), fallback);
        assert_eq!(
            global_auth_path(),
            fallback.map(|home| home.join("auth.json"))
        );

        std::env::set_var("COMPOSER_HOME", "~/x");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(composer_home(), Some(home.join("x")));
            assert_eq!(global_auth_path(), Some(home.join("x").join("auth.json")));
        }

        match saved {
            Some(value) => std::env::set_var("COMPOSER_HOME", value),
            None => std::env::remove_var("COMPOSER_HOME"),
        }
    }
}
