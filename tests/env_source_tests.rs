//! Environment source tests.
//!
//! Tests for `.env` discovery and system/file precedence.

use composer_env_auth::{
    find_project_root, DotenvLoader, EnvFile, EnvFileLoader, EnvOptions, EnvProvider,
    EnvironmentSource, Result, SystemEnv,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn setup(dotenv: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("composer.json"), "{}").unwrap();
    fs::write(temp.path().join(".env"), dotenv).unwrap();
    temp
}

fn source(system: HashMap<String, String>, cwd: &Path) -> EnvironmentSource {
    EnvironmentSource::new(
        system,
        EnvOptions {
            cwd: Some(cwd.to_path_buf()),
            ..Default::default()
        },
    )
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn test_precedence_properties() {
    let temp = setup("BOTH=file\nFILE_ONLY=file\n");
    let system = HashMap::from([
        ("BOTH".to_string(), "system".to_string()),
        ("SYSTEM_ONLY".to_string(), "system".to_string()),
    ]);
    let env = source(system, temp.path());

    assert_eq!(env.lookup("BOTH").as_deref(), Some("system"));
    assert_eq!(env.lookup("FILE_ONLY").as_deref(), Some("file"));
    assert_eq!(env.lookup("SYSTEM_ONLY").as_deref(), Some("system"));
    assert_eq!(env.lookup("NEITHER"), None);
}

#[test]
fn test_empty_system_value_still_shadows_file() {
    let temp = setup("NAME=file\n");
    let system = HashMap::from([("NAME".to_string(), String::new())]);
    let env = source(system, temp.path());

    assert_eq!(env.lookup("NAME").as_deref(), Some(""));
}

#[test]
fn test_all_loaded_variables_is_file_only() {
    let temp = setup("A=1\nB=2\n");
    let system = HashMap::from([("C".to_string(), "3".to_string())]);
    let env = source(system, temp.path());

    let loaded = env.all_loaded_variables();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get("A").map(String::as_str), Some("1"));
    assert!(!loaded.contains_key("C"));
}

#[test]
fn test_dotenv_syntax() {
    let temp = setup(
        "# comment\n\
         export EXPORTED=yes\n\
         QUOTED=\"with spaces\"\n\
         SINGLE='literal $HOME'\n\
         \n\
         LAST=end\n",
    );
    let env = source(HashMap::new(), temp.path());

    assert_eq!(env.lookup("EXPORTED").as_deref(), Some("yes"));
    assert_eq!(env.lookup("QUOTED").as_deref(), Some("with spaces"));
    assert_eq!(env.lookup("SINGLE").as_deref(), Some("literal $HOME"));
    assert_eq!(env.lookup("LAST").as_deref(), Some("end"));
}

#[test]
fn test_process_environment_is_not_mutated() {
    let name = "COMPOSER_ENV_AUTH_TEST_UNSET_VARIABLE";
    let temp = setup(&format!("{}=from-file\n", name));
    let env = EnvironmentSource::new(
        SystemEnv,
        EnvOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..Default::default()
        },
    );

    assert_eq!(env.lookup(name).as_deref(), Some("from-file"));
    assert!(std::env::var(name).is_err());
    assert_eq!(SystemEnv.var(name), None);
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn test_env_file_in_project_root() {
    let temp = setup("ROOT=1\n");
    let sub = temp.path().join("src").join("lib").join("deep");
    fs::create_dir_all(&sub).unwrap();

    assert_eq!(find_project_root(&sub), temp.path());

    let env = source(HashMap::new(), &sub);
    assert_eq!(env.lookup("ROOT").as_deref(), Some("1"));
}

#[test]
fn test_env_file_beside_subdirectory_is_ignored() {
    let temp = setup("ROOT=1\n");
    let sub = temp.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join(".env"), "SUB=1\n").unwrap();

    // Only the project root's .env is a candidate
    let env = source(HashMap::new(), &sub);
    assert_eq!(env.lookup("ROOT").as_deref(), Some("1"));
    assert_eq!(env.lookup("SUB"), None);
}

#[test]
fn test_fallback_to_cwd_without_manifest() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".env"), "HERE=1\n").unwrap();

    let env = source(HashMap::new(), temp.path());
    assert_eq!(env.lookup("HERE").as_deref(), Some("1"));
}

#[test]
fn test_env_directory_is_not_a_candidate() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("composer.json"), "{}").unwrap();
    fs::create_dir_all(temp.path().join(".env")).unwrap();

    let env = source(HashMap::new(), temp.path());
    assert!(matches!(env.load_outcome(), EnvFile::Absent));
}

// =============================================================================
// Load-once
// =============================================================================

#[test]
fn test_file_io_at_most_once() {
    let temp = setup("A=1\n");
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);

    let loader = move |path: &Path| -> Result<HashMap<String, String>> {
        counter.fetch_add(1, Ordering::SeqCst);
        DotenvLoader.load(path)
    };
    let env = source(HashMap::new(), temp.path()).with_loader(loader);

    for _ in 0..5 {
        env.ensure_loaded();
        env.lookup("A");
        env.lookup("MISSING");
    }
    env.all_loaded_variables();

    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_system_hit_does_not_load_file() {
    let temp = setup("A=1\n");
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);

    let system = HashMap::from([("A".to_string(), "sys".to_string())]);
    let loader = move |path: &Path| -> Result<HashMap<String, String>> {
        counter.fetch_add(1, Ordering::SeqCst);
        DotenvLoader.load(path)
    };
    let env = source(system, temp.path()).with_loader(loader);

    assert_eq!(env.lookup("A").as_deref(), Some("sys"));
    assert_eq!(reads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_global_source_is_shared() {
    let a = EnvironmentSource::global();
    let b = EnvironmentSource::global();

    assert!(std::ptr::eq(a, b));
}
