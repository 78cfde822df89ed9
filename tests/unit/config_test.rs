use lakerelay::cli::{HandleArgs, QueryArgs};
use lakerelay::config::{
    env_non_empty, load_from_handle_args, load_from_query_args, non_empty,
    DEFAULT_RECOGNIZED_PATH,
};
use std::path::PathBuf;
use std::sync::Mutex;

// --- Env var test infrastructure ---

/// Static mutex to serialize tests that touch process env vars.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// RAII guard that sets env vars on creation and removes them on Drop.
/// Holds the ENV_MUTEX lock for its lifetime.
struct EnvGuard {
    keys: Vec<String>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Create a guard that sets the given env vars and holds the mutex.
    fn new(vars: &[(&str, &str)]) -> Self {
        let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        for (key, val) in vars {
            // SAFETY: env var access is serialized by ENV_MUTEX
            unsafe {
                std::env::set_var(key, val);
            }
        }
        EnvGuard {
            keys: vars.iter().map(|(k, _)| k.to_string()).collect(),
            _lock: lock,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            // SAFETY: env var access is serialized by ENV_MUTEX
            unsafe {
                std::env::remove_var(key);
            }
        }
    }
}

fn make_handle_args(overrides: impl FnOnce(&mut HandleArgs)) -> HandleArgs {
    let mut args = HandleArgs {
        invocation: Some("{}".to_string()),
        invocation_file: None,
        recognized_paths: vec![],
        region: None,
        output_location: Some("s3://results-store/".to_string()),
        workgroup: None,
        catalog: None,
        database: None,
        poll_interval_ms: None,
        timeout: None,
        output: None,
        profile: None,
    };
    overrides(&mut args);
    args
}

fn make_query_args(overrides: impl FnOnce(&mut QueryArgs)) -> QueryArgs {
    let mut args = QueryArgs {
        sql: Some("SELECT 1".to_string()),
        sql_file: None,
        region: None,
        output_location: Some("s3://results-store/".to_string()),
        workgroup: None,
        catalog: None,
        database: None,
        poll_interval_ms: None,
        timeout: None,
        output: None,
        profile: None,
    };
    overrides(&mut args);
    args
}

/// Write a TOML config to a temp file and return its path.
fn write_temp_toml(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("lakerelay-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

// --- Defaults ---

#[test]
fn test_defaults() {
    let config = load_from_handle_args(&make_handle_args(|_| {}), false, None).unwrap();
    assert_eq!(config.athena.output_location, "s3://results-store/");
    assert_eq!(config.poll_interval_ms, 1000);
    assert_eq!(config.query_timeout_secs, 60);
    assert!(!config.verbose);
    assert!(config.output_file.is_none());
    assert_eq!(config.recognized_paths.len(), 1);
    assert!(config.recognized_paths.contains(DEFAULT_RECOGNIZED_PATH));
}

#[test]
fn test_missing_output_location_errors() {
    let args = make_handle_args(|a| a.output_location = None);
    let result = load_from_handle_args(&args, false, None);
    assert!(result.is_err());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("no output location specified"), "Got: {}", err);
}

#[test]
fn test_empty_output_location_treated_as_unset() {
    // clap resolves an empty env var to Some("")
    let args = make_handle_args(|a| a.output_location = Some(String::new()));
    let result = load_from_handle_args(&args, false, None);
    assert!(result.is_err());
}

// --- Overrides ---

#[test]
fn test_explicit_poll_interval_and_timeout() {
    let args = make_handle_args(|a| {
        a.poll_interval_ms = Some(250);
        a.timeout = Some(120);
    });
    let config = load_from_handle_args(&args, false, None).unwrap();
    assert_eq!(config.poll_interval_ms, 250);
    assert_eq!(config.query_timeout_secs, 120);
}

#[test]
fn test_explicit_recognized_paths() {
    let args = make_handle_args(|a| {
        a.recognized_paths = vec!["/athenaQuery".to_string(), "/reportQuery".to_string()];
    });
    let config = load_from_handle_args(&args, false, None).unwrap();
    assert!(config.recognized_paths.contains("/athenaQuery"));
    assert!(config.recognized_paths.contains("/reportQuery"));
    assert_eq!(config.recognized_paths.len(), 2);
}

#[test]
fn test_athena_target_options() {
    let args = make_handle_args(|a| {
        a.workgroup = Some("primary".to_string());
        a.catalog = Some("AwsDataCatalog".to_string());
        a.database = Some("clinic".to_string());
    });
    let config = load_from_handle_args(&args, false, None).unwrap();
    assert_eq!(config.athena.workgroup.as_deref(), Some("primary"));
    assert_eq!(config.athena.catalog.as_deref(), Some("AwsDataCatalog"));
    assert_eq!(config.athena.database.as_deref(), Some("clinic"));
}

#[test]
fn test_region_std_env_fallback() {
    let _guard = EnvGuard::new(&[("AWS_REGION", "eu-west-1")]);
    let config = load_from_handle_args(&make_handle_args(|_| {}), false, None).unwrap();
    assert_eq!(config.athena.region.as_deref(), Some("eu-west-1"));
}

#[test]
fn test_region_cli_overrides_std_env() {
    let _guard = EnvGuard::new(&[("AWS_REGION", "eu-west-1")]);
    let args = make_handle_args(|a| a.region = Some("us-east-1".to_string()));
    let config = load_from_handle_args(&args, false, None).unwrap();
    assert_eq!(config.athena.region.as_deref(), Some("us-east-1"));
}

// --- Config file ---

#[test]
fn test_config_file_not_found_errors() {
    let bad_path = PathBuf::from("/nonexistent/config.toml");
    let result = load_from_handle_args(&make_handle_args(|_| {}), false, Some(&bad_path));
    assert!(result.is_err());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("config file not found"), "Got: {}", err);
}

#[test]
fn test_profile_resolution() {
    let toml_content = r#"
[defaults]
poll_interval_ms = 500
timeout = 90

[profiles.clinic]
region = "us-east-1"
output_location = "s3://toml-results/"
workgroup = "analytics"
catalog = "AwsDataCatalog"
database = "clinic"
recognized_paths = ["/athenaQuery", "/reportQuery"]
"#;
    let config_path = write_temp_toml("profile", toml_content);

    let args = make_handle_args(|a| {
        a.output_location = None;
        a.profile = Some("clinic".to_string());
    });
    let config = load_from_handle_args(&args, false, Some(&config_path)).unwrap();

    assert_eq!(config.athena.output_location, "s3://toml-results/");
    assert_eq!(config.athena.workgroup.as_deref(), Some("analytics"));
    assert_eq!(config.athena.database.as_deref(), Some("clinic"));
    assert_eq!(config.poll_interval_ms, 500);
    assert_eq!(config.query_timeout_secs, 90);
    assert_eq!(config.recognized_paths.len(), 2);

    std::fs::remove_file(&config_path).ok();
}

#[test]
fn test_cli_overrides_profile() {
    let toml_content = r#"
[profiles.clinic]
output_location = "s3://toml-results/"
workgroup = "analytics"
"#;
    let config_path = write_temp_toml("override", toml_content);

    let args = make_handle_args(|a| {
        a.output_location = Some("s3://cli-results/".to_string());
        a.profile = Some("clinic".to_string());
    });
    let config = load_from_handle_args(&args, false, Some(&config_path)).unwrap();

    assert_eq!(config.athena.output_location, "s3://cli-results/");
    assert_eq!(config.athena.workgroup.as_deref(), Some("analytics"));

    std::fs::remove_file(&config_path).ok();
}

#[test]
fn test_unknown_profile_errors() {
    let config_path = write_temp_toml("unknown-profile", "[defaults]\n");

    let args = make_handle_args(|a| a.profile = Some("missing".to_string()));
    let result = load_from_handle_args(&args, false, Some(&config_path));
    assert!(result.is_err());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("profile 'missing' not found"), "Got: {}", err);

    std::fs::remove_file(&config_path).ok();
}

#[test]
fn test_toml_defaults_verbose() {
    let config_path = write_temp_toml("verbose", "[defaults]\nverbose = true\n");

    let config =
        load_from_handle_args(&make_handle_args(|_| {}), false, Some(&config_path)).unwrap();
    assert!(config.verbose);

    std::fs::remove_file(&config_path).ok();
}

// --- Query args loader ---

#[test]
fn test_query_args_get_default_recognized_path() {
    let config = load_from_query_args(&make_query_args(|_| {}), false, None).unwrap();
    assert_eq!(config.recognized_paths.len(), 1);
    assert!(config.recognized_paths.contains(DEFAULT_RECOGNIZED_PATH));
}

#[test]
fn test_query_args_output_file() {
    let args = make_query_args(|a| a.output = Some(PathBuf::from("rows.json")));
    let config = load_from_query_args(&args, false, None).unwrap();
    assert_eq!(config.output_file, Some(PathBuf::from("rows.json")));
}

// --- Helpers ---

#[test]
fn test_non_empty_none() {
    assert_eq!(non_empty(None), None);
}

#[test]
fn test_non_empty_empty_string() {
    assert_eq!(non_empty(Some("")), None);
}

#[test]
fn test_non_empty_value() {
    assert_eq!(non_empty(Some("value")), Some("value"));
}

#[test]
fn test_env_non_empty_unset() {
    let _guard = EnvGuard::new(&[]);
    // Ensure the var is not set
    unsafe {
        std::env::remove_var("TEST_LAKERELAY_UNSET");
    }
    assert_eq!(env_non_empty("TEST_LAKERELAY_UNSET"), None);
}

#[test]
fn test_env_non_empty_empty() {
    let _guard = EnvGuard::new(&[("TEST_LAKERELAY_EMPTY", "")]);
    assert_eq!(env_non_empty("TEST_LAKERELAY_EMPTY"), None);
}

#[test]
fn test_env_non_empty_value() {
    let _guard = EnvGuard::new(&[("TEST_LAKERELAY_VAL", "value")]);
    assert_eq!(env_non_empty("TEST_LAKERELAY_VAL"), Some("value".to_string()));
}
