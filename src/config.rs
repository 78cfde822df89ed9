use crate::cli::{HandleArgs, QueryArgs};
use crate::error::LakerelayError;
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// Recognized api path when none is configured.
pub const DEFAULT_RECOGNIZED_PATH: &str = "/athenaQuery";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub athena: AthenaConfig,
    pub recognized_paths: BTreeSet<String>,
    pub poll_interval_ms: u64,
    pub query_timeout_secs: u64,
    pub verbose: bool,
    pub output_file: Option<PathBuf>,
}

/// Configured Athena target.
#[derive(Debug)]
pub struct AthenaConfig {
    pub region: Option<String>,
    pub output_location: String,
    pub workgroup: Option<String>,
    pub catalog: Option<String>,
    pub database: Option<String>,
}

// --- TOML config file structs ---

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    defaults: TomlDefaults,
    #[serde(default)]
    profiles: HashMap<String, TomlProfile>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDefaults {
    poll_interval_ms: Option<u64>,
    timeout: Option<u64>,
    verbose: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct TomlProfile {
    region: Option<String>,
    output_location: Option<String>,
    workgroup: Option<String>,
    catalog: Option<String>,
    database: Option<String>,
    recognized_paths: Option<Vec<String>>,
}

/// Config path resolution result — distinguishes explicit vs auto-resolved paths.
struct ResolvedConfigPath {
    path: PathBuf,
    /// true if user explicitly specified via --config or LAKERELAY_CONFIG
    explicit: bool,
}

/// Resolve the config file path: --config flag > env var > platform default.
fn resolve_config_path(cli_config: Option<&PathBuf>) -> Option<ResolvedConfigPath> {
    if let Some(path) = cli_config {
        return Some(ResolvedConfigPath { path: path.clone(), explicit: true });
    }
    if let Ok(path) = std::env::var("LAKERELAY_CONFIG") {
        return Some(ResolvedConfigPath { path: PathBuf::from(path), explicit: true });
    }
    ProjectDirs::from("", "", "lakerelay")
        .map(|dirs| ResolvedConfigPath {
            path: dirs.config_dir().join("config.toml"),
            explicit: false,
        })
}

/// Load and parse the TOML config file (if it exists).
fn load_toml_config(resolved: Option<&ResolvedConfigPath>) -> Result<TomlConfig, LakerelayError> {
    let resolved = match resolved {
        Some(r) => r,
        None => return Ok(TomlConfig::default()),
    };

    if !resolved.path.exists() {
        if resolved.explicit {
            return Err(LakerelayError::Config {
                message: format!("config file not found: {}", resolved.path.display()),
            });
        }
        // Auto-resolved path doesn't exist — that's fine
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&resolved.path).map_err(|e| LakerelayError::Config {
        message: format!("cannot read config file {}: {}", resolved.path.display(), e),
    })?;

    toml::from_str(&content).map_err(|e| LakerelayError::Config {
        message: format!("invalid config file {}: {}", resolved.path.display(), e),
    })
}

/// Treat empty strings as unset (clap resolves empty env vars to Some("")).
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Read an env var, treating empty values as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Per-command option overrides, normalized before resolution.
struct Overrides<'a> {
    region: Option<&'a str>,
    output_location: Option<&'a str>,
    workgroup: Option<&'a str>,
    catalog: Option<&'a str>,
    database: Option<&'a str>,
    recognized_paths: &'a [String],
    poll_interval_ms: Option<u64>,
    timeout: Option<u64>,
    output: Option<&'a PathBuf>,
    profile: Option<&'a str>,
}

fn resolve(
    overrides: Overrides<'_>,
    verbose: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, LakerelayError> {
    let resolved_path = resolve_config_path(config_path);
    let toml_config = load_toml_config(resolved_path.as_ref())?;

    // Load profile if specified
    let profile = overrides.profile.map(|name| {
        toml_config.profiles.get(name).cloned().ok_or_else(|| LakerelayError::Config {
            message: format!("profile '{}' not found in config file", name),
        })
    }).transpose()?;

    let profile = profile.unwrap_or_default();

    // region: CLI/LAKERELAY env > standard AWS env > profile > SDK chain (None)
    let region = non_empty(overrides.region)
        .map(|s| s.to_string())
        .or_else(|| env_non_empty("AWS_REGION"))
        .or_else(|| env_non_empty("AWS_DEFAULT_REGION"))
        .or_else(|| profile.region.clone());

    // output_location: CLI/env > profile > error — never hard-coded
    let output_location = non_empty(overrides.output_location)
        .map(|s| s.to_string())
        .or_else(|| profile.output_location.clone())
        .ok_or_else(|| LakerelayError::Config {
            message: "no output location specified — use --output-location or configure a profile"
                .to_string(),
        })?;

    let workgroup = non_empty(overrides.workgroup)
        .map(|s| s.to_string())
        .or_else(|| profile.workgroup.clone());

    let catalog = non_empty(overrides.catalog)
        .map(|s| s.to_string())
        .or_else(|| profile.catalog.clone());

    let database = non_empty(overrides.database)
        .map(|s| s.to_string())
        .or_else(|| profile.database.clone());

    // recognized paths: CLI > profile > default
    let recognized_paths: BTreeSet<String> = if !overrides.recognized_paths.is_empty() {
        overrides.recognized_paths.iter().cloned().collect()
    } else if let Some(paths) = &profile.recognized_paths
        && !paths.is_empty()
    {
        paths.iter().cloned().collect()
    } else {
        BTreeSet::from([DEFAULT_RECOGNIZED_PATH.to_string()])
    };

    // poll interval: CLI/env > TOML > 1000ms
    let poll_interval_ms = overrides
        .poll_interval_ms
        .unwrap_or_else(|| toml_config.defaults.poll_interval_ms.unwrap_or(1000));

    // timeout: CLI/env > TOML > 60
    let query_timeout_secs = overrides
        .timeout
        .unwrap_or_else(|| toml_config.defaults.timeout.unwrap_or(60));

    // verbose: CLI/env OR TOML default
    let verbose = verbose || toml_config.defaults.verbose.unwrap_or(false);

    Ok(AppConfig {
        athena: AthenaConfig {
            region,
            output_location,
            workgroup,
            catalog,
            database,
        },
        recognized_paths,
        poll_interval_ms,
        query_timeout_secs,
        verbose,
        output_file: overrides.output.cloned(),
    })
}

/// Build AppConfig from `handle` CLI args.
pub fn load_from_handle_args(
    args: &HandleArgs,
    verbose: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, LakerelayError> {
    resolve(
        Overrides {
            region: args.region.as_deref(),
            output_location: args.output_location.as_deref(),
            workgroup: args.workgroup.as_deref(),
            catalog: args.catalog.as_deref(),
            database: args.database.as_deref(),
            recognized_paths: &args.recognized_paths,
            poll_interval_ms: args.poll_interval_ms,
            timeout: args.timeout,
            output: args.output.as_ref(),
            profile: args.profile.as_deref(),
        },
        verbose,
        config_path,
    )
}

/// Build AppConfig from `query` CLI args.
pub fn load_from_query_args(
    args: &QueryArgs,
    verbose: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, LakerelayError> {
    resolve(
        Overrides {
            region: args.region.as_deref(),
            output_location: args.output_location.as_deref(),
            workgroup: args.workgroup.as_deref(),
            catalog: args.catalog.as_deref(),
            database: args.database.as_deref(),
            recognized_paths: &[],
            poll_interval_ms: args.poll_interval_ms,
            timeout: args.timeout,
            output: args.output.as_ref(),
            profile: args.profile.as_deref(),
        },
        verbose,
        config_path,
    )
}
