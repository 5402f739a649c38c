//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `KILN__<SECTION>__<KEY>`, e.g.
//!    `KILN__OUTPUT__STRATEGY=single`
//! 3. Config file: `--config <FILE>`, or `.kiln.toml` in the working
//!    directory layered over the user config file
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use kiln_adapters::{BUILTIN_PLUGINS, DEFAULT_MANIFEST_NAME, DEFAULT_MAX_DEPTH};
use kiln_core::domain::{DEFAULT_COMMON_NAMESPACE, DEFAULT_FILE_EXTENSION, DEFAULT_GENERATED_SUFFIX, WriteStrategy};

/// Name of the per-directory config file.
pub const LOCAL_CONFIG_FILE: &str = ".kiln.toml";

const ENV_PREFIX: &str = "KILN";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub output: OutputConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Generated directory name and namespace suffix.
    pub suffix: String,
    /// Namespace of the common pseudo-project.
    pub common_namespace: String,
    /// Namespaces never collected, at any depth.
    #[serde(default)]
    pub independent_namespaces: Vec<String>,
    pub fail_fast: bool,
    pub inject_annotations: bool,
    /// Plugins run by `kiln generate` when no `--plugin` is given.
    pub plugins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub strategy: WriteStrategy,
    /// Generated file extension, without the dot.
    pub extension: String,
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`. The `--output-format` flag wins.
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub manifest_name: String,
    pub max_depth: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig {
                suffix: DEFAULT_GENERATED_SUFFIX.into(),
                common_namespace: DEFAULT_COMMON_NAMESPACE.into(),
                independent_namespaces: Vec::new(),
                fail_fast: false,
                inject_annotations: true,
                plugins: BUILTIN_PLUGINS.iter().map(|p| (*p).to_string()).collect(),
            },
            output: OutputConfig {
                strategy: WriteStrategy::default(),
                extension: DEFAULT_FILE_EXTENSION.into(),
                no_color: false,
                format: "auto".into(),
            },
            discovery: DiscoveryConfig {
                manifest_name: DEFAULT_MANIFEST_NAME.into(),
                max_depth: DEFAULT_MAX_DEPTH,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then files, then the process
    /// environment.
    ///
    /// `config_file` is the path passed via `--config`; when given it must
    /// exist and replaces the default file lookup.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        Self::load_from(config_file.map(PathBuf::as_path), None)
    }

    /// Like [`Self::load`], reading environment variables from `env` instead
    /// of the process environment when it is `Some`.
    pub fn load_from(
        config_file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to encode default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder
                .add_source(File::from(Self::config_path()).required(false))
                .add_source(File::from(Path::new(LOCAL_CONFIG_FILE)).required(false)),
        };

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("generation.independent_namespaces")
            .with_list_parse_key("generation.plugins")
            .source(env);

        builder
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kiln.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }
}
