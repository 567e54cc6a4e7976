//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate only sees the values it is handed
//! (output layout, session settings).
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `ARCHC_*` environment variables, `__` between section and key
//!    (`ARCHC_GENERATION__OUTPUT_DIR=build/gen`); a `.env` file is loaded
//!    into the environment first
//! 3. Config file (`--config FILE`, else the platform config directory)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use archc_core::domain::{OutputLayout, SessionConfig};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "ARCHC";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

/// Where artifacts go and how the session runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub output_dir: PathBuf,
    pub sources_dir: PathBuf,
    pub resources_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub debug: bool,
    pub mode: String,
    pub fail_on_validation_errors: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            sources_dir: PathBuf::from("sources"),
            resources_dir: PathBuf::from("resources"),
            docs_dir: PathBuf::from("docs"),
            debug: false,
            mode: "default".into(),
            fail_on_validation_errors: true,
        }
    }
}

impl GenerationConfig {
    /// Layout under `root`, or under `output_dir` when no root is given.
    pub fn layout(&self, root: Option<&Path>) -> OutputLayout {
        OutputLayout::new(root.unwrap_or(&self.output_dir))
            .with_sources(&self.sources_dir)
            .with_resources(&self.resources_dir)
            .with_docs(&self.docs_dir)
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            debug: self.debug,
            mode: self.mode.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from '{}'", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in '{}'", path.display()))
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.archc.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("io", "archc", "archc")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".archc.toml"))
    }
}
