use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::artifacts::{
    ArtifactPaths, CATEGORIES_FILE, EXPECTED_COLUMNS_FILE, LABEL_ENCODER_FILE, MODEL_FILE,
};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "obesity.toml";

/// Application settings, usually read from `obesity.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,
    /// Artifact locations.
    #[serde(default)]
    pub artifacts: ArtifactSettings,
    /// Structured log settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Artifact directory and file names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactSettings {
    /// Directory holding the artifacts.
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
    /// Model document file name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Label encoder file name.
    #[serde(default = "default_label_encoder")]
    pub label_encoder: String,
    /// Expected column order file name.
    #[serde(default = "default_expected_columns")]
    pub expected_columns: String,
    /// Category vocabulary file name.
    #[serde(default = "default_categories")]
    pub categories: String,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
            model: default_model(),
            label_encoder: default_label_encoder(),
            expected_columns: default_expected_columns(),
            categories: default_categories(),
        }
    }
}

impl ArtifactSettings {
    /// Full paths of the four artifacts.
    #[must_use]
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.dir.join(&self.model),
            label_encoder: self.dir.join(&self.label_encoder),
            expected_columns: self.dir.join(&self.expected_columns),
            categories: self.dir.join(&self.categories),
        }
    }
}

/// Structured log settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// JSON-lines log file; logging is off when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Loads configuration from a TOML file. Relative paths resolve against
    /// the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config = Self::parse(&raw).with_context(|| format!("parsing {}", path.display()))?;
        let source_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.artifacts.dir = resolve(&source_dir, &config.artifacts.dir);
        if let Some(log) = config.logging.path.take() {
            config.logging.path = Some(resolve(&source_dir, &log));
        }
        Ok(config)
    }

    /// Loads `path` when given, otherwise `obesity.toml` from the working
    /// directory, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Self::discover(Path::new(".")), Self::load)
    }

    /// Loads [`DEFAULT_CONFIG_FILE`] from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses TOML text without resolving paths.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        anyhow::ensure!(!config.server.bind.trim().is_empty(), "server.bind is empty");
        Ok(config)
    }
}

fn resolve(base: &Path, candidate: &Path) -> PathBuf {
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

fn default_bind() -> String {
    "127.0.0.1:8501".into()
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("dataset")
}

fn default_model() -> String {
    MODEL_FILE.into()
}

fn default_label_encoder() -> String {
    LABEL_ENCODER_FILE.into()
}

fn default_expected_columns() -> String {
    EXPECTED_COLUMNS_FILE.into()
}

fn default_categories() -> String {
    CATEGORIES_FILE.into()
}
