use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use eeg_types::DEFAULT_SAMPLING_RATE;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Upper bound on an uploaded data file, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Label drawn on the artwork when the request does not name a subject.
pub const DEFAULT_SUBJECT_LABEL: &str = "Brain Wave Art";

/// Configuration for the analysis service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Sampling rate used when the header does not state one
    pub default_sampling_rate: u32,
    /// Largest accepted upload file, data or header
    pub max_upload_bytes: usize,
    /// Label handed to the renderer
    pub subject_label: String,
    /// Parent directory for staged uploads; the system temp dir when unset
    pub staging_dir: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            default_sampling_rate: DEFAULT_SAMPLING_RATE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            subject_label: DEFAULT_SUBJECT_LABEL.to_string(),
            staging_dir: None,
        }
    }
}

impl DaemonConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_sampling_rate == 0 {
            bail!("default_sampling_rate must be positive");
        }
        if self.max_upload_bytes == 0 {
            bail!("max_upload_bytes must be positive");
        }
        Ok(())
    }
}

/// Load daemon configuration from `path`, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<DaemonConfig> {
    if !path.exists() {
        info!("No configuration at {}, using defaults", path.display());
        return Ok(DaemonConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read configuration file at '{}'", path.display()))?;
    let config: DaemonConfig = serde_json::from_str(&contents)
        .with_context(|| format!("Could not parse configuration file at '{}'", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in '{}'", path.display()))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
