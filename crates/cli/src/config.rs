use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use trainer_api::ClientConfig;

pub const TRAINER_DIR: &str = ".session-trainer";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrainerConfig {
    pub client: ClientConfig,
    #[serde(default)]
    pub rehearsal: RehearsalConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RehearsalConfig {
    /// Expertise used when `rehearse` is started without `--expertise`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_expertise: Option<String>,
}

/// Values from the command line and environment, applied over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub token: Option<String>,
    pub course: Option<String>,
    pub assignment: Option<String>,
}

impl TrainerConfig {
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.url {
            self.client.base_url = url;
        }
        if let Some(token) = overrides.token {
            self.client.token = token;
        }
        if let Some(course) = overrides.course {
            self.client.course_id = course;
        }
        if let Some(assignment) = overrides.assignment {
            self.client.assignment_id = assignment;
        }
    }
}

pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(TRAINER_DIR).join(CONFIG_FILE))
}

/// Read the config at `path`, or defaults when the file does not exist.
pub async fn load(path: &Path) -> Result<TrainerConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(TrainerConfig::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
}

pub async fn save(path: &Path, config: &TrainerConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
