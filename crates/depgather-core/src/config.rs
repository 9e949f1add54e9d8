use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use depgather_util::errors::{GatherError, GatherResult};

use crate::framework::TargetFramework;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "depgather.toml";

/// Configuration loaded from `depgather.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatherConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub feed: FeedConfig,
}

/// Resolution settings from `[resolve]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_framework")]
    pub framework: TargetFramework,
    #[serde(default, rename = "include-prerelease")]
    pub include_prerelease: bool,
    #[serde(
        default = "default_max_concurrent_queries",
        rename = "max-concurrent-queries"
    )]
    pub max_concurrent_queries: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            framework: default_framework(),
            include_prerelease: false,
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

fn default_framework() -> TargetFramework {
    TargetFramework::any()
}

fn default_max_concurrent_queries() -> usize {
    8
}

/// Local feed settings from `[feed]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl GatherConfig {
    /// Load the configuration from `path`, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> GatherResult<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| GatherError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let mut config = Self::from_toml(&content)?;
        // relative feed paths are relative to the config file
        if let (Some(feed), Some(dir)) = (config.feed.path.as_mut(), path.parent()) {
            if feed.is_relative() {
                *feed = dir.join(&*feed);
            }
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> GatherResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| GatherError::Config {
            message: format!("Failed to parse config: {e}"),
        })?;
        if config.resolve.max_concurrent_queries == 0 {
            return Err(GatherError::Config {
                message: "max-concurrent-queries must be at least 1".to_string(),
            });
        }
        Ok(config)
    }

    /// Returns the default path to the config file in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }
}
