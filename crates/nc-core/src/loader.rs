use crate::config::ChainConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a single configuration file, or every config file in a directory.
    pub fn load(&self, path: &Path) -> Result<ChainConfig> {
        if path.is_dir() {
            self.load_dir(path)
        } else {
            ChainConfig::from_file(path)
        }
    }

    /// Load and merge all `.yaml`, `.yml` and `.json` files in a directory,
    /// in file name order. Files that fail to load are skipped.
    pub fn load_dir(&self, dir: &Path) -> Result<ChainConfig> {
        let mut config = ChainConfig::default();

        if !dir.exists() {
            return Ok(config);
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read configuration directory {:?}", dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_config_file(path))
            .collect();
        paths.sort();

        for path in paths {
            match ChainConfig::from_file(&path) {
                Ok(loaded) => {
                    debug!(path = ?path, tables = loaded.tables.len(), "loaded chain configuration");
                    config.merge(loaded);
                }
                Err(e) => {
                    warn!("Failed to load chain configuration from {:?}: {:#}", path, e);
                }
            }
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_config_file(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml") | Some("json")
        )
}
