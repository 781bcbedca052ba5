//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name of the per-directory config file
pub const PROJECT_CONFIG_FILE: &str = "vinspect.yaml";

/// vinspect configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Technician named in reports
    pub technician: Option<String>,

    /// Inspection data file (the bundled sample is used when unset)
    pub data_file: Option<PathBuf>,

    /// Device version used when no serial number picks one
    pub device: Option<String>,

    /// Plain-text copy of every log event
    pub log_file: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/vinspect/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Directory config (vinspect.yaml in the current or a parent directory)
        if let Some(project_path) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover(&cwd))
        {
            if let Some(project) = Self::read_file(&project_path) {
                config.merge(project);
            }
        }

        // 4. Environment variables
        if let Ok(data) = std::env::var("VINSPECT_DATA") {
            config.data_file = Some(PathBuf::from(data));
        }
        if let Ok(technician) = std::env::var("VINSPECT_TECHNICIAN") {
            config.technician = Some(technician);
        }
        if let Ok(device) = std::env::var("VINSPECT_DEVICE") {
            config.device = Some(device);
        }
        if let Ok(log) = std::env::var("VINSPECT_LOG") {
            config.log_file = Some(PathBuf::from(log));
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "vinspect")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Walk up from `start` looking for a directory config file
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Read one config file. Relative paths inside it resolve against its directory.
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        let mut config = match serde_yml::from_str::<Config>(&contents) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                return None;
            }
        };

        if let Some(base) = path.parent() {
            config.data_file = config.data_file.map(|p| resolve(base, p));
            config.log_file = config.log_file.map(|p| resolve(base, p));
        }
        Some(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.technician.is_some() {
            self.technician = other.technician;
        }
        if other.data_file.is_some() {
            self.data_file = other.data_file;
        }
        if other.device.is_some() {
            self.device = other.device;
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the technician name, falling back to git config or username
    pub fn technician(&self) -> String {
        if let Some(ref technician) = self.technician {
            return technician.clone();
        }

        // Try git config
        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        // Fall back to username
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            technician: Some("Ana".to_string()),
            device: Some("V6".to_string()),
            ..Default::default()
        };
        base.merge(Config {
            device: Some("V8".to_string()),
            ..Default::default()
        });
        assert_eq!(base.technician.as_deref(), Some("Ana"));
        assert_eq!(base.device.as_deref(), Some("V8"));
    }

    #[test]
    fn test_read_file_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "technician: Sam\ndata_file: data/inspection.json\n").unwrap();

        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.technician.as_deref(), Some("Sam"));
        assert_eq!(config.data_file, Some(dir.path().join("data/inspection.json")));
        assert_eq!(config.technician(), "Sam");
    }

    #[test]
    fn test_read_file_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "technician: [unclosed\n").unwrap();
        assert!(Config::read_file(&path).is_none());
        assert!(Config::read_file(&dir.path().join("missing.yaml")).is_none());
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "device: V6\n").unwrap();

        assert_eq!(Config::discover(&nested), Some(dir.path().join(PROJECT_CONFIG_FILE)));
    }
}
