//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{load_or_sample, Config, LoadedData, PartsCatalog};
use crate::entities::device::DeviceProfile;
use crate::entities::question::Questionnaire;

/// Configuration and data every command starts from
pub struct DataContext {
    pub config: Config,
    pub data: LoadedData,
}

impl DataContext {
    /// Load config, then the data file it (or `--data`) names
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();
        let path = global.data.clone().or_else(|| config.data_file.clone());
        let data = load_or_sample(path.as_deref())?;
        Ok(Self { config, data })
    }

    /// Pick a device: explicit flag, then configured default, then the first enabled profile
    pub fn device(&self, requested: Option<&str>) -> Result<&DeviceProfile> {
        if let Some(version) = requested.or(self.config.device.as_deref()) {
            return Ok(self.data.device(version)?);
        }
        self.data
            .default_device()
            .ok_or_else(|| miette::miette!("no enabled device profiles in {}", self.data.source))
    }

    /// Catalog and questionnaire for a device
    pub fn device_data(&self, device: &DeviceProfile) -> Result<(PartsCatalog, Questionnaire)> {
        let catalog = self.data.catalog(&device.catalog)?;
        let questionnaire = self.data.questionnaire(&device.questionnaire)?;
        Ok((catalog, questionnaire))
    }
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("écran cassé", 8), "écran...");
    }
}
