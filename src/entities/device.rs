//! Device profile - a device version expressed as configuration
//!
//! Each supported device version is a value naming its serial-number ranges
//! and which catalog and questionnaire an inspection uses.

use serde::{Deserialize, Serialize};

/// Inclusive serial-number range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct SerialRange {
    pub low: u64,
    pub high: u64,
}

impl SerialRange {
    pub fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, serial: u64) -> bool {
        self.low <= serial && serial <= self.high
    }
}

impl From<(u64, u64)> for SerialRange {
    fn from((low, high): (u64, u64)) -> Self {
        Self::new(low, high)
    }
}

impl From<SerialRange> for (u64, u64) {
    fn from(range: SerialRange) -> Self {
        (range.low, range.high)
    }
}

impl std::fmt::Display for SerialRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Inspection category recorded on the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Repair,
    Recert,
    Rental,
}

impl Default for Category {
    fn default() -> Self {
        Category::Repair
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Repair => write!(f, "repair"),
            Category::Recert => write!(f, "recert"),
            Category::Rental => write!(f, "rental"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "repair" => Ok(Category::Repair),
            "recert" => Ok(Category::Recert),
            "rental" => Ok(Category::Rental),
            _ => Err(format!(
                "Invalid category: {}. Use repair, recert, or rental",
                s
            )),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// A device version and the data it inspects against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    /// Version label, e.g. "V6"
    pub version: String,

    /// Serial numbers belonging to this version
    #[serde(default)]
    pub serial_ranges: Vec<SerialRange>,

    /// Key into the data file's catalogs
    pub catalog: String,

    /// Key into the data file's questionnaires
    pub questionnaire: String,

    /// Disabled profiles are listed but cannot be inspected
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl DeviceProfile {
    /// Whether the serial number falls in any of this profile's ranges
    pub fn accepts(&self, serial: u64) -> bool {
        self.serial_ranges.iter().any(|r| r.contains(serial))
    }

    /// Ranges formatted for display
    pub fn ranges_display(&self) -> String {
        self.serial_ranges
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v6() -> DeviceProfile {
        DeviceProfile {
            version: "V6".to_string(),
            serial_ranges: vec![SerialRange::new(460000, 470000), SerialRange::new(720000, 1125000)],
            catalog: "V6".to_string(),
            questionnaire: "V6".to_string(),
            enabled: true,
        }
    }

    #[test]
    fn test_accepts_inclusive_bounds() {
        let profile = v6();
        assert!(profile.accepts(460000));
        assert!(profile.accepts(470000));
        assert!(profile.accepts(800000));
        assert!(!profile.accepts(470001));
        assert!(!profile.accepts(2000000));
    }

    #[test]
    fn test_profile_deserialize() {
        let json = r#"{"version": "V8", "serialRanges": [[2000000, 2300000]], "catalog": "V8", "questionnaire": "V8", "enabled": false}"#;
        let profile: DeviceProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.version, "V8");
        assert_eq!(profile.serial_ranges, vec![SerialRange::new(2000000, 2300000)]);
        assert!(!profile.enabled);
        assert_eq!(profile.ranges_display(), "2000000-2300000");
    }

    #[test]
    fn test_enabled_defaults_true() {
        let json = r#"{"version": "V6", "catalog": "V6", "questionnaire": "V6"}"#;
        let profile: DeviceProfile = serde_json::from_str(json).unwrap();
        assert!(profile.enabled);
        assert!(profile.serial_ranges.is_empty());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Rental".parse::<Category>().unwrap(), Category::Rental);
        assert!("loaner".parse::<Category>().is_err());
    }
}
