//! Inspection data loading
//!
//! A data file is parsed, checked against the embedded schema, then decoded.
//! Catalogs are only built when asked for, so one broken catalog does not
//! stop work on another device.

use indexmap::IndexMap;
use miette::Diagnostic;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::builder::{BuildError, GraphBuilder, RawParts};
use crate::core::catalog::PartsCatalog;
use crate::core::serial::{profile_for_serial, SerialError};
use crate::entities::device::DeviceProfile;
use crate::entities::question::{Questionnaire, RawQuestionnaire};
use crate::json::{parse_json_str, JsonSyntaxError};
use crate::schema::registry::{sample_data, SAMPLE_DATA};
use crate::schema::validator::{DataValidator, ValidationError};

/// Length of the fingerprint quoted in reports
const FINGERPRINT_LEN: usize = 12;

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read {path}")]
    #[diagnostic(code(vinspect::load::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the bundled sample data is unavailable")]
    #[diagnostic(code(vinspect::load::no_sample))]
    NoSample,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] JsonSyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Serial(#[from] SerialError),

    #[error("no catalog named '{0}'")]
    #[diagnostic(code(vinspect::load::missing_catalog))]
    MissingCatalog(String),

    #[error("no questionnaire named '{0}'")]
    #[diagnostic(code(vinspect::load::missing_questionnaire))]
    MissingQuestionnaire(String),

    #[error("no device profile for version '{0}'")]
    #[diagnostic(code(vinspect::load::unknown_device), help("run `vinspect devices` to list versions"))]
    UnknownDevice(String),

    #[error("device {0} is not enabled for inspection")]
    #[diagnostic(code(vinspect::load::device_disabled))]
    DeviceDisabled(String),
}

/// Report statement templates
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Statements {
    pub opening: Option<String>,
    pub default: Option<String>,
}

/// The data file as written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInspectionData {
    #[serde(default)]
    pub revision: Option<String>,

    #[serde(default)]
    pub statements: Statements,

    #[serde(default)]
    pub processes: Vec<String>,

    #[serde(default)]
    pub catalogs: IndexMap<String, RawParts>,

    #[serde(default)]
    pub questionnaires: IndexMap<String, RawQuestionnaire>,

    #[serde(default)]
    pub devices: Vec<DeviceProfile>,
}

/// A decoded data file and where it came from
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub raw: RawInspectionData,
    pub source: String,
    pub fingerprint: String,
}

impl LoadedData {
    /// Decode data file text
    pub fn from_json(content: &str, source: &str) -> Result<Self, LoadError> {
        let value: serde_json::Value = parse_json_str(content, source)?;
        DataValidator::default().validate(&value, content, source)?;

        // Decoded from text rather than `value` so duplicate keys stay visible
        let raw: RawInspectionData = parse_json_str(content, source)?;

        let fingerprint = fingerprint(content.as_bytes());
        debug!(
            source,
            %fingerprint,
            catalogs = raw.catalogs.len(),
            devices = raw.devices.len(),
            "inspection data decoded"
        );

        Ok(Self {
            raw,
            source: source.to_string(),
            fingerprint,
        })
    }

    /// The bundled sample data
    pub fn sample() -> Result<Self, LoadError> {
        let content = sample_data().ok_or(LoadError::NoSample)?;
        Self::from_json(&content, SAMPLE_DATA)
    }

    pub fn revision(&self) -> &str {
        self.raw.revision.as_deref().unwrap_or("-")
    }

    /// Build the named catalog against the shared process universe
    pub fn catalog(&self, key: &str) -> Result<PartsCatalog, LoadError> {
        let parts = self
            .raw
            .catalogs
            .get(key)
            .ok_or_else(|| LoadError::MissingCatalog(key.to_string()))?;
        let catalog = GraphBuilder::new(parts.with_processes(&self.raw.processes)).build()?;
        Ok(catalog)
    }

    pub fn questionnaire(&self, key: &str) -> Result<Questionnaire, LoadError> {
        self.raw
            .questionnaires
            .get(key)
            .map(Questionnaire::from_raw)
            .ok_or_else(|| LoadError::MissingQuestionnaire(key.to_string()))
    }

    pub fn devices(&self) -> &[DeviceProfile] {
        &self.raw.devices
    }

    /// Enabled profile by version label (case-insensitive)
    pub fn device(&self, version: &str) -> Result<&DeviceProfile, LoadError> {
        let profile = self
            .raw
            .devices
            .iter()
            .find(|d| d.version.eq_ignore_ascii_case(version))
            .ok_or_else(|| LoadError::UnknownDevice(version.to_string()))?;
        ensure_enabled(profile)
    }

    /// Enabled profile whose ranges contain the serial number
    pub fn device_for_serial(&self, serial: u64) -> Result<&DeviceProfile, LoadError> {
        let profile = profile_for_serial(serial, &self.raw.devices)?;
        ensure_enabled(profile)
    }

    /// First enabled profile
    pub fn default_device(&self) -> Option<&DeviceProfile> {
        self.raw.devices.iter().find(|d| d.enabled)
    }
}

fn ensure_enabled(profile: &DeviceProfile) -> Result<&DeviceProfile, LoadError> {
    if profile.enabled {
        Ok(profile)
    } else {
        Err(LoadError::DeviceDisabled(profile.version.clone()))
    }
}

/// Short SHA-256 fingerprint of the data file bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..FINGERPRINT_LEN].to_string()
}

/// Read and decode a data file
pub fn load_data(path: &Path) -> Result<LoadedData, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = LoadedData::from_json(&content, &path.display().to_string())?;
    info!(path = %path.display(), fingerprint = %data.fingerprint, "inspection data loaded");
    Ok(data)
}

/// Load from a path if given, otherwise fall back to the bundled sample
pub fn load_or_sample(path: Option<&Path>) -> Result<LoadedData, LoadError> {
    match path {
        Some(p) => load_data(p),
        None => LoadedData::sample(),
    }
}
