//! Serial number entry and validation

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::device::DeviceProfile;

/// How many times a technician enters the serial number
pub const SERIAL_REDUNDANCY: usize = 2;

/// Inputs that abandon serial entry
pub const QUIT_TOKENS: [&str; 3] = ["q", "quit", "end"];

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum SerialError {
    #[error("'{0}' is not a serial number")]
    #[diagnostic(code(vinspect::serial::invalid), help("serial numbers contain digits only"))]
    Invalid(String),

    #[error("serial numbers do not match: {first} vs {second}")]
    #[diagnostic(code(vinspect::serial::mismatch), help("enter the same serial number each time"))]
    Mismatch { first: u64, second: u64 },

    #[error("serial number {serial} is outside the {device} ranges ({ranges})")]
    #[diagnostic(code(vinspect::serial::out_of_range))]
    OutOfRange {
        serial: u64,
        device: String,
        ranges: String,
    },

    #[error("no device profile accepts serial number {0}")]
    #[diagnostic(code(vinspect::serial::unknown_device))]
    UnknownDevice(u64),

    #[error("serial entry cancelled")]
    Cancelled,
}

/// Whether the input asks to stop entering serial numbers
pub fn is_quit(input: &str) -> bool {
    QUIT_TOKENS.contains(&input.trim().to_lowercase().as_str())
}

/// Parse one serial number entry
pub fn parse_serial(input: &str) -> Result<u64, SerialError> {
    let trimmed = input.trim();
    if is_quit(trimmed) {
        return Err(SerialError::Cancelled);
    }
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(SerialError::Invalid(trimmed.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| SerialError::Invalid(trimmed.to_string()))
}

/// Check redundant entries agree and fall inside the profile's ranges
pub fn confirm_serial<S: AsRef<str>>(entries: &[S], profile: &DeviceProfile) -> Result<u64, SerialError> {
    let mut confirmed: Option<u64> = None;
    for entry in entries {
        let serial = parse_serial(entry.as_ref())?;
        match confirmed {
            Some(first) if first != serial => {
                return Err(SerialError::Mismatch {
                    first,
                    second: serial,
                });
            }
            _ => confirmed = Some(serial),
        }
    }

    let serial = confirmed.ok_or_else(|| SerialError::Invalid(String::new()))?;
    check_range(serial, profile)?;
    Ok(serial)
}

/// Check a serial number against a profile
pub fn check_range(serial: u64, profile: &DeviceProfile) -> Result<(), SerialError> {
    if profile.accepts(serial) {
        Ok(())
    } else {
        Err(SerialError::OutOfRange {
            serial,
            device: profile.version.clone(),
            ranges: profile.ranges_display(),
        })
    }
}

/// First profile whose ranges contain the serial number
pub fn profile_for_serial(serial: u64, profiles: &[DeviceProfile]) -> Result<&DeviceProfile, SerialError> {
    profiles
        .iter()
        .find(|p| p.accepts(serial))
        .ok_or(SerialError::UnknownDevice(serial))
}
