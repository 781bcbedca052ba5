//! Core module - catalog construction, trimming, coverage and inspection sessions

pub mod builder;
pub mod catalog;
pub mod config;
pub mod coverage;
pub mod loader;
pub mod serial;
pub mod session;
pub mod trim;

pub use builder::{BuildError, GraphBuilder, RawCatalog, RawPart, RawParts, RawRelations};
pub use catalog::PartsCatalog;
pub use config::Config;
pub use coverage::{CoverageReport, CoverageVerifier, ReferenceKind, UnknownReference};
pub use loader::{load_data, load_or_sample, LoadError, LoadedData, RawInspectionData};
pub use serial::SerialError;
pub use session::{Finding, InspectionSession, SessionError};
pub use trim::{Resolution, TrimEngine, TrimError};
