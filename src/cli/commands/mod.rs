//! CLI command implementations

pub mod completions;
pub mod coverage;
pub mod devices;
pub mod inspect;
pub mod parts;
pub mod trim;
pub mod validate;
