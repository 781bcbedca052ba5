//! vinspect: visual inspection parts and processes resolver
//!
//! Builds a parts dependency graph from a catalog, trims a damage seed down
//! to the parts and processes that still need attention, and verifies that
//! a questionnaire can reach every catalog entry.

pub mod cli;
pub mod core;
pub mod entities;
pub mod json;
pub mod schema;
