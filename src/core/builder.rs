//! Graph builder - turns decoded catalog data into a validated [`PartsCatalog`]
//!
//! Construction runs in two phases so that parts may reference parts defined
//! later in the data and so that cycles through several parts are possible:
//!
//! 1. **Allocate** - register a shell (name and level) for every part number,
//!    rejecting duplicates.
//! 2. **Link** - resolve every shell's relation lists against the allocated
//!    shells and the process universe, then build the finished node.
//!
//! Only direct self-references are rejected; longer cycles are valid.

use indexmap::{IndexMap, IndexSet};
use miette::Diagnostic;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::catalog::PartsCatalog;
use crate::entities::part::{Level, PartNode, Relation};

/// Errors raised while building a catalog. Any of these aborts the build.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("duplicate part number '{part_number}'")]
    #[diagnostic(
        code(vinspect::build::duplicate_part),
        help("each part number may appear only once in a catalog")
    )]
    DuplicatePart { part_number: String },

    #[error("part '{part_number}' lists unknown part '{target}' in {relation}")]
    #[diagnostic(
        code(vinspect::build::dangling_reference),
        help("every referenced part number must be defined in the same catalog")
    )]
    DanglingReference {
        part_number: String,
        relation: Relation,
        target: String,
    },

    #[error("part '{part_number}' lists unknown process '{process}'")]
    #[diagnostic(
        code(vinspect::build::unknown_process),
        help("every included process must appear in the processes list")
    )]
    UnknownProcess { part_number: String, process: String },

    #[error("part '{part_number}' references itself in {relation}")]
    #[diagnostic(code(vinspect::build::self_reference))]
    SelfReference {
        part_number: String,
        relation: Relation,
    },

    #[error("part '{part_number}' has invalid level '{level}'")]
    #[diagnostic(code(vinspect::build::invalid_level), help("use custom, 1, 2, or 3"))]
    InvalidLevel { part_number: String, level: String },
}

/// Level as written in the data file: a string or a bare integer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLevel {
    Number(u64),
    Text(String),
}

impl RawLevel {
    fn parse(&self) -> Result<Level, String> {
        match self {
            RawLevel::Number(n) => n.to_string().parse(),
            RawLevel::Text(s) => s.parse(),
        }
    }
}

impl fmt::Display for RawLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLevel::Number(n) => write!(f, "{}", n),
            RawLevel::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<Level> for RawLevel {
    fn from(level: Level) -> Self {
        RawLevel::Text(level.as_str().to_string())
    }
}

/// The relation lists of one part, as written in the data file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelations {
    #[serde(default)]
    pub included_parts: Vec<String>,
    #[serde(default)]
    pub collateral_parts: Vec<String>,
    #[serde(default)]
    pub included_processes: Vec<String>,
}

impl RawRelations {
    pub fn includes<I: IntoIterator<Item = S>, S: Into<String>>(mut self, parts: I) -> Self {
        self.included_parts.extend(parts.into_iter().map(Into::into));
        self
    }

    pub fn collateral<I: IntoIterator<Item = S>, S: Into<String>>(mut self, parts: I) -> Self {
        self.collateral_parts.extend(parts.into_iter().map(Into::into));
        self
    }

    pub fn processes<I: IntoIterator<Item = S>, S: Into<String>>(mut self, processes: I) -> Self {
        self.included_processes
            .extend(processes.into_iter().map(Into::into));
        self
    }
}

/// One part entry: decoded from `[name, level, {relations}]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, RawLevel, RawRelations)")]
pub struct RawPart {
    pub name: String,
    pub level: RawLevel,
    pub relations: RawRelations,
}

impl RawPart {
    pub fn new(name: impl Into<String>, level: impl Into<RawLevel>, relations: RawRelations) -> Self {
        Self {
            name: name.into(),
            level: level.into(),
            relations,
        }
    }
}

impl From<(String, RawLevel, RawRelations)> for RawPart {
    fn from((name, level, relations): (String, RawLevel, RawRelations)) -> Self {
        Self {
            name,
            level,
            relations,
        }
    }
}

/// Decoded catalog data handed to the builder.
///
/// `parts` keeps every entry of the source mapping, duplicates included, so
/// the allocate phase can reject them instead of a decoder silently keeping
/// the last one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalog {
    #[serde(deserialize_with = "deserialize_entries")]
    pub parts: Vec<(String, RawPart)>,
    #[serde(default)]
    pub processes: Vec<String>,
}

impl RawCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, part_number: impl Into<String>, part: RawPart) -> Self {
        self.parts.push((part_number.into(), part));
        self
    }

    pub fn with_processes<I: IntoIterator<Item = S>, S: Into<String>>(mut self, processes: I) -> Self {
        self.processes.extend(processes.into_iter().map(Into::into));
        self
    }
}

/// A bare parts mapping, for data files that keep several catalogs side by
/// side and share one process universe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParts(#[serde(deserialize_with = "deserialize_entries")] pub Vec<(String, RawPart)>);

impl RawParts {
    /// Pair the parts with a process universe
    pub fn with_processes(&self, processes: &[String]) -> RawCatalog {
        RawCatalog {
            parts: self.0.clone(),
            processes: processes.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode a JSON object into its entries, keeping duplicate keys
pub(crate) fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<(String, RawPart)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, RawPart)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of part number to [name, level, relations]")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, RawPart>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

/// Allocated part: name and level known, relations not yet linked
#[derive(Debug)]
struct Shell<'a> {
    name: &'a str,
    level: Level,
    relations: &'a RawRelations,
}

/// Two-phase catalog constructor
#[derive(Debug, Default)]
pub struct GraphBuilder {
    raw: RawCatalog,
}

impl GraphBuilder {
    pub fn new(raw: RawCatalog) -> Self {
        Self { raw }
    }

    /// Run both phases and return the finished, read-only catalog
    pub fn build(self) -> Result<PartsCatalog, BuildError> {
        let processes = self.process_universe();
        let shells = self.allocate()?;
        let parts = Self::link(&shells, &processes)?;

        debug!(
            parts = parts.len(),
            processes = processes.len(),
            "catalog built"
        );

        Ok(PartsCatalog::from_linked(parts, processes))
    }

    fn process_universe(&self) -> IndexSet<String> {
        let mut processes = IndexSet::with_capacity(self.raw.processes.len());
        for process in &self.raw.processes {
            if !processes.insert(process.clone()) {
                warn!(process = %process, "duplicate process id ignored");
            }
        }
        processes
    }

    /// Phase 1: one shell per part number
    fn allocate(&self) -> Result<IndexMap<&str, Shell<'_>>, BuildError> {
        let mut shells = IndexMap::with_capacity(self.raw.parts.len());

        for (part_number, raw) in &self.raw.parts {
            let level = raw.level.parse().map_err(|_| BuildError::InvalidLevel {
                part_number: part_number.clone(),
                level: raw.level.to_string(),
            })?;

            let shell = Shell {
                name: &raw.name,
                level,
                relations: &raw.relations,
            };
            if shells.insert(part_number.as_str(), shell).is_some() {
                return Err(BuildError::DuplicatePart {
                    part_number: part_number.clone(),
                });
            }
        }

        Ok(shells)
    }

    /// Phase 2: validate references and build finished nodes
    fn link(
        shells: &IndexMap<&str, Shell<'_>>,
        processes: &IndexSet<String>,
    ) -> Result<IndexMap<String, PartNode>, BuildError> {
        let mut parts = IndexMap::with_capacity(shells.len());

        for (&part_number, shell) in shells {
            let included = Self::link_parts(
                part_number,
                &shell.relations.included_parts,
                Relation::IncludedPart,
                shells,
            )?;
            let collateral = Self::link_parts(
                part_number,
                &shell.relations.collateral_parts,
                Relation::CollateralPart,
                shells,
            )?;

            let mut included_processes = IndexSet::new();
            for process in &shell.relations.included_processes {
                if !processes.contains(process) {
                    return Err(BuildError::UnknownProcess {
                        part_number: part_number.to_string(),
                        process: process.clone(),
                    });
                }
                included_processes.insert(process.clone());
            }

            let node = PartNode::new(
                part_number,
                shell.name,
                shell.level,
                included,
                collateral,
                included_processes,
            );
            parts.insert(part_number.to_string(), node);
        }

        Ok(parts)
    }

    fn link_parts(
        part_number: &str,
        targets: &[String],
        relation: Relation,
        shells: &IndexMap<&str, Shell<'_>>,
    ) -> Result<IndexSet<String>, BuildError> {
        let mut linked = IndexSet::with_capacity(targets.len());
        for target in targets {
            if target == part_number {
                return Err(BuildError::SelfReference {
                    part_number: part_number.to_string(),
                    relation,
                });
            }
            if !shells.contains_key(target.as_str()) {
                return Err(BuildError::DanglingReference {
                    part_number: part_number.to_string(),
                    relation,
                    target: target.clone(),
                });
            }
            linked.insert(target.clone());
        }
        Ok(linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(relations: RawRelations) -> RawPart {
        RawPart::new("Part", Level::One, relations)
    }

    #[test]
    fn test_build_forward_references() {
        let raw = RawCatalog::new()
            .with_part("A", part(RawRelations::default().collateral(["B"])))
            .with_part("B", part(RawRelations::default()));

        let catalog = GraphBuilder::new(raw).build().unwrap();
        assert!(catalog.get("A").unwrap().collateral_parts().contains("B"));
    }

    #[test]
    fn test_build_accepts_cycles() {
        let raw = RawCatalog::new()
            .with_part("A", part(RawRelations::default().collateral(["B"])))
            .with_part("B", part(RawRelations::default().collateral(["C"])))
            .with_part("C", part(RawRelations::default().includes(["A"])));

        let catalog = GraphBuilder::new(raw).build().unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_build_rejects_self_loop() {
        let raw = RawCatalog::new().with_part("A", part(RawRelations::default().includes(["A"])));

        let err = GraphBuilder::new(raw).build().unwrap_err();
        assert_eq!(
            err,
            BuildError::SelfReference {
                part_number: "A".to_string(),
                relation: Relation::IncludedPart,
            }
        );
    }

    #[test]
    fn test_build_rejects_collateral_self_loop() {
        let raw = RawCatalog::new().with_part("A", part(RawRelations::default().collateral(["A"])));

        let err = GraphBuilder::new(raw).build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::SelfReference { relation: Relation::CollateralPart, .. }
        ));
    }

    #[test]
    fn test_build_rejects_dangling_reference() {
        let raw = RawCatalog::new().with_part("A", part(RawRelations::default().collateral(["MISSING"])));

        let err = GraphBuilder::new(raw).build().unwrap_err();
        assert_eq!(
            err,
            BuildError::DanglingReference {
                part_number: "A".to_string(),
                relation: Relation::CollateralPart,
                target: "MISSING".to_string(),
            }
        );
    }

    #[test]
    fn test_build_rejects_unknown_process() {
        let raw = RawCatalog::new()
            .with_processes(["CLEAN"])
            .with_part("A", part(RawRelations::default().processes(["CLEAN", "POLISH"])));

        let err = GraphBuilder::new(raw).build().unwrap_err();
        assert_eq!(
            err,
            BuildError::UnknownProcess {
                part_number: "A".to_string(),
                process: "POLISH".to_string(),
            }
        );
    }

    #[test]
    fn test_build_rejects_duplicate_from_json() {
        let raw: RawCatalog = serde_json::from_str(
            r#"{
                "parts": {
                    "A": ["First", "1", {}],
                    "A": ["Second", "2", {}]
                },
                "processes": []
            }"#,
        )
        .unwrap();
        assert_eq!(raw.parts.len(), 2);

        let err = GraphBuilder::new(raw).build().unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicatePart {
                part_number: "A".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_invalid_level() {
        let raw: RawCatalog = serde_json::from_str(
            r#"{"parts": {"A": ["Case", 7, {}]}, "processes": []}"#,
        )
        .unwrap();

        let err = GraphBuilder::new(raw).build().unwrap_err();
        assert!(matches!(err, BuildError::InvalidLevel { ref level, .. } if level == "7"));
    }

    #[test]
    fn test_numeric_level_accepted() {
        let raw: RawCatalog = serde_json::from_str(
            r#"{"parts": {"A": ["Case", 3, {"includedProcesses": []}]}, "processes": []}"#,
        )
        .unwrap();

        let catalog = GraphBuilder::new(raw).build().unwrap();
        assert_eq!(catalog.get("A").unwrap().level(), Level::Three);
    }

    #[test]
    fn test_duplicate_process_ids_collapse() {
        let raw = RawCatalog::new().with_processes(["CLEAN", "CLEAN", "TEST"]);
        let catalog = GraphBuilder::new(raw).build().unwrap();
        assert_eq!(catalog.processes().len(), 2);
    }
}
