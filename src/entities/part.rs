//! Part entity - one replaceable or inspectable component of a device

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Classification tier of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Custom,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Custom => "custom",
            Level::One => "1",
            Level::Two => "2",
            Level::Three => "3",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "custom" => Ok(Level::Custom),
            "1" | "one" => Ok(Level::One),
            "2" | "two" => Ok(Level::Two),
            "3" | "three" => Ok(Level::Three),
            _ => Err(format!(
                "Invalid level: {}. Use custom, 1, 2, or 3",
                s
            )),
        }
    }
}

/// Which relation set a reference was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    IncludedPart,
    CollateralPart,
    IncludedProcess,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::IncludedPart => write!(f, "includedParts"),
            Relation::CollateralPart => write!(f, "collateralParts"),
            Relation::IncludedProcess => write!(f, "includedProcesses"),
        }
    }
}

/// A part and its three relation sets.
///
/// Nodes are built fully formed by the graph builder and never change
/// afterwards. Two nodes are equal when their part numbers are equal.
#[derive(Debug, Clone, Serialize)]
pub struct PartNode {
    part_number: String,
    part_name: String,
    level: Level,
    included_parts: IndexSet<String>,
    collateral_parts: IndexSet<String>,
    included_processes: IndexSet<String>,
}

impl PartNode {
    pub fn new(
        part_number: impl Into<String>,
        part_name: impl Into<String>,
        level: Level,
        included_parts: IndexSet<String>,
        collateral_parts: IndexSet<String>,
        included_processes: IndexSet<String>,
    ) -> Self {
        Self {
            part_number: part_number.into(),
            part_name: part_name.into(),
            level,
            included_parts,
            collateral_parts,
            included_processes,
        }
    }

    pub fn part_number(&self) -> &str {
        &self.part_number
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Parts already satisfied once this part is addressed
    pub fn included_parts(&self) -> &IndexSet<String> {
        &self.included_parts
    }

    /// Parts that must also be addressed alongside this one
    pub fn collateral_parts(&self) -> &IndexSet<String> {
        &self.collateral_parts
    }

    /// Processes resolved once this part is addressed
    pub fn included_processes(&self) -> &IndexSet<String> {
        &self.included_processes
    }

    /// Depth of the aligned traversal: the longest of the three relation sets
    pub fn depth(&self) -> usize {
        self.collateral_parts
            .len()
            .max(self.included_parts.len())
            .max(self.included_processes.len())
    }

    /// Walk the three relation sets side by side.
    ///
    /// Every call starts from index 0, so the view can be walked any number
    /// of times.
    pub fn levels(&self) -> RelationLevels<'_> {
        RelationLevels {
            node: self,
            position: 0,
            end: self.depth(),
        }
    }
}

impl PartialEq for PartNode {
    fn eq(&self, other: &Self) -> bool {
        self.part_number == other.part_number
    }
}

impl Eq for PartNode {}

impl Hash for PartNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.part_number.hash(state);
    }
}

impl<'a> IntoIterator for &'a PartNode {
    type Item = RelationLevel<'a>;
    type IntoIter = RelationLevels<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels()
    }
}

/// One row of the aligned traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationLevel<'a> {
    pub collateral: Option<&'a str>,
    pub included_part: Option<&'a str>,
    pub included_process: Option<&'a str>,
}

/// Iterator over a node's relation sets at equal depth
#[derive(Debug, Clone)]
pub struct RelationLevels<'a> {
    node: &'a PartNode,
    position: usize,
    end: usize,
}

impl<'a> Iterator for RelationLevels<'a> {
    type Item = RelationLevel<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.end {
            return None;
        }
        let i = self.position;
        self.position += 1;
        Some(RelationLevel {
            collateral: self.node.collateral_parts.get_index(i).map(String::as_str),
            included_part: self.node.included_parts.get_index(i).map(String::as_str),
            included_process: self.node.included_processes.get_index(i).map(String::as_str),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RelationLevels<'_> {}

impl std::iter::FusedIterator for RelationLevels<'_> {}
