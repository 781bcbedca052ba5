//! Parts catalog - the universe of parts and processes for one device

use indexmap::{IndexMap, IndexSet};

use crate::entities::part::{Level, PartNode};

/// All parts of a device plus the valid process ids.
///
/// Built once by [`GraphBuilder`](crate::core::builder::GraphBuilder) and
/// read-only afterwards; a data change means building a new catalog.
#[derive(Debug, Clone, Default)]
pub struct PartsCatalog {
    parts: IndexMap<String, PartNode>,
    processes: IndexSet<String>,
}

impl PartsCatalog {
    /// Assemble a catalog from already-linked nodes. Only the builder calls
    /// this; it has validated every reference beforehand.
    pub(crate) fn from_linked(parts: IndexMap<String, PartNode>, processes: IndexSet<String>) -> Self {
        Self { parts, processes }
    }

    pub fn get(&self, part_number: &str) -> Option<&PartNode> {
        self.parts.get(part_number)
    }

    pub fn contains_part(&self, part_number: &str) -> bool {
        self.parts.contains_key(part_number)
    }

    pub fn contains_process(&self, process: &str) -> bool {
        self.processes.contains(process)
    }

    pub fn parts(&self) -> impl Iterator<Item = &PartNode> {
        self.parts.values()
    }

    pub fn part_numbers(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn processes(&self) -> &IndexSet<String> {
        &self.processes
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parts at a given classification tier
    pub fn parts_at_level(&self, level: Level) -> impl Iterator<Item = &PartNode> {
        self.parts.values().filter(move |p| p.level() == level)
    }

    /// Parts that list `part_number` in one of their relation sets, as
    /// `(referencing part, relation)` pairs
    pub fn referenced_by(&self, part_number: &str) -> Vec<(&PartNode, &'static str)> {
        let mut refs = Vec::new();
        for node in self.parts.values() {
            if node.included_parts().contains(part_number) {
                refs.push((node, "includes"));
            }
            if node.collateral_parts().contains(part_number) {
                refs.push((node, "collateral"));
            }
        }
        refs
    }

    /// Parts whose included processes resolve `process`
    pub fn resolving_process(&self, process: &str) -> Vec<&PartNode> {
        self.parts
            .values()
            .filter(|p| p.included_processes().contains(process))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{GraphBuilder, RawCatalog};

    fn sample() -> PartsCatalog {
        let raw: RawCatalog = serde_json::from_str(
            r#"{
                "parts": {
                    "A": ["Front case", "1", {"includedParts": ["B"], "collateralParts": ["C"], "includedProcesses": ["CLEAN"]}],
                    "B": ["Keypad", "2", {}],
                    "C": ["Gasket", "custom", {"collateralParts": ["B"]}]
                },
                "processes": ["CLEAN", "CALIBRATE"]
            }"#,
        )
        .unwrap();
        GraphBuilder::new(raw).build().unwrap()
    }

    #[test]
    fn test_lookup() {
        let catalog = sample();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains_part("A"));
        assert!(!catalog.contains_part("Z"));
        assert!(catalog.contains_process("CALIBRATE"));
        assert_eq!(catalog.get("B").unwrap().part_name(), "Keypad");
    }

    #[test]
    fn test_parts_at_level() {
        let catalog = sample();
        let custom: Vec<_> = catalog.parts_at_level(Level::Custom).map(|p| p.part_number()).collect();
        assert_eq!(custom, vec!["C"]);
    }

    #[test]
    fn test_referenced_by() {
        let catalog = sample();
        let refs: Vec<_> = catalog
            .referenced_by("B")
            .into_iter()
            .map(|(node, rel)| (node.part_number(), rel))
            .collect();
        assert_eq!(refs, vec![("A", "includes"), ("C", "collateral")]);
    }

    #[test]
    fn test_resolving_process() {
        let catalog = sample();
        let parts: Vec<_> = catalog.resolving_process("CLEAN").iter().map(|p| p.part_number()).collect();
        assert_eq!(parts, vec!["A"]);
        assert!(catalog.resolving_process("CALIBRATE").is_empty());
    }
}
