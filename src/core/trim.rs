//! Trim engine - cascading resolution of required parts and processes
//!
//! Starting from a seed (the parts and processes a question names), the
//! engine repeatedly applies each reached part's relations until nothing
//! changes:
//!
//! - an **included** part is already satisfied and leaves the required set
//!   for the rest of the run,
//! - a **collateral** part becomes required and is resolved in turn,
//! - an **included** process leaves the required process set.
//!
//! The walk is an explicit FIFO worklist with a visited set, so cycles
//! terminate and the processing order (and with it the result) is fixed by
//! the seed order.

use indexmap::IndexSet;
use miette::Diagnostic;
use serde::Serialize;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, trace};

use crate::core::catalog::PartsCatalog;

/// Errors that abort a single trim run
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum TrimError {
    #[error("seed part '{part_number}' is not in the catalog")]
    #[diagnostic(
        code(vinspect::trim::unknown_seed_part),
        help("questions may only name parts defined in the device catalog")
    )]
    UnknownSeedPart { part_number: String },
}

/// Outcome of one trim run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Parts still to be addressed
    pub required_parts: IndexSet<String>,

    /// Processes still to be performed
    pub required_processes: IndexSet<String>,

    /// Every part whose relations were applied, in processing order
    pub visited: IndexSet<String>,

    /// Every process some visited part includes, whether or not it was
    /// part of the seed
    pub resolved_processes: IndexSet<String>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.required_parts.is_empty() && self.required_processes.is_empty()
    }
}

/// Mutable state of one run. Never shared between runs.
#[derive(Debug, Default)]
struct TrimState {
    required_parts: IndexSet<String>,
    required_processes: IndexSet<String>,
    visited: IndexSet<String>,
    frontier: VecDeque<String>,
    /// Parts removed as included; they stay out for the rest of the run
    excluded: IndexSet<String>,
    resolved_processes: IndexSet<String>,
}

impl TrimState {
    fn seeded<P, R>(seed_parts: P, seed_processes: R) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut state = Self::default();
        for part in seed_parts {
            let part = part.as_ref();
            if state.required_parts.insert(part.to_string()) {
                state.frontier.push_back(part.to_string());
            }
        }
        state.required_processes = seed_processes
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        state
    }

    fn into_resolution(self) -> Resolution {
        Resolution {
            required_parts: self.required_parts,
            required_processes: self.required_processes,
            visited: self.visited,
            resolved_processes: self.resolved_processes,
        }
    }
}

/// Resolves seeds against a shared, read-only catalog
#[derive(Debug, Clone, Copy)]
pub struct TrimEngine<'a> {
    catalog: &'a PartsCatalog,
}

impl<'a> TrimEngine<'a> {
    pub fn new(catalog: &'a PartsCatalog) -> Self {
        Self { catalog }
    }

    /// Compute the fixpoint for a seed.
    ///
    /// Every seed part must exist in the catalog; otherwise the run is
    /// aborted and no partial result is returned. Seed processes are taken
    /// as given.
    pub fn trim<P, R>(&self, seed_parts: P, seed_processes: R) -> Result<Resolution, TrimError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut state = TrimState::seeded(seed_parts, seed_processes);

        if let Some(unknown) = state
            .required_parts
            .iter()
            .find(|p| !self.catalog.contains_part(p))
        {
            return Err(TrimError::UnknownSeedPart {
                part_number: unknown.clone(),
            });
        }

        while let Some(part_number) = state.frontier.pop_front() {
            if !state.visited.insert(part_number.clone()) {
                continue;
            }
            self.apply(&part_number, &mut state);
        }

        debug!(
            required_parts = state.required_parts.len(),
            required_processes = state.required_processes.len(),
            visited = state.visited.len(),
            "trim reached fixpoint"
        );

        Ok(state.into_resolution())
    }

    /// Apply one part's relations to the state
    fn apply(&self, part_number: &str, state: &mut TrimState) {
        // Frontier entries are either validated seeds or collateral parts the
        // builder linked, so the lookup cannot miss.
        let Some(node) = self.catalog.get(part_number) else {
            return;
        };
        trace!(part = part_number, "resolving");

        for included in node.included_parts() {
            if state.required_parts.shift_remove(included) {
                trace!(part = part_number, included = %included, "included part satisfied");
            }
            state.excluded.insert(included.clone());
        }

        for collateral in node.collateral_parts() {
            if state.required_parts.contains(collateral)
                || state.visited.contains(collateral)
                || state.excluded.contains(collateral)
            {
                continue;
            }
            trace!(part = part_number, collateral = %collateral, "collateral part required");
            state.required_parts.insert(collateral.clone());
            state.frontier.push_back(collateral.clone());
        }

        for process in node.included_processes() {
            state.required_processes.shift_remove(process);
            state.resolved_processes.insert(process.clone());
        }
    }
}

/// Convenience wrapper around [`TrimEngine::trim`]
pub fn trim<P, R>(catalog: &PartsCatalog, seed_parts: P, seed_processes: R) -> Result<Resolution, TrimError>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    TrimEngine::new(catalog).trim(seed_parts, seed_processes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{GraphBuilder, RawCatalog, RawPart, RawRelations};
    use crate::entities::part::Level;
    use proptest::prelude::*;

    const NONE: [&str; 0] = [];

    fn catalog(parts: &[(&str, RawRelations)], processes: &[&str]) -> PartsCatalog {
        let mut raw = RawCatalog::new().with_processes(processes.iter().copied());
        for (pn, relations) in parts {
            raw = raw.with_part(*pn, RawPart::new(*pn, Level::One, relations.clone()));
        }
        GraphBuilder::new(raw).build().unwrap()
    }

    fn rel() -> RawRelations {
        RawRelations::default()
    }

    fn names(set: &IndexSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_included_part_removed() {
        let cat = catalog(&[("A", rel().includes(["B"])), ("B", rel())], &[]);
        let res = trim(&cat, ["A", "B"], NONE).unwrap();
        assert_eq!(names(&res.required_parts), vec!["A"]);
    }

    #[test]
    fn test_collateral_part_added() {
        let cat = catalog(&[("A", rel().collateral(["C"])), ("C", rel())], &[]);
        let res = trim(&cat, ["A"], NONE).unwrap();
        assert_eq!(names(&res.required_parts), vec!["A", "C"]);
        assert_eq!(names(&res.visited), vec!["A", "C"]);
    }

    #[test]
    fn test_collateral_cascades() {
        let cat = catalog(
            &[
                ("A", rel().collateral(["B"])),
                ("B", rel().collateral(["C"])),
                ("C", rel().includes(["D"])),
                ("D", rel()),
            ],
            &[],
        );
        let res = trim(&cat, ["A", "D"], NONE).unwrap();
        assert_eq!(names(&res.required_parts), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_process_resolution() {
        let cat = catalog(&[("A", rel().processes(["P1"]))], &["P1", "P2"]);
        let res = trim(&cat, ["A"], ["P1", "P2"]).unwrap();
        assert_eq!(names(&res.required_processes), vec!["P2"]);
        assert_eq!(names(&res.resolved_processes), vec!["P1"]);
    }

    #[test]
    fn test_unseeded_process_not_added() {
        let cat = catalog(&[("A", rel().processes(["P1"]))], &["P1"]);
        let res = trim(&cat, ["A"], NONE).unwrap();
        assert!(res.required_processes.is_empty());
        assert!(res.resolved_processes.contains("P1"));
    }

    #[test]
    fn test_cycle_terminates() {
        let cat = catalog(&[("A", rel().collateral(["B"])), ("B", rel().collateral(["A"]))], &[]);
        let res = trim(&cat, ["A"], NONE).unwrap();
        assert_eq!(names(&res.required_parts), vec!["A", "B"]);
        assert_eq!(res.visited.len(), 2);
    }

    #[test]
    fn test_removed_part_not_readded_by_collateral() {
        // A includes C, B lists C as collateral; C stays out once removed
        let cat = catalog(
            &[
                ("A", rel().includes(["C"])),
                ("B", rel().collateral(["C"])),
                ("C", rel()),
            ],
            &[],
        );
        let res = trim(&cat, ["A", "B"], NONE).unwrap();
        assert_eq!(names(&res.required_parts), vec!["A", "B"]);
    }

    #[test]
    fn test_collateral_later_included_is_removed() {
        // A adds C as collateral; B, processed after A, includes C
        let cat = catalog(
            &[
                ("A", rel().collateral(["C"])),
                ("B", rel().includes(["C"])),
                ("C", rel()),
            ],
            &[],
        );
        let res = trim(&cat, ["A", "B"], NONE).unwrap();
        assert_eq!(names(&res.required_parts), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_seed_part_aborts() {
        let cat = catalog(&[("A", rel())], &[]);
        let err = trim(&cat, ["A", "Z"], NONE).unwrap_err();
        assert_eq!(
            err,
            TrimError::UnknownSeedPart {
                part_number: "Z".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_seed_parts_collapse() {
        let cat = catalog(&[("A", rel())], &[]);
        let res = trim(&cat, ["A", "A"], NONE).unwrap();
        assert_eq!(names(&res.required_parts), vec!["A"]);
    }

    #[test]
    fn test_empty_seed() {
        let cat = catalog(&[("A", rel())], &[]);
        let res = trim(&cat, NONE, NONE).unwrap();
        assert!(res.is_empty());
        assert!(res.visited.is_empty());
    }

    /// Random catalogs over `n` parts; edges never point a part at itself
    fn arb_catalog() -> impl Strategy<Value = (PartsCatalog, Vec<String>)> {
        (2usize..8).prop_flat_map(|n| {
            let edges = prop::collection::vec((0..n, 0..n, any::<bool>()), 0..(n * 3));
            let seed = prop::collection::vec(0..n, 0..n);
            (Just(n), edges, seed).prop_map(|(n, edges, seed)| {
                let mut relations = vec![rel(); n];
                for (from, to, collateral) in edges {
                    if from == to {
                        continue;
                    }
                    let target = format!("P{}", to);
                    if collateral {
                        relations[from].collateral_parts.push(target);
                    } else {
                        relations[from].included_parts.push(target);
                    }
                }
                let mut raw = RawCatalog::new();
                for (i, relation) in relations.into_iter().enumerate() {
                    let pn = format!("P{}", i);
                    raw = raw.with_part(pn.clone(), RawPart::new(pn, Level::Two, relation));
                }
                let cat = GraphBuilder::new(raw).build().unwrap();
                let seed = seed.into_iter().map(|i| format!("P{}", i)).collect();
                (cat, seed)
            })
        })
    }

    proptest! {
        #[test]
        fn prop_trim_is_idempotent((cat, seed) in arb_catalog()) {
            let first = trim(&cat, &seed, NONE).unwrap();
            let second = trim(&cat, &seed, NONE).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_visits_each_part_at_most_once((cat, seed) in arb_catalog()) {
            let res = trim(&cat, &seed, NONE).unwrap();
            prop_assert!(res.visited.len() <= cat.len());
            for part in &res.required_parts {
                prop_assert!(cat.contains_part(part));
            }
        }
    }
}
