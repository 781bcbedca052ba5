//! Coverage verifier - checks that a questionnaire reaches every catalog entry
//!
//! Each question is resolved through the [`TrimEngine`] with its own seed.
//! A part counts as covered when a resolution still requires it or when a
//! question names it directly. Any part left over fails the check, even one
//! a reached part includes. Processes are checked the same way but only
//! produce a warning.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::catalog::PartsCatalog;
use crate::core::trim::TrimEngine;
use crate::entities::question::{Question, Questionnaire};

/// What kind of identifier a question named that the catalog lacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Part,
    Process,
}

/// A question naming a part or process absent from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownReference {
    pub level: String,
    pub question: String,
    pub kind: ReferenceKind,
    pub id: String,
}

/// Result of a coverage check. Always returned as data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// Union of every question's resolved required parts
    pub covered_parts: IndexSet<String>,

    /// Parts named by some question before resolution
    pub directly_named_parts: IndexSet<String>,

    /// Parts included by a part some resolution reached (informational)
    pub satisfied_parts: IndexSet<String>,

    /// Catalog parts no question reaches (failure)
    pub missing_parts: IndexSet<String>,

    /// Processes named by a question or resolved by a reached part
    pub covered_processes: IndexSet<String>,

    /// Catalog processes no question reaches (warning)
    pub unused_processes: IndexSet<String>,

    /// Questions naming identifiers the catalog does not define (failure)
    pub unknown_references: Vec<UnknownReference>,

    /// Number of questions checked
    pub questions: usize,

    pub passed: bool,
}

impl CoverageReport {
    pub fn has_warnings(&self) -> bool {
        !self.unused_processes.is_empty()
    }

    /// Percentage of catalog parts covered
    pub fn part_coverage_percent(&self, total_parts: usize) -> f64 {
        if total_parts == 0 {
            return 100.0;
        }
        let covered = total_parts.saturating_sub(self.missing_parts.len());
        (covered as f64 / total_parts as f64) * 100.0
    }
}

/// Runs the onto-coverage check against one catalog
#[derive(Debug, Clone, Copy)]
pub struct CoverageVerifier<'a> {
    catalog: &'a PartsCatalog,
}

impl<'a> CoverageVerifier<'a> {
    pub fn new(catalog: &'a PartsCatalog) -> Self {
        Self { catalog }
    }

    pub fn verify(&self, questionnaire: &Questionnaire) -> CoverageReport {
        let engine = TrimEngine::new(self.catalog);
        let mut report = CoverageReport::default();

        for question in questionnaire.iter() {
            report.questions += 1;
            report
                .directly_named_parts
                .extend(question.required_parts.iter().cloned());
            report
                .covered_processes
                .extend(question.required_processes.iter().cloned());

            let unknown = self.unknown_references(question);
            if !unknown.is_empty() {
                for reference in &unknown {
                    warn!(
                        question = %reference.question,
                        id = %reference.id,
                        kind = ?reference.kind,
                        "question names an identifier missing from the catalog"
                    );
                }
                let skips_parts = unknown.iter().any(|r| r.kind == ReferenceKind::Part);
                report.unknown_references.extend(unknown);
                if skips_parts {
                    continue;
                }
            }

            // Seed parts were all checked above, so the run cannot fail
            let Ok(resolution) = engine.trim(&question.required_parts, &question.required_processes)
            else {
                continue;
            };

            report.covered_parts.extend(resolution.required_parts);
            report
                .covered_processes
                .extend(resolution.resolved_processes);
            for visited in &resolution.visited {
                if let Some(node) = self.catalog.get(visited) {
                    report
                        .satisfied_parts
                        .extend(node.included_parts().iter().cloned());
                }
            }
        }

        report.missing_parts = self
            .catalog
            .part_numbers()
            .filter(|p| {
                !report.covered_parts.contains(*p) && !report.directly_named_parts.contains(*p)
            })
            .map(str::to_string)
            .collect();

        report.unused_processes = self
            .catalog
            .processes()
            .iter()
            .filter(|p| !report.covered_processes.contains(*p))
            .cloned()
            .collect();

        report.passed = report.missing_parts.is_empty() && report.unknown_references.is_empty();

        debug!(
            questions = report.questions,
            missing_parts = report.missing_parts.len(),
            unused_processes = report.unused_processes.len(),
            passed = report.passed,
            "coverage verified"
        );

        report
    }

    fn unknown_references(&self, question: &Question) -> Vec<UnknownReference> {
        let parts = question
            .required_parts
            .iter()
            .filter(|p| !self.catalog.contains_part(p))
            .map(|p| (ReferenceKind::Part, p));
        let processes = question
            .required_processes
            .iter()
            .filter(|p| !self.catalog.contains_process(p))
            .map(|p| (ReferenceKind::Process, p));

        parts
            .chain(processes)
            .map(|(kind, id)| UnknownReference {
                level: question.level.clone(),
                question: question.id.clone(),
                kind,
                id: id.clone(),
            })
            .collect()
    }
}

/// Convenience wrapper around [`CoverageVerifier::verify`]
pub fn verify(catalog: &PartsCatalog, questionnaire: &Questionnaire) -> CoverageReport {
    CoverageVerifier::new(catalog).verify(questionnaire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{GraphBuilder, RawCatalog, RawPart, RawRelations};
    use crate::entities::part::Level;

    fn catalog(parts: &[(&str, RawRelations)], processes: &[&str]) -> PartsCatalog {
        let mut raw = RawCatalog::new().with_processes(processes.iter().copied());
        for (pn, relations) in parts {
            raw = raw.with_part(*pn, RawPart::new(*pn, Level::One, relations.clone()));
        }
        GraphBuilder::new(raw).build().unwrap()
    }

    fn questionnaire(questions: Vec<Question>) -> Questionnaire {
        let mut q = Questionnaire::new();
        for question in questions {
            q.insert(question);
        }
        q
    }

    #[test]
    fn test_coverage_passes_through_collateral() {
        let cat = catalog(
            &[("A", RawRelations::default().collateral(["B"])), ("B", RawRelations::default())],
            &[],
        );
        let q = questionnaire(vec![Question::new("1", "Is A damaged?").with_parts(["A"])]);

        let report = verify(&cat, &q);
        assert!(report.missing_parts.is_empty());
        assert!(report.passed);
        assert!(report.covered_parts.contains("B"));
        assert!(!report.directly_named_parts.contains("B"));
    }

    #[test]
    fn test_coverage_fails_on_unreached_part() {
        let cat = catalog(&[("A", RawRelations::default()), ("B", RawRelations::default())], &[]);
        let q = questionnaire(vec![Question::new("1", "Is A damaged?").with_parts(["A"])]);

        let report = verify(&cat, &q);
        assert_eq!(report.missing_parts.iter().collect::<Vec<_>>(), vec!["B"]);
        assert!(!report.passed);
    }

    #[test]
    fn test_included_part_alone_is_not_covered() {
        let cat = catalog(
            &[("A", RawRelations::default().includes(["B"])), ("B", RawRelations::default())],
            &[],
        );
        let q = questionnaire(vec![Question::new("1", "Replace A?").with_parts(["A"])]);

        let report = verify(&cat, &q);
        assert_eq!(report.covered_parts.iter().collect::<Vec<_>>(), vec!["A"]);
        assert!(report.satisfied_parts.contains("B"));
        assert_eq!(report.missing_parts.iter().collect::<Vec<_>>(), vec!["B"]);
        assert!(!report.passed);
    }

    #[test]
    fn test_included_part_covered_when_named() {
        let cat = catalog(
            &[("A", RawRelations::default().includes(["B"])), ("B", RawRelations::default())],
            &[],
        );
        let q = questionnaire(vec![
            Question::new("1", "Replace A?").with_parts(["A"]),
            Question::new("1", "Is B worn?").with_parts(["B"]),
        ]);

        let report = verify(&cat, &q);
        assert!(report.missing_parts.is_empty());
        assert!(report.passed);
    }

    #[test]
    fn test_unused_process_is_warning_only() {
        let cat = catalog(
            &[("A", RawRelations::default().processes(["CLEAN"]))],
            &["CLEAN", "CALIBRATE", "LABEL"],
        );
        let q = questionnaire(vec![
            Question::new("1", "Is A dirty?").with_parts(["A"]),
            Question::new("2", "Label missing?").with_processes(["LABEL"]),
        ]);

        let report = verify(&cat, &q);
        assert!(report.passed);
        assert!(report.has_warnings());
        assert_eq!(report.unused_processes.iter().collect::<Vec<_>>(), vec!["CALIBRATE"]);
    }

    #[test]
    fn test_unknown_references_reported() {
        let cat = catalog(&[("A", RawRelations::default())], &["CLEAN"]);
        let q = questionnaire(vec![
            Question::new("1", "Ghost?").with_parts(["A", "GHOST"]),
            Question::new("1", "Polish?").with_processes(["POLISH"]),
        ]);

        let report = verify(&cat, &q);
        assert!(!report.passed);
        assert_eq!(report.unknown_references.len(), 2);
        assert_eq!(report.unknown_references[0].kind, ReferenceKind::Part);
        assert_eq!(report.unknown_references[0].id, "GHOST");
        assert_eq!(report.unknown_references[1].kind, ReferenceKind::Process);
        // A is still directly named even though the question was skipped
        assert!(report.missing_parts.is_empty());
    }

    #[test]
    fn test_verify_is_repeatable() {
        let cat = catalog(
            &[
                ("A", RawRelations::default().collateral(["B"])),
                ("B", RawRelations::default().collateral(["A"])),
                ("C", RawRelations::default()),
            ],
            &[],
        );
        let q = questionnaire(vec![Question::new("1", "A?").with_parts(["A"])]);
        assert_eq!(verify(&cat, &q), verify(&cat, &q));
    }

    #[test]
    fn test_coverage_percent() {
        let report = CoverageReport {
            missing_parts: ["X".to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(report.part_coverage_percent(4), 75.0);
        assert_eq!(CoverageReport::default().part_coverage_percent(0), 100.0);
    }
}
