//! Report rendering from embedded Tera templates

use chrono::{DateTime, Local};
use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::core::catalog::PartsCatalog;
use crate::core::session::InspectionSession;
use crate::core::trim::Resolution;

#[derive(Embed)]
#[folder = "assets/templates/"]
struct EmbeddedTemplates;

const REPORT_TEMPLATE: &str = "report.txt.tera";

/// Fallback statements when the data file does not provide any
pub const DEFAULT_OPENING: &str =
    "On {{ date }}, {{ device }} SN {{ serial }} was visually inspected (revision {{ revision }}).";
pub const DEFAULT_STATEMENT: &str = "No visual damage was found.";

#[derive(Debug, Error, miette::Diagnostic)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    #[diagnostic(code(vinspect::template::not_found))]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    #[diagnostic(code(vinspect::template::render))]
    RenderError(String),
}

/// Values the statement templates may reference
#[derive(Debug, Clone, Serialize)]
pub struct StatementContext {
    pub date: String,
    pub serial: u64,
    pub revision: String,
    pub device: String,
    pub technician: String,
}

impl StatementContext {
    pub fn new(
        date: DateTime<Local>,
        serial: u64,
        revision: impl Into<String>,
        device: impl Into<String>,
        technician: impl Into<String>,
    ) -> Self {
        Self {
            date: date.format("%B %d, %Y").to_string(),
            serial,
            revision: revision.into(),
            device: device.into(),
            technician: technician.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FindingView {
    question: String,
    parts: Vec<String>,
    processes: Vec<String>,
}

/// Everything a finished inspection report needs
#[derive(Debug)]
pub struct ReportInput<'a> {
    pub session: &'a InspectionSession<'a>,
    pub catalog: &'a PartsCatalog,
    pub remaining: &'a Resolution,
    pub opening: &'a str,
    pub default_statement: &'a str,
    pub revision: &'a str,
    pub technician: &'a str,
    pub fingerprint: &'a str,
}

/// Renders inspection reports
pub struct ReportGenerator {
    tera: Tera,
}

impl ReportGenerator {
    /// Create a new generator with the embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Render one statement template from the data file
    pub fn render_statement(
        &self,
        template: &str,
        ctx: &StatementContext,
    ) -> Result<String, TemplateError> {
        let context = tera::Context::from_serialize(ctx)
            .map_err(|e| TemplateError::RenderError(e.to_string()))?;
        Tera::one_off(template, &context, false)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    /// Render the full report for a finished session
    pub fn render_report(&self, input: &ReportInput<'_>) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == REPORT_TEMPLATE) {
            return Err(TemplateError::NotFound(REPORT_TEMPLATE.to_string()));
        }

        let session = input.session;
        let statement_ctx = StatementContext::new(
            session.started(),
            session.serial(),
            input.revision,
            session.device(),
            input.technician,
        );

        let label = |pn: &String| match input.catalog.get(pn) {
            Some(node) => format!("{} {}", pn, node.part_name()),
            None => pn.clone(),
        };

        let findings: Vec<FindingView> = session
            .findings()
            .map(|f| FindingView {
                question: f.prompt.clone(),
                parts: f.parts.iter().map(label).collect(),
                processes: f.processes.iter().cloned().collect(),
            })
            .collect();
        let remaining_parts: Vec<String> = input.remaining.required_parts.iter().map(label).collect();
        let remaining_processes: Vec<&String> = input.remaining.required_processes.iter().collect();

        let mut context = tera::Context::new();
        context.insert("opening", &self.render_statement(input.opening, &statement_ctx)?);
        context.insert(
            "default",
            &self.render_statement(input.default_statement, &statement_ctx)?,
        );
        context.insert("findings", &findings);
        context.insert("remaining_parts", &remaining_parts);
        context.insert("remaining_processes", &remaining_processes);
        context.insert("technician", input.technician);
        context.insert("category", &session.category().to_string());
        context.insert("session", &session.id().to_string());
        context.insert("fingerprint", input.fingerprint);

        self.tera
            .render(REPORT_TEMPLATE, &context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{GraphBuilder, RawCatalog, RawPart, RawRelations};
    use crate::entities::part::Level;
    use crate::entities::question::{Question, Questionnaire};
    use chrono::TimeZone;

    fn fixture() -> (PartsCatalog, Questionnaire) {
        let raw = RawCatalog::new()
            .with_processes(["CLEAN"])
            .with_part(
                "DOOR",
                RawPart::new("Door assembly", Level::One, RawRelations::default().processes(["CLEAN"])),
            )
            .with_part("CASE", RawPart::new("Case", Level::One, RawRelations::default()));
        let catalog = GraphBuilder::new(raw).build().unwrap();
        let mut questionnaire = Questionnaire::new();
        questionnaire.insert(Question::new("exterior", "Door damaged?").with_parts(["DOOR"]));
        questionnaire.insert(Question::new("exterior", "Case cracked?").with_parts(["CASE"]));
        (catalog, questionnaire)
    }

    fn render(session: &InspectionSession<'_>, catalog: &PartsCatalog) -> String {
        let remaining = session.remaining().unwrap();
        let generator = ReportGenerator::new().unwrap();
        generator
            .render_report(&ReportInput {
                session,
                catalog,
                remaining: &remaining,
                opening: "Device {{ device }} SN {{ serial }} rev {{ revision }}.",
                default_statement: "Nothing found.",
                revision: "C",
                technician: "Jo",
                fingerprint: "abc123",
            })
            .unwrap()
    }

    #[test]
    fn test_render_statement() {
        let generator = ReportGenerator::new().unwrap();
        let date = Local.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let ctx = StatementContext::new(date, 465000, "C", "V6", "Jo");
        let text = generator
            .render_statement("On {{ date }}, {{ device }} SN {{ serial }} by {{ technician }}", &ctx)
            .unwrap();
        assert_eq!(text, "On October 19, 2026, V6 SN 465000 by Jo");
    }

    #[test]
    fn test_render_statement_bad_template() {
        let generator = ReportGenerator::new().unwrap();
        let date = Local.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let ctx = StatementContext::new(date, 1, "C", "V6", "Jo");
        assert!(matches!(
            generator.render_statement("{{ unclosed", &ctx),
            Err(TemplateError::RenderError(_))
        ));
    }

    #[test]
    fn test_report_with_findings() {
        let (catalog, questionnaire) = fixture();
        let mut session = InspectionSession::new("V6", 465000, &catalog, &questionnaire);
        session.answer(true).unwrap();
        session.answer(false).unwrap();

        let report = render(&session, &catalog);
        assert!(report.contains("Device V6 SN 465000 rev C."));
        assert!(report.contains("Door damaged?"));
        assert!(report.contains("DOOR Door assembly"));
        assert!(report.contains("CLEAN"));
        assert!(!report.contains("Nothing found."));
        assert!(report.contains("Technician: Jo | Category: repair"));
        assert!(report.contains("data abc123"));
    }

    #[test]
    fn test_report_without_findings() {
        let (catalog, questionnaire) = fixture();
        let mut session = InspectionSession::new("V6", 465000, &catalog, &questionnaire);
        session.answer(false).unwrap();
        session.answer(false).unwrap();

        let report = render(&session, &catalog);
        assert!(report.contains("Nothing found."));
        assert!(!report.contains("Findings:"));
    }
}
