//! Inspection session - the state behind the question prompt loop
//!
//! A session walks the questionnaire in order. Every affirmative answer
//! resolves that question's seed through the trim engine and records the
//! result as a finding. Answers can be taken back one at a time.

use chrono::{DateTime, Local};
use indexmap::IndexSet;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use ulid::Ulid;

use crate::core::catalog::PartsCatalog;
use crate::core::trim::{Resolution, TrimEngine, TrimError};
use crate::entities::device::Category;
use crate::entities::question::{Question, Questionnaire};

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("all questions have been answered")]
    #[diagnostic(code(vinspect::session::complete))]
    Complete,

    #[error("no answer to take back")]
    #[diagnostic(code(vinspect::session::at_start))]
    AtStart,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Trim(#[from] TrimError),
}

/// The resolution recorded for one "yes" answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub level: String,
    pub question: String,
    /// Question text as shown to the technician
    pub prompt: String,
    pub parts: IndexSet<String>,
    pub processes: IndexSet<String>,
}

#[derive(Debug, Clone)]
struct Answer {
    affirmative: bool,
    finding: Option<Finding>,
}

/// One inspection of one device
#[derive(Debug)]
pub struct InspectionSession<'a> {
    id: Ulid,
    started: DateTime<Local>,
    device: String,
    serial: u64,
    category: Category,
    catalog: &'a PartsCatalog,
    questions: Vec<&'a Question>,
    answers: Vec<Answer>,
}

impl<'a> InspectionSession<'a> {
    pub fn new(
        device: impl Into<String>,
        serial: u64,
        catalog: &'a PartsCatalog,
        questionnaire: &'a Questionnaire,
    ) -> Self {
        let session = Self {
            id: Ulid::new(),
            started: Local::now(),
            device: device.into(),
            serial,
            category: Category::default(),
            catalog,
            questions: questionnaire.iter().collect(),
            answers: Vec::new(),
        };
        info!(
            session = %session.id,
            device = %session.device,
            serial = session.serial,
            questions = session.questions.len(),
            "inspection started"
        );
        session
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn started(&self) -> DateTime<Local> {
        self.started
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Index of the current question (equals the number of answers given)
    pub fn position(&self) -> usize {
        self.answers.len()
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() >= self.questions.len()
    }

    /// The question awaiting an answer
    pub fn current(&self) -> Option<&'a Question> {
        self.questions.get(self.answers.len()).copied()
    }

    /// Record an answer to the current question
    pub fn answer(&mut self, affirmative: bool) -> Result<Option<&Finding>, SessionError> {
        let question = self.current().ok_or(SessionError::Complete)?;

        let finding = if affirmative {
            let resolution = TrimEngine::new(self.catalog)
                .trim(&question.required_parts, &question.required_processes)?;
            info!(
                session = %self.id,
                question = %question.id,
                parts = resolution.required_parts.len(),
                processes = resolution.required_processes.len(),
                "finding recorded"
            );
            Some(Finding {
                level: question.level.clone(),
                question: question.id.clone(),
                prompt: question.display_text().to_string(),
                parts: resolution.required_parts,
                processes: resolution.required_processes,
            })
        } else {
            None
        };

        self.answers.push(Answer {
            affirmative,
            finding,
        });
        Ok(self.answers.last().and_then(|a| a.finding.as_ref()))
    }

    /// Take back the most recent answer and return to its question
    pub fn back(&mut self) -> Result<&'a Question, SessionError> {
        self.answers.pop().ok_or(SessionError::AtStart)?;
        info!(session = %self.id, position = self.answers.len(), "answer taken back");
        self.current().ok_or(SessionError::AtStart)
    }

    /// Answers given so far, in order
    pub fn answers(&self) -> impl Iterator<Item = (&'a Question, bool)> + '_ {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .map(|(q, a)| (*q, a.affirmative))
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.answers.iter().filter_map(|a| a.finding.as_ref())
    }

    pub fn has_findings(&self) -> bool {
        self.findings().next().is_some()
    }

    /// Running remainder: the resolution of every affirmative seed combined
    pub fn remaining(&self) -> Result<Resolution, TrimError> {
        let mut parts: IndexSet<&str> = IndexSet::new();
        let mut processes: IndexSet<&str> = IndexSet::new();
        for (question, affirmative) in self.answers() {
            if affirmative {
                parts.extend(question.required_parts.iter().map(String::as_str));
                processes.extend(question.required_processes.iter().map(String::as_str));
            }
        }
        TrimEngine::new(self.catalog).trim(parts, processes)
    }
}
