//! Question entity - one checklist prompt and the parts/processes it names

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A question as it appears in the data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuestion {
    /// Parts named directly by the question
    #[serde(default)]
    pub parts: Vec<String>,

    /// Processes named directly by the question
    #[serde(default)]
    pub processes: Vec<String>,

    /// Display text (falls back to the question id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Raw questionnaire shape: level -> question id -> question
pub type RawQuestionnaire = IndexMap<String, IndexMap<String, RawQuestion>>;

/// A checklist question with its seed sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub level: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub required_parts: IndexSet<String>,
    pub required_processes: IndexSet<String>,
}

impl Question {
    pub fn new(level: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            id: id.into(),
            prompt: None,
            required_parts: IndexSet::new(),
            required_processes: IndexSet::new(),
        }
    }

    pub fn with_parts<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_parts.extend(parts.into_iter().map(Into::into));
        self
    }

    pub fn with_processes<I, S>(mut self, processes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_processes
            .extend(processes.into_iter().map(Into::into));
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Text shown to the technician
    pub fn display_text(&self) -> &str {
        self.prompt.as_deref().unwrap_or(&self.id)
    }
}

/// Ordered mapping of level -> (question id -> question).
///
/// Order only matters for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Questionnaire {
    levels: IndexMap<String, IndexMap<String, Question>>,
}

impl Questionnaire {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert the decoded data-file shape into typed questions
    pub fn from_raw(raw: &RawQuestionnaire) -> Self {
        let mut questionnaire = Self::new();
        for (level, questions) in raw {
            for (id, q) in questions {
                let mut question = Question::new(level.as_str(), id.as_str())
                    .with_parts(q.parts.iter().cloned())
                    .with_processes(q.processes.iter().cloned());
                question.prompt = q.prompt.clone();
                questionnaire.insert(question);
            }
        }
        questionnaire
    }

    /// Add a question under its level, replacing any with the same id
    pub fn insert(&mut self, question: Question) {
        self.levels
            .entry(question.level.clone())
            .or_default()
            .insert(question.id.clone(), question);
    }

    pub fn get(&self, level: &str, id: &str) -> Option<&Question> {
        self.levels.get(level).and_then(|qs| qs.get(id))
    }

    pub fn level_names(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    /// All questions, flattened in presentation order
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.levels.values().flat_map(|qs| qs.values())
    }

    pub fn len(&self) -> usize {
        self.levels.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_preserves_order() {
        let json = r#"{
            "exterior": {
                "Is the case cracked?": {"parts": ["CASE"], "processes": []},
                "Is the door damaged?": {"parts": ["DOOR"], "processes": ["CLEAN"], "prompt": "Door damage?"}
            },
            "interior": {
                "Is the pole clamp loose?": {"parts": ["CLAMP"]}
            }
        }"#;
        let raw: RawQuestionnaire = serde_json::from_str(json).unwrap();
        let questionnaire = Questionnaire::from_raw(&raw);

        assert_eq!(questionnaire.len(), 3);
        let levels: Vec<_> = questionnaire.level_names().collect();
        assert_eq!(levels, vec!["exterior", "interior"]);

        let ids: Vec<_> = questionnaire.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["Is the case cracked?", "Is the door damaged?", "Is the pole clamp loose?"]
        );

        let door = questionnaire.get("exterior", "Is the door damaged?").unwrap();
        assert_eq!(door.display_text(), "Door damage?");
        assert!(door.required_processes.contains("CLEAN"));

        let clamp = questionnaire.get("interior", "Is the pole clamp loose?").unwrap();
        assert!(clamp.required_processes.is_empty());
        assert_eq!(clamp.display_text(), "Is the pole clamp loose?");
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut questionnaire = Questionnaire::new();
        questionnaire.insert(Question::new("1", "q").with_parts(["A"]));
        questionnaire.insert(Question::new("1", "q").with_parts(["B"]));
        assert_eq!(questionnaire.len(), 1);
        assert!(questionnaire.get("1", "q").unwrap().required_parts.contains("B"));
    }
}
