//! Embedded assets - the data file schema, report templates and sample data

use rust_embed::Embed;

#[derive(Embed)]
#[folder = "assets/schema/"]
struct EmbeddedSchemas;

#[derive(Embed)]
#[folder = "assets/data/"]
struct EmbeddedData;

/// Name of the schema every inspection data file is checked against
pub const DATA_SCHEMA: &str = "inspection.schema.json";

/// Name of the bundled sample data file
pub const SAMPLE_DATA: &str = "visual_inspection.json";

/// Registry of embedded schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    overrides: Vec<(String, String)>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an embedded schema with custom content
    pub fn with_schema(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        self.overrides.retain(|(n, _)| *n != name);
        self.overrides.push((name, content.into()));
        self
    }

    /// Get schema text by file name
    pub fn get(&self, name: &str) -> Option<String> {
        if let Some((_, content)) = self.overrides.iter().find(|(n, _)| n == name) {
            return Some(content.clone());
        }
        EmbeddedSchemas::get(name).and_then(|f| String::from_utf8(f.data.into_owned()).ok())
    }

    /// The inspection data file schema
    pub fn data_schema(&self) -> Option<String> {
        self.get(DATA_SCHEMA)
    }

    /// Names of all available schemas
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = EmbeddedSchemas::iter().map(|n| n.to_string()).collect();
        for (name, _) in &self.overrides {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// The bundled sample inspection data
pub fn sample_data() -> Option<String> {
    EmbeddedData::get(SAMPLE_DATA).and_then(|f| String::from_utf8(f.data.into_owned()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schema_present() {
        let registry = SchemaRegistry::default();
        let schema = registry.data_schema().unwrap();
        assert!(schema.contains("\"catalogs\""));
        assert!(registry.names().contains(&DATA_SCHEMA.to_string()));
    }

    #[test]
    fn test_override() {
        let registry = SchemaRegistry::new().with_schema(DATA_SCHEMA, "{}");
        assert_eq!(registry.data_schema().unwrap(), "{}");
    }

    #[test]
    fn test_sample_data_present() {
        let data = sample_data().unwrap();
        assert!(data.contains("\"revision\""));
    }
}
