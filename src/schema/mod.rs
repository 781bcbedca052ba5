//! Schema system - data file validation, embedded assets and report templates

pub mod registry;
pub mod template;
pub mod validator;

pub use registry::SchemaRegistry;
pub use template::{ReportGenerator, ReportInput, StatementContext, TemplateError};
pub use validator::{DataValidator, ValidationError};
