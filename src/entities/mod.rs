//! Entity type definitions
//!
//! - [`PartNode`] - A device part and its included/collateral relations
//! - [`Question`] - A checklist question naming parts and processes
//! - [`DeviceProfile`] - A device version with its serial ranges and data keys

pub mod device;
pub mod part;
pub mod question;

pub use device::{Category, DeviceProfile, SerialRange};
pub use part::{Level, PartNode, Relation, RelationLevel, RelationLevels};
pub use question::{Question, Questionnaire, RawQuestion, RawQuestionnaire};
