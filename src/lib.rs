pub mod config;
pub mod core;
pub mod seed;
pub mod ui;

pub use crate::core::edit;
pub use crate::core::error;
pub use crate::core::field;
pub use crate::core::field_path;
pub use crate::core::field_tree;
pub use crate::core::form_state;
pub use crate::core::preview;

pub use config::BuilderConfig;
pub use crate::core::FieldId;
pub use crate::core::edit::{EditOutcome, FieldEdit};
pub use crate::core::error::SchemaError;
pub use crate::core::field::{FieldKind, FieldNode};
pub use crate::core::field_path::FieldPath;
pub use crate::core::field_tree::{ChildrenPolicy, FieldTree};
pub use crate::core::form_state::{FormState, PreviewUpdate, SubscriptionId};
pub use crate::core::preview::{Preview, PreviewValue, project, render_json};
