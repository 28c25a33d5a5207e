//! Domain layer: tree model, record paths and the merge engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod format;
pub mod merge;
pub mod node;
pub mod punch;
pub mod record;
pub mod text;

pub use error::{DomainError, DomainResult};
pub use node::{Attributes, TreeNode};
pub use record::{RecordPath, RecordSpec};
