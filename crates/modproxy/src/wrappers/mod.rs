//! Wrappers around host entities.

pub mod category;
pub mod document;
pub mod editor;
pub mod loaded;
pub mod workspace;

pub use category::{Category, CategoryInfo};
pub use document::{CategoryChange, Document, DocumentSignals};
pub use editor::Editor;
pub use loaded::{Delivery, LoadedExtension};
pub use workspace::{Workspace, WorkspaceSignals};
