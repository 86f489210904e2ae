//! Shared types.

pub mod handle;

pub use handle::{
    CategoryHandle, DialogHandle, DocumentHandle, ExtensionHandle, PanelHandle, WorkspaceHandle,
};
