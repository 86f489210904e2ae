//! Category wrapper.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use modproxy_core::types::CategoryHandle;

/// One row of the host's category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Host handle.
    pub handle: CategoryHandle,
    /// Short name, e.g. `Rust`.
    pub name: String,
    /// Display title.
    pub title: String,
    /// File name patterns.
    pub patterns: Vec<String>,
}

/// A host category.
#[derive(Debug)]
pub struct Category {
    info: CategoryInfo,
    stale: Cell<bool>,
}

impl Category {
    pub(crate) fn new(info: CategoryInfo) -> Self {
        Self {
            info,
            stale: Cell::new(false),
        }
    }

    pub fn handle(&self) -> CategoryHandle {
        self.info.handle
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn patterns(&self) -> &[String] {
        &self.info.patterns
    }

    /// Whether the host reloaded its categories since this wrapper was
    /// handed out. A stale wrapper no longer identifies a live category.
    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }

    pub(crate) fn mark_stale(&self) {
        self.stale.set(true);
    }
}
