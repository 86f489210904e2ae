//! FFI ABI definitions for the host side.
//!
//! Defines the C-compatible types the host passes into and receives from
//! the entry points in [`super::entry`].

use std::os::raw::{c_char, c_void};

/// Host services as a C vtable. Every callback receives `user_data`.
///
/// Missing callbacks are treated as "nothing to report".
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiHost {
    /// Opaque host pointer passed back to every callback.
    pub user_data: *mut c_void,
    /// Returns the host configuration directory (null-terminated, owned by
    /// the host, valid until the next call).
    pub config_dir: Option<unsafe extern "C" fn(user_data: *mut c_void) -> *const c_char>,
    /// Returns the active document handle, 0 if none.
    pub current_document: Option<unsafe extern "C" fn(user_data: *mut c_void) -> u64>,
    /// Returns the number of categories.
    pub category_count: Option<unsafe extern "C" fn(user_data: *mut c_void) -> usize>,
    /// Fills `out` with the category at `index`. Returns false if out of
    /// range.
    pub category_at: Option<
        unsafe extern "C" fn(user_data: *mut c_void, index: usize, out: *mut FfiCategory) -> bool,
    >,
    /// Opens `uri` (null-terminated) in the user's browser.
    pub open_uri: Option<unsafe extern "C" fn(user_data: *mut c_void, uri: *const c_char)>,
}

/// One row of the host's category table.
#[repr(C)]
pub struct FfiCategory {
    /// Category handle.
    pub handle: u64,
    /// Short name (null-terminated).
    pub name: *const c_char,
    /// Display title (null-terminated).
    pub title: *const c_char,
    /// File name patterns separated by `;` (null-terminated).
    pub patterns: *const c_char,
}

impl Default for FfiCategory {
    fn default() -> Self {
        Self {
            handle: 0,
            name: std::ptr::null(),
            title: std::ptr::null(),
            patterns: std::ptr::null(),
        }
    }
}

/// Probe verdict.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiProbeResult {
    /// Not a sub-extension file.
    Ignored = 0,
    /// A loadable descriptor.
    Matched = 1,
    /// The module of a loadable pair.
    Related = 2,
}

/// What the host shows for a loaded sub-extension. Strings stay valid until
/// the sub-extension is unloaded.
#[repr(C)]
pub struct FfiSubExtensionInfo {
    pub name: *const c_char,
    pub description: *const c_char,
    pub version: *const c_char,
    pub author: *const c_char,
    /// Whether the host should offer a help action.
    pub offers_help: bool,
    /// Whether the host should offer a configure action.
    pub offers_configure: bool,
}

/// Notification kinds, as carried in [`FfiEvent::kind`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiEventKind {
    DocumentActivated = 0,
    DocumentBeforeSave = 1,
    DocumentClosed = 2,
    DocumentCategoryChanged = 3,
    DocumentCreated = 4,
    DocumentOpened = 5,
    DocumentReloaded = 6,
    DocumentSaved = 7,
    EditorNotification = 8,
    WorkspaceOpened = 9,
    WorkspaceClosed = 10,
    WorkspaceDialogOpened = 11,
    WorkspaceDialogConfirmed = 12,
    WorkspaceDialogClosed = 13,
    CategoriesReloaded = 14,
}

impl FfiEventKind {
    /// Decodes a raw kind value. `None` if unknown.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::DocumentActivated,
            1 => Self::DocumentBeforeSave,
            2 => Self::DocumentClosed,
            3 => Self::DocumentCategoryChanged,
            4 => Self::DocumentCreated,
            5 => Self::DocumentOpened,
            6 => Self::DocumentReloaded,
            7 => Self::DocumentSaved,
            8 => Self::EditorNotification,
            9 => Self::WorkspaceOpened,
            10 => Self::WorkspaceClosed,
            11 => Self::WorkspaceDialogOpened,
            12 => Self::WorkspaceDialogConfirmed,
            13 => Self::WorkspaceDialogClosed,
            14 => Self::CategoriesReloaded,
            _ => return None,
        })
    }
}

/// Raw editor notification.
#[repr(C)]
pub struct FfiEditorNotification {
    pub code: u32,
    pub position: i64,
    pub ch: u32,
    pub modifiers: u32,
    pub modification_type: u32,
    pub line: i64,
    pub lines_added: i64,
    pub margin: i32,
    /// Null-terminated text, or null.
    pub text: *const c_char,
}

/// One host notification. Fields not used by `kind` are ignored.
#[repr(C)]
pub struct FfiEvent {
    /// An [`FfiEventKind`] value.
    pub kind: u32,
    /// Document handle for document and editor notifications.
    pub document: u64,
    /// Previous category for category changes, 0 if none.
    pub category: u64,
    /// Workspace handle for workspace-opened.
    pub workspace: u64,
    /// Dialog handle for workspace dialog notifications.
    pub dialog: u64,
    /// Workspace configuration as key-file text for workspace-opened.
    pub config: *const c_char,
    /// Editor payload for editor notifications.
    pub editor: FfiEditorNotification,
}
