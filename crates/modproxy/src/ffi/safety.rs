//! FFI safety wrappers: converts between FFI types and Rust types.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;

use tracing::warn;

use modproxy_core::KeyFile;
use modproxy_core::types::{CategoryHandle, DialogHandle, DocumentHandle, WorkspaceHandle};

use crate::events::definitions::{EditorNotification, HostEvent};
use crate::host::Host;
use crate::probe::ProbeOutcome;
use crate::wrappers::category::CategoryInfo;

use super::abi::{FfiCategory, FfiEditorNotification, FfiEvent, FfiEventKind, FfiHost, FfiProbeResult};

/// Converts a C string pointer to a Rust `String`.
///
/// Returns `None` if the pointer is null or not UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a null-terminated string.
pub unsafe fn c_str_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .ok()
        .map(|s| s.to_string())
}

/// Converts a Rust string to a `CString`.
///
/// Returns `None` if the string contains null bytes.
pub fn string_to_c_string(s: &str) -> Option<CString> {
    CString::new(s).ok()
}

impl From<ProbeOutcome> for FfiProbeResult {
    fn from(outcome: ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Matched => Self::Matched,
            ProbeOutcome::Related => Self::Related,
            ProbeOutcome::Ignored => Self::Ignored,
        }
    }
}

/// [`Host`] backed by a C vtable.
pub struct ForeignHost {
    vtable: FfiHost,
}

impl ForeignHost {
    /// Wraps `vtable`.
    ///
    /// # Safety
    /// Every callback in `vtable` must be safe to call with its
    /// `user_data` for as long as the returned host lives.
    pub unsafe fn new(vtable: FfiHost) -> Self {
        Self { vtable }
    }
}

impl Host for ForeignHost {
    fn config_dir(&self) -> PathBuf {
        let raw = match self.vtable.config_dir {
            // SAFETY: guaranteed by `ForeignHost::new`.
            Some(config_dir) => unsafe { config_dir(self.vtable.user_data) },
            None => std::ptr::null(),
        };
        // SAFETY: the host returns a null-terminated string or null.
        unsafe { c_str_to_string(raw) }
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    fn current_document(&self) -> Option<DocumentHandle> {
        let current = self.vtable.current_document?;
        // SAFETY: guaranteed by `ForeignHost::new`.
        let raw = unsafe { current(self.vtable.user_data) };
        (raw != 0).then_some(DocumentHandle(raw))
    }

    fn categories(&self) -> Vec<CategoryInfo> {
        let (Some(count), Some(category_at)) = (self.vtable.category_count, self.vtable.category_at)
        else {
            return Vec::new();
        };

        // SAFETY: guaranteed by `ForeignHost::new`.
        let count = unsafe { count(self.vtable.user_data) };
        let mut categories = Vec::with_capacity(count);
        for index in 0..count {
            let mut row = FfiCategory::default();
            // SAFETY: `row` is a valid out-pointer for the call.
            if !unsafe { category_at(self.vtable.user_data, index, &mut row) } {
                break;
            }
            // SAFETY: the host fills the row with null-terminated strings.
            let (name, title, patterns) = unsafe {
                (
                    c_str_to_string(row.name).unwrap_or_default(),
                    c_str_to_string(row.title).unwrap_or_default(),
                    c_str_to_string(row.patterns).unwrap_or_default(),
                )
            };
            categories.push(CategoryInfo {
                handle: CategoryHandle(row.handle),
                name,
                title,
                patterns: patterns
                    .split(';')
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            });
        }
        categories
    }

    fn open_uri(&self, uri: &str) {
        let Some(open_uri) = self.vtable.open_uri else {
            warn!(uri = %uri, "Host cannot open URIs");
            return;
        };
        let Some(uri) = string_to_c_string(uri) else {
            warn!("Help URI contains a null byte");
            return;
        };
        // SAFETY: guaranteed by `ForeignHost::new`; `uri` outlives the call.
        unsafe { open_uri(self.vtable.user_data, uri.as_ptr()) }
    }
}

/// Converts a raw host event.
///
/// Returns `None` for an unknown kind.
///
/// # Safety
/// String pointers in `event` must be null or null-terminated.
pub unsafe fn event_from_ffi(event: &FfiEvent) -> Option<HostEvent> {
    let Some(kind) = FfiEventKind::from_raw(event.kind) else {
        warn!(kind = event.kind, "Unknown host event kind, dropped");
        return None;
    };
    let document = DocumentHandle(event.document);
    let dialog = DialogHandle(event.dialog);

    Some(match kind {
        FfiEventKind::DocumentActivated => HostEvent::DocumentActivated(document),
        FfiEventKind::DocumentBeforeSave => HostEvent::DocumentBeforeSave(document),
        FfiEventKind::DocumentClosed => HostEvent::DocumentClosed(document),
        FfiEventKind::DocumentCategoryChanged => HostEvent::DocumentCategoryChanged {
            document,
            previous: (event.category != 0).then_some(CategoryHandle(event.category)),
        },
        FfiEventKind::DocumentCreated => HostEvent::DocumentCreated(document),
        FfiEventKind::DocumentOpened => HostEvent::DocumentOpened(document),
        FfiEventKind::DocumentReloaded => HostEvent::DocumentReloaded(document),
        FfiEventKind::DocumentSaved => HostEvent::DocumentSaved(document),
        FfiEventKind::EditorNotification => HostEvent::EditorNotification {
            document,
            // SAFETY: forwarded from the caller.
            notification: unsafe { editor_from_ffi(&event.editor) },
        },
        FfiEventKind::WorkspaceOpened => {
            // SAFETY: forwarded from the caller.
            let text = unsafe { c_str_to_string(event.config) }.unwrap_or_default();
            let config = KeyFile::parse(&text).unwrap_or_else(|e| {
                warn!(error = %e, "Malformed workspace configuration, using an empty one");
                KeyFile::new()
            });
            HostEvent::WorkspaceOpened {
                workspace: WorkspaceHandle(event.workspace),
                config,
            }
        }
        FfiEventKind::WorkspaceClosed => HostEvent::WorkspaceClosed,
        FfiEventKind::WorkspaceDialogOpened => HostEvent::WorkspaceDialogOpened(dialog),
        FfiEventKind::WorkspaceDialogConfirmed => HostEvent::WorkspaceDialogConfirmed(dialog),
        FfiEventKind::WorkspaceDialogClosed => HostEvent::WorkspaceDialogClosed(dialog),
        FfiEventKind::CategoriesReloaded => HostEvent::CategoriesReloaded,
    })
}

unsafe fn editor_from_ffi(raw: &FfiEditorNotification) -> EditorNotification {
    EditorNotification {
        code: raw.code,
        position: raw.position,
        ch: raw.ch,
        modifiers: raw.modifiers,
        modification_type: raw.modification_type,
        line: raw.line,
        lines_added: raw.lines_added,
        margin: raw.margin,
        // SAFETY: forwarded from the caller.
        text: unsafe { c_str_to_string(raw.text) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::raw::c_void;

    fn editor(code: u32) -> FfiEditorNotification {
        FfiEditorNotification {
            code,
            position: 0,
            ch: 0,
            modifiers: 0,
            modification_type: 0,
            line: 0,
            lines_added: 0,
            margin: 0,
            text: std::ptr::null(),
        }
    }

    fn event(kind: u32) -> FfiEvent {
        FfiEvent {
            kind,
            document: 7,
            category: 0,
            workspace: 0,
            dialog: 0,
            config: std::ptr::null(),
            editor: editor(2001),
        }
    }

    #[test]
    fn test_event_conversion() {
        let converted = unsafe { event_from_ffi(&event(FfiEventKind::DocumentSaved as u32)) };
        assert_eq!(converted, Some(HostEvent::DocumentSaved(DocumentHandle(7))));

        let converted =
            unsafe { event_from_ffi(&event(FfiEventKind::DocumentCategoryChanged as u32)) };
        assert_eq!(
            converted,
            Some(HostEvent::DocumentCategoryChanged {
                document: DocumentHandle(7),
                previous: None
            })
        );

        assert_eq!(unsafe { event_from_ffi(&event(99)) }, None);
    }

    #[test]
    fn test_workspace_config_is_parsed() {
        let text = CString::new("[project]\nname=demo\n").expect("cstring");
        let mut raw = event(FfiEventKind::WorkspaceOpened as u32);
        raw.workspace = 3;
        raw.config = text.as_ptr();

        match unsafe { event_from_ffi(&raw) } {
            Some(HostEvent::WorkspaceOpened { workspace, config }) => {
                assert_eq!(workspace, WorkspaceHandle(3));
                assert_eq!(config.string("project", "name"), Some("demo"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    unsafe extern "C" fn config_dir(_: *mut c_void) -> *const c_char {
        c"/home/u/.config/host".as_ptr()
    }

    unsafe extern "C" fn current_document(_: *mut c_void) -> u64 {
        0
    }

    #[test]
    fn test_foreign_host_callbacks() {
        let host = unsafe {
            ForeignHost::new(FfiHost {
                user_data: std::ptr::null_mut(),
                config_dir: Some(config_dir),
                current_document: Some(current_document),
                category_count: None,
                category_at: None,
                open_uri: None,
            })
        };

        assert_eq!(host.config_dir(), PathBuf::from("/home/u/.config/host"));
        assert_eq!(host.current_document(), None);
        assert!(host.categories().is_empty());
        host.open_uri("https://example.org");
    }
}
