//! Host notification definitions.

use std::fmt;

use modproxy_core::KeyFile;
use modproxy_core::types::{CategoryHandle, DialogHandle, DocumentHandle, WorkspaceHandle};

/// Every notification the proxy consumes from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    // ── Document ──
    /// A document became the active one.
    DocumentActivated(DocumentHandle),
    /// A document is about to be written to disk.
    DocumentBeforeSave(DocumentHandle),
    /// A document is closing; its handle is invalid afterwards.
    DocumentClosed(DocumentHandle),
    /// A document's category changed. May arrive before the document's
    /// created/opened notification.
    DocumentCategoryChanged {
        /// The document whose category changed.
        document: DocumentHandle,
        /// The category it had before, if any.
        previous: Option<CategoryHandle>,
    },
    /// A new, empty document was created.
    DocumentCreated(DocumentHandle),
    /// An existing file was opened as a document.
    DocumentOpened(DocumentHandle),
    /// A document was reloaded from disk.
    DocumentReloaded(DocumentHandle),
    /// A document was written to disk.
    DocumentSaved(DocumentHandle),

    // ── Editor ──
    /// A fine-grained notification from a document's editor.
    EditorNotification {
        /// The document owning the editor.
        document: DocumentHandle,
        /// The raw notification.
        notification: EditorNotification,
    },

    // ── Workspace ──
    /// A workspace was opened, carrying its configuration.
    WorkspaceOpened {
        /// The workspace handle.
        workspace: WorkspaceHandle,
        /// The workspace's configuration file contents.
        config: KeyFile,
    },
    /// The open workspace was closed.
    WorkspaceClosed,
    /// The workspace properties dialog was opened.
    WorkspaceDialogOpened(DialogHandle),
    /// The workspace properties dialog was confirmed.
    WorkspaceDialogConfirmed(DialogHandle),
    /// The workspace properties dialog was closed.
    WorkspaceDialogClosed(DialogHandle),

    // ── Categories ──
    /// The host rebuilt its category table.
    CategoriesReloaded,
}

/// How the dispatcher resolves the handle carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The wrapper is created if it does not exist yet.
    Create,
    /// The wrapper must already exist; a miss drops the notification.
    Lookup,
    /// The notification carries no document handle.
    None,
}

impl HostEvent {
    /// Returns the host's name for this notification.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DocumentActivated(_) => "document-activate",
            Self::DocumentBeforeSave(_) => "document-before-save",
            Self::DocumentClosed(_) => "document-close",
            Self::DocumentCategoryChanged { .. } => "document-filetype-set",
            Self::DocumentCreated(_) => "document-new",
            Self::DocumentOpened(_) => "document-open",
            Self::DocumentReloaded(_) => "document-reload",
            Self::DocumentSaved(_) => "document-save",
            Self::EditorNotification { .. } => "editor-notify",
            Self::WorkspaceOpened { .. } => "project-open",
            Self::WorkspaceClosed => "project-close",
            Self::WorkspaceDialogOpened(_) => "project-dialog-open",
            Self::WorkspaceDialogConfirmed(_) => "project-dialog-confirmed",
            Self::WorkspaceDialogClosed(_) => "project-dialog-close",
            Self::CategoriesReloaded => "filetypes-reloaded",
        }
    }

    /// Returns how the document handle of this notification is resolved.
    pub fn resolution(&self) -> Resolution {
        match self {
            Self::DocumentCreated(_)
            | Self::DocumentOpened(_)
            | Self::DocumentCategoryChanged { .. } => Resolution::Create,
            Self::DocumentActivated(_)
            | Self::DocumentBeforeSave(_)
            | Self::DocumentClosed(_)
            | Self::DocumentReloaded(_)
            | Self::DocumentSaved(_)
            | Self::EditorNotification { .. } => Resolution::Lookup,
            Self::WorkspaceOpened { .. }
            | Self::WorkspaceClosed
            | Self::WorkspaceDialogOpened(_)
            | Self::WorkspaceDialogConfirmed(_)
            | Self::WorkspaceDialogClosed(_)
            | Self::CategoriesReloaded => Resolution::None,
        }
    }

    /// Returns whether this notification is delivered to every loaded
    /// sub-extension.
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self,
            Self::DocumentCreated(_)
                | Self::DocumentOpened(_)
                | Self::WorkspaceOpened { .. }
                | Self::WorkspaceClosed
        )
    }

    /// Returns the document handle carried by this notification, if any.
    pub fn document(&self) -> Option<DocumentHandle> {
        match self {
            Self::DocumentActivated(doc)
            | Self::DocumentBeforeSave(doc)
            | Self::DocumentClosed(doc)
            | Self::DocumentCreated(doc)
            | Self::DocumentOpened(doc)
            | Self::DocumentReloaded(doc)
            | Self::DocumentSaved(doc) => Some(*doc),
            Self::DocumentCategoryChanged { document, .. }
            | Self::EditorNotification { document, .. } => Some(*document),
            _ => None,
        }
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw editor notification as delivered by the host.
///
/// Only the code is interpreted by the proxy; the remaining fields are
/// passed through to observers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorNotification {
    /// Notification code.
    pub code: u32,
    /// Byte position the notification refers to.
    pub position: i64,
    /// Character typed, for character notifications.
    pub ch: u32,
    /// Modifier key state.
    pub modifiers: u32,
    /// Modification flags, for modification notifications.
    pub modification_type: u32,
    /// Line the notification refers to.
    pub line: i64,
    /// Lines added by a modification.
    pub lines_added: i64,
    /// Margin index, for margin clicks.
    pub margin: i32,
    /// Text carried by the notification (list selection, dropped URI).
    pub text: Option<String>,
}

impl EditorNotification {
    /// Creates a notification with only a code.
    pub fn new(code: u32) -> Self {
        Self {
            code,
            ..Default::default()
        }
    }

    /// Returns the recognized kind, if the code is known.
    pub fn kind(&self) -> Option<EditorNotificationKind> {
        EditorNotificationKind::from_code(self.code)
    }
}

macro_rules! editor_notifications {
    ($( $(#[$meta:meta])* $variant:ident = $code:literal => $name:literal, )*) => {
        /// Every editor notification the proxy routes to a distinct signal.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EditorNotificationKind {
            $( $(#[$meta])* $variant, )*
        }

        impl EditorNotificationKind {
            /// All kinds in signal order.
            pub const ALL: &'static [EditorNotificationKind] = &[ $( Self::$variant, )* ];

            /// Number of kinds.
            pub const COUNT: usize = Self::ALL.len();

            /// Maps a raw host code to its kind.
            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// Returns the raw host code.
            pub fn code(self) -> u32 {
                match self {
                    $( Self::$variant => $code, )*
                }
            }

            /// Returns the signal name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Index of this kind's signal on the editor wrapper.
            pub fn index(self) -> usize {
                self as usize
            }
        }
    };
}

editor_notifications! {
    /// Text needs styling.
    StyleNeeded = 2000 => "style-needed",
    /// A character was typed.
    CharAdded = 2001 => "char-added",
    /// The document reached its save point.
    SavePointReached = 2002 => "save-point-reached",
    /// The document left its save point.
    SavePointLeft = 2003 => "save-point-left",
    /// A read-only document was modified.
    ModifyAttemptReadOnly = 2004 => "modify-attempt-ro",
    /// A key was pressed.
    Key = 2005 => "key",
    /// The text was double-clicked.
    DoubleClick = 2006 => "double-click",
    /// Content, styling or selection changed.
    UpdateUi = 2007 => "update-ui",
    /// The text was modified.
    Modified = 2008 => "modified",
    /// A macro-recordable action ran.
    MacroRecord = 2009 => "macro-record",
    /// A margin was clicked.
    MarginClick = 2010 => "margin-click",
    /// Hidden lines need showing.
    NeedShown = 2011 => "need-shown",
    /// Painting finished.
    Painted = 2013 => "painted",
    /// A user list item was selected.
    UserListSelection = 2014 => "user-list-selection",
    /// A URI was dropped on the editor.
    UriDropped = 2015 => "uri-dropped",
    /// The pointer started dwelling.
    DwellStart = 2016 => "dwell-start",
    /// The pointer stopped dwelling.
    DwellEnd = 2017 => "dwell-end",
    /// The zoom level changed.
    Zoom = 2018 => "zoom",
    /// A hotspot was clicked.
    HotSpotClick = 2019 => "hot-spot-click",
    /// A hotspot was double-clicked.
    HotSpotDoubleClick = 2020 => "hot-spot-double-click",
    /// A call tip was clicked.
    CallTipClick = 2021 => "call-tip-click",
    /// An autocompletion item was selected.
    AutoCSelection = 2022 => "auto-c-selection",
    /// An indicator was clicked.
    IndicatorClick = 2023 => "indicator-click",
    /// An indicator click was released.
    IndicatorRelease = 2024 => "indicator-release",
    /// Autocompletion was cancelled.
    AutoCCancelled = 2025 => "auto-c-cancelled",
    /// A character was deleted while autocompleting.
    AutoCCharDeleted = 2026 => "auto-c-char-deleted",
    /// A hotspot click was released.
    HotSpotReleaseClick = 2027 => "hot-spot-release-click",
    /// The editor gained focus.
    FocusIn = 2028 => "focus-in",
    /// The editor lost focus.
    FocusOut = 2029 => "focus-out",
    /// Autocompletion inserted its text.
    AutoCCompleted = 2030 => "auto-c-completed",
}

impl fmt::Display for EditorNotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
