//! Newtype wrappers around the opaque handles the host hands out.
//!
//! The host identifies its internal objects by pointer-sized values. Using
//! distinct types prevents passing a `CategoryHandle` where a
//! `DocumentHandle` is expected. A handle carries no meaning beyond
//! identity; the proxy never dereferences it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype handle wrapper around `u64`.
macro_rules! define_handle {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw host value.
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the raw host value.
            pub const fn into_raw(self) -> u64 {
                self.0
            }

            /// Whether this is the host's null handle.
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(handle: $name) -> u64 {
                handle.0
            }
        }
    };
}

define_handle!(
    /// Host handle of one open document.
    DocumentHandle
);

define_handle!(
    /// Host handle of one document category (file type).
    CategoryHandle
);

define_handle!(
    /// Host handle issued for one loaded sub-extension.
    ExtensionHandle
);

define_handle!(
    /// Host handle of the open workspace.
    WorkspaceHandle
);

define_handle!(
    /// Host handle of a dialog a panel may be attached to.
    DialogHandle
);

define_handle!(
    /// Host handle of a configuration panel built by a sub-extension.
    PanelHandle
);
