//! Host notifications and their dispatch.

pub mod definitions;
pub mod dispatcher;

pub use definitions::{EditorNotification, EditorNotificationKind, HostEvent, Resolution};
pub use dispatcher::{DispatchOutcome, EventDispatcher};
