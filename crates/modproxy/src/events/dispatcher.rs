//! Host notification fan-out.
//!
//! Each notification is resolved to its wrapper, then either fires that
//! wrapper's own observers or is broadcast to every loaded sub-extension in
//! load order:
//!
//! - Creation-class notifications build the wrapper on first sight.
//! - Every other document notification requires an existing wrapper; a
//!   miss drops the notification silently.
//! - On close, observers run while the document is still registered; it is
//!   evicted afterwards.
//! - A sub-extension that is still running further up the stack receives
//!   its broadcast on the next event-loop turn instead.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::context::ProxyContext;
use crate::extension::ExtensionBox;
use crate::host::Host;
use crate::wrappers::document::CategoryChange;
use crate::wrappers::loaded::Delivery;
use crate::wrappers::workspace::Workspace;

use super::definitions::{HostEvent, Resolution};

/// What happened to one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// A wrapper was found or created for the notification.
    pub resolved: bool,
    /// Observer handlers that ran.
    pub observers: usize,
    /// Sub-extensions that received a broadcast.
    pub delivered: usize,
    /// Sub-extensions whose broadcast was deferred.
    pub deferred: usize,
    /// An editor observer handled the notification.
    pub handled: bool,
}

impl DispatchOutcome {
    fn dropped() -> Self {
        Self::default()
    }

    fn resolved() -> Self {
        Self {
            resolved: true,
            ..Self::default()
        }
    }
}

/// Routes host notifications through the proxy context.
pub struct EventDispatcher<'a> {
    context: &'a ProxyContext,
    host: &'a dyn Host,
}

impl<'a> EventDispatcher<'a> {
    pub fn new(context: &'a ProxyContext, host: &'a dyn Host) -> Self {
        Self { context, host }
    }

    /// Dispatches one notification.
    pub fn dispatch(&self, event: &HostEvent) -> DispatchOutcome {
        debug!(event = %event, "Dispatching host notification");

        match event {
            HostEvent::DocumentCreated(handle) | HostEvent::DocumentOpened(handle) => {
                let document = self.context.documents().add(*handle);
                let mut outcome = DispatchOutcome::resolved();
                self.broadcast(
                    event,
                    move |ext: &mut ExtensionBox| ext.on_document_opened(&document),
                    &mut outcome,
                );
                outcome
            }

            HostEvent::DocumentCategoryChanged { document, previous } => {
                let wrapper = self.context.documents().add(*document);
                let change = CategoryChange {
                    document: *document,
                    previous: previous.and_then(|h| self.context.categories().lookup(h)),
                };
                DispatchOutcome {
                    observers: wrapper.signals().category_changed.emit(&change),
                    ..DispatchOutcome::resolved()
                }
            }

            HostEvent::DocumentActivated(_)
            | HostEvent::DocumentBeforeSave(_)
            | HostEvent::DocumentSaved(_)
            | HostEvent::DocumentReloaded(_)
            | HostEvent::DocumentClosed(_) => self.fire_document(event),

            HostEvent::EditorNotification {
                document,
                notification,
            } => {
                let Some(kind) = notification.kind() else {
                    warn!(
                        code = notification.code,
                        document = %document,
                        "Unknown editor notification code, dropped"
                    );
                    return DispatchOutcome::dropped();
                };
                let Some(wrapper) = self.context.documents().lookup(*document) else {
                    debug!(document = %document, kind = %kind, "No wrapper for editor notification, dropped");
                    return DispatchOutcome::dropped();
                };
                let (observers, handled) =
                    wrapper.editor().signal(kind).emit_counted(notification);
                DispatchOutcome {
                    observers,
                    handled,
                    ..DispatchOutcome::resolved()
                }
            }

            HostEvent::WorkspaceOpened { workspace, config } => {
                let opened = Rc::new(Workspace::new(*workspace, config.clone()));
                if let Some(previous) = self.context.set_workspace(Some(Rc::clone(&opened))) {
                    debug!(workspace = %previous.handle(), "Replacing workspace that was never closed");
                }
                let mut outcome = DispatchOutcome::resolved();
                self.broadcast(
                    event,
                    move |ext: &mut ExtensionBox| ext.on_workspace_opened(&opened, opened.config()),
                    &mut outcome,
                );
                outcome
            }

            HostEvent::WorkspaceClosed => {
                let mut outcome = DispatchOutcome::resolved();
                match self.context.workspace() {
                    Some(workspace) => {
                        outcome.observers = workspace.signals().closed.emit(&workspace.handle());
                    }
                    None => debug!("No workspace wrapper to close, broadcasting only"),
                }
                self.broadcast(
                    event,
                    |ext: &mut ExtensionBox| ext.on_workspace_closed(),
                    &mut outcome,
                );
                self.context.set_workspace(None);
                outcome
            }

            HostEvent::WorkspaceDialogOpened(dialog)
            | HostEvent::WorkspaceDialogConfirmed(dialog)
            | HostEvent::WorkspaceDialogClosed(dialog) => {
                let Some(workspace) = self.context.workspace() else {
                    warn!(event = %event, dialog = %dialog, "No open workspace, dropped");
                    return DispatchOutcome::dropped();
                };
                let signals = workspace.signals();
                let signal = match event {
                    HostEvent::WorkspaceDialogOpened(_) => &signals.dialog_opened,
                    HostEvent::WorkspaceDialogConfirmed(_) => &signals.dialog_confirmed,
                    _ => &signals.dialog_closed,
                };
                DispatchOutcome {
                    observers: signal.emit(dialog),
                    ..DispatchOutcome::resolved()
                }
            }

            HostEvent::CategoriesReloaded => {
                self.context.categories().reload(self.host.categories());
                DispatchOutcome::resolved()
            }
        }
    }

    fn fire_document(&self, event: &HostEvent) -> DispatchOutcome {
        debug_assert_eq!(event.resolution(), Resolution::Lookup);
        debug_assert!(!event.is_broadcast());
        let Some(handle) = event.document() else {
            return DispatchOutcome::dropped();
        };
        let Some(document) = self.context.documents().lookup(handle) else {
            debug!(event = %event, document = %handle, "No wrapper for document, dropped");
            return DispatchOutcome::dropped();
        };

        let signals = document.signals();
        let observers = match event {
            HostEvent::DocumentActivated(_) => signals.activated.emit(&document),
            HostEvent::DocumentBeforeSave(_) => signals.before_save.emit(&document),
            HostEvent::DocumentSaved(_) => signals.saved.emit(&document),
            HostEvent::DocumentReloaded(_) => signals.reloaded.emit(&document),
            HostEvent::DocumentClosed(_) => {
                let observers = signals.closed.emit(&document);
                self.context.documents().remove(handle);
                observers
            }
            _ => 0,
        };

        DispatchOutcome {
            observers,
            ..DispatchOutcome::resolved()
        }
    }

    fn broadcast<F>(&self, event: &HostEvent, deliver: F, outcome: &mut DispatchOutcome)
    where
        F: Fn(&mut ExtensionBox) + Clone + 'static,
    {
        debug_assert!(event.is_broadcast(), "{event} is not a broadcast");
        for loaded in self.context.extensions().list() {
            match loaded.deliver(&deliver) {
                Delivery::Delivered(()) => outcome.delivered += 1,
                Delivery::Gone => {
                    debug!(handle = %loaded.handle(), event = %event, "Sub-extension gone, skipped");
                }
                Delivery::Busy => {
                    warn!(
                        handle = %loaded.handle(),
                        name = %loaded.name(),
                        event = %event,
                        "Sub-extension busy, delivery deferred"
                    );
                    let deliver = deliver.clone();
                    let target = Rc::clone(&loaded);
                    let name = event.name();
                    self.context
                        .tasks()
                        .schedule_owned(loaded.handle(), move || {
                            if let Delivery::Busy = target.deliver(deliver) {
                                warn!(handle = %target.handle(), event = %name, "Sub-extension still busy, delivery dropped");
                            }
                        });
                    outcome.deferred += 1;
                }
            }
        }
    }
}
