//! Sample sub-extension: counts typed characters per document.
//!
//! Shows the pieces a real sub-extension uses: owner-tagged observers on
//! the document wrappers, the deferred scheduler, and the workspace
//! configuration handed over on open.

use std::cell::RefCell;
use std::collections::HashMap;

use modproxy_sdk::prelude::*;
use modproxy_sdk::tracing::{debug, info};

/// Workspace group read on open.
const WORKSPACE_GROUP: &str = "demo";

type Tally = Rc<RefCell<HashMap<DocumentHandle, u64>>>;

/// Per-instance state.
pub struct TypingTally {
    owner: ExtensionHandle,
    scheduler: Scheduler,
    counts: Tally,
    // Reported along with each count; set from the workspace.
    label: Rc<RefCell<Option<String>>>,
}

impl TypingTally {
    pub fn new(ctx: &ExtensionContext) -> Self {
        info!(
            handle = %ctx.handle(),
            config = %ctx.config_path().display(),
            "Typing tally created"
        );
        Self {
            owner: ctx.handle(),
            scheduler: ctx.scheduler().clone(),
            counts: Rc::new(RefCell::new(HashMap::new())),
            label: Rc::new(RefCell::new(None)),
        }
    }

    /// Characters typed into `document` since it was opened.
    pub fn count(&self, document: DocumentHandle) -> u64 {
        self.counts.borrow().get(&document).copied().unwrap_or(0)
    }
}

impl Extension for TypingTally {
    fn on_document_opened(&mut self, document: &Rc<Document>) {
        let handle = document.handle();
        self.counts.borrow_mut().entry(handle).or_insert(0);

        let counts = Rc::clone(&self.counts);
        document
            .editor()
            .signal(EditorNotificationKind::CharAdded)
            .connect_owned(self.owner, move |_| {
                *counts.borrow_mut().entry(handle).or_insert(0) += 1;
                false
            });

        let counts = Rc::clone(&self.counts);
        let label = Rc::clone(&self.label);
        let scheduler = self.scheduler.clone();
        document
            .signals()
            .saved
            .connect_owned(self.owner, move |doc: &Document| {
                let counts = Rc::clone(&counts);
                let label = Rc::clone(&label);
                let handle = doc.handle();
                // Report after the host finishes its own save handling.
                scheduler.schedule(move || {
                    let typed = counts.borrow().get(&handle).copied().unwrap_or(0);
                    info!(
                        document = %handle,
                        typed,
                        workspace = label.borrow().as_deref().unwrap_or("-"),
                        "Saved"
                    );
                });
            });

        let counts = Rc::clone(&self.counts);
        document
            .signals()
            .closed
            .connect_owned(self.owner, move |doc: &Document| {
                counts.borrow_mut().remove(&doc.handle());
            });

        debug!(document = %handle, "Tracking document");
    }

    fn on_workspace_opened(&mut self, workspace: &Rc<Workspace>, config: &KeyFile) {
        let label = config
            .string(WORKSPACE_GROUP, "label")
            .map(str::to_string)
            .unwrap_or_else(|| workspace.handle().to_string());
        *self.label.borrow_mut() = Some(label);
    }

    fn on_workspace_closed(&mut self) {
        *self.label.borrow_mut() = None;
    }
}

fn create(ctx: &ExtensionContext) -> Option<ExtensionBox> {
    Some(Box::new(TypingTally::new(ctx)))
}

declare_extension!(create);
