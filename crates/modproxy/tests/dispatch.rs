//! Notification fan-out through the proxy surface.

mod common;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use modproxy::prelude::*;
use modproxy::wrappers::CategoryInfo;
use modproxy::{HostEvent, Proxy};

use common::{Harness, Journal, Recorder, journal};

#[test]
fn test_created_twice_yields_one_wrapper() {
    let harness = Harness::new();
    let handle = DocumentHandle(0x10);

    harness.proxy.dispatch(&HostEvent::DocumentCreated(handle));
    let first = harness.proxy.context().documents().lookup(handle).expect("wrapped");
    harness.proxy.dispatch(&HostEvent::DocumentCreated(handle));
    let second = harness.proxy.context().documents().lookup(handle).expect("wrapped");

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(harness.proxy.context().documents().len(), 1);
}

#[test]
fn test_unknown_document_is_dropped() {
    let harness = Harness::new();
    let log = journal();
    let descriptor = harness.recorder_pair("quiet", &log);
    let data = harness.start(1, &descriptor);

    for event in [
        HostEvent::DocumentSaved(DocumentHandle(99)),
        HostEvent::DocumentActivated(DocumentHandle(99)),
        HostEvent::DocumentClosed(DocumentHandle(99)),
        HostEvent::EditorNotification {
            document: DocumentHandle(99),
            notification: EditorNotification::new(2001),
        },
    ] {
        let outcome = harness.proxy.dispatch(&event);
        assert!(!outcome.resolved, "{event:?} should not resolve");
        assert_eq!(outcome.observers, 0);
    }

    assert!(harness.proxy.context().documents().is_empty());
    assert!(log.borrow().is_empty());
    harness.proxy.unload(data).expect("unload");
}

#[test]
fn test_broadcast_follows_load_order() {
    let harness = Harness::new();
    let log = journal();
    let records: Vec<_> = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(i, stem)| {
            let descriptor = harness.recorder_pair(stem, &log);
            harness.start(i as u64 + 1, &descriptor)
        })
        .collect();

    let outcome = harness.proxy.dispatch(&HostEvent::DocumentOpened(DocumentHandle(7)));
    assert_eq!(outcome.delivered, 3);
    assert_eq!(
        *log.borrow(),
        vec![
            "a:opened 7".to_string(),
            "b:opened 7".to_string(),
            "c:opened 7".to_string(),
        ]
    );

    for data in records {
        harness.proxy.unload(data).expect("unload");
    }
}

#[test]
fn test_close_observers_see_registered_document() {
    let harness = Harness::new();
    let handle = DocumentHandle(3);
    harness.proxy.dispatch(&HostEvent::DocumentOpened(handle));

    let seen = Rc::new(RefCell::new(None));
    let proxy: Weak<Proxy> = Rc::downgrade(&harness.proxy);
    let sink = Rc::clone(&seen);
    let document = harness.proxy.context().documents().lookup(handle).expect("wrapped");
    document.signals().closed.connect(move |doc: &Document| {
        let proxy = proxy.upgrade().expect("proxy alive");
        let still_there = proxy.context().documents().lookup(doc.handle());
        *sink.borrow_mut() = Some(still_there.is_some());
    });
    drop(document);

    let outcome = harness.proxy.dispatch(&HostEvent::DocumentClosed(handle));
    assert_eq!(outcome.observers, 1);
    assert_eq!(*seen.borrow(), Some(true));
    assert!(harness.proxy.context().documents().lookup(handle).is_none());
}

#[test]
fn test_category_change_before_open_reuses_wrapper() {
    let harness = Harness::new();
    harness.host.categories.borrow_mut().push(CategoryInfo {
        handle: CategoryHandle(8),
        name: "Rust".to_string(),
        title: "Rust source".to_string(),
        patterns: vec!["*.rs".to_string()],
    });
    harness.proxy.reload_categories();

    let handle = DocumentHandle(4);
    let outcome = harness.proxy.dispatch(&HostEvent::DocumentCategoryChanged {
        document: handle,
        previous: Some(CategoryHandle(8)),
    });
    assert!(outcome.resolved);
    let early = harness.proxy.context().documents().lookup(handle).expect("wrapped");

    harness.proxy.dispatch(&HostEvent::DocumentOpened(handle));
    let opened = harness.proxy.context().documents().lookup(handle).expect("wrapped");
    assert!(Rc::ptr_eq(&early, &opened));
}

#[test]
fn test_category_reload_invalidates_old_wrappers() {
    let harness = Harness::new();
    harness.host.categories.borrow_mut().push(CategoryInfo {
        handle: CategoryHandle(1),
        name: "C".to_string(),
        title: "C source".to_string(),
        patterns: vec!["*.c".to_string(), "*.h".to_string()],
    });
    harness.proxy.dispatch(&HostEvent::CategoriesReloaded);
    let before = harness
        .proxy
        .context()
        .categories()
        .lookup(CategoryHandle(1))
        .expect("cached");

    harness.proxy.dispatch(&HostEvent::CategoriesReloaded);
    let after = harness
        .proxy
        .context()
        .categories()
        .lookup(CategoryHandle(1))
        .expect("cached");

    assert!(before.is_stale());
    assert!(!after.is_stale());
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(after.patterns(), ["*.c", "*.h"]);
}

#[test]
fn test_editor_observers_report_handled() {
    let harness = Harness::new();
    let handle = DocumentHandle(6);
    harness.proxy.dispatch(&HostEvent::DocumentOpened(handle));
    let document = harness.proxy.context().documents().lookup(handle).expect("wrapped");

    let chars: Journal = journal();
    let sink = Rc::clone(&chars);
    document
        .editor()
        .signal(EditorNotificationKind::CharAdded)
        .connect(move |n: &EditorNotification| {
            sink.borrow_mut().push(n.ch.to_string());
            n.ch == u32::from('x')
        });

    let mut notification = EditorNotification::new(EditorNotificationKind::CharAdded.code());
    notification.ch = u32::from('a');
    let outcome = harness.proxy.dispatch(&HostEvent::EditorNotification {
        document: handle,
        notification: notification.clone(),
    });
    assert!(!outcome.handled);

    notification.ch = u32::from('x');
    let outcome = harness.proxy.dispatch(&HostEvent::EditorNotification {
        document: handle,
        notification,
    });
    assert!(outcome.handled);
    assert_eq!(outcome.observers, 1);
    assert_eq!(chars.borrow().len(), 2);
}

#[test]
fn test_workspace_round_trip() {
    let harness = Harness::new();
    let log = journal();
    let descriptor = harness.recorder_pair("ws", &log);
    let data = harness.start(1, &descriptor);

    let config = KeyFile::parse("[build]\ntarget=debug\n").expect("parse");
    harness.proxy.dispatch(&HostEvent::WorkspaceOpened {
        workspace: WorkspaceHandle(2),
        config,
    });
    let workspace = harness.proxy.context().workspace().expect("open");
    assert_eq!(workspace.config().string("build", "target"), Some("debug"));

    let dialogs = journal();
    let sink = Rc::clone(&dialogs);
    workspace
        .signals()
        .dialog_confirmed
        .connect(move |dialog: &DialogHandle| sink.borrow_mut().push(dialog.to_string()));
    let outcome = harness
        .proxy
        .dispatch(&HostEvent::WorkspaceDialogConfirmed(DialogHandle(0x20)));
    assert_eq!(outcome.observers, 1);
    drop(workspace);

    harness.proxy.dispatch(&HostEvent::WorkspaceClosed);
    assert!(harness.proxy.context().workspace().is_none());
    assert_eq!(
        *log.borrow(),
        vec!["ws:workspace 2".to_string(), "ws:workspace closed".to_string()]
    );
    assert_eq!(*dialogs.borrow(), vec!["0x20".to_string()]);

    harness.proxy.unload(data).expect("unload");
}

#[test]
fn test_workspace_closed_without_open_still_broadcasts() {
    let harness = Harness::new();
    let log = journal();
    let descriptor = harness.recorder_pair("ws", &log);
    let data = harness.start(1, &descriptor);

    let outcome = harness.proxy.dispatch(&HostEvent::WorkspaceClosed);
    assert!(outcome.resolved);
    assert_eq!(outcome.observers, 0);
    assert_eq!(outcome.delivered, 1);
    assert_eq!(*log.borrow(), vec!["ws:workspace closed".to_string()]);

    harness.proxy.unload(data).expect("unload");
}

#[test]
fn test_workspace_open_at_creation_is_wrapped() {
    let config = KeyFile::parse("[build]\ntarget=release\n").expect("parse");
    let harness = Harness::with_open_workspace(WorkspaceHandle(4), config);
    let log = journal();
    let descriptor = harness.recorder_pair("late", &log);
    let data = harness.start(1, &descriptor);

    let workspace = harness.proxy.context().workspace().expect("seeded");
    assert_eq!(workspace.handle(), WorkspaceHandle(4));
    assert_eq!(workspace.config().string("build", "target"), Some("release"));

    let closed = journal();
    let sink = Rc::clone(&closed);
    workspace
        .signals()
        .closed
        .connect(move |handle: &WorkspaceHandle| sink.borrow_mut().push(handle.to_string()));
    drop(workspace);

    let outcome = harness.proxy.dispatch(&HostEvent::WorkspaceClosed);
    assert_eq!(outcome.observers, 1);
    assert_eq!(outcome.delivered, 1);
    assert_eq!(*closed.borrow(), vec!["0x4".to_string()]);
    assert_eq!(*log.borrow(), vec!["late:workspace closed".to_string()]);
    assert!(harness.proxy.context().workspace().is_none());

    harness.proxy.unload(data).expect("unload");
}

#[test]
fn test_current_document_follows_host() {
    let harness = Harness::new();
    assert!(harness.proxy.current_document().is_none());

    harness.proxy.dispatch(&HostEvent::DocumentOpened(DocumentHandle(7)));
    let opened = harness.proxy.context().documents().lookup(DocumentHandle(7)).expect("wrapped");

    harness.host.active.set(Some(DocumentHandle(7)));
    let current = harness.proxy.current_document().expect("active");
    assert!(Rc::ptr_eq(&current, &opened));

    // The host shows a document the proxy never wrapped.
    harness.host.active.set(Some(DocumentHandle(8)));
    assert!(harness.proxy.current_document().is_none());
}

#[test]
fn test_extension_resolves_current_document() {
    let harness = Harness::new();
    let descriptor = harness.descriptor("peek", "name=Peek");
    harness.module("peek");
    let log = journal();
    let sink = Rc::clone(&log);
    let kept: Rc<RefCell<Option<ActiveDocument>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&kept);
    harness.binder.register("peek", move |ctx| {
        assert!(ctx.current_document().is_none());
        *slot.borrow_mut() = ctx.active_document().cloned();
        Some(Box::new(Recorder::new("peek", &sink)) as ExtensionBox)
    });
    let data = harness.start(1, &descriptor);
    let active = kept.borrow_mut().take().expect("resolver handed over");

    harness.proxy.dispatch(&HostEvent::DocumentOpened(DocumentHandle(3)));
    harness.host.active.set(Some(DocumentHandle(3)));
    let seen = active.get().expect("active document");
    assert_eq!(seen.handle(), DocumentHandle(3));
    assert!(Rc::ptr_eq(&seen, &harness.proxy.current_document().expect("active")));

    harness.proxy.dispatch(&HostEvent::DocumentClosed(DocumentHandle(3)));
    assert!(active.get().is_none());

    harness.proxy.unload(data).expect("unload");
}

#[test]
fn test_reentrant_broadcast_is_deferred() {
    struct Echo {
        proxy: Weak<Proxy>,
        log: Journal,
    }

    impl Extension for Echo {
        fn on_document_opened(&mut self, document: &Rc<Document>) {
            let raw = document.handle().into_raw();
            self.log.borrow_mut().push(format!("opened {raw}"));
            if raw == 1 {
                if let Some(proxy) = self.proxy.upgrade() {
                    let outcome = proxy.dispatch(&HostEvent::DocumentOpened(DocumentHandle(2)));
                    self.log
                        .borrow_mut()
                        .push(format!("nested deferred {}", outcome.deferred));
                }
            }
        }
    }

    let harness = Harness::new();
    let descriptor = harness.descriptor("echo", "name=Echo");
    harness.module("echo");
    let log = journal();
    let sink = Rc::clone(&log);
    let proxy = Rc::downgrade(&harness.proxy);
    harness.binder.register("echo", move |_| {
        Some(Box::new(Echo {
            proxy: proxy.clone(),
            log: Rc::clone(&sink),
        }) as ExtensionBox)
    });
    let data = harness.start(1, &descriptor);

    harness.proxy.dispatch(&HostEvent::DocumentOpened(DocumentHandle(1)));
    assert_eq!(
        *log.borrow(),
        vec!["opened 1".to_string(), "nested deferred 1".to_string()]
    );

    assert_eq!(harness.proxy.run_pending(), 1);
    assert_eq!(log.borrow().last().map(String::as_str), Some("opened 2"));
    harness.proxy.unload(data).expect("unload");
}

#[test]
fn test_help_prefers_extension_then_uri() {
    let harness = Harness::new();
    let descriptor = harness.descriptor("helpful", "name=Helpful\nhelp_uri=https://example.org/help");
    harness.module("helpful");
    let log = journal();
    let sink = Rc::clone(&log);
    let handles_help = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&handles_help);
    harness.binder.register("helpful", move |_| {
        let mut recorder = Recorder::new("helpful", &sink);
        recorder.handles_help = *flag.borrow();
        Some(Box::new(recorder) as ExtensionBox)
    });

    let data = harness.start(1, &descriptor);
    assert!(harness.proxy.help(&data.record));
    assert_eq!(
        *harness.host.opened_uris.borrow(),
        vec!["https://example.org/help".to_string()]
    );
    harness.proxy.unload(data).expect("unload");

    *handles_help.borrow_mut() = true;
    let data = harness.start(2, &descriptor);
    assert!(harness.proxy.help(&data.record));
    assert_eq!(harness.host.opened_uris.borrow().len(), 1);
    harness.proxy.unload(data).expect("unload");
}

#[test]
fn test_help_not_offered_without_uri() {
    let harness = Harness::new();
    let log = journal();
    let descriptor = harness.recorder_pair("plain", &log);
    let data = harness.start(1, &descriptor);

    assert!(!data.callbacks.help);
    assert!(!harness.proxy.help(&data.record));
    assert!(log.borrow().is_empty());
    assert!(harness.host.opened_uris.borrow().is_empty());
    harness.proxy.unload(data).expect("unload");
}

#[test]
fn test_configure_follows_descriptor_flag() {
    let harness = Harness::new();
    let on = harness.descriptor("tunable", "name=Tunable\nconfigurable=true");
    harness.module("tunable");
    let off = harness.descriptor("fixed", "name=Fixed");
    harness.module("fixed");

    let log = journal();
    for stem in ["tunable", "fixed"] {
        let sink = Rc::clone(&log);
        harness.binder.register(stem, move |_| {
            let mut recorder = Recorder::new(stem, &sink);
            recorder.panel = Some(PanelHandle(0x77));
            Some(Box::new(recorder) as ExtensionBox)
        });
    }

    let tunable = harness.start(1, &on);
    let fixed = harness.start(2, &off);
    assert!(tunable.callbacks.configure);
    assert!(!fixed.callbacks.configure);

    assert_eq!(
        harness.proxy.configure(&tunable.record, DialogHandle(1)),
        Some(PanelHandle(0x77))
    );
    assert_eq!(harness.proxy.configure(&fixed.record, DialogHandle(1)), None);
    assert_eq!(*log.borrow(), vec!["tunable:configure".to_string()]);

    harness.proxy.unload(tunable).expect("unload");
    harness.proxy.unload(fixed).expect("unload");
}

#[test]
fn test_configure_without_panel() {
    let harness = Harness::new();
    let descriptor = harness.descriptor("empty", "name=Empty\nconfigurable=true");
    harness.module("empty");
    let log = journal();
    let sink = Rc::clone(&log);
    harness
        .binder
        .register("empty", move |_| Some(Box::new(Recorder::new("empty", &sink)) as ExtensionBox));

    let data = harness.start(1, &descriptor);
    assert_eq!(harness.proxy.configure(&data.record, DialogHandle(3)), None);
    harness.proxy.unload(data).expect("unload");
}
