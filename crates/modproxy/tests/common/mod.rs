//! Shared fixtures for the proxy integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use modproxy::prelude::*;
use modproxy::wrappers::CategoryInfo;
use modproxy::{Host, Proxy, StaticBinder};
use modproxy_core::config::ProxyConfig;

/// Shared, ordered record of what extensions and observers saw.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Host double that records URIs it was asked to open.
#[derive(Clone)]
pub struct TestHost {
    pub config_dir: PathBuf,
    pub opened_uris: Journal,
    pub categories: Rc<RefCell<Vec<CategoryInfo>>>,
    pub active: Rc<Cell<Option<DocumentHandle>>>,
    pub open_workspace: Option<(WorkspaceHandle, KeyFile)>,
}

impl TestHost {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            opened_uris: journal(),
            categories: Rc::new(RefCell::new(Vec::new())),
            active: Rc::new(Cell::new(None)),
            open_workspace: None,
        }
    }
}

impl Host for TestHost {
    fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    fn current_document(&self) -> Option<DocumentHandle> {
        self.active.get()
    }

    fn current_workspace(&self) -> Option<(WorkspaceHandle, KeyFile)> {
        self.open_workspace.clone()
    }

    fn categories(&self) -> Vec<CategoryInfo> {
        self.categories.borrow().clone()
    }

    fn open_uri(&self, uri: &str) {
        self.opened_uris.borrow_mut().push(uri.to_string());
    }
}

/// Sub-extension that logs every callback it receives.
pub struct Recorder {
    pub name: String,
    pub journal: Journal,
    pub handles_help: bool,
    pub panel: Option<PanelHandle>,
    /// When set, the drop entry records how many modules are still bound.
    pub binder: Option<StaticBinder>,
}

impl Recorder {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: Rc::clone(journal),
            handles_help: false,
            panel: None,
            binder: None,
        }
    }

    fn log(&self, what: impl std::fmt::Display) {
        self.journal.borrow_mut().push(format!("{}:{}", self.name, what));
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        match &self.binder {
            Some(binder) => self.log(format!("dropped with {} bound", binder.live_bindings())),
            None => self.log("dropped"),
        }
    }
}

impl Extension for Recorder {
    fn on_document_opened(&mut self, document: &Rc<Document>) {
        self.log(format!("opened {}", document.handle().into_raw()));
    }

    fn on_workspace_opened(&mut self, workspace: &Rc<Workspace>, _config: &KeyFile) {
        self.log(format!("workspace {}", workspace.handle().into_raw()));
    }

    fn on_workspace_closed(&mut self) {
        self.log("workspace closed");
    }

    fn configure(&mut self, _dialog: DialogHandle) -> Option<PanelHandle> {
        self.log("configure");
        self.panel
    }

    fn show_help(&mut self) -> bool {
        self.log("help");
        self.handles_help
    }
}

/// A directory of descriptor + module pairs and a proxy over it.
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub binder: StaticBinder,
    pub host: TestHost,
    pub proxy: Rc<Proxy>,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let host = TestHost::new(&dir.path().join("config"));
        Self::with_host(dir, host)
    }

    /// A harness whose host already has `workspace` open.
    pub fn with_open_workspace(workspace: WorkspaceHandle, config: KeyFile) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut host = TestHost::new(&dir.path().join("config"));
        host.open_workspace = Some((workspace, config));
        Self::with_host(dir, host)
    }

    fn with_host(dir: tempfile::TempDir, host: TestHost) -> Self {
        let binder = StaticBinder::new();
        let proxy = Rc::new(Proxy::new(
            ProxyConfig::default(),
            Box::new(host.clone()),
            Box::new(binder.clone()),
        ));
        Self {
            dir,
            binder,
            host,
            proxy,
        }
    }

    /// Writes `<stem>.plugin` with the given body under the `[modproxy]`
    /// group.
    pub fn descriptor(&self, stem: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(format!("{stem}.plugin"));
        std::fs::write(&path, format!("[modproxy]\n{body}\n")).expect("write descriptor");
        path
    }

    /// Writes the module file for `stem`.
    pub fn module(&self, stem: &str) -> PathBuf {
        let path = self
            .dir
            .path()
            .join(format!("{stem}.{}", std::env::consts::DLL_EXTENSION));
        std::fs::write(&path, b"").expect("write module");
        path
    }

    /// Writes a descriptor + module pair whose factory builds a recorder.
    pub fn recorder_pair(&self, stem: &str, journal: &Journal) -> PathBuf {
        let descriptor = self.descriptor(stem, &format!("name={stem}"));
        self.module(stem);
        let journal = Rc::clone(journal);
        let name = stem.to_string();
        self.binder.register(stem, move |_| {
            Some(Box::new(Recorder::new(&name, &journal)) as ExtensionBox)
        });
        descriptor
    }

    /// Loads and initializes the pair at `descriptor`.
    pub fn start(&self, raw: u64, descriptor: &Path) -> Box<modproxy::LoadData> {
        let mut data = self
            .proxy
            .load(ExtensionHandle(raw), descriptor)
            .expect("descriptor loads");
        assert!(self.proxy.init(&mut data.record).expect("init"));
        data
    }
}
