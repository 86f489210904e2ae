//! # modproxy
//!
//! Proxy loader that lets one host extension host an open-ended set of
//! sub-extensions, each shipped as a descriptor file plus a code module.
//! Provides:
//!
//! - Candidate probing (descriptor and same-stem module)
//! - Module binding through `libloading` or a static factory table
//! - Per-sub-extension lifecycle (load, init, cleanup, unload)
//! - Identity caches giving one stable wrapper per host handle
//! - Single-threaded notification fan-out with per-wrapper observers
//! - A deferred task queue drained once per host event-loop turn
//! - The boundary that turns any failure under a host entry point into a
//!   logged process abort
//!
//! Everything here runs on the host's thread. Shared state lives in `Rc` and
//! `RefCell`, so none of these types are `Send`.

pub mod boundary;
pub mod cache;
pub mod context;
pub mod descriptor;
pub mod events;
pub mod extension;
pub mod ffi;
pub mod host;
pub mod later;
pub mod lifecycle;
pub mod loader;
pub mod logging;
pub mod prelude;
pub mod probe;
pub mod proxy;
pub mod signal;
pub mod wrappers;

pub use boundary::{Fatal, contain, guard};
pub use cache::{CategoryCache, FromHandle, IdentityCache};
pub use context::ProxyContext;
pub use descriptor::Descriptor;
pub use events::definitions::{EditorNotification, EditorNotificationKind, HostEvent};
pub use events::dispatcher::{DispatchOutcome, EventDispatcher};
pub use extension::{
    CreateExtensionFn, Extension, ExtensionBox, ExtensionContext, ExtensionFactory,
    FACTORY_SYMBOL, export_extension,
};
pub use host::{ActiveDocument, HeadlessHost, Host};
pub use later::{Scheduler, TaskQueue};
pub use lifecycle::{LifecycleRecord, LifecycleState, LoadData, OfferedCallbacks, SubExtensionInfo};
pub use loader::{Binding, Module, ModuleBinder, StaticBinder, default_binder};
pub use probe::{CandidateKind, ProbeOutcome, Prober};
pub use proxy::Proxy;
pub use signal::{HandledSignal, Signal, SlotId};

#[cfg(feature = "dynamic")]
pub use loader::DynamicBinder;
