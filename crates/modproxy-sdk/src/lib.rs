//! # modproxy-sdk
//!
//! Kit for writing sub-extensions loaded by modproxy.
//!
//! A sub-extension ships as two files with the same stem: a `.plugin`
//! descriptor and a code module built as a `cdylib`. The module exports one
//! factory, generated by [`declare_extension!`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modproxy_sdk::prelude::*;
//!
//! struct Greeter {
//!     owner: ExtensionHandle,
//! }
//!
//! impl Extension for Greeter {
//!     fn on_document_opened(&mut self, document: &Rc<Document>) {
//!         document.signals().saved.connect_owned(self.owner, |doc| {
//!             modproxy_sdk::tracing::info!(document = %doc.handle(), "Saved");
//!         });
//!     }
//! }
//!
//! fn create(ctx: &ExtensionContext) -> Option<ExtensionBox> {
//!     Some(Box::new(Greeter { owner: ctx.handle() }))
//! }
//!
//! declare_extension!(create);
//! ```
//!
//! with `greeter.plugin` next to the module:
//!
//! ```text
//! [modproxy]
//! name=Greeter
//! description=Logs every save
//! version=0.1.0
//! ```
//!
//! The module must be built with the same toolchain as the proxy: the
//! factory hands a boxed trait object across the boundary.

pub mod macros;

pub use modproxy::{ExtensionBox, ExtensionContext, FACTORY_SYMBOL, export_extension};
pub use modproxy_core::{ProxyError, ProxyResult};
pub use tracing;

/// Prelude for convenient imports.
pub mod prelude {
    pub use std::rc::Rc;

    pub use modproxy::prelude::*;

    pub use crate::declare_extension;
}
