//! # modproxy-core
//!
//! Core crate for modproxy. Contains the configuration schema, opaque host
//! handle types, the key-file parser used for descriptors and workspace
//! payloads, and the unified error system.
//!
//! This crate has **no** internal dependencies on other modproxy crates.

pub mod config;
pub mod error;
pub mod keyfile;
pub mod result;
pub mod types;

pub use error::ProxyError;
pub use keyfile::KeyFile;
pub use result::ProxyResult;
