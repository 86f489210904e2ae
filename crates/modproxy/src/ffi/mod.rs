//! C ABI surface between the host and the proxy.

pub mod abi;
pub mod entry;
pub mod safety;

pub use abi::{FfiCategory, FfiEvent, FfiEventKind, FfiHost, FfiProbeResult, FfiSubExtensionInfo};
pub use safety::ForeignHost;
