//! Convenience result type alias for modproxy.

use crate::error::ProxyError;

/// A specialized `Result` type for modproxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;
