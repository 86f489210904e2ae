//! The failure boundary in front of every host entry point.
//!
//! The host calls in through a plain C ABI and cannot receive an error or
//! survive an unwind. Anything that goes wrong underneath an entry point,
//! whether an `Err` bubbling up or a panic inside sub-extension code, is
//! caught here, logged, and turned into a process abort.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use thiserror::Error;
use tracing::error;

use modproxy_core::{ProxyError, ProxyResult};

/// A failure that must not cross into the host.
#[derive(Debug, Error)]
pub enum Fatal {
    /// An error was propagated up to the entry point.
    #[error("{0}")]
    Error(#[from] ProxyError),
    /// Code underneath panicked with a message.
    #[error("panic: {0}")]
    Panic(String),
    /// Code underneath panicked with a payload that is not a string.
    #[error("unknown failure")]
    UnknownPanic,
}

impl Fatal {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        if let Some(message) = payload.downcast_ref::<&'static str>() {
            return Self::Panic((*message).to_string());
        }
        match payload.downcast::<String>() {
            Ok(message) => Self::Panic(*message),
            Err(_) => Self::UnknownPanic,
        }
    }
}

/// Runs `f`, converting both `Err` and panics into [`Fatal`].
pub fn contain<T>(f: impl FnOnce() -> ProxyResult<T>) -> Result<T, Fatal> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Fatal::Error(e)),
        Err(payload) => Err(Fatal::from_panic(payload)),
    }
}

/// Runs `f` for the entry point `entry`; any failure aborts the process.
pub fn guard<T>(entry: &'static str, f: impl FnOnce() -> ProxyResult<T>) -> T {
    match contain(f) {
        Ok(value) => value,
        Err(fatal) => terminate(entry, &fatal),
    }
}

/// Logs `fatal` and aborts.
pub fn terminate(entry: &str, fatal: &Fatal) -> ! {
    match fatal {
        Fatal::UnknownPanic => error!(entry = %entry, "Unknown failure at host entry point, aborting"),
        _ => error!(entry = %entry, error = %fatal, "Fatal failure at host entry point, aborting"),
    }
    std::process::abort()
}
