//! C entry points the host calls.
//!
//! Every function body runs inside [`guard`]: an error or panic underneath
//! is logged and the process aborts instead of unwinding into the host.
//! Passing a null proxy or load pointer is treated the same way.

use std::ffi::CString;
use std::os::raw::c_char;
use std::path::PathBuf;

use modproxy_core::config::ProxyConfig;
use modproxy_core::types::{DialogHandle, ExtensionHandle};
use modproxy_core::{ProxyError, ProxyResult};

use crate::boundary::guard;
use crate::lifecycle::LoadData;
use crate::logging::init_logging;
use crate::proxy::Proxy;

use super::abi::{FfiEvent, FfiHost, FfiProbeResult, FfiSubExtensionInfo};
use super::safety::{ForeignHost, c_str_to_string, event_from_ffi, string_to_c_string};

/// A loaded sub-extension as handed to the host.
pub struct FfiLoadData {
    data: Box<LoadData>,
    // Backing storage for `info`.
    _strings: [CString; 4],
    info: FfiSubExtensionInfo,
}

impl FfiLoadData {
    fn new(data: Box<LoadData>) -> Self {
        let strings = [
            &data.info.name,
            &data.info.description,
            &data.info.version,
            &data.info.author,
        ]
        .map(|s| string_to_c_string(s).unwrap_or_default());

        let info = FfiSubExtensionInfo {
            name: strings[0].as_ptr(),
            description: strings[1].as_ptr(),
            version: strings[2].as_ptr(),
            author: strings[3].as_ptr(),
            offers_help: data.callbacks.help,
            offers_configure: data.callbacks.configure,
        };

        Self {
            data,
            _strings: strings,
            info,
        }
    }
}

unsafe fn proxy_ref<'a>(proxy: *const Proxy) -> ProxyResult<&'a Proxy> {
    // SAFETY: the host passes a pointer from `modproxy_proxy_new` or null.
    unsafe { proxy.as_ref() }.ok_or_else(|| ProxyError::internal("null proxy pointer"))
}

unsafe fn load_mut<'a>(data: *mut FfiLoadData) -> ProxyResult<&'a mut FfiLoadData> {
    // SAFETY: the host passes a pointer from `modproxy_proxy_load` or null.
    unsafe { data.as_mut() }.ok_or_else(|| ProxyError::internal("null load pointer"))
}

/// Creates the proxy.
///
/// `config_path` may be null; the configuration then comes from defaults
/// and `MODPROXY__*` environment variables.
///
/// # Safety
/// `host` must point to a vtable whose callbacks stay valid until
/// [`modproxy_proxy_free`]. `config_path` must be null or null-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_new(
    host: *const FfiHost,
    config_path: *const c_char,
) -> *mut Proxy {
    guard("modproxy_proxy_new", || {
        // SAFETY: see the function contract.
        let vtable = unsafe { host.as_ref() }
            .copied()
            .ok_or_else(|| ProxyError::internal("null host vtable"))?;
        let config_path = unsafe { c_str_to_string(config_path) }.map(PathBuf::from);

        let config = ProxyConfig::load(config_path.as_deref())?;
        init_logging(&config.logging);

        // SAFETY: see the function contract.
        let host = unsafe { ForeignHost::new(vtable) };
        let proxy = Proxy::with_default_binder(config, Box::new(host));
        Ok(Box::into_raw(Box::new(proxy)))
    })
}

/// Destroys the proxy.
///
/// # Safety
/// `proxy` must come from [`modproxy_proxy_new`] and every loaded
/// sub-extension must have been unloaded.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_free(proxy: *mut Proxy) {
    guard("modproxy_proxy_free", || {
        if !proxy.is_null() {
            // SAFETY: see the function contract.
            drop(unsafe { Box::from_raw(proxy) });
        }
        Ok(())
    })
}

/// Classifies a candidate file.
///
/// # Safety
/// `proxy` must be live; `path` must be null-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_probe(
    proxy: *const Proxy,
    path: *const c_char,
) -> FfiProbeResult {
    guard("modproxy_proxy_probe", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        let Some(path) = (unsafe { c_str_to_string(path) }) else {
            return Ok(FfiProbeResult::Ignored);
        };
        Ok(proxy.probe(&PathBuf::from(path)).into())
    })
}

/// Loads the descriptor at `path` for the host-issued `handle`.
///
/// Returns null if the descriptor is unusable.
///
/// # Safety
/// `proxy` must be live; `path` must be null-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_load(
    proxy: *const Proxy,
    handle: u64,
    path: *const c_char,
) -> *mut FfiLoadData {
    guard("modproxy_proxy_load", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        let Some(path) = (unsafe { c_str_to_string(path) }) else {
            return Ok(std::ptr::null_mut());
        };
        Ok(proxy
            .load(ExtensionHandle(handle), &PathBuf::from(path))
            .map(|data| Box::into_raw(Box::new(FfiLoadData::new(data))))
            .unwrap_or(std::ptr::null_mut()))
    })
}

/// What the host shows for a loaded sub-extension.
///
/// # Safety
/// `data` must come from [`modproxy_proxy_load`] and not be unloaded.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_load_info(data: *mut FfiLoadData) -> *const FfiSubExtensionInfo {
    guard("modproxy_load_info", || {
        let data = unsafe { load_mut(data) }?;
        Ok(&data.info as *const FfiSubExtensionInfo)
    })
}

/// Unloads a sub-extension, cleaning it up first if needed.
///
/// # Safety
/// `proxy` must be live; `data` must come from [`modproxy_proxy_load`]
/// and is invalid afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_unload(proxy: *const Proxy, data: *mut FfiLoadData) {
    guard("modproxy_proxy_unload", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        if data.is_null() {
            return Err(ProxyError::internal("null load pointer"));
        }
        // SAFETY: see the function contract.
        let data = unsafe { Box::from_raw(data) };
        proxy.unload(data.data)
    })
}

/// Binds the module and constructs the instance.
///
/// # Safety
/// `proxy` must be live; `data` must come from [`modproxy_proxy_load`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_init(proxy: *const Proxy, data: *mut FfiLoadData) -> bool {
    guard("modproxy_proxy_init", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        let data = unsafe { load_mut(data) }?;
        proxy.init(&mut data.data.record)
    })
}

/// Destroys the instance and releases the module.
///
/// # Safety
/// `proxy` must be live; `data` must come from [`modproxy_proxy_load`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_cleanup(proxy: *const Proxy, data: *mut FfiLoadData) {
    guard("modproxy_proxy_cleanup", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        let data = unsafe { load_mut(data) }?;
        proxy.cleanup(&mut data.data.record)
    })
}

/// Shows help for a sub-extension.
///
/// # Safety
/// `proxy` must be live; `data` must come from [`modproxy_proxy_load`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_help(proxy: *const Proxy, data: *mut FfiLoadData) {
    guard("modproxy_proxy_help", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        let data = unsafe { load_mut(data) }?;
        proxy.help(&data.data.record);
        Ok(())
    })
}

/// Builds a sub-extension's configuration panel. Returns 0 for no panel.
///
/// # Safety
/// `proxy` must be live; `data` must come from [`modproxy_proxy_load`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_configure(
    proxy: *const Proxy,
    data: *mut FfiLoadData,
    dialog: u64,
) -> u64 {
    guard("modproxy_proxy_configure", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        let data = unsafe { load_mut(data) }?;
        Ok(proxy
            .configure(&data.data.record, DialogHandle(dialog))
            .map(u64::from)
            .unwrap_or(0))
    })
}

/// Dispatches one host notification. Returns whether an editor observer
/// handled it.
///
/// # Safety
/// `proxy` must be live; `event` must point to a valid event.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_dispatch(proxy: *const Proxy, event: *const FfiEvent) -> bool {
    guard("modproxy_proxy_dispatch", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        let raw = unsafe { event.as_ref() }.ok_or_else(|| ProxyError::internal("null event"))?;
        let Some(event) = (unsafe { event_from_ffi(raw) }) else {
            return Ok(false);
        };
        Ok(proxy.dispatch(&event).handled)
    })
}

/// Runs deferred tasks. Returns how many ran.
///
/// # Safety
/// `proxy` must be live.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modproxy_proxy_run_pending(proxy: *const Proxy) -> usize {
    guard("modproxy_proxy_run_pending", || {
        let proxy = unsafe { proxy_ref(proxy) }?;
        Ok(proxy.run_pending())
    })
}
