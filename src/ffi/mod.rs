//! FFI layer – each sub-module exposes one domain area of the C API.
//!
//! Shared pieces live here: the handle tables, the panic boundary, pointer
//! helpers and the guard macro.
//!
//! Every exported function resets the calling thread's last status on entry
//! and records a [`KkcStatus`] plus message on failure. Nothing unwinds across
//! the C ABI; a caught panic is reported as [`KkcStatus::Internal`].

use std::any::Any;
use std::ffi::{c_char, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use crate::composing::ComposingText;
use crate::converter::Converter;
use crate::diagnostics::{self, KkcStatus};
use crate::registry::{HandleError, HandleRegistry};

// Domain modules
pub mod candidates;
pub mod composing;
pub mod config;
pub mod converter;

#[cfg(test)]
mod tests;

// Re-export all public FFI symbols so `pub use ffi::*;` in lib.rs works.
pub use candidates::*;
pub use composing::*;
pub use config::*;
pub use converter::*;

pub(crate) static CONVERTERS: HandleRegistry<Arc<Converter>> = HandleRegistry::new();
pub(crate) static COMPOSING_TEXTS: HandleRegistry<ComposingText> = HandleRegistry::new();

/// Safely convert a C string pointer to a `&str`.
/// Returns `None` if the pointer is null or contains invalid UTF-8.
pub(crate) unsafe fn cptr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Like [`cptr_to_str`], but null reads as the empty string.
/// Returns `None` only for invalid UTF-8.
pub(crate) unsafe fn cptr_to_str_or_empty<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return Some("");
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Build a C string from `s`, dropping interior NULs.
pub(crate) fn to_c_string(s: String) -> CString {
    CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

// ---------------------------------------------------------------------------
// FFI boilerplate-reduction macros (crate-internal)
// ---------------------------------------------------------------------------

/// Validate one or more FFI arguments and bind them as safe Rust values,
/// recording [`KkcStatus::InvalidArgument`] and returning `$on_err` from the
/// enclosing function or closure if any check fails.
///
/// # Supported argument forms
///
/// | Syntax | What it does |
/// |--------|--------------|
/// | `str: $name = $ptr` | Null-check `$ptr: *const c_char`, convert via [`cptr_to_str`] to `&str`, bind as `$name`. |
/// | `opt_str: $name = $ptr` | As `str:`, but null binds `""`. |
/// | `nonnull: $ptr`      | Assert `$ptr` is non-null (no new binding is introduced). |
///
/// # Examples
///
/// ```ignore
/// ffi_guard!(ptr::null_mut();
///     nonnull: out_length,
///     str: dictionary_path = dictionary_path,
///     opt_str: context = context,
/// );
/// ```
macro_rules! ffi_guard {
    ($on_err:expr ; ) => {};

    ($on_err:expr ; str: $name:ident = $ptr:expr , $($rest:tt)*) => {
        let Some($name) = (unsafe { $crate::ffi::cptr_to_str($ptr) }) else {
            $crate::ffi::invalid_argument(stringify!($ptr), "null or not UTF-8");
            return $on_err;
        };
        $crate::ffi::ffi_guard!($on_err ; $($rest)*);
    };

    ($on_err:expr ; opt_str: $name:ident = $ptr:expr , $($rest:tt)*) => {
        let Some($name) = (unsafe { $crate::ffi::cptr_to_str_or_empty($ptr) }) else {
            $crate::ffi::invalid_argument(stringify!($ptr), "not UTF-8");
            return $on_err;
        };
        $crate::ffi::ffi_guard!($on_err ; $($rest)*);
    };

    ($on_err:expr ; nonnull: $ptr:expr , $($rest:tt)*) => {
        if $ptr.is_null() {
            $crate::ffi::invalid_argument(stringify!($ptr), "null");
            return $on_err;
        }
        $crate::ffi::ffi_guard!($on_err ; $($rest)*);
    };
}

// Make macros available to sub-modules.
pub(crate) use ffi_guard;

pub(crate) fn invalid_argument(name: &str, reason: &str) {
    tracing::error!(argument = name, reason, "invalid argument");
    diagnostics::record(KkcStatus::InvalidArgument, format!("{name}: {reason}"));
}

pub(crate) fn invalid_handle(function: &str, e: &HandleError) {
    tracing::error!(function, error = %e, "invalid handle");
    diagnostics::record(KkcStatus::from(e), format!("{function}: {e}"));
}

/// Run the body of an exported function: reset the last status, then call
/// `f`, converting a panic into `fallback` and [`KkcStatus::Internal`].
pub(crate) fn boundary<R>(function: &'static str, fallback: R, f: impl FnOnce() -> R) -> R {
    diagnostics::clear();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::error!(function, panic = %msg, "panic caught at FFI boundary");
            diagnostics::record(KkcStatus::Internal, format!("{function}: panic: {msg}"));
            fallback
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

// --- Top-level FFI functions ---

const VERSION: &CStr = match CStr::from_bytes_with_nul(
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes(),
) {
    Ok(v) => v,
    Err(_) => c"unknown",
};

#[no_mangle]
pub extern "C" fn kkc_bridge_version() -> *const c_char {
    VERSION.as_ptr()
}

#[no_mangle]
#[allow(clippy::unused_unit)]
pub extern "C" fn kkc_trace_init(log_dir: *const c_char) {
    boundary("kkc_trace_init", (), || {
        ffi_guard!(();
            str: dir_str = log_dir,
        );
        crate::trace_init::init_tracing(Path::new(dir_str));
    })
}

/// Free a string returned by this library. Null is a no-op.
#[no_mangle]
pub extern "C" fn kkc_string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Status of the last call made on this thread.
#[no_mangle]
pub extern "C" fn kkc_last_status() -> KkcStatus {
    diagnostics::last_status()
}

/// Message for the last failed call on this thread, or null after success.
/// Owned by the library and valid until the next call on this thread.
#[no_mangle]
pub extern "C" fn kkc_last_error_message() -> *const c_char {
    diagnostics::last_message_ptr()
}
