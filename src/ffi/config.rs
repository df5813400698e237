use std::ffi::c_char;
use std::path::Path;

use super::{boundary, ffi_guard, to_c_string};
use crate::diagnostics::{self, KkcStatus};
use crate::romaji::RomajiTrie;

// --- Configuration FFI ---
//
// Custom tables must be installed before the first conversion or insert.
// Once a table is in use, loading fails with InvalidArgument and the table
// in effect is unchanged.

fn read_config(path: &str) -> Option<String> {
    match std::fs::read_to_string(Path::new(path)) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path, error = %e, "cannot read config");
            diagnostics::record(KkcStatus::ResourceUnavailable, format!("{path}: {e}"));
            None
        }
    }
}

fn rejected(e: impl std::fmt::Display) -> i32 {
    tracing::warn!(error = %e, "config rejected");
    diagnostics::record(KkcStatus::InvalidArgument, e.to_string());
    -1
}

/// Replace the default settings with the TOML file at `path`.
/// Returns 0 on success, -1 on failure.
#[no_mangle]
pub extern "C" fn kkc_settings_load_config(path: *const c_char) -> i32 {
    boundary("kkc_settings_load_config", -1, || {
        ffi_guard!(-1;
            str: path = path,
        );
        let Some(content) = read_config(path) else {
            return -1;
        };
        match crate::settings::init_custom(content) {
            Ok(()) => 0,
            Err(e) => rejected(e),
        }
    })
}

/// Replace the romaji table with the TOML file at `path`.
/// Returns 0 on success, -1 on failure.
#[no_mangle]
pub extern "C" fn kkc_romaji_load_config(path: *const c_char) -> i32 {
    boundary("kkc_romaji_load_config", -1, || {
        ffi_guard!(-1;
            str: path = path,
        );
        let Some(content) = read_config(path) else {
            return -1;
        };
        match RomajiTrie::init_custom(content) {
            Ok(()) => 0,
            Err(e) => rejected(e),
        }
    })
}

/// The embedded settings TOML. Free with `kkc_string_free`.
#[no_mangle]
pub extern "C" fn kkc_settings_default_config() -> *mut c_char {
    to_c_string(crate::settings::DEFAULT_SETTINGS_TOML.to_string()).into_raw()
}

/// The embedded romaji TOML. Free with `kkc_string_free`.
#[no_mangle]
pub extern "C" fn kkc_romaji_default_config() -> *mut c_char {
    to_c_string(crate::romaji::DEFAULT_TOML.to_string()).into_raw()
}
