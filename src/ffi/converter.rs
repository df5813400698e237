use std::ffi::{c_char, c_int};
use std::ptr;
use std::sync::Arc;

use tracing::{debug, warn};

use super::candidates::{pack_candidates, KkcCandidate};
use super::composing::KkcComposingTextHandle;
use super::{boundary, ffi_guard, invalid_handle, COMPOSING_TEXTS, CONVERTERS};
use crate::composing::ComposingText;
use crate::converter::Converter;
use crate::diagnostics::{self, KkcStatus};
use crate::engine::ConversionRequest;

// --- Converter FFI ---

/// Opaque converter reference. `0` is null.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KkcConverterHandle(pub u64);

impl KkcConverterHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Create a converter with its own engine worker. Returns the null handle if
/// the worker thread cannot be started.
#[no_mangle]
pub extern "C" fn kkc_converter_create() -> KkcConverterHandle {
    boundary("kkc_converter_create", KkcConverterHandle::NULL, || {
        match Converter::new() {
            Ok(converter) => KkcConverterHandle(CONVERTERS.insert(Arc::new(converter))),
            Err(e) => {
                warn!(error = %e, "failed to start engine worker");
                diagnostics::record(KkcStatus::EngineUnavailable, e.to_string());
                KkcConverterHandle::NULL
            }
        }
    })
}

/// Destroy a converter. A request still in flight on another thread keeps the
/// engine alive until it returns, and then yields an empty result.
#[no_mangle]
pub extern "C" fn kkc_converter_destroy(handle: KkcConverterHandle) {
    boundary("kkc_converter_destroy", (), || {
        // Dropping the last reference joins the idle worker.
        if let Err(e) = CONVERTERS.remove(handle.0) {
            invalid_handle("kkc_converter_destroy", &e);
        }
    })
}

/// Convert the buffer's current contents, blocking until the engine replies.
///
/// Writes the number of candidates to `out_length` and returns an owned
/// array of that many records, best first; release it with
/// `kkc_candidates_free`. Every failure returns null with `*out_length == 0`;
/// `kkc_last_status` tells them apart from an empty conversion.
///
/// A null `context` or `weight_path` reads as empty. An empty `weight_path`
/// disables the scoring-model augmentation.
#[no_mangle]
pub extern "C" fn kkc_converter_request_candidates(
    converter: KkcConverterHandle,
    composing_text: KkcComposingTextHandle,
    out_length: *mut c_int,
    context: *const c_char,
    dictionary_path: *const c_char,
    weight_path: *const c_char,
) -> *mut *mut KkcCandidate {
    if !out_length.is_null() {
        unsafe { *out_length = 0 };
    }
    boundary("kkc_converter_request_candidates", ptr::null_mut(), || {
        ffi_guard!(ptr::null_mut();
            nonnull: out_length,
            str: dictionary_path = dictionary_path,
            opt_str: context = context,
            opt_str: weight_path = weight_path,
        );

        let engine = match CONVERTERS.get(converter.0) {
            Ok(engine) => engine,
            Err(e) => {
                invalid_handle("kkc_converter_request_candidates", &e);
                return ptr::null_mut();
            }
        };
        let snapshot = match COMPOSING_TEXTS.with(composing_text.0, ComposingText::snapshot) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                invalid_handle("kkc_converter_request_candidates", &e);
                return ptr::null_mut();
            }
        };

        let request = ConversionRequest {
            context,
            dictionary_path,
            weight_path,
        };
        let result = engine.request_candidates(snapshot, &request);
        drop(engine);

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "conversion failed");
                diagnostics::record(KkcStatus::from(&e), e.to_string());
                return ptr::null_mut();
            }
        };

        // Either handle may have been destroyed while the engine ran.
        if !CONVERTERS.contains(converter.0) || !COMPOSING_TEXTS.contains(composing_text.0) {
            debug!("handle destroyed during request; discarding result");
            diagnostics::record(
                KkcStatus::InvalidHandle,
                "kkc_converter_request_candidates: handle destroyed during request",
            );
            return ptr::null_mut();
        }

        let (list, len) = pack_candidates(result.main_results);
        unsafe { *out_length = len };
        list
    })
}

/// Ask requests in flight on `converter` to finish early. The converter and
/// buffer stay valid.
#[no_mangle]
pub extern "C" fn kkc_converter_stop_composition(
    converter: KkcConverterHandle,
    composing_text: KkcComposingTextHandle,
) {
    boundary("kkc_converter_stop_composition", (), || {
        if let Err(e) = CONVERTERS.with(converter.0, |engine| engine.stop_composition()) {
            invalid_handle("kkc_converter_stop_composition", &e);
            return;
        }
        if let Err(e) = COMPOSING_TEXTS.with(composing_text.0, |_| ()) {
            invalid_handle("kkc_converter_stop_composition", &e);
        }
    })
}
