use std::ffi::{c_char, c_int, CString};
use std::ptr;

use super::{boundary, invalid_argument, to_c_string};
use crate::engine::Candidate;

// --- Candidate list FFI ---

/// One conversion candidate. Text is NUL-terminated UTF-8.
#[repr(C)]
pub struct KkcCandidate {
    pub text: *mut c_char,
    /// Composing units consumed, counted from the start of the buffer.
    pub corresponding_count: c_int,
}

/// Marshal `candidates` into an owned array of owned records, best first.
///
/// Returns `(null, 0)` for an empty list. Lists longer than `c_int::MAX` are
/// truncated.
pub(crate) fn pack_candidates(candidates: Vec<Candidate>) -> (*mut *mut KkcCandidate, c_int) {
    if candidates.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let records: Box<[*mut KkcCandidate]> = candidates
        .into_iter()
        .take(c_int::MAX as usize)
        .map(|c| {
            Box::into_raw(Box::new(KkcCandidate {
                text: to_c_string(c.text).into_raw(),
                corresponding_count: c_int::try_from(c.corresponding_count).unwrap_or(c_int::MAX),
            }))
        })
        .collect();
    // Bounded by the take() above
    let len = records.len() as c_int;
    (Box::into_raw(records).cast::<*mut KkcCandidate>(), len)
}

/// Release a list returned by `kkc_converter_request_candidates`.
///
/// `len` must be the count written to `out_length` by that call. Null is a
/// no-op.
#[no_mangle]
pub extern "C" fn kkc_candidates_free(list: *mut *mut KkcCandidate, len: c_int) {
    if list.is_null() {
        return;
    }
    boundary("kkc_candidates_free", (), || {
        let Ok(len) = usize::try_from(len) else {
            invalid_argument("len", "negative length for non-null list");
            return;
        };
        let records = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(list, len)) };
        for &record in records.iter() {
            if record.is_null() {
                continue;
            }
            let record = unsafe { Box::from_raw(record) };
            if !record.text.is_null() {
                drop(unsafe { CString::from_raw(record.text) });
            }
        }
    })
}
