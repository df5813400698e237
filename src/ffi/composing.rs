use std::ffi::c_char;
use std::ptr;

use super::{boundary, ffi_guard, invalid_handle, to_c_string, COMPOSING_TEXTS};
use crate::composing::ComposingText;

// --- Composing buffer FFI ---

/// Opaque composing-buffer reference. `0` is null.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KkcComposingTextHandle(pub u64);

impl KkcComposingTextHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

fn cursor_to_c(cursor: usize) -> i32 {
    i32::try_from(cursor).unwrap_or(i32::MAX)
}

#[no_mangle]
pub extern "C" fn kkc_composing_text_create() -> KkcComposingTextHandle {
    boundary("kkc_composing_text_create", KkcComposingTextHandle::NULL, || {
        KkcComposingTextHandle(COMPOSING_TEXTS.insert(ComposingText::new()))
    })
}

/// Destroy a composing buffer. Stale, unknown and null handles are reported
/// through `kkc_last_status` and otherwise ignored.
#[no_mangle]
pub extern "C" fn kkc_composing_text_destroy(handle: KkcComposingTextHandle) {
    boundary("kkc_composing_text_destroy", (), || {
        if let Err(e) = COMPOSING_TEXTS.remove(handle.0) {
            invalid_handle("kkc_composing_text_destroy", &e);
        }
    })
}

/// Insert romaji (or kana) at the cursor.
#[no_mangle]
pub extern "C" fn kkc_composing_text_insert_at_cursor(
    handle: KkcComposingTextHandle,
    text: *const c_char,
) {
    boundary("kkc_composing_text_insert_at_cursor", (), || {
        ffi_guard!(();
            str: text = text,
        );
        if let Err(e) = COMPOSING_TEXTS.with_mut(handle.0, |ct| ct.insert_at_cursor(text)) {
            invalid_handle("kkc_composing_text_insert_at_cursor", &e);
        }
    })
}

/// Remove up to `count` units after the cursor. `count <= 0` is a no-op.
#[no_mangle]
pub extern "C" fn kkc_composing_text_delete_forward(handle: KkcComposingTextHandle, count: i32) {
    boundary("kkc_composing_text_delete_forward", (), || {
        if let Err(e) =
            COMPOSING_TEXTS.with_mut(handle.0, |ct| ct.delete_forward_from_cursor(count))
        {
            invalid_handle("kkc_composing_text_delete_forward", &e);
        }
    })
}

/// Remove up to `count` units before the cursor. `count <= 0` is a no-op.
#[no_mangle]
pub extern "C" fn kkc_composing_text_delete_backward(handle: KkcComposingTextHandle, count: i32) {
    boundary("kkc_composing_text_delete_backward", (), || {
        if let Err(e) =
            COMPOSING_TEXTS.with_mut(handle.0, |ct| ct.delete_backward_from_cursor(count))
        {
            invalid_handle("kkc_composing_text_delete_backward", &e);
        }
    })
}

/// Move the cursor by `offset` units. Returns the new cursor, or -1 for an
/// invalid handle.
#[no_mangle]
pub extern "C" fn kkc_composing_text_move_cursor(
    handle: KkcComposingTextHandle,
    offset: i32,
) -> i32 {
    boundary("kkc_composing_text_move_cursor", -1, || {
        match COMPOSING_TEXTS.with_mut(handle.0, |ct| ct.move_cursor(offset)) {
            Ok(cursor) => cursor_to_c(cursor),
            Err(e) => {
                invalid_handle("kkc_composing_text_move_cursor", &e);
                -1
            }
        }
    })
}

/// Kana text of the buffer. Free with `kkc_string_free`. Null for an invalid
/// handle.
#[no_mangle]
pub extern "C" fn kkc_composing_text_convert_target(
    handle: KkcComposingTextHandle,
) -> *mut c_char {
    boundary("kkc_composing_text_convert_target", ptr::null_mut(), || {
        match COMPOSING_TEXTS.with(handle.0, ComposingText::convert_target) {
            Ok(text) => to_c_string(text).into_raw(),
            Err(e) => {
                invalid_handle("kkc_composing_text_convert_target", &e);
                ptr::null_mut()
            }
        }
    })
}

/// Cursor position in units, or -1 for an invalid handle.
#[no_mangle]
pub extern "C" fn kkc_composing_text_cursor(handle: KkcComposingTextHandle) -> i32 {
    boundary("kkc_composing_text_cursor", -1, || {
        match COMPOSING_TEXTS.with(handle.0, ComposingText::cursor) {
            Ok(cursor) => cursor_to_c(cursor),
            Err(e) => {
                invalid_handle("kkc_composing_text_cursor", &e);
                -1
            }
        }
    })
}
