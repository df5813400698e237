//! Per-thread outcome of the most recent boundary call.
//!
//! Candidate-returning functions degrade to empty output on failure; callers
//! that need to tell "no candidates" from "dictionary missing" read the status
//! recorded here. Every boundary call resets it on entry.

use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::ptr;

use crate::engine::{EngineError, ResourceError};
use crate::registry::HandleError;

/// Outcome code of the last boundary call on the calling thread.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KkcStatus {
    Ok = 0,
    InvalidHandle = 1,
    InvalidArgument = 2,
    ResourceUnavailable = 3,
    EngineUnavailable = 4,
    Internal = 5,
}

struct LastOutcome {
    status: KkcStatus,
    message: Option<CString>,
}

thread_local! {
    static LAST: RefCell<LastOutcome> = const {
        RefCell::new(LastOutcome {
            status: KkcStatus::Ok,
            message: None,
        })
    };
}

pub(crate) fn clear() {
    LAST.with(|last| {
        let mut last = last.borrow_mut();
        last.status = KkcStatus::Ok;
        last.message = None;
    });
}

/// Record a failure. Interior NULs in `message` are dropped.
pub(crate) fn record(status: KkcStatus, message: impl Into<String>) {
    let mut bytes = message.into().into_bytes();
    bytes.retain(|&b| b != 0);
    let message = CString::new(bytes).ok();
    LAST.with(|last| {
        let mut last = last.borrow_mut();
        last.status = status;
        last.message = message;
    });
}

pub fn last_status() -> KkcStatus {
    LAST.with(|last| last.borrow().status)
}

pub fn last_message() -> Option<String> {
    LAST.with(|last| {
        last.borrow()
            .message
            .as_ref()
            .map(|m| m.to_string_lossy().into_owned())
    })
}

/// Pointer to the last message, valid until the next boundary call on this
/// thread. Null when the last call succeeded.
pub(crate) fn last_message_ptr() -> *const c_char {
    LAST.with(|last| {
        last.borrow()
            .message
            .as_ref()
            .map_or(ptr::null(), |m| m.as_ptr())
    })
}

impl From<&HandleError> for KkcStatus {
    fn from(e: &HandleError) -> Self {
        match e {
            HandleError::Null | HandleError::Unknown(_) | HandleError::Stale(_) => {
                KkcStatus::InvalidHandle
            }
        }
    }
}

impl From<&EngineError> for KkcStatus {
    fn from(e: &EngineError) -> Self {
        match e {
            EngineError::Resource(ResourceError::WorkingDirectory(_)) => KkcStatus::Internal,
            EngineError::Resource(_) => KkcStatus::ResourceUnavailable,
            EngineError::WorkerGone => KkcStatus::EngineUnavailable,
        }
    }
}
