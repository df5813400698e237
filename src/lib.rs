//! C ABI bridge to a kana-kanji conversion engine.
//!
//! Callers create converters and composing buffers through opaque handles,
//! type romaji into a buffer, and ask a converter for ranked candidates. Each
//! converter runs its engine on a dedicated worker thread; boundary calls
//! block until the engine replies.

// FFI functions perform null checks before dereferencing raw pointers.
// Clippy cannot verify this statically, so we allow it at crate level.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

mod async_worker;
pub mod composing;
pub mod converter;
pub mod diagnostics;
pub mod engine;
pub mod ffi;
pub mod registry;
pub mod romaji;
pub mod settings;
mod trace_init;
pub mod unicode;

pub use ffi::*;
