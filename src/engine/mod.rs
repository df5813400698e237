//! Conversion engine interface and the request adapter.
//!
//! The bridge talks to an engine only through [`ConversionEngine`]. A boundary
//! request is turned into [`ConvertRequestOptions`] by [`ConversionRequest`];
//! [`StandardEngine`] is the bundled dictionary-backed implementation.

mod lexicon;
mod request;
mod scoring;
mod standard;

pub use lexicon::{DictEntry, Lexicon};
pub use request::{AugmentationOptions, ConversionRequest, ConvertRequestOptions};
pub use scoring::WeightModel;
pub use standard::StandardEngine;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::composing::ComposingSnapshot;

/// Failure to load a dictionary or weight resource.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: no dictionary entries", path.display())]
    Empty { path: PathBuf },

    #[error("{}: invalid weight file: {msg}", path.display())]
    InvalidWeights { path: PathBuf, msg: String },

    #[error("cannot resolve working directory: {0}")]
    WorkingDirectory(#[source] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("conversion worker is not running")]
    WorkerGone,
}

/// One ranked conversion result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Candidate {
    pub text: String,
    /// Composing units this candidate consumes, counted from the start.
    pub corresponding_count: usize,
    /// Lower is better.
    pub cost: i64,
}

/// Candidates in ranked order, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResult {
    pub main_results: Vec<Candidate>,
}

/// Cooperative stop signal for one job.
///
/// A token remembers the converter generation it was issued under; bumping
/// the generation cancels every token issued before the bump.
#[derive(Debug, Clone)]
pub struct CancelToken {
    current: Arc<AtomicU64>,
    issued: u64,
}

impl CancelToken {
    pub(crate) fn issue(current: &Arc<AtomicU64>) -> Self {
        Self {
            issued: current.load(Ordering::SeqCst),
            current: Arc::clone(current),
        }
    }

    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self::issue(&Arc::new(AtomicU64::new(0)))
    }

    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.issued
    }
}

/// A kana-kanji conversion engine driven by the bridge.
///
/// Engines run on their converter's worker thread and are never shared, so
/// `&mut self` is available for resource caches.
pub trait ConversionEngine: Send {
    fn request_candidates(
        &mut self,
        input: &ComposingSnapshot,
        options: &ConvertRequestOptions,
        cancel: &CancelToken,
    ) -> Result<ConversionResult, EngineError>;
}
