//! A converter: one engine behind its own worker thread.

use std::io;

use tracing::debug_span;

use crate::async_worker::EngineWorker;
use crate::composing::ComposingSnapshot;
use crate::engine::{
    ConversionEngine, ConversionRequest, ConversionResult, EngineError, StandardEngine,
};

pub struct Converter {
    worker: EngineWorker,
}

impl Converter {
    /// Converter backed by the bundled dictionary engine.
    pub fn new() -> io::Result<Self> {
        Self::with_engine(Box::new(StandardEngine::new()))
    }

    pub fn with_engine(engine: Box<dyn ConversionEngine>) -> io::Result<Self> {
        Ok(Self {
            worker: EngineWorker::spawn(engine)?,
        })
    }

    /// Convert `input`, blocking until the engine replies.
    pub fn request_candidates(
        &self,
        input: ComposingSnapshot,
        request: &ConversionRequest<'_>,
    ) -> Result<ConversionResult, EngineError> {
        let _span = debug_span!("request_candidates", units = input.len()).entered();
        let options = request.to_options()?;
        self.worker.request_blocking(input, options)
    }

    /// Ask in-flight requests to return early. The converter stays usable.
    pub fn stop_composition(&self) {
        self.worker.stop();
    }
}
