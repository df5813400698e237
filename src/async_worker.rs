use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use crate::composing::ComposingSnapshot;
use crate::engine::{
    CancelToken, ConversionEngine, ConversionResult, ConvertRequestOptions, EngineError,
};

// ---------------------------------------------------------------------------
// Work / Result types
// ---------------------------------------------------------------------------

pub(crate) struct ConversionJob {
    pub input: ComposingSnapshot,
    pub options: ConvertRequestOptions,
    pub cancel: CancelToken,
    pub reply: mpsc::SyncSender<Result<ConversionResult, EngineError>>,
}

// ---------------------------------------------------------------------------
// EngineWorker
// ---------------------------------------------------------------------------

static WORKER_SEQ: AtomicU64 = AtomicU64::new(0);

/// One engine on its own thread, fed through a FIFO job queue.
pub(crate) struct EngineWorker {
    job_tx: Option<mpsc::Sender<ConversionJob>>,
    generation: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl EngineWorker {
    pub fn spawn(engine: Box<dyn ConversionEngine>) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<ConversionJob>();
        let seq = WORKER_SEQ.fetch_add(1, Ordering::Relaxed);
        let thread = thread::Builder::new()
            .name(format!("kkc-engine-{seq}"))
            .spawn(move || engine_worker(job_rx, engine))?;
        Ok(Self {
            job_tx: Some(job_tx),
            generation: Arc::new(AtomicU64::new(0)),
            thread: Some(thread),
        })
    }

    /// Queue a conversion and block until its single reply arrives.
    pub fn request_blocking(
        &self,
        input: ComposingSnapshot,
        options: ConvertRequestOptions,
    ) -> Result<ConversionResult, EngineError> {
        let (reply, reply_rx) = mpsc::sync_channel(1);
        let job = ConversionJob {
            input,
            options,
            cancel: CancelToken::issue(&self.generation),
            reply,
        };
        let tx = self.job_tx.as_ref().ok_or(EngineError::WorkerGone)?;
        tx.send(job).map_err(|_| EngineError::WorkerGone)?;
        // A worker that dies mid-job drops the reply sender, which ends recv.
        reply_rx.recv().map_err(|_| EngineError::WorkerGone)?
    }

    /// Cancel every job issued so far. Later jobs run normally.
    pub fn stop(&self) {
        let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation = gen, "stop requested");
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        drop(self.job_tx.take());
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() == thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                warn!("engine worker exited by panic");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

fn engine_worker(rx: mpsc::Receiver<ConversionJob>, mut engine: Box<dyn ConversionEngine>) {
    while let Ok(job) = rx.recv() {
        let result = engine.request_candidates(&job.input, &job.options, &job.cancel);
        if let Err(e) = &result {
            error!(error = %e, "conversion failed");
        }
        // The requester may have given up; nothing to do then.
        let _ = job.reply.send(result);
    }
    debug!("engine worker shutting down");
}
