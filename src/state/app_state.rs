use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::batch::error_log::ErrorLog;

#[derive(Debug, Default)]
pub struct RunStats {
    pub processed: AtomicUsize,
    pub written: AtomicUsize,
    pub failed: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub written: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            processed: self.processed.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    // Checked between files; set from the Ctrl-C handler
    pub stop: Arc<AtomicBool>,
    pub error_log: Arc<ErrorLog>,
    pub stats: Arc<RunStats>,
}

impl AppState {
    pub fn new(error_log: ErrorLog) -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            error_log: Arc::new(error_log),
            stats: Arc::new(RunStats::default()),
        }
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}
