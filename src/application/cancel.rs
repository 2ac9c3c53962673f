use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative, advisory cancellation flag shared between a request and
/// whoever may abort it (Ctrl-C, a closed conversation).
///
/// Checked at external-call boundaries only. In-flight calls run to
/// completion; their results are discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
