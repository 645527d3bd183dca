use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "shut down now" flag.
///
/// Clones observe the same flag. Once triggered it stays triggered.
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
