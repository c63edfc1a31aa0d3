//! Evacuation valve.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Binary evacuation valve. Starts closed.
#[derive(Debug, Default)]
pub struct SafetyValve {
    open: AtomicBool,
}

impl SafetyValve {
    /// Create a closed valve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the valve. Returns `true` if it was closed.
    pub fn open(&self) -> bool {
        let changed = !self.open.swap(true, Ordering::AcqRel);
        if changed {
            info!("[EVENT] evacuation valve opened");
        }
        changed
    }

    /// Close the valve. Returns `true` if it was open.
    pub fn close(&self) -> bool {
        let changed = self.open.swap(false, Ordering::AcqRel);
        if changed {
            info!("[EVENT] evacuation valve closed");
        }
        changed
    }

    /// Current position.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}
