//! Captured output shared between the reader task and the foreground.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ordered, append-only log of output chunks.
///
/// Entries are raw read chunks (not necessarily whole lines) plus the echo,
/// reply and diagnostic lines added by the router. Insertion order is the only
/// ordering guarantee. Cloning yields another handle to the same log.
#[derive(Clone, Debug, Default)]
pub struct OutputLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry at the end of the log.
    pub fn append(&self, text: impl Into<String>) {
        self.lock().push(text.into());
    }

    /// Copy of the current contents. Later appends or clears do not affect it.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a Vec<String> half-updated.
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
