use std::sync::{Mutex, PoisonError};

/// Process-wide state behind one lock. Every mutation runs with exclusive access.
#[derive(Debug, Default)]
pub struct Store<S> {
    state: Mutex<S>,
}

impl<S> Store<S> {
    pub fn new(state: S) -> Self { Self { state: Mutex::new(state) } }

    /// Runs `f` while holding the lock. A poisoned lock is recovered, not propagated.
    pub fn with<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}

impl<S: Clone> Store<S> {
    pub fn snapshot(&self) -> S { self.with(|s| s.clone()) }
}
