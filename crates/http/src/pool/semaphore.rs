use std::sync::{Condvar, Mutex};

/// A counting semaphore built from a mutex and a condition variable.
///
/// `acquire` blocks while the count is zero; `release` increments and wakes
/// one waiter. A poisoned mutex means a thread panicked while holding the
/// count — the process cannot safely continue and these methods panic with a
/// diagnostic rather than limp on with corrupt shared state.
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(initial: usize) -> Semaphore {
        Semaphore { permits: Mutex::new(initial), available: Condvar::new() }
    }

    /// Takes one permit, blocking until one is available.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock().expect("semaphore mutex poisoned");
        while *permits == 0 {
            permits = self.available.wait(permits).expect("semaphore mutex poisoned");
        }
        *permits -= 1;
    }

    /// Returns one permit and wakes a single waiter.
    pub fn release(&self) {
        let mut permits = self.permits.lock().expect("semaphore mutex poisoned");
        *permits += 1;
        drop(permits);
        self.available.notify_one();
    }
}
