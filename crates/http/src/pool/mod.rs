//! The fixed-size worker pool and its bounded handoff queue.
//!
//! This is the classic bounded-buffer producer/consumer arrangement: the
//! reactor thread is the sole producer, the workers are the consumers, and
//! two counting semaphores plus a mutex guard the ring between them. The
//! "free slots" semaphore starts at the ring capacity and blocks the
//! producer when the queue is full; the "filled slots" semaphore starts at
//! zero and parks workers while the queue is empty. A full queue therefore
//! blocks the reactor itself, which stops draining readiness events, which
//! throttles accepts — backpressure runs end to end instead of dropping
//! work.

mod ring;
mod semaphore;

pub use ring::{Ring, RING_CAPACITY};
pub use semaphore::Semaphore;

use std::io;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;

use mio::Waker;
use tracing::{debug, error, warn};

use crate::connection::Connection;
use crate::server::Service;

/// Worker threads started by default.
pub const DEFAULT_WORKERS: usize = 8;

/// One unit of work: a connection whose request is fully parsed and ready
/// for application dispatch.
#[derive(Debug)]
pub struct Task {
    pub connection: Connection,
}

struct Shared {
    ring: Mutex<Ring<Task>>,
    free_slots: Semaphore,
    filled_slots: Semaphore,
}

/// The worker pool. Created once at startup and owned by the server for the
/// process lifetime; workers run tasks to completion, there is no
/// cancellation.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool").field("workers", &self.workers.len()).finish()
    }
}

impl ThreadPool {
    /// Starts `workers` threads consuming from a ring of [`RING_CAPACITY`]
    /// slots.
    ///
    /// Each finished connection is handed back to the reactor over `done`,
    /// and `waker` interrupts the readiness wait so the reactor notices.
    /// Failing to spawn a worker is a fatal startup error.
    pub fn start(
        workers: usize,
        service: Arc<dyn Service>,
        done: Sender<Connection>,
        waker: Arc<Waker>,
    ) -> io::Result<ThreadPool> {
        let shared = Arc::new(Shared {
            ring: Mutex::new(Ring::new(RING_CAPACITY)),
            free_slots: Semaphore::new(RING_CAPACITY),
            filled_slots: Semaphore::new(0),
        });

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let shared = Arc::clone(&shared);
            let service = Arc::clone(&service);
            let done = done.clone();
            let waker = Arc::clone(&waker);

            let handle = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker_loop(&shared, service.as_ref(), &done, &waker))?;
            handles.push(handle);
        }

        Ok(ThreadPool { shared, workers: handles })
    }

    /// Hands a task to the pool.
    ///
    /// Blocks on the free-slot semaphore when the ring is full — the
    /// producer must never push without a permit, that permit is the only
    /// thing keeping `Ring::push` from dropping work.
    pub fn submit(&self, task: Task) {
        self.shared.free_slots.acquire();
        {
            let mut ring = self.shared.ring.lock().expect("task ring mutex poisoned");
            ring.push(task);
        }
        self.shared.filled_slots.release();
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(shared: &Shared, service: &dyn Service, done: &Sender<Connection>, waker: &Waker) {
    loop {
        shared.filled_slots.acquire();
        let task = {
            let mut ring = shared.ring.lock().expect("task ring mutex poisoned");
            ring.pop()
        };
        shared.free_slots.release();

        let Some(task) = task else {
            continue;
        };

        let mut connection = task.connection;
        connection.serve(service);

        debug!(peer = %connection.peer(), "task finished, returning connection to reactor");

        // The reactor re-arms the connection for writability once it owns it
        // again; waking the poll makes that happen promptly.
        if done.send(connection).is_err() {
            warn!("reactor is gone, shutting worker down");
            return;
        }

        if let Err(e) = waker.wake() {
            error!(cause = %e, "failed to wake reactor");
            return;
        }
    }
}
