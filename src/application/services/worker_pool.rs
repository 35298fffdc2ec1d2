use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;

/// Caps how many recognizer subprocesses run at once.
///
/// Admission is FIFO: the underlying semaphore is fair, so queued work
/// acquires slots in submission order. The queue itself has no depth bound;
/// `queued()` exposes its size as an observability signal.
pub struct WorkerPool {
    semaphore: Semaphore,
    capacity: usize,
    queued: AtomicUsize,
    active: AtomicUsize,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            queued: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks waiting for a free slot.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Tasks currently holding a slot.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Runs `work` once a slot frees up. Failures inside `work` stay values
    /// of its output type; nothing panics across the pool boundary. Counter
    /// guards keep `queued`/`active` accurate when the awaiting task is
    /// cancelled mid-wait.
    pub async fn run<F>(&self, work: F) -> F::Output
    where
        F: Future,
    {
        let queued = CounterGuard::increment(&self.queued);
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("worker pool semaphore closed");
        drop(queued);

        let _active = CounterGuard::increment(&self.active);
        work.await
    }
}

struct CounterGuard<'a>(&'a AtomicUsize);

impl<'a> CounterGuard<'a> {
    fn increment(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for CounterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
