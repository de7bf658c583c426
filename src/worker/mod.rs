//! Background work dispatch
//!
//! [`WorkQueue`] runs producers on their own worker threads and hands
//! the results back to a single-threaded driver. Completions land in
//! one mutex-guarded queue; the driver drains the entire current
//! contents exactly once per tick, invoking each completion callback
//! synchronously on its own thread. That gives three guarantees:
//! callbacks never run concurrently with each other or with the
//! driver's per-tick logic, generation work never touches driver-owned
//! state directly, and a job finishing while a drain is in progress
//! waits for the next tick.
//!
//! There is no cancellation: a submitted job always runs to completion
//! and its callback always eventually fires.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

type Completion<Ctx> = Box<dyn FnOnce(&mut Ctx) + Send>;

/// Thread-per-job dispatcher with a single-drain completion queue
///
/// `Ctx` is the driver-owned state completions are allowed to mutate;
/// it is only ever touched from [`WorkQueue::process`], never from a
/// worker. Clones share the same queue.
pub struct WorkQueue<Ctx> {
    completed: Arc<Mutex<VecDeque<Completion<Ctx>>>>,
}

impl<Ctx> Clone for WorkQueue<Ctx> {
    fn clone(&self) -> Self {
        Self {
            completed: Arc::clone(&self.completed),
        }
    }
}

impl<Ctx: 'static> Default for WorkQueue<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx: 'static> WorkQueue<Ctx> {
    pub fn new() -> Self {
        Self {
            completed: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Run `producer` on a fresh worker thread; queue `on_complete`
    /// with its result for the next drain
    pub fn submit<T, P, C>(&self, producer: P, on_complete: C)
    where
        T: Send + 'static,
        P: FnOnce() -> T + Send + 'static,
        C: FnOnce(&mut Ctx, T) + Send + 'static,
    {
        let completed = Arc::clone(&self.completed);
        thread::spawn(move || {
            let result = producer();
            let mut queue = completed.lock().unwrap_or_else(PoisonError::into_inner);
            queue.push_back(Box::new(move |ctx: &mut Ctx| on_complete(ctx, result)));
        });
    }

    /// Invoke every completion currently queued, in completion order
    ///
    /// Takes the whole queue in one lock so completions arriving during
    /// the drain are deferred to the next call.
    pub fn process(&self, ctx: &mut Ctx) {
        let drained = {
            let mut queue = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *queue)
        };
        for completion in drained {
            completion(ctx);
        }
    }

    /// Number of completions waiting for the next drain
    pub fn completed_len(&self) -> usize {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::ThreadId;
    use std::time::{Duration, Instant};

    fn wait_for_completions<Ctx: 'static>(queue: &WorkQueue<Ctx>, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while queue.completed_len() < count {
            assert!(Instant::now() < deadline, "jobs did not complete in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_each_callback_fires_exactly_once() {
        let queue: WorkQueue<Vec<u32>> = WorkQueue::new();
        for i in 0..10u32 {
            queue.submit(move || i * 2, |results, value| results.push(value));
        }
        wait_for_completions(&queue, 10);

        let mut results = Vec::new();
        queue.process(&mut results);
        results.sort_unstable();
        assert_eq!(results, (0..10).map(|i| i * 2).collect::<Vec<_>>());

        // Nothing left for a second drain
        queue.process(&mut results);
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn test_callbacks_run_on_driver_thread() {
        let queue: WorkQueue<Vec<ThreadId>> = WorkQueue::new();
        queue.submit(|| (), |seen, _| seen.push(thread::current().id()));
        wait_for_completions(&queue, 1);

        let mut seen = Vec::new();
        queue.process(&mut seen);
        assert_eq!(seen, vec![thread::current().id()]);
    }

    #[test]
    fn test_job_submitted_during_drain_waits_for_next_tick() {
        let queue: WorkQueue<Vec<&'static str>> = WorkQueue::new();
        let resubmit = queue.clone();
        queue.submit(
            || (),
            move |log, _| {
                log.push("first");
                resubmit.submit(|| (), |log, _| log.push("second"));
            },
        );
        wait_for_completions(&queue, 1);

        let mut log = Vec::new();
        queue.process(&mut log);
        assert_eq!(log, vec!["first"]);

        wait_for_completions(&queue, 1);
        queue.process(&mut log);
        assert_eq!(log, vec!["first", "second"]);
    }

    #[test]
    fn test_results_independent_of_completion_order() {
        // Stagger job durations so completion order differs from
        // submission order; the drained set must still be complete.
        let queue: WorkQueue<Vec<u64>> = WorkQueue::new();
        for i in 0..6u64 {
            queue.submit(
                move || {
                    thread::sleep(Duration::from_millis((6 - i) * 3));
                    i
                },
                |results, value| results.push(value),
            );
        }
        wait_for_completions(&queue, 6);

        let mut results = Vec::new();
        queue.process(&mut results);
        results.sort_unstable();
        assert_eq!(results, vec![0, 1, 2, 3, 4, 5]);
    }
}
