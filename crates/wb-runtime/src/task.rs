use std::fmt;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// Identifies one unit of tracked concurrent work.
///
/// Allocated from the process-wide scheduling bookkeeping; resetting the
/// bookkeeping between tests restarts the numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Token for a task handed to the worker pool.
///
/// The handle does not own the task; the world's tracker does. A handle
/// that is never drained through the world's completion barrier shows up
/// as outstanding work in consistency checking.
#[derive(Debug, Clone, Copy)]
pub struct TaskHandle {
    id: TaskId,
}

impl TaskHandle {
    /// The task's identifier.
    pub fn id(&self) -> TaskId {
        self.id
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Completion flag shared between a tracked task and its waiters.
struct TaskState {
    done: Mutex<bool>,
    signal: Condvar,
}

impl TaskState {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            done: Mutex::new(false),
            signal: Condvar::new(),
        })
    }

    fn mark_done(&self) {
        let mut done = self
            .done
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *done = true;
        self.signal.notify_all();
    }

    fn wait(&self) {
        let mut done = self
            .done
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        while !*done {
            done = self
                .signal
                .wait(done)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    fn is_done(&self) -> bool {
        *self
            .done
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Fixed pool of worker threads fed over a channel.
///
/// Dropping the pool closes the channel; workers finish everything still
/// queued before exiting, and the drop joins them. Disposing the owner
/// therefore blocks until all submitted work has settled.
struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    fn new(worker_count: usize) -> Self {
        let (sender, receiver) = channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..worker_count.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                thread::spawn(move || Self::work(&receiver))
            })
            .collect();
        Self {
            sender: Some(sender),
            workers,
        }
    }

    fn work(receiver: &Mutex<Receiver<Job>>) {
        loop {
            let job = {
                let guard = receiver
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                guard.recv()
            };
            match job {
                Ok(job) => job(),
                Err(_) => break,
            }
        }
    }

    fn submit(&self, job: Job) {
        if let Some(sender) = &self.sender {
            // A send can only fail once every worker has exited, which
            // cannot happen while the pool is alive.
            let _ = sender.send(job);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// Tracks every task a world has handed to its worker pool.
pub(crate) struct TaskTracker {
    pool: WorkerPool,
    tracked: Vec<(TaskId, Arc<TaskState>)>,
}

impl TaskTracker {
    pub(crate) fn new() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(4);
        Self {
            pool: WorkerPool::new(workers),
            tracked: Vec::new(),
        }
    }

    /// Submit a job and track it until the next completion barrier.
    pub(crate) fn spawn(&mut self, id: TaskId, job: impl FnOnce() + Send + 'static) -> TaskHandle {
        let state = TaskState::new();
        let task_state = Arc::clone(&state);
        self.pool.submit(Box::new(move || {
            job();
            task_state.mark_done();
        }));
        self.tracked.push((id, state));
        TaskHandle { id }
    }

    /// Block until every tracked task has completed, then forget them.
    pub(crate) fn complete_all(&mut self) {
        for (_, state) in self.tracked.drain(..) {
            state.wait();
        }
    }

    /// Number of tracked tasks that have not finished running.
    pub(crate) fn outstanding(&self) -> usize {
        self.tracked.iter().filter(|(_, s)| !s.is_done()).count()
    }

    /// Drop bookkeeping for tasks that already finished; returns how
    /// many entries were reaped.
    pub(crate) fn reap_completed(&mut self) -> usize {
        let before = self.tracked.len();
        self.tracked.retain(|(_, s)| !s.is_done());
        before - self.tracked.len()
    }
}

impl fmt::Debug for TaskTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskTracker")
            .field("tracked", &self.tracked.len())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[test]
    fn complete_all_waits_for_every_task() {
        let mut tracker = TaskTracker::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for i in 0..8 {
            let counter = Arc::clone(&counter);
            tracker.spawn(TaskId(i), move || {
                thread::sleep(Duration::from_millis(5));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        tracker.complete_all();
        assert_eq!(counter.load(Ordering::SeqCst), 8);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn outstanding_counts_unfinished_work() {
        let mut tracker = TaskTracker::new();
        tracker.spawn(TaskId(0), || thread::sleep(Duration::from_millis(200)));
        assert_eq!(tracker.outstanding(), 1);
        tracker.complete_all();
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn reap_removes_only_finished_entries() {
        let mut tracker = TaskTracker::new();
        tracker.spawn(TaskId(0), || {});
        tracker.spawn(TaskId(1), || thread::sleep(Duration::from_millis(200)));
        // Give the first task time to run.
        thread::sleep(Duration::from_millis(50));
        let reaped = tracker.reap_completed();
        assert_eq!(reaped, 1);
        assert_eq!(tracker.outstanding(), 1);
        tracker.complete_all();
    }

    #[test]
    fn dropping_the_tracker_drains_queued_work() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let mut tracker = TaskTracker::new();
            for i in 0..16 {
                let counter = Arc::clone(&counter);
                tracker.spawn(TaskId(i), move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 16);
    }
}
