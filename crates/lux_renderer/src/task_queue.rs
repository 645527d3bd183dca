//! Blocking FIFO of render tasks with a completion barrier.
//!
//! Producers push a batch of tasks, then block in [`TaskQueue::wait_for_all_done`]
//! until every task has been popped *and* reported finished. Workers block in
//! [`TaskQueue::pop_blocking`] until a task arrives or shutdown is requested.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::shutdown::ShutdownSignal;

#[derive(Debug)]
struct QueueState<T> {
    tasks: VecDeque<T>,
    /// Tasks handed to a worker but not yet reported done
    in_flight: usize,
}

impl<T> QueueState<T> {
    fn is_idle(&self) -> bool {
        self.tasks.is_empty() && self.in_flight == 0
    }
}

/// Mutex-protected task list with a "work available" and an "all done" condition.
#[derive(Debug)]
pub struct TaskQueue<T> {
    state: Mutex<QueueState<T>>,
    work_available: Condvar,
    all_done: Condvar,
    shutdown: ShutdownSignal,
}

impl<T> TaskQueue<T> {
    /// Create an empty queue observing `shutdown`.
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                in_flight: 0,
            }),
            work_available: Condvar::new(),
            all_done: Condvar::new(),
            shutdown,
        }
    }

    /// Append a task and wake one waiting worker.
    pub fn push(&self, task: T) {
        self.state.lock().tasks.push_back(task);
        self.work_available.notify_one();
    }

    /// Append several tasks under one lock and wake every waiting worker.
    pub fn push_batch(&self, tasks: impl IntoIterator<Item = T>) {
        self.state.lock().tasks.extend(tasks);
        self.work_available.notify_all();
    }

    /// Take the oldest task, blocking while the queue is empty.
    ///
    /// Returns `None` once shutdown has been requested, even if tasks remain.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if self.shutdown.is_triggered() {
                // Remaining tasks are abandoned, so a barrier waiting on them
                // must re-check the flag.
                self.all_done.notify_all();
                return None;
            }
            if let Some(task) = state.tasks.pop_front() {
                state.in_flight += 1;
                return Some(task);
            }
            self.work_available.wait(&mut state);
        }
    }

    /// Report that a task taken with [`pop_blocking`](Self::pop_blocking) has finished.
    pub fn task_done(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.is_idle() || self.shutdown.is_triggered() {
            self.all_done.notify_all();
        }
    }

    /// Block until no task is queued or running.
    ///
    /// Returns `false` if shutdown interrupted the wait. The flag may be set
    /// directly on the [`ShutdownSignal`] rather than through
    /// [`notify_quit`](Self::notify_quit): while tasks are outstanding some
    /// worker is either running one or about to pop, and both paths wake
    /// this wait once they see the flag.
    pub fn wait_for_all_done(&self) -> bool {
        let mut state = self.state.lock();
        while !state.is_idle() {
            if self.shutdown.is_triggered() {
                return false;
            }
            self.all_done.wait(&mut state);
        }
        !self.shutdown.is_triggered()
    }

    /// Trigger shutdown and wake every thread blocked on the queue.
    pub fn notify_quit(&self) {
        self.shutdown.trigger();
        // Taking the lock orders the flag store before any waiter's re-check.
        let _state = self.state.lock();
        self.work_available.notify_all();
        self.all_done.notify_all();
    }

    /// Number of tasks waiting to be picked up.
    pub fn queued(&self) -> usize {
        self.state.lock().tasks.len()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }
}
