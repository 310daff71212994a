//! Per-mount task bookkeeping.
//!
//! A page tracks every task it spawns while mounted (data loads, debounce
//! timers) in a `TaskTracker` and aborts them all when it is unmounted, so no
//! callback outlives the view it was started for.

use tokio::task::AbortHandle;

/// A handle to a spawned task that can be aborted.
#[derive(Debug)]
pub struct TaskHandle {
    abort_handle: AbortHandle,
}

impl TaskHandle {
    pub fn new(abort_handle: AbortHandle) -> Self {
        Self { abort_handle }
    }

    /// Abort the task. The task is cancelled at its next await point.
    pub fn abort(&self) {
        self.abort_handle.abort();
    }

    /// Check if the task has finished (either completed or aborted).
    pub fn is_finished(&self) -> bool {
        self.abort_handle.is_finished()
    }
}

/// Task handles cancelled together, normally on unmount.
#[derive(Debug, Default)]
pub struct TaskTracker {
    handles: Vec<TaskHandle>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self { handles: Vec::new() }
    }

    /// Track a task handle until `abort_all` is called.
    pub fn track(&mut self, handle: TaskHandle) {
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(handle);
    }

    /// Abort all tracked tasks.
    pub fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    /// Number of tracked tasks that are still running.
    pub fn active_count(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn has_active_tasks(&self) -> bool {
        self.handles.iter().any(|h| !h.is_finished())
    }
}

impl Drop for TaskTracker {
    fn drop(&mut self) {
        self.abort_all();
    }
}
