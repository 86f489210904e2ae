//! Deferred single-shot tasks.
//!
//! Work scheduled here never runs inside the call that scheduled it. The
//! host drains the queue once per event-loop turn; tasks scheduled while a
//! drain is running wait for the next one.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use modproxy_core::types::ExtensionHandle;

struct Task {
    seq: u64,
    owner: Option<ExtensionHandle>,
    run: Box<dyn FnOnce()>,
}

/// FIFO of deferred tasks.
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
    next_seq: Cell<u64>,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a task not owned by any sub-extension.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.push(None, Box::new(task));
    }

    /// Schedules a task owned by `owner`. It is discarded if the owner is
    /// cleaned up first.
    pub fn schedule_owned(&self, owner: ExtensionHandle, task: impl FnOnce() + 'static) {
        self.push(Some(owner), Box::new(task));
    }

    /// Runs every task queued before this call. Returns how many ran.
    pub fn drain(&self) -> usize {
        let limit = self.next_seq.get();
        let mut ran = 0;

        loop {
            let task = {
                let mut tasks = self.tasks.borrow_mut();
                match tasks.front() {
                    Some(task) if task.seq < limit => tasks.pop_front(),
                    _ => None,
                }
            };
            let Some(task) = task else { break };
            (task.run)();
            ran += 1;
        }

        if ran > 0 {
            debug!(ran, pending = self.pending(), "Drained deferred tasks");
        }
        ran
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Discards every task owned by `owner`. Returns how many were dropped.
    pub fn cancel_owner(&self, owner: ExtensionHandle) -> usize {
        let removed: Vec<Task> = {
            let mut tasks = self.tasks.borrow_mut();
            let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut *tasks)
                .into_iter()
                .partition(|task| task.owner == Some(owner));
            *tasks = kept.into();
            removed
        };
        removed.len()
    }

    fn push(&self, owner: Option<ExtensionHandle>, run: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.tasks.borrow_mut().push_back(Task { seq, owner, run });
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

/// A sub-extension's view of the task queue. Everything it schedules is
/// owned by that sub-extension.
#[derive(Clone)]
pub struct Scheduler {
    queue: Rc<TaskQueue>,
    owner: ExtensionHandle,
}

impl Scheduler {
    /// Creates a scheduler for `owner`.
    pub fn new(queue: Rc<TaskQueue>, owner: ExtensionHandle) -> Self {
        Self { queue, owner }
    }

    /// Runs `task` on a later event-loop turn.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.queue.schedule_owned(self.owner, task);
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_run_only_on_drain() {
        let queue = TaskQueue::new();
        let ran = Rc::new(Cell::new(0));

        let counter = Rc::clone(&ran);
        queue.schedule(move || counter.set(counter.get() + 1));
        assert_eq!(ran.get(), 0);
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.drain(), 1);
        assert_eq!(ran.get(), 1);
        assert_eq!(queue.drain(), 0);
    }

    #[test]
    fn test_nested_schedule_runs_on_next_drain() {
        let queue = Rc::new(TaskQueue::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        let inner_queue = Rc::clone(&queue);
        let outer_order = Rc::clone(&order);
        queue.schedule(move || {
            outer_order.borrow_mut().push("outer");
            let nested_order = Rc::clone(&outer_order);
            inner_queue.schedule(move || nested_order.borrow_mut().push("nested"));
        });

        assert_eq!(queue.drain(), 1);
        assert_eq!(*order.borrow(), vec!["outer"]);
        assert_eq!(queue.drain(), 1);
        assert_eq!(*order.borrow(), vec!["outer", "nested"]);
    }

    #[test]
    fn test_cancel_owner() {
        let queue = TaskQueue::new();
        let owner = ExtensionHandle(4);

        queue.schedule_owned(owner, || panic!("cancelled task ran"));
        queue.schedule_owned(ExtensionHandle(5), || {});
        queue.schedule(|| {});

        assert_eq!(queue.cancel_owner(owner), 1);
        assert_eq!(queue.drain(), 2);
    }

    #[test]
    fn test_scheduler_tags_owner() {
        let queue = Rc::new(TaskQueue::new());
        let owner = ExtensionHandle(4);
        let scheduler = Scheduler::new(Rc::clone(&queue), owner);
        scheduler.schedule(|| {});
        scheduler.schedule(|| {});

        assert_eq!(queue.cancel_owner(owner), 2);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_task_cancelled_by_earlier_task_in_same_drain() {
        let queue = Rc::new(TaskQueue::new());
        let owner = ExtensionHandle(1);

        let canceller = Rc::clone(&queue);
        queue.schedule(move || {
            canceller.cancel_owner(owner);
        });
        queue.schedule_owned(owner, || panic!("cancelled task ran"));

        assert_eq!(queue.drain(), 1);
        assert_eq!(queue.pending(), 0);
    }
}
