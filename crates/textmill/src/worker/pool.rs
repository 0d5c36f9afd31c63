use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, error, info};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Batch-level progress callback, invoked with `floor(100 * completed / total)`
/// after every task completion.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// FIFO task queue executed by a lazily-started fixed set of worker threads.
///
/// The pool is idle until the first `submit`, which spawns `max_workers`
/// workers. Workers drain the queue and exit when they observe it empty;
/// the last one out resets the completion counters so the next submission
/// starts a fresh 0-100% cycle and spawns anew.
pub struct TaskQueue {
    inner: Arc<QueueInner>,
    max_workers: usize,
}

struct QueueInner {
    state: Mutex<QueueState>,
    progress: Option<ProgressCallback>,
}

struct QueueState {
    tasks: VecDeque<Task>,
    running: bool,
    workers_alive: usize,
    total_tasks: usize,
    completed_tasks: usize,
}

impl TaskQueue {
    /// # Panics
    /// Panics if `max_workers` is 0.
    pub fn new(max_workers: usize, progress: Option<ProgressCallback>) -> Self {
        assert!(max_workers > 0, "max_workers must be > 0");
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    tasks: VecDeque::new(),
                    running: false,
                    workers_alive: 0,
                    total_tasks: 0,
                    completed_tasks: 0,
                }),
                progress,
            }),
            max_workers,
        }
    }

    /// Appends a task to the queue, starting the worker threads if the
    /// pool is idle.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let spawn = {
            let mut state = self.inner.state.lock().expect("queue mutex poisoned");
            state.tasks.push_back(Box::new(task));
            state.total_tasks += 1;
            if state.running {
                false
            } else {
                state.running = true;
                state.workers_alive = self.max_workers;
                true
            }
        };

        if spawn {
            info!("Starting {} workers", self.max_workers);
            for worker_id in 0..self.max_workers {
                let inner = Arc::clone(&self.inner);
                thread::spawn(move || run_worker(worker_id, inner));
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.inner.state.lock().expect("queue mutex poisoned").running
    }

    /// Current `(total_tasks, completed_tasks)` snapshot.
    pub fn counters(&self) -> (usize, usize) {
        let state = self.inner.state.lock().expect("queue mutex poisoned");
        (state.total_tasks, state.completed_tasks)
    }

    /// Blocks until the pool has drained and returned to idle.
    pub fn wait_idle(&self) {
        while !self.is_idle() {
            thread::sleep(std::time::Duration::from_millis(1));
        }
    }
}

fn run_worker(worker_id: usize, inner: Arc<QueueInner>) {
    debug!("Worker {} started", worker_id);

    loop {
        let task = {
            let mut state = inner.state.lock().expect("queue mutex poisoned");
            match state.tasks.pop_front() {
                Some(task) => task,
                None => {
                    // Observed empty: this worker leaves rather than wait
                    // for new work. The last one out flips the pool back to
                    // idle; a submission racing this section either lands
                    // before the pop (and is taken) or after the idle
                    // transition (and spawns fresh workers).
                    state.workers_alive -= 1;
                    if state.workers_alive == 0 && state.completed_tasks == state.total_tasks {
                        state.running = false;
                        state.total_tasks = 0;
                        state.completed_tasks = 0;
                    }
                    break;
                }
            }
        };

        // A failing task must not take down the pool or block other tasks.
        if let Err(panic) = catch_unwind(AssertUnwindSafe(task)) {
            error!("Worker {}: task panicked: {}", worker_id, panic_message(&panic));
        }

        let state = &mut *inner.state.lock().expect("queue mutex poisoned");
        state.completed_tasks += 1;
        if let Some(ref progress) = inner.progress {
            // Invoked under the state lock so concurrently completing
            // workers report non-decreasing percentages.
            let percent = (100 * state.completed_tasks / state.total_tasks) as u8;
            progress(percent);
        }
    }

    debug!("Worker {} stopped", worker_id);
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
