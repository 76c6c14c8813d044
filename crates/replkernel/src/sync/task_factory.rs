/*
 * task_factory.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::sync::Mutex;
use std::thread::JoinHandle;

use stdext::spawn;

/// Launches a named group of long-running worker threads and lets a caller
/// block until all of them have returned.
///
/// Workers are expected to loop forever, so in practice `wait_all()` blocks
/// for the lifetime of the process; it only returns once every worker has
/// exited or panicked.
pub struct TaskFactory {
    /// Prefix for the names of spawned threads
    name: String,

    tasks: Mutex<Vec<(String, JoinHandle<()>)>>,
}

impl TaskFactory {
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Schedules `worker` on its own thread, named `{factory}-{name}`.
    pub fn start_new<F>(&self, name: &str, worker: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let thread_name = format!("{}-{}", self.name, name);
        log::trace!("Starting task '{thread_name}'");
        let handle = spawn!(thread_name.clone(), worker);
        self.tasks.lock().unwrap().push((thread_name, handle));
    }

    /// Blocks until every worker started so far has returned. Returns the
    /// names of the workers that panicked.
    pub fn wait_all(&self) -> Vec<String> {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap());
        let mut panicked = Vec::new();

        for (name, handle) in tasks {
            match handle.join() {
                Ok(()) => log::info!("Task '{name}' finished"),
                Err(_) => {
                    log::error!("Task '{name}' panicked");
                    panicked.push(name);
                },
            }
        }

        panicked
    }
}
