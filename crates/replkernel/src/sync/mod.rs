/*
 * mod.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

pub mod blocking_queue;
pub mod concurrent_array;
pub mod task_factory;

pub use blocking_queue::BlockingQueue;
pub use concurrent_array::ConcurrentArray;
pub use task_factory::TaskFactory;
