/*
 * concurrent_array.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::sync::Mutex;

/// A growable array whose every operation takes an exclusive lock.
///
/// Meant for small, short-lived buffers that several threads touch, such as
/// the frames of a partially received control message.
#[derive(Debug, Default)]
pub struct ConcurrentArray<T> {
    items: Mutex<Vec<T>>,
}

impl<T> ConcurrentArray<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn append(&self, item: T) {
        self.items.lock().unwrap().push(item);
    }

    /// Empties the array, returning how many items were dropped.
    pub fn remove_all(&self) -> usize {
        let mut items = self.items.lock().unwrap();
        let count = items.len();
        *items = Vec::new();
        count
    }

    /// Atomically takes every item out, leaving the array empty.
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.lock().unwrap())
    }
}
