/*
 * blocking_queue.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::time::Duration;

use crossbeam::channel::unbounded;
use crossbeam::channel::Receiver;
use crossbeam::channel::RecvTimeoutError;
use crossbeam::channel::Sender;

use crate::error::Error;

/// A thread-safe FIFO queue whose `take()` blocks until an item is available.
///
/// Clones share the same underlying queue, so a clone can be handed to each
/// producer and consumer thread. Because every clone holds both ends of the
/// channel, the queue can never become disconnected while a clone is alive.
pub struct BlockingQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> BlockingQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Appends an item; wakes exactly one pending `take()`, if any.
    pub fn add(&self, item: T) {
        // Sending only fails when all receivers are gone, and we own one.
        if self.tx.send(item).is_err() {
            log::error!("Blocking queue lost its receiver");
        }
    }

    /// Removes and returns the oldest item, blocking until one exists.
    pub fn take(&self) -> T {
        // Can't disconnect, `self.tx` keeps the channel alive
        self.rx.recv().unwrap()
    }

    /// Removes and returns the oldest item, giving up after `timeout`.
    pub fn take_timeout(&self, timeout: Duration) -> crate::Result<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Ok(item),
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(crate::anyhow!("Blocking queue disconnected"))
            },
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Clone for BlockingQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;
    use std::time::Instant;

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_take_is_fifo() {
        let queue = BlockingQueue::new();
        queue.add(1);
        queue.add(2);
        queue.add(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.take(), 1);
        assert_eq!(queue.take(), 2);
        assert_eq!(queue.take(), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_take_blocks_until_add() {
        let queue = BlockingQueue::new();
        let producer = queue.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            producer.add(String::from("hello"));
        });

        let start = Instant::now();
        assert_eq!(queue.take(), "hello");
        assert!(start.elapsed() >= Duration::from_millis(40));
        handle.join().unwrap();
    }

    #[test]
    fn test_take_timeout_elapses() {
        let queue = BlockingQueue::<u32>::new();
        assert_matches!(
            queue.take_timeout(Duration::from_millis(20)),
            Err(Error::Timeout(_))
        );

        queue.add(7);
        assert_matches!(queue.take_timeout(Duration::from_millis(20)), Ok(7));
    }

    #[test]
    fn test_many_producers_one_consumer() {
        let queue = BlockingQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|p| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        queue.add(p * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut seen: Vec<u32> = (0..400).map(|_| queue.take()).collect();

        // Items from the same producer must come out in the order they went in
        for p in 0..4 {
            let ours: Vec<u32> = seen.iter().copied().filter(|x| x / 1000 == p).collect();
            let expected: Vec<u32> = (0..100).map(|i| p * 1000 + i).collect();
            assert_eq!(ours, expected);
        }

        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 400);
    }
}
