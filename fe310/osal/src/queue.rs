//! Bounded byte queues shared between a thread and an ISR.

use heapless::Deque;

/// Bounded FIFO of bytes.
///
/// Every operation is non-blocking and safe to call with the system lock
/// held, from either level. Blocking behaviour is layered on top by the
/// owning driver, outside the lock.
pub struct ByteQueue<const N: usize> {
    queue: Deque<u8, N>,
}

impl<const N: usize> ByteQueue<N> {
    /// Create a new empty queue
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// Append one byte, handing it back when the queue is full.
    pub fn put(&mut self, byte: u8) -> Result<(), u8> {
        self.queue.push_back(byte)
    }

    /// Take the oldest byte.
    pub fn get(&mut self) -> Option<u8> {
        self.queue.pop_front()
    }

    /// Append as many bytes of `bytes` as fit, returning how many did.
    pub fn put_slice(&mut self, bytes: &[u8]) -> usize {
        let mut count = 0;
        for &byte in bytes {
            if self.queue.push_back(byte).is_err() {
                break;
            }
            count += 1;
        }
        count
    }

    /// Fill `buf` from the front of the queue, returning how many bytes
    /// were moved.
    pub fn get_slice(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.queue.pop_front() {
                Some(byte) => *slot = byte,
                None => break,
            }
            count += 1;
        }
        count
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if the queue is full
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Get the maximum capacity of the queue
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop every queued byte.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
