//! Fixed-capacity byte queue for the serial receive path
//!
//! [`RingBuffer`] is the plain data structure. [`SharedRingBuffer`] wraps
//! it in a critical section so the byte-received interrupt can push while
//! the main loop drains.

use core::cell::RefCell;

use critical_section::Mutex;

/// Circular byte buffer
///
/// `head == tail` is ambiguous, so explicit `empty`/`full` flags carry
/// the occupancy state. A push into a full buffer is rejected.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    buffer: [u8; N],
    head: usize,
    tail: usize,
    empty: bool,
    full: bool,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            head: 0,
            tail: 0,
            empty: true,
            full: N == 0,
        }
    }

    /// Total capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Append a byte; returns false if the buffer is full
    pub fn push(&mut self, byte: u8) -> bool {
        if self.full {
            return false;
        }

        self.buffer[self.head] = byte;
        self.head = (self.head + 1) % N;
        self.empty = false;
        self.full = self.head == self.tail;
        true
    }

    /// Remove the oldest byte, if any
    pub fn try_pop(&mut self) -> Option<u8> {
        if self.empty {
            return None;
        }

        let byte = self.buffer[self.tail];
        self.tail = (self.tail + 1) % N;
        self.full = false;
        self.empty = self.head == self.tail;
        Some(byte)
    }

    /// Remove the oldest byte, or 0x00 if empty
    ///
    /// Check [`available`](Self::available) first; the sentinel is
    /// indistinguishable from a received zero.
    pub fn pop(&mut self) -> u8 {
        self.try_pop().unwrap_or(0)
    }

    /// Oldest byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        if self.empty {
            None
        } else {
            Some(self.buffer[self.tail])
        }
    }

    /// Number of queued bytes
    pub fn available(&self) -> usize {
        if self.full {
            N
        } else if self.head >= self.tail {
            self.head - self.tail
        } else {
            N - self.tail + self.head
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Drop all queued bytes
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.empty = true;
        self.full = N == 0;
    }
}

/// Ring buffer shared between an interrupt producer and the main loop
///
/// Every operation runs inside a critical section, so the multi-field
/// index/flag update is never observed half done.
pub struct SharedRingBuffer<const N: usize> {
    inner: Mutex<RefCell<RingBuffer<N>>>,
}

impl<const N: usize> Default for SharedRingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SharedRingBuffer<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RingBuffer::new())),
        }
    }

    /// Push from interrupt context; returns false (byte dropped) if full
    pub fn push(&self, byte: u8) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).push(byte))
    }

    pub fn try_pop(&self) -> Option<u8> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).try_pop())
    }

    pub fn pop(&self) -> u8 {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop())
    }

    pub fn peek(&self) -> Option<u8> {
        critical_section::with(|cs| self.inner.borrow_ref(cs).peek())
    }

    pub fn available(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).available())
    }

    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut ring = RingBuffer::<4>::new();
        assert!(ring.push(1));
        assert!(ring.push(2));
        assert_eq!(ring.available(), 2);
        assert_eq!(ring.try_pop(), Some(1));
        assert_eq!(ring.try_pop(), Some(2));
        assert_eq!(ring.try_pop(), None);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_overflow_rejected() {
        let mut ring = RingBuffer::<8>::new();
        for i in 0..8 {
            assert!(ring.push(i));
        }
        assert!(ring.is_full());
        assert!(!ring.push(0xAA));
        assert_eq!(ring.available(), 8);
        // Oldest byte survives the rejected push
        assert_eq!(ring.peek(), Some(0));
    }

    #[test]
    fn test_pop_empty_returns_zero() {
        let mut ring = RingBuffer::<4>::new();
        assert_eq!(ring.available(), 0);
        assert_eq!(ring.pop(), 0x00);
    }

    #[test]
    fn test_wraparound() {
        let mut ring = RingBuffer::<3>::new();
        ring.push(1);
        ring.push(2);
        ring.push(3);
        assert_eq!(ring.pop(), 1);
        assert!(ring.push(4));
        assert_eq!(ring.available(), 3);
        assert_eq!(ring.pop(), 2);
        assert_eq!(ring.pop(), 3);
        assert_eq!(ring.pop(), 4);
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut ring = RingBuffer::<4>::new();
        ring.push(7);
        assert_eq!(ring.peek(), Some(7));
        assert_eq!(ring.available(), 1);
    }

    #[test]
    fn test_clear() {
        let mut ring = RingBuffer::<4>::new();
        ring.push(1);
        ring.push(2);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.available(), 0);
        assert!(ring.push(9));
        assert_eq!(ring.pop(), 9);
    }

    #[test]
    fn test_shared_ring() {
        static RING: SharedRingBuffer<2> = SharedRingBuffer::new();
        assert!(RING.push(0x41));
        assert!(RING.push(0x74));
        assert!(!RING.push(0x00));
        assert_eq!(RING.available(), 2);
        assert_eq!(RING.peek(), Some(0x41));
        assert_eq!(RING.try_pop(), Some(0x41));
        RING.clear();
        assert_eq!(RING.try_pop(), None);
    }
}
