//! Interrupt-shared bounded ring buffer
//!
//! `RingBuffer<T, N>` is a fixed-capacity FIFO for exactly one producer
//! and one consumer, which may run in different execution contexts (main
//! loop and an interrupt handler) and preempt each other at any
//! instruction boundary. No locks are taken:
//!
//! - `tail` and the slot being written belong to the producer
//! - `head` and the slot being read belong to the consumer
//! - only `count` is shared, and it is changed with a single atomic
//!   read-modify-write (a native byte operation, or an interrupt-masked
//!   one on parts without it)
//!
//! The producer stores the value before publishing the new count; the
//! consumer copies the value out before releasing the slot by
//! decrementing the count. Neither side ever sees a count that runs ahead
//! of the data.
//!
//! Enqueue and dequeue never block. Blocking is layered on top by the
//! caller (see [`crate::serial`]).

use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::MaybeUninit;

use portable_atomic::{AtomicU8, Ordering};

/// Default capacity of the serial buffers
pub const DEFAULT_CAPACITY: usize = 8;

/// Non-fatal queue condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// Producer found every slot occupied
    Full,
    /// Consumer found no occupied slot
    Empty,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "queue full"),
            Self::Empty => write!(f, "queue empty"),
        }
    }
}

/// Single-producer single-consumer circular queue of capacity `N`
///
/// `N` must be between 1 and 255; the occupancy count is one byte so its
/// update stays a single read-modify-write on an 8-bit core.
pub struct RingBuffer<T: Copy, const N: usize> {
    slots: UnsafeCell<MaybeUninit<[T; N]>>,
    /// Next slot to read, consumer only
    head: UnsafeCell<u8>,
    /// Next slot to write, producer only
    tail: UnsafeCell<u8>,
    /// Occupied slots, shared
    count: AtomicU8,
}

// SAFETY: every field except `count` is touched by exactly one role, and
// the role contracts on `enqueue`/`dequeue` keep each role to one context.
unsafe impl<T: Copy + Send, const N: usize> Sync for RingBuffer<T, N> {}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    const CAPACITY_OK: () = assert!(
        N > 0 && N <= u8::MAX as usize,
        "ring buffer capacity must be 1..=255"
    );

    /// Empty buffer, usable in a `static`
    pub const fn new() -> Self {
        let () = Self::CAPACITY_OK;
        Self {
            slots: UnsafeCell::new(MaybeUninit::uninit()),
            head: UnsafeCell::new(0),
            tail: UnsafeCell::new(0),
            count: AtomicU8::new(0),
        }
    }

    #[inline(always)]
    const fn advance(cursor: u8) -> u8 {
        if cursor as usize + 1 == N {
            0
        } else {
            cursor + 1
        }
    }

    #[inline(always)]
    fn slot(&self, index: u8) -> *mut T {
        // Points into the array without forming a reference to it, so the
        // two roles never alias a `&mut` over shared memory.
        self.slots.get().cast::<T>().wrapping_add(index as usize)
    }

    /// Append `value` at the tail
    ///
    /// Fails with [`QueueError::Full`] and leaves the buffer unchanged when
    /// every slot is occupied.
    ///
    /// # Safety
    ///
    /// The caller must be the buffer's only producer: no other call to
    /// `enqueue` may run concurrently or be preempted by one, for the
    /// lifetime of the buffer.
    #[inline]
    pub unsafe fn enqueue(&self, value: T) -> Result<(), QueueError> {
        if self.count.load(Ordering::Acquire) as usize == N {
            return Err(QueueError::Full);
        }

        // SAFETY: producer-only state. The acquire load above ordered the
        // consumer's last read of this slot before our write.
        unsafe {
            let tail = *self.tail.get();
            self.slot(tail).write(value);
            *self.tail.get() = Self::advance(tail);
        }

        // Publish only after the data is stored
        self.count.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Remove and return the value at the head
    ///
    /// Fails with [`QueueError::Empty`] when nothing is queued.
    ///
    /// # Safety
    ///
    /// The caller must be the buffer's only consumer: no other call to
    /// `dequeue` may run concurrently or be preempted by one, for the
    /// lifetime of the buffer.
    #[inline]
    pub unsafe fn dequeue(&self) -> Result<T, QueueError> {
        if self.count.load(Ordering::Acquire) == 0 {
            return Err(QueueError::Empty);
        }

        // SAFETY: consumer-only state. The acquire load synchronises with
        // the producer's release increment, so the slot is initialised.
        let value = unsafe {
            let head = *self.head.get();
            let value = self.slot(head).read();
            *self.head.get() = Self::advance(head);
            value
        };

        // Release the slot only after the value has been copied out
        self.count.fetch_sub(1, Ordering::Release);
        Ok(value)
    }

    /// Number of occupied slots
    #[inline]
    pub fn size(&self) -> usize {
        self.count.load(Ordering::Acquire) as usize
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_full(&self) -> bool {
        self.size() == N
    }

    /// Split into the two role handles
    ///
    /// The exclusive borrow guarantees no other handle exists while these
    /// are alive, which makes the role contract a compile-time fact.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let queue: &Self = self;
        (
            Producer {
                queue,
                _not_sync: PhantomData,
            },
            Consumer {
                queue,
                _not_sync: PhantomData,
            },
        )
    }
}

impl<T: Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half of a split [`RingBuffer`]
pub struct Producer<'a, T: Copy, const N: usize> {
    queue: &'a RingBuffer<T, N>,
    _not_sync: PhantomData<*const ()>,
}

// SAFETY: the handle is unique for its role and may move to the context
// that plays it.
unsafe impl<T: Copy + Send, const N: usize> Send for Producer<'_, T, N> {}

impl<T: Copy, const N: usize> Producer<'_, T, N> {
    pub fn enqueue(&mut self, value: T) -> Result<(), QueueError> {
        // SAFETY: this handle is the only producer
        unsafe { self.queue.enqueue(value) }
    }

    pub fn size(&self) -> usize {
        self.queue.size()
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }
}

/// Consumer half of a split [`RingBuffer`]
pub struct Consumer<'a, T: Copy, const N: usize> {
    queue: &'a RingBuffer<T, N>,
    _not_sync: PhantomData<*const ()>,
}

// SAFETY: as for `Producer`
unsafe impl<T: Copy + Send, const N: usize> Send for Consumer<'_, T, N> {}

impl<T: Copy, const N: usize> Consumer<'_, T, N> {
    pub fn dequeue(&mut self) -> Result<T, QueueError> {
        // SAFETY: this handle is the only consumer
        unsafe { self.queue.dequeue() }
    }

    pub fn size(&self) -> usize {
        self.queue.size()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue: RingBuffer<u8, 4> = RingBuffer::new();
        let (mut tx, mut rx) = queue.split();

        tx.enqueue(1).unwrap();
        tx.enqueue(2).unwrap();
        tx.enqueue(3).unwrap();
        assert_eq!(rx.dequeue(), Ok(1));
        assert_eq!(rx.dequeue(), Ok(2));
        assert_eq!(rx.dequeue(), Ok(3));
        assert_eq!(rx.dequeue(), Err(QueueError::Empty));
    }

    #[test]
    fn test_full_leaves_buffer_unchanged() {
        let mut queue: RingBuffer<u8, 3> = RingBuffer::new();
        {
            let (mut tx, _) = queue.split();
            for byte in 0..3 {
                tx.enqueue(byte).unwrap();
            }
            assert_eq!(tx.enqueue(99), Err(QueueError::Full));
            assert!(tx.is_full());
        }
        assert_eq!(queue.size(), 3);

        let (_, mut rx) = queue.split();
        assert_eq!(rx.dequeue(), Ok(0));
        assert_eq!(rx.dequeue(), Ok(1));
        assert_eq!(rx.dequeue(), Ok(2));
    }

    #[test]
    fn test_empty_leaves_count_at_zero() {
        let mut queue: RingBuffer<u16, 2> = RingBuffer::new();
        let (_, mut rx) = queue.split();
        assert_eq!(rx.dequeue(), Err(QueueError::Empty));
        assert_eq!(rx.dequeue(), Err(QueueError::Empty));
        assert_eq!(rx.size(), 0);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_cursors_wrap() {
        let mut queue: RingBuffer<u8, 3> = RingBuffer::new();
        let (mut tx, mut rx) = queue.split();

        // Walk the cursors around the ring several times
        for round in 0..10u8 {
            tx.enqueue(round).unwrap();
            tx.enqueue(round.wrapping_add(100)).unwrap();
            assert_eq!(rx.dequeue(), Ok(round));
            assert_eq!(rx.dequeue(), Ok(round.wrapping_add(100)));
        }
        assert_eq!(rx.size(), 0);
    }

    #[test]
    fn test_non_power_of_two_capacity() {
        let mut queue: RingBuffer<u32, 5> = RingBuffer::new();
        assert_eq!(queue.capacity(), 5);
        let (mut tx, mut rx) = queue.split();

        for value in 0..5 {
            tx.enqueue(value * 1000).unwrap();
        }
        assert_eq!(tx.enqueue(1), Err(QueueError::Full));
        assert_eq!(rx.dequeue(), Ok(0));
        tx.enqueue(5000).unwrap();
        for value in 1..=5 {
            assert_eq!(rx.dequeue(), Ok(value * 1000));
        }
    }

    #[test]
    fn test_shared_reference_roles() {
        let queue: RingBuffer<u8, 2> = RingBuffer::new();
        // SAFETY: single-threaded test, one caller per role
        unsafe {
            queue.enqueue(7).unwrap();
            assert_eq!(queue.size(), 1);
            assert_eq!(queue.dequeue(), Ok(7));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_error_display() {
        extern crate std;
        use std::string::ToString;

        assert_eq!(QueueError::Full.to_string(), "queue full");
        assert_eq!(QueueError::Empty.to_string(), "queue empty");
    }
}
