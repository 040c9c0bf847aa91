// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-producer / single-consumer byte ring over a static arena.
//!
//! The arena holds `N` bytes (`N` must be a power of two). Two cursors address it:
//!
//! - `head` is stored only by the producer and points at the next free slot.
//! - `tail` is stored only by the consumer and points at the next byte to read.
//!
//! Cursors count modulo `2 * N`, so `head == tail` means empty and `head - tail == N` means full
//! without giving up a slot. A byte is written into the arena before `head` is published, and read
//! out before `tail` is published, so either side can be preempted at any point and the other side
//! still sees a consistent `(head, tail)` pair.
//!
//! When full, pushes are rejected: the new byte is dropped, the overflow flag is latched, and the
//! bytes already queued are left untouched.
//!
//! Works in `no_std` and does not allocate memory.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Fixed-capacity FIFO of bytes.
pub struct RingBuffer<const N: usize> {
    data: UnsafeCell<[u8; N]>,
    head: AtomicUsize,
    tail: AtomicUsize,
    overflow: AtomicBool,
    underflow: AtomicBool,
}

// Slots are only written through the producer path and only read through the consumer path, and
// both paths require either `&mut RingBuffer` or a unique `Producer` / `Consumer` handle.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(N.is_power_of_two(), "capacity must be 2^k");

    /// Create an empty ring with both flags clear.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;
        Self {
            data: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            overflow: AtomicBool::new(false),
            underflow: AtomicBool::new(false),
        }
    }

    #[inline]
    const fn slot(cursor: usize) -> usize {
        cursor & (N - 1)
    }

    #[inline]
    const fn advance(cursor: usize) -> usize {
        (cursor + 1) & (2 * N - 1)
    }

    #[inline]
    const fn distance(head: usize, tail: usize) -> usize {
        head.wrapping_sub(tail) & (2 * N - 1)
    }

    /// # Safety
    ///
    /// The caller must be the only producer for the lifetime of the call.
    unsafe fn push_unchecked(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if Self::distance(head, tail) == N {
            self.overflow.store(true, Ordering::Relaxed);
            return false;
        }

        // The consumer never reads this slot until `head` moves past it.
        unsafe {
            self.data.get().cast::<u8>().add(Self::slot(head)).write(byte);
        }
        self.head.store(Self::advance(head), Ordering::Release);
        true
    }

    /// # Safety
    ///
    /// The caller must be the only consumer for the lifetime of the call.
    unsafe fn pop_unchecked(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if head == tail {
            self.underflow.store(true, Ordering::Relaxed);
            return None;
        }

        // The producer never writes this slot until `tail` moves past it.
        let byte = unsafe { self.data.get().cast::<u8>().add(Self::slot(tail)).read() };
        self.tail.store(Self::advance(tail), Ordering::Release);
        Some(byte)
    }

    /// Append a byte. Returns `false` and latches the overflow flag if the ring is full.
    #[inline]
    pub fn try_push(&mut self, byte: u8) -> bool {
        // `&mut self` rules out any other producer.
        unsafe { self.push_unchecked(byte) }
    }

    /// Remove the oldest byte. Returns `None` and latches the underflow flag if the ring is empty.
    #[inline]
    pub fn try_pop(&mut self) -> Option<u8> {
        // `&mut self` rules out any other consumer.
        unsafe { self.pop_unchecked() }
    }

    /// Split into producer and consumer halves that may live in different contexts.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        (
            Producer {
                ring: &*self,
                _unique: PhantomData,
            },
            Consumer {
                ring: &*self,
                _unique: PhantomData,
            },
        )
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        Self::distance(head, tail)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Arena position of the next write, in `[0, N)`.
    #[inline]
    pub fn head(&self) -> usize {
        Self::slot(self.head.load(Ordering::Acquire))
    }

    /// Arena position of the next read, in `[0, N)`.
    #[inline]
    pub fn tail(&self) -> usize {
        Self::slot(self.tail.load(Ordering::Acquire))
    }

    #[inline]
    pub fn overflowed(&self) -> bool {
        self.overflow.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn underflowed(&self) -> bool {
        self.underflow.load(Ordering::Relaxed)
    }

    /// Read and clear the overflow flag.
    #[inline]
    pub fn take_overflow(&self) -> bool {
        self.overflow.swap(false, Ordering::Relaxed)
    }

    /// Read and clear the underflow flag.
    #[inline]
    pub fn take_underflow(&self) -> bool {
        self.underflow.swap(false, Ordering::Relaxed)
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half of a split [`RingBuffer`].
pub struct Producer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
    // Not `Clone`: a second producer would break the single-writer rule on `head`.
    _unique: PhantomData<&'a mut ()>,
}

impl<const N: usize> Producer<'_, N> {
    #[inline]
    pub fn try_push(&mut self, byte: u8) -> bool {
        unsafe { self.ring.push_unchecked(byte) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }
}

/// Consumer half of a split [`RingBuffer`].
pub struct Consumer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
    _unique: PhantomData<&'a mut ()>,
}

impl<const N: usize> Consumer<'_, N> {
    #[inline]
    pub fn try_pop(&mut self) -> Option<u8> {
        unsafe { self.ring.pop_unchecked() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }
}
