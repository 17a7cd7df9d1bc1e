//! Busy-wait locks and padded atomic counters for the shared merge phase.

mod counter;
mod spinlock;
mod ticket;

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

pub use counter::AtomicCounter;
pub use spinlock::SpinLock;
pub use ticket::TicketLock;

/// Size of the alignment used to keep independent cells on separate lines.
pub const CACHE_LINE: usize = 64;

/// Aligns `T` to its own cache line to avoid false sharing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(align(64))]
pub struct CachePadded<T>(pub T);

impl<T> CachePadded<T> {
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for CachePadded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for CachePadded<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

/// Raw mutual exclusion without an owned value.
///
/// # Safety
///
/// Implementors must guarantee that between a `lock()` (or successful
/// `try_lock()`) returning and the matching `unlock()`, no other thread's
/// `lock()` returns, and that `unlock()` happens-before the next acquisition.
pub unsafe trait RawLock: Default + Send + Sync {
    fn lock(&self);

    fn try_lock(&self) -> bool;

    /// Must only be called by the current holder.
    fn unlock(&self);
}

/// A value protected by a [`RawLock`].
#[derive(Default)]
pub struct Guarded<L: RawLock, T> {
    lock: L,
    value: UnsafeCell<T>,
}

// SAFETY: access to `value` is serialized by `lock`.
unsafe impl<L: RawLock, T: Send> Sync for Guarded<L, T> {}

impl<L: RawLock, T> Guarded<L, T> {
    pub fn new(value: T) -> Self {
        Self {
            lock: L::default(),
            value: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> GuardedRef<'_, L, T> {
        self.lock.lock();
        GuardedRef { owner: self }
    }

    pub fn try_lock(&self) -> Option<GuardedRef<'_, L, T>> {
        self.lock.try_lock().then(|| GuardedRef { owner: self })
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

/// RAII guard; the lock is released on drop.
pub struct GuardedRef<'a, L: RawLock, T> {
    owner: &'a Guarded<L, T>,
}

impl<L: RawLock, T> Deref for GuardedRef<'_, L, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard proves the lock is held.
        unsafe { &*self.owner.value.get() }
    }
}

impl<L: RawLock, T> DerefMut for GuardedRef<'_, L, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard proves the lock is held.
        unsafe { &mut *self.owner.value.get() }
    }
}

impl<L: RawLock, T> Drop for GuardedRef<'_, L, T> {
    fn drop(&mut self) {
        self.owner.lock.unlock();
    }
}
