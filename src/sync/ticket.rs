use std::hint;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::RawLock;

/// FIFO spinlock: each `lock()` draws a ticket and waits until it is served.
#[derive(Debug, Default)]
pub struct TicketLock {
    next_ticket: AtomicUsize,
    serving: AtomicUsize,
}

impl TicketLock {
    pub const fn new() -> Self {
        Self {
            next_ticket: AtomicUsize::new(0),
            serving: AtomicUsize::new(0),
        }
    }

    /// Acquire the lock and return the ticket it was granted under.
    ///
    /// Tickets are granted strictly in the order they were drawn.
    pub fn acquire(&self) -> usize {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        while self.serving.load(Ordering::Acquire) != ticket {
            hint::spin_loop();
        }
        ticket
    }

    /// Number of threads holding or waiting for the lock.
    pub fn queue_len(&self) -> usize {
        let next = self.next_ticket.load(Ordering::Relaxed);
        next.wrapping_sub(self.serving.load(Ordering::Relaxed))
    }
}

// SAFETY: only the thread whose ticket equals `serving` leaves `acquire`,
// and `serving` only advances in `unlock` with Release.
unsafe impl RawLock for TicketLock {
    fn lock(&self) {
        self.acquire();
    }

    fn try_lock(&self) -> bool {
        let serving = self.serving.load(Ordering::Acquire);
        // only take a ticket if it would be served immediately
        self.next_ticket
            .compare_exchange(serving, serving.wrapping_add(1), Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    fn unlock(&self) {
        self.serving.fetch_add(1, Ordering::Release);
    }
}
