//! Single-slot motion-flag mailbox.
//!
//! The SoftDevice delivers notifications on its own execution context;
//! the application consumes them from its polling loop. This cell is the
//! only shared-mutable state between the two. It is deliberately lossy:
//! a new flag always replaces an unread one, so the consumer sees the
//! freshest value rather than a backlog - the right trade for a status
//! flag.
//!
//! Lock-free: one atomic byte, writer stores, reader swaps. Safe for one
//! producer and one consumer without any platform mutex.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::ble::MotionFlag;

/// Slot encoding for "no unread value".
const EMPTY: u8 = u8::MAX;

/// Latest-value-wins overwrite cell for [`MotionFlag`].
pub struct FlagMailbox {
    slot: AtomicU8,
}

impl FlagMailbox {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU8::new(EMPTY),
        }
    }

    /// Post a flag, replacing any unread one. Never blocks; callable
    /// from the radio delivery context.
    pub fn post(&self, flag: MotionFlag) {
        self.slot.store(flag as u8, Ordering::Release);
    }

    /// Check-and-consume the most recent flag.
    ///
    /// Returns `None` when nothing unread is present. A posted value is
    /// returned at most once: the swap leaves the slot empty.
    pub fn take(&self) -> Option<MotionFlag> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            0 => Some(MotionFlag::Still),
            1 => Some(MotionFlag::Moving),
            _ => None,
        }
    }
}

impl Default for FlagMailbox {
    fn default() -> Self {
        Self::new()
    }
}
