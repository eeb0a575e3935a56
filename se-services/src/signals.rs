//! Completion flags shared with the MHU interrupt handlers.
//!
//! The interrupt side only ever sets a flag; the foreground only ever clears
//! one, right before issuing the operation it is about to wait on.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::warn;
use mhu::{AckHandler, ReceiveHandler};

pub struct Signals {
    ack_received: AtomicBool,
    response_received: AtomicBool,
    /// Global address of the packet buffer; the only word accepted as a
    /// response.
    expected: AtomicU32,
}

impl Signals {
    pub const fn new() -> Self {
        Self {
            ack_received: AtomicBool::new(false),
            response_received: AtomicBool::new(false),
            expected: AtomicU32::new(0),
        }
    }

    pub(crate) fn expect(&self, address: u32) {
        self.expected.store(address, Ordering::Release);
    }

    pub(crate) fn clear_ack(&self) {
        self.ack_received.store(false, Ordering::Release);
    }

    pub(crate) fn clear_response(&self) {
        self.response_received.store(false, Ordering::Release);
    }

    pub fn ack_received(&self) -> bool {
        self.ack_received.load(Ordering::Acquire)
    }

    pub fn response_received(&self) -> bool {
        self.response_received.load(Ordering::Acquire)
    }
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

impl AckHandler for Signals {
    fn acknowledged(&self, _frame_id: usize, _channel: usize) {
        self.ack_received.store(true, Ordering::Release);
    }
}

impl ReceiveHandler for Signals {
    fn received(&self, frame_id: usize, channel: usize, data: u32) {
        let expected = self.expected.load(Ordering::Acquire);
        if data != expected {
            warn!(
                "dropping response {:#010x} on {}:{} (expected {:#010x})",
                data, frame_id, channel, expected
            );
            return;
        }
        self.response_received.store(true, Ordering::Release);
    }
}
