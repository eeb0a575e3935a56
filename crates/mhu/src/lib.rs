//! Arm MHUv2 mailbox drivers.
//!
//! A Message Handling Unit moves one 32-bit word per channel between two
//! cores and raises an interrupt on the far side. This crate drives both
//! directions:
//! - [`MhuSender`]: frame arbitration, channel writes and ACK detection
//! - [`MhuReceiver`]: combined interrupt decoding and channel dispatch
//!
//! Completion is reported through the [`AckHandler`] and [`ReceiveHandler`]
//! traits, which are called from interrupt context.

#![cfg_attr(not(test), no_std)]

pub mod global;
pub mod poll;
pub mod receiver;
pub mod regs;
pub mod sender;

#[cfg(test)]
mod testing;

pub use global::GlobalSender;
pub use poll::{Timeout, poll_with_budget};
pub use receiver::MhuReceiver;
pub use regs::{FrameInterrupt, MHU_CHANNELS};
pub use sender::{MhuSender, SenderConfig};

/// Default number of `ACCESS_READY` polls before arbitration gives up.
pub const DEFAULT_ACCESS_BUDGET: u32 = 10_000;

/// Wire status for a send accepted by the hardware.
pub const MHU_SEND_OK: u32 = 0;
/// Wire status for an out-of-range frame or channel.
pub const MHU_SEND_FAILED: u32 = 1;
/// Wire status for an arbitration timeout.
pub const MHU_RECEIVER_BUSY: u32 = 2;

/// Errors returned by [`MhuSender::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// Frame or channel index out of range. Never worth retrying.
    SendFailed,
    /// The remote receiver did not grant access within the poll budget.
    ReceiverBusy,
}

impl SendError {
    /// Numeric status as reported to C-style callers.
    pub fn code(self) -> u32 {
        match self {
            SendError::SendFailed => MHU_SEND_FAILED,
            SendError::ReceiverBusy => MHU_RECEIVER_BUSY,
        }
    }
}

/// Receiver readiness change reported by a sender frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Not-ready → ready.
    Ready,
    /// Ready → not-ready.
    NotReady,
}

/// Sink for sender-side completions. Called from interrupt context.
pub trait AckHandler: Sync {
    /// The remote side consumed the word sent on `(frame_id, channel)`.
    fn acknowledged(&self, frame_id: usize, channel: usize);

    /// Receiver readiness changed on `frame_id`.
    fn frame_event(&self, _frame_id: usize, _event: FrameEvent) {}
}

/// Sink for incoming words. Called from interrupt context.
pub trait ReceiveHandler: Sync {
    fn received(&self, frame_id: usize, channel: usize, data: u32);
}

/// Anything that can put one word on a mailbox channel.
pub trait MessageSender {
    fn send(&self, frame_id: usize, channel: usize, data: u32) -> Result<(), SendError>;
}

impl<S: MessageSender + ?Sized> MessageSender for &S {
    fn send(&self, frame_id: usize, channel: usize, data: u32) -> Result<(), SendError> {
        (**self).send(frame_id, channel, data)
    }
}
