//! Service handles.
//!
//! A handle names one `(mailbox, channel)` pair as a single integer so
//! callers never hold raw hardware indices. It carries no state: the pair is
//! recovered arithmetically every time it is used.

use se_abi::MAX_CHANNELS_PER_MAILBOX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceHandle(u32);

impl ServiceHandle {
    /// Encode `mailbox_id * MAX_CHANNELS_PER_MAILBOX + channel`.
    ///
    /// A `channel` past the end of a mailbox spills into the next one.
    pub const fn new(mailbox_id: u32, channel: u32) -> Self {
        Self(mailbox_id.wrapping_mul(MAX_CHANNELS_PER_MAILBOX).wrapping_add(channel))
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn mailbox(self) -> u32 {
        self.0 / MAX_CHANNELS_PER_MAILBOX
    }

    pub const fn channel(self) -> u32 {
        self.0 % MAX_CHANNELS_PER_MAILBOX
    }
}
