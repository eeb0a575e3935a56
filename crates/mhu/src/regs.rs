//! MHUv2 register model.
//!
//! Each mailbox instance exposes one 4 KiB frame per direction. The first
//! 124 × 0x20 bytes are per-channel windows; the frame-level block starts at
//! 0xF80. This module provides volatile access to both frame kinds through
//! typed views so the drivers never compute offsets by hand.

use core::ptr::{read_volatile, write_volatile};

use bitflags::bitflags;

/// Channel windows per frame.
pub const MHU_CHANNELS: usize = 124;

/// Channels covered by one combined interrupt status register.
pub const CHANNELS_PER_GROUP: usize = 32;

/// Combined interrupt status registers per frame.
pub const CHANNEL_GROUPS: usize = 4;

/// Size of one frame in bytes.
pub const FRAME_SIZE: usize = 0x1000;

/// Distance between consecutive channel windows.
pub const CHANNEL_STRIDE: usize = 0x20;

/// Sender channel window offsets.
pub mod send_ch {
    pub const CH_ST: usize = 0x00;
    pub const CH_SET: usize = 0x0C;
    pub const CH_INT_ST: usize = 0x10;
    pub const CH_INT_CLR: usize = 0x14;
    pub const CH_INT_EN: usize = 0x18;
}

/// Receiver channel window offsets.
pub mod recv_ch {
    pub const CH_ST: usize = 0x00;
    pub const CH_ST_MASKED: usize = 0x04;
    pub const CH_CLR: usize = 0x08;
    pub const CH_MSK_ST: usize = 0x10;
    pub const CH_MSK_SET: usize = 0x14;
    pub const CH_MSK_CLR: usize = 0x18;
}

/// Frame-level register offsets, shared by both frame kinds.
pub mod frame {
    pub const MHU_CFG: usize = 0xF80;
    pub const RESP_CFG: usize = 0xF84;
    /// Sender only.
    pub const ACCESS_REQUEST: usize = 0xF88;
    /// Sender only.
    pub const ACCESS_READY: usize = 0xF8C;
    pub const INT_ST: usize = 0xF90;
    pub const INT_CLR: usize = 0xF94;
    pub const INT_EN: usize = 0xF98;
    /// First of the four `CH_INT_ST{0..3}` combined status registers.
    pub const CH_INT_ST0: usize = 0xFA0;
}

pub const ACC_REQ: u32 = 0x1;
pub const ACC_RDY: u32 = 0x1;

/// Channel interrupt enable/clear bit in `CH_INT_EN` / `CH_INT_CLR`.
pub const CH_INT: u32 = 0x1;

bitflags! {
    /// Frame-level interrupt sources in `INT_ST` / `INT_CLR` / `INT_EN`.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct FrameInterrupt: u32 {
        /// Receiver became ready (not-ready → ready).
        const NR2R = 0x1;
        /// Receiver became not ready (ready → not-ready).
        const R2NR = 0x2;
        /// One or more channel interrupts are pending.
        const CHCOMB = 0x4;
    }
}

/// Map a channel number to its combined-status register and bit mask.
#[inline]
pub const fn channel_group(channel: usize) -> (usize, u32) {
    (channel / CHANNELS_PER_GROUP, 1 << (channel % CHANNELS_PER_GROUP))
}

/// Volatile access to one frame, addressed by byte offset.
#[derive(Debug, Clone, Copy)]
pub struct Registers {
    base: usize,
}

impl Registers {
    /// # Safety
    ///
    /// `base` must point at a live, 4-byte aligned region of at least
    /// [`FRAME_SIZE`] bytes for as long as the returned value is used.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn read(&self, offset: usize) -> u32 {
        debug_assert!(offset + 4 <= FRAME_SIZE, "MHU read out of bounds");
        // SAFETY: guaranteed by the constructor contract.
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    pub fn write(&self, offset: usize, value: u32) {
        debug_assert!(offset + 4 <= FRAME_SIZE, "MHU write out of bounds");
        // SAFETY: guaranteed by the constructor contract.
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }
}

#[inline]
const fn channel_offset(channel: usize, register: usize) -> usize {
    channel * CHANNEL_STRIDE + register
}

/// Typed view of a sender frame.
#[derive(Debug, Clone, Copy)]
pub struct SenderFrame {
    regs: Registers,
}

impl SenderFrame {
    /// # Safety
    ///
    /// See [`Registers::new`].
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            regs: unsafe { Registers::new(base) },
        }
    }

    pub fn request_access(&self) {
        self.regs.write(frame::ACCESS_REQUEST, ACC_REQ);
    }

    pub fn release_access(&self) {
        self.regs.write(frame::ACCESS_REQUEST, 0);
    }

    pub fn access_ready(&self) -> bool {
        self.regs.read(frame::ACCESS_READY) & ACC_RDY != 0
    }

    pub fn interrupt_status(&self) -> FrameInterrupt {
        FrameInterrupt::from_bits_truncate(self.regs.read(frame::INT_ST))
    }

    pub fn clear_interrupts(&self, sources: FrameInterrupt) {
        self.regs.write(frame::INT_CLR, sources.bits());
    }

    pub fn enable_interrupts(&self, sources: FrameInterrupt) {
        let enabled = self.regs.read(frame::INT_EN);
        self.regs.write(frame::INT_EN, enabled | sources.bits());
    }

    pub fn channel_status(&self, channel: usize) -> u32 {
        self.regs.read(channel_offset(channel, send_ch::CH_ST))
    }

    /// Write `data` into the channel; raises the remote receiver's interrupt.
    pub fn set_channel(&self, channel: usize, data: u32) {
        self.regs.write(channel_offset(channel, send_ch::CH_SET), data);
    }

    pub fn channel_interrupt_enabled(&self, channel: usize) -> bool {
        self.regs.read(channel_offset(channel, send_ch::CH_INT_EN)) & CH_INT != 0
    }

    pub fn enable_channel_interrupt(&self, channel: usize) {
        self.regs.write(channel_offset(channel, send_ch::CH_INT_EN), CH_INT);
    }

    pub fn disable_channel_interrupt(&self, channel: usize) {
        self.regs.write(channel_offset(channel, send_ch::CH_INT_EN), 0);
    }

    pub fn clear_channel_interrupt(&self, channel: usize) {
        self.regs.write(channel_offset(channel, send_ch::CH_INT_CLR), CH_INT);
    }
}

/// Typed view of a receiver frame.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverFrame {
    regs: Registers,
}

impl ReceiverFrame {
    /// # Safety
    ///
    /// See [`Registers::new`].
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            regs: unsafe { Registers::new(base) },
        }
    }

    pub fn enable_interrupts(&self, sources: FrameInterrupt) {
        let enabled = self.regs.read(frame::INT_EN);
        self.regs.write(frame::INT_EN, enabled | sources.bits());
    }

    /// Combined status word for channels `32 * group .. 32 * group + 31`.
    pub fn group_status(&self, group: usize) -> u32 {
        self.regs.read(frame::CH_INT_ST0 + group * 4)
    }

    pub fn channel_status(&self, channel: usize) -> u32 {
        self.regs.read(channel_offset(channel, recv_ch::CH_ST))
    }

    pub fn clear_channel(&self, channel: usize) {
        self.regs.write(channel_offset(channel, recv_ch::CH_CLR), u32::MAX);
    }
}
