//! MHU receiver frame driver.
//!
//! The remote sender already owns the frame through the access handshake, so
//! the receive side needs no arbitration: decode, deliver, clear.

use log::debug;

use crate::ReceiveHandler;
use crate::regs::{FrameInterrupt, MHU_CHANNELS, ReceiverFrame, channel_group};

/// Driver for a set of receiver frames.
pub struct MhuReceiver {
    frames: &'static [usize],
    handler: &'static dyn ReceiveHandler,
}

impl MhuReceiver {
    /// Take ownership of the receiver frames at `frames` and enable their
    /// combined channel interrupt.
    ///
    /// # Safety
    ///
    /// Every entry of `frames` must be the base of a mapped MHU receiver frame
    /// that nothing else drives for the life of the program.
    pub unsafe fn new(frames: &'static [usize], handler: &'static dyn ReceiveHandler) -> Self {
        let receiver = Self { frames, handler };
        for id in 0..frames.len() {
            if let Some(frame) = receiver.frame(id) {
                frame.enable_interrupts(FrameInterrupt::CHCOMB);
            }
        }
        debug!("MHU receiver: {} frame(s) initialised", frames.len());
        receiver
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, frame_id: usize) -> Option<ReceiverFrame> {
        let base = *self.frames.get(frame_id)?;
        // SAFETY: bases were handed over in `new`.
        Some(unsafe { ReceiverFrame::new(base) })
    }

    /// Interrupt bottom half for `frame_id`.
    ///
    /// Unknown frames are ignored: interrupt routing is fixed by the board,
    /// so this only happens when the vector table is miswired.
    pub fn handle_interrupt(&self, frame_id: usize) {
        let Some(frame) = self.frame(frame_id) else {
            return;
        };

        for channel in 0..MHU_CHANNELS {
            let (group, bit) = channel_group(channel);
            if frame.group_status(group) & bit != 0 {
                let data = frame.channel_status(channel);
                self.handler.received(frame_id, channel, data);
                frame.clear_channel(channel);
            }
        }
    }
}
