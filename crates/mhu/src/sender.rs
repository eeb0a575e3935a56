//! MHU sender frame driver.
//!
//! A send is a four-step handshake with the remote receiver:
//! 1. raise `ACCESS_REQUEST` on the frame
//! 2. spin until `ACCESS_READY` (bounded by [`SenderConfig::access_budget`])
//! 3. arm the channel interrupt and write the word into `CH_SET`
//! 4. later, in [`MhuSender::handle_interrupt`], notice the remote cleared the
//!    channel, drop `ACCESS_REQUEST` and report the ACK
//!
//! [`MhuSender::send`] returns after step 3; completion is only ever observed
//! from the interrupt handler.

use log::{debug, warn};

use crate::poll::poll_with_budget;
use crate::regs::{FrameInterrupt, MHU_CHANNELS, SenderFrame};
use crate::{AckHandler, DEFAULT_ACCESS_BUDGET, FrameEvent, MessageSender, SendError};

/// Tunables for the sender driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderConfig {
    /// Polls of `ACCESS_READY` before a send fails with `ReceiverBusy`.
    pub access_budget: u32,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            access_budget: DEFAULT_ACCESS_BUDGET,
        }
    }
}

/// Driver for a set of sender frames.
pub struct MhuSender {
    frames: &'static [usize],
    handler: &'static dyn AckHandler,
    config: SenderConfig,
}

impl MhuSender {
    /// Take ownership of the sender frames at `frames` and arm their
    /// frame-level interrupts.
    ///
    /// # Safety
    ///
    /// Every entry of `frames` must be the base of a mapped MHU sender frame
    /// that nothing else drives for the life of the program.
    pub unsafe fn new(frames: &'static [usize], handler: &'static dyn AckHandler) -> Self {
        unsafe { Self::with_config(frames, handler, SenderConfig::default()) }
    }

    /// Like [`MhuSender::new`] with explicit tunables.
    ///
    /// # Safety
    ///
    /// See [`MhuSender::new`].
    pub unsafe fn with_config(
        frames: &'static [usize],
        handler: &'static dyn AckHandler,
        config: SenderConfig,
    ) -> Self {
        let sender = Self {
            frames,
            handler,
            config,
        };

        let sources = FrameInterrupt::NR2R | FrameInterrupt::R2NR | FrameInterrupt::CHCOMB;
        for id in 0..frames.len() {
            if let Some(frame) = sender.frame(id) {
                frame.clear_interrupts(sources);
                frame.enable_interrupts(sources);
            }
        }
        debug!("MHU sender: {} frame(s) initialised", frames.len());

        sender
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, frame_id: usize) -> Option<SenderFrame> {
        let base = *self.frames.get(frame_id)?;
        // SAFETY: bases were handed over in `new`.
        Some(unsafe { SenderFrame::new(base) })
    }

    /// Put `data` on `(frame_id, channel)`.
    ///
    /// Returns once the word is written; the ACK arrives later through
    /// [`AckHandler::acknowledged`].
    pub fn send(&self, frame_id: usize, channel: usize, data: u32) -> Result<(), SendError> {
        if channel >= MHU_CHANNELS {
            return Err(SendError::SendFailed);
        }
        let frame = self.frame(frame_id).ok_or(SendError::SendFailed)?;

        frame.request_access();
        if poll_with_budget(self.config.access_budget, || frame.access_ready()).is_err() {
            frame.release_access();
            warn!("MHU sender: frame {} receiver busy", frame_id);
            return Err(SendError::ReceiverBusy);
        }

        frame.clear_channel_interrupt(channel);
        frame.enable_channel_interrupt(channel);
        frame.set_channel(channel, data);

        Ok(())
    }

    /// Interrupt bottom half for `frame_id`.
    pub fn handle_interrupt(&self, frame_id: usize) {
        let Some(frame) = self.frame(frame_id) else {
            return;
        };

        let status = frame.interrupt_status();

        if status.contains(FrameInterrupt::NR2R) {
            frame.clear_interrupts(FrameInterrupt::NR2R);
            self.handler.frame_event(frame_id, FrameEvent::Ready);
        }

        if status.contains(FrameInterrupt::R2NR) {
            frame.clear_interrupts(FrameInterrupt::R2NR);
            self.handler.frame_event(frame_id, FrameEvent::NotReady);
        }

        if status.contains(FrameInterrupt::CHCOMB) {
            for channel in 0..MHU_CHANNELS {
                // Status alone also reads zero for idle channels; the armed
                // interrupt marks the one we are waiting on.
                if frame.channel_status(channel) == 0 && frame.channel_interrupt_enabled(channel) {
                    frame.disable_channel_interrupt(channel);
                    frame.clear_channel_interrupt(channel);
                    frame.release_access();
                    self.handler.acknowledged(frame_id, channel);
                }
            }
        }
    }
}

impl MessageSender for MhuSender {
    fn send(&self, frame_id: usize, channel: usize, data: u32) -> Result<(), SendError> {
        MhuSender::send(self, frame_id, channel, data)
    }
}
