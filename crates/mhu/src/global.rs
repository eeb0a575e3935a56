//! Process-wide driver instances for interrupt vectors.
//!
//! Hardware vectors cannot carry a context pointer, so boards that wire the
//! MHU interrupts straight to these handlers install one sender and one
//! receiver here at boot. The write lock is only taken during
//! initialization, which must happen before the MHU interrupts are unmasked;
//! afterwards the foreground send path and the interrupt handlers share read
//! locks and never wait on each other.

use spinning_top::RwSpinlock;

use crate::{AckHandler, MessageSender, MhuReceiver, MhuSender, ReceiveHandler, SendError, SenderConfig};

static SENDER: RwSpinlock<Option<MhuSender>> = RwSpinlock::new(None);
static RECEIVER: RwSpinlock<Option<MhuReceiver>> = RwSpinlock::new(None);

/// Install the process-wide sender.
///
/// # Safety
///
/// See [`MhuSender::new`]. Must be called with the sender interrupts masked.
pub unsafe fn sender_initialize(
    frames: &'static [usize],
    handler: &'static dyn AckHandler,
    config: SenderConfig,
) {
    let sender = unsafe { MhuSender::with_config(frames, handler, config) };
    *SENDER.write() = Some(sender);
}

/// Send through the process-wide sender.
///
/// Fails with [`SendError::SendFailed`] if no sender is installed.
pub fn send_message(frame_id: usize, channel: usize, data: u32) -> Result<(), SendError> {
    match SENDER.read().as_ref() {
        Some(sender) => sender.send(frame_id, channel, data),
        None => Err(SendError::SendFailed),
    }
}

/// Sender interrupt entry point for `frame_id`.
pub fn send_message_irq_handler(frame_id: usize) {
    if let Some(sender) = SENDER.read().as_ref() {
        sender.handle_interrupt(frame_id);
    }
}

/// Install the process-wide receiver.
///
/// # Safety
///
/// See [`MhuReceiver::new`]. Must be called with the receiver interrupts
/// masked.
pub unsafe fn receiver_initialize(frames: &'static [usize], handler: &'static dyn ReceiveHandler) {
    let receiver = unsafe { MhuReceiver::new(frames, handler) };
    *RECEIVER.write() = Some(receiver);
}

/// Receiver interrupt entry point for `frame_id`.
pub fn receive_message_irq_handler(frame_id: usize) {
    if let Some(receiver) = RECEIVER.read().as_ref() {
        receiver.handle_interrupt(frame_id);
    }
}

/// [`MessageSender`] backed by the process-wide sender.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalSender;

impl MessageSender for GlobalSender {
    fn send(&self, frame_id: usize, channel: usize, data: u32) -> Result<(), SendError> {
        send_message(frame_id, channel, data)
    }
}
