//! Secure enclave services over the Arm MHU.
//!
//! Requests travel as the address of a shared packet buffer on one mailbox
//! channel; the enclave answers by sending the same address back once the
//! response is in the buffer. A typical bring-up:
//!
//! ```ignore
//! static PACKET: PacketStorage<PACKET_BUFFER_SIZE> = PacketStorage::new();
//!
//! unsafe {
//!     mhu::global::sender_initialize(&SENDER_FRAMES, &SIGNALS, SenderConfig::default());
//!     mhu::global::receiver_initialize(&RECEIVER_FRAMES, &SIGNALS);
//! }
//! bringup::enable_mhu_interrupts(&nvic, &IRQS);
//!
//! let mut services = Services::new(PACKET.take()?, GlobalSender, board, &SIGNALS, ServicesConfig::default());
//! let handle = register_channel(0, 0);
//! services.synchronize_with_se(handle)?;
//! let status = services.send_request(handle, SERVICE_MAINTENANCE_HEARTBEAT, None)?;
//! ```

#![cfg_attr(not(test), no_std)]

pub mod bringup;
pub mod buffer;
pub mod handle;
pub mod logging;
pub mod platform;
pub mod services;
pub mod signals;

pub use buffer::{PacketBuffer, PacketError, PacketStorage, Response};
pub use handle::ServiceHandle;
pub use platform::{InterruptController, Platform};
pub use services::{ServiceError, Services, ServicesConfig, SyncError, register_channel};
pub use signals::Signals;

/// Completion flags for boards that route the MHU interrupts through the
/// process-wide drivers in [`mhu::global`].
pub static SIGNALS: Signals = Signals::new();
