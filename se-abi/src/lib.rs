//! Shared definitions between the application core and the secure enclave.
//!
//! This crate contains the packet header layout, service identifiers, status
//! codes and the default limits that both sides of the mailbox protocol need
//! to agree on.

#![no_std]

pub mod header;

pub use header::{RequestHeader, ResponseHeader};

// =============================================================================
// Mailbox geometry
// =============================================================================

/// Channels per MHU frame. Also the stride used when encoding service handles.
pub const MAX_CHANNELS_PER_MAILBOX: u32 = 124;

// =============================================================================
// Packet buffer
// =============================================================================

/// Default size of the shared packet buffer (one page).
pub const PACKET_BUFFER_SIZE: usize = 4096;

/// Alignment of the shared packet buffer, matching the data cache line.
pub const PACKET_BUFFER_ALIGN: usize = 32;

// =============================================================================
// Default limits
// =============================================================================

/// Default number of response polls before a request times out.
pub const DEFAULT_RESPONSE_TIMEOUT: u32 = 0x0010_0000;

/// Number of polls spent waiting for the mailbox ACK interrupt.
pub const DEFAULT_ACK_BUDGET: u32 = 0x0040_0000;

/// Heartbeats attempted by the synchronization routine before giving up.
pub const MAX_SYNC_RETRIES: u32 = 100;

// =============================================================================
// Service identifiers
// =============================================================================

// Maintenance services (0x0000 - 0x00FF)
/// Liveness probe: () -> error_code
pub const SERVICE_MAINTENANCE_HEARTBEAT: u16 = 0x0001;

// =============================================================================
// Status codes
// =============================================================================

/// Request completed and the enclave reported success.
pub const SERVICES_REQ_SUCCESS: u32 = 0x00;
/// The request payload did not fit in the packet buffer. Never sent on the
/// wire; the request is rejected before the mailbox is touched.
pub const SERVICES_REQ_PAYLOAD_TOO_LARGE: u32 = 0xFB;
/// The enclave did not recognise the service identifier.
pub const SERVICES_RESP_UNKNOWN_COMMAND: u32 = 0xFC;
/// No response arrived within the response timeout.
pub const SERVICES_REQ_TIMEOUT: u32 = 0xFD;
/// The mailbox did not signal that the request word was consumed.
pub const SERVICES_REQ_NOT_ACKNOWLEDGE: u32 = 0xFF;
