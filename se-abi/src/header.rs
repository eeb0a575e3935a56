//! Packet header layout.
//!
//! Every request starts at offset 0 of the shared packet buffer:
//! ```text
//! +----------------+-------------+------------------+-------------+
//! | service_id u16 | flags u16   | error_code u32   | payload ... |
//! +----------------+-------------+------------------+-------------+
//! ```
//!
//! `error_code` is written by the enclave in the response and is zero in the
//! request. All fields are little-endian.

use zerocopy::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Header written by the application core.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned)]
pub struct RequestHeader {
    pub service_id: U16,
    pub flags: U16,
}

impl RequestHeader {
    pub fn new(service_id: u16) -> Self {
        Self {
            service_id: U16::new(service_id),
            flags: U16::new(0),
        }
    }
}

/// Header as it reads back after the enclave has answered.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned)]
pub struct ResponseHeader {
    pub request: RequestHeader,
    pub error_code: U32,
}

impl ResponseHeader {
    /// Byte offset of the opaque payload.
    pub const PAYLOAD_OFFSET: usize = core::mem::size_of::<Self>();

    pub fn service_id(&self) -> u16 {
        self.request.service_id.get()
    }

    pub fn flags(&self) -> u16 {
        self.request.flags.get()
    }

    pub fn error_code(&self) -> u32 {
        self.error_code.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes() {
        assert_eq!(core::mem::size_of::<RequestHeader>(), 4);
        assert_eq!(ResponseHeader::PAYLOAD_OFFSET, 8);
    }

    #[test]
    fn request_layout_is_little_endian() {
        let header = RequestHeader::new(0x1234);
        assert_eq!(header.as_bytes(), &[0x34, 0x12, 0x00, 0x00]);
    }

    #[test]
    fn response_reads_error_code_after_header() {
        let bytes = [0x01, 0x00, 0x00, 0x00, 0xFC, 0x00, 0x00, 0x00, 0xAA];
        let (header, rest) = ResponseHeader::read_from_prefix(&bytes).unwrap();
        assert_eq!(header.service_id(), 1);
        assert_eq!(header.flags(), 0);
        assert_eq!(header.error_code(), crate::SERVICES_RESP_UNKNOWN_COMMAND);
        assert_eq!(rest, &[0xAA]);
    }
}
