//! The shared packet buffer.
//!
//! One buffer carries every request and its response. The enclave reads and
//! writes it directly through its global address, so while a request is
//! outstanding the contents belong to the remote core; the local side only
//! touches it before the cache clean and after the cache invalidate.

use core::cell::UnsafeCell;
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicBool, Ordering, compiler_fence};

use se_abi::{RequestHeader, ResponseHeader};
use zerocopy::{FromBytes, IntoBytes};

/// Errors from packet buffer setup and request encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Backing storage cannot hold a response header.
    TooSmall,
    /// The storage was already handed out.
    AlreadyTaken,
    /// Header plus payload does not fit in the buffer.
    PayloadTooLarge,
}

/// Statically allocated backing storage for a [`PacketBuffer`].
///
/// ```ignore
/// static PACKET: PacketStorage<PACKET_BUFFER_SIZE> = PacketStorage::new();
/// let buffer = PACKET.take()?;
/// ```
#[repr(C, align(32))]
pub struct PacketStorage<const N: usize> {
    bytes: UnsafeCell<[u8; N]>,
    taken: AtomicBool,
}

// Safety: the bytes are only reachable through the single PacketBuffer that
// `take` hands out.
unsafe impl<const N: usize> Sync for PacketStorage<N> {}

impl<const N: usize> PacketStorage<N> {
    pub const fn new() -> Self {
        Self {
            bytes: UnsafeCell::new([0; N]),
            taken: AtomicBool::new(false),
        }
    }

    /// Hand out the one buffer backed by this storage.
    pub fn take(&'static self) -> Result<PacketBuffer, PacketError> {
        if N < ResponseHeader::PAYLOAD_OFFSET {
            return Err(PacketError::TooSmall);
        }
        if self.taken.swap(true, Ordering::AcqRel) {
            return Err(PacketError::AlreadyTaken);
        }
        // SAFETY: `taken` guarantees this is the only reference.
        let bytes: &'static mut [u8; N] = unsafe { &mut *self.bytes.get() };
        PacketBuffer::new(bytes)
    }
}

impl<const N: usize> Default for PacketStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive handle on the shared packet memory.
///
/// Held as a raw pointer rather than a slice: the enclave writes the memory
/// behind the compiler's back while a request is in flight.
pub struct PacketBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

// Safety: PacketBuffer is the unique owner of its memory.
unsafe impl Send for PacketBuffer {}

impl PacketBuffer {
    /// Wrap caller-provided memory. Prefer [`PacketStorage`] for the
    /// cache-line alignment.
    pub fn new(bytes: &'static mut [u8]) -> Result<Self, PacketError> {
        if bytes.len() < ResponseHeader::PAYLOAD_OFFSET {
            return Err(PacketError::TooSmall);
        }
        let len = bytes.len();
        Ok(Self {
            ptr: NonNull::from(bytes).cast(),
            len,
        })
    }

    /// Address of the buffer as seen by this core.
    pub fn local_address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest request or response payload the buffer can carry.
    pub fn payload_capacity(&self) -> usize {
        self.len - ResponseHeader::PAYLOAD_OFFSET
    }

    /// Zero the whole buffer and write a fresh request.
    pub(crate) fn prepare(&mut self, service_id: u16, payload: &[u8]) -> Result<(), PacketError> {
        if payload.len() > self.payload_capacity() {
            return Err(PacketError::PayloadTooLarge);
        }
        let header = RequestHeader::new(service_id);
        let header = header.as_bytes();
        // SAFETY: both copies stay inside `len`, checked above and in `new`.
        unsafe {
            ptr::write_bytes(self.ptr.as_ptr(), 0, self.len);
            ptr::copy_nonoverlapping(header.as_ptr(), self.ptr.as_ptr(), header.len());
            ptr::copy_nonoverlapping(
                payload.as_ptr(),
                self.ptr.as_ptr().add(ResponseHeader::PAYLOAD_OFFSET),
                payload.len(),
            );
        }
        compiler_fence(Ordering::Release);
        Ok(())
    }

    /// View the buffer as a response.
    pub fn response(&self) -> Response<'_> {
        compiler_fence(Ordering::Acquire);
        // SAFETY: `ptr..ptr + len` is owned by this buffer.
        let bytes = unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) };
        let header = ResponseHeader::read_from_prefix(bytes)
            .map(|(header, _)| header)
            .unwrap_or_default();
        Response {
            header,
            payload: &bytes[ResponseHeader::PAYLOAD_OFFSET..],
        }
    }
}

/// A response as read back from the packet buffer.
#[derive(Debug, Clone, Copy)]
pub struct Response<'a> {
    pub header: ResponseHeader,
    pub payload: &'a [u8],
}

impl Response<'_> {
    pub fn error_code(&self) -> u32 {
        self.header.error_code()
    }
}
