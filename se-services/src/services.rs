//! Synchronous request/response calls to the secure enclave.
//!
//! A request is the address of the shared packet buffer, sent as a single
//! word on one MHU channel. The call then waits twice:
//! 1. for the sender-side ACK (the enclave consumed the word)
//! 2. for a receiver-side word equal to the same address (the response is
//!    in the buffer)
//!
//! Both waits are spin budgets. Nothing is retried here except the heartbeat
//! in [`Services::synchronize_with_se`].

use log::{debug, warn};
use mhu::{MessageSender, SendError, poll_with_budget};
use se_abi::{
    DEFAULT_ACK_BUDGET, DEFAULT_RESPONSE_TIMEOUT, MAX_SYNC_RETRIES, SERVICE_MAINTENANCE_HEARTBEAT,
    SERVICES_REQ_NOT_ACKNOWLEDGE, SERVICES_REQ_PAYLOAD_TOO_LARGE, SERVICES_REQ_SUCCESS,
    SERVICES_REQ_TIMEOUT,
};

use crate::buffer::{PacketBuffer, PacketError, Response};
use crate::handle::ServiceHandle;
use crate::platform::Platform;
use crate::signals::Signals;

/// Handle for `channel` of `mailbox_id`.
pub fn register_channel(mailbox_id: u32, channel: u32) -> ServiceHandle {
    ServiceHandle::new(mailbox_id, channel)
}

/// Tunables for the services layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicesConfig {
    /// Response polls used when a request passes no timeout.
    pub default_timeout: u32,
    /// Polls spent waiting for the MHU ACK.
    pub ack_budget: u32,
    /// Heartbeats attempted by [`Services::synchronize_with_se`].
    pub max_sync_retries: u32,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_RESPONSE_TIMEOUT,
            ack_budget: DEFAULT_ACK_BUDGET,
            max_sync_retries: MAX_SYNC_RETRIES,
        }
    }
}

/// Errors from a services call. A response carrying a non-zero error code is
/// not an error here; it is returned as the call's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    /// The MHU refused the send.
    Mhu(SendError),
    /// The word was sent but the ACK interrupt never came.
    NotAcknowledged,
    /// ACKed, but no matching response arrived in time.
    Timeout,
    /// The request payload does not fit in the packet buffer.
    PayloadTooLarge,
}

impl ServiceError {
    /// Numeric status as reported to C-style callers.
    pub fn code(self) -> u32 {
        match self {
            ServiceError::Mhu(err) => err.code(),
            ServiceError::NotAcknowledged => SERVICES_REQ_NOT_ACKNOWLEDGE,
            ServiceError::Timeout => SERVICES_REQ_TIMEOUT,
            ServiceError::PayloadTooLarge => SERVICES_REQ_PAYLOAD_TOO_LARGE,
        }
    }
}

impl From<SendError> for ServiceError {
    fn from(err: SendError) -> Self {
        ServiceError::Mhu(err)
    }
}

impl From<PacketError> for ServiceError {
    fn from(_: PacketError) -> Self {
        ServiceError::PayloadTooLarge
    }
}

/// Every heartbeat failed; `attempts` counts one past the last heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncError {
    pub attempts: u32,
}

impl SyncError {
    /// The negated attempt count.
    pub fn code(self) -> i32 {
        -(self.attempts as i32)
    }
}

/// The services context: one packet buffer, one sender, one set of
/// completion flags.
///
/// Request methods take `&mut self`, so only one request can be in flight.
pub struct Services<S: MessageSender, P: Platform> {
    sender: S,
    platform: P,
    buffer: PacketBuffer,
    global_address: u32,
    signals: &'static Signals,
    config: ServicesConfig,
}

impl<S: MessageSender, P: Platform> Services<S, P> {
    /// Set up the services layer.
    ///
    /// The buffer's global address is translated once here and reused for
    /// every request. `signals` must be the handler the MHU sender and
    /// receiver report to.
    pub fn new(
        buffer: PacketBuffer,
        sender: S,
        platform: P,
        signals: &'static Signals,
        config: ServicesConfig,
    ) -> Self {
        let global_address = platform.local_to_global(buffer.local_address());
        signals.expect(global_address);
        debug!(
            "services: packet buffer {:#x} (global {:#010x}), {} bytes",
            buffer.local_address(),
            global_address,
            buffer.len()
        );
        Self {
            sender,
            platform,
            buffer,
            global_address,
            signals,
            config,
        }
    }

    pub fn global_address(&self) -> u32 {
        self.global_address
    }

    pub fn config(&self) -> &ServicesConfig {
        &self.config
    }

    /// Send one word on `handle` and wait for the MHU ACK.
    pub fn send_msg(&mut self, handle: ServiceHandle, data: u32) -> Result<(), ServiceError> {
        let signals = self.signals;
        signals.clear_ack();

        self.sender
            .send(handle.mailbox() as usize, handle.channel() as usize, data)?;

        poll_with_budget(self.config.ack_budget, || signals.ack_received()).map_err(|_| {
            warn!("services: no ACK on handle {}", handle.raw());
            ServiceError::NotAcknowledged
        })?;

        Ok(())
    }

    /// Issue `service_id` with an empty payload and return the enclave's
    /// error code.
    ///
    /// `timeout` is a response poll budget; `None` uses
    /// [`ServicesConfig::default_timeout`].
    pub fn send_request(
        &mut self,
        handle: ServiceHandle,
        service_id: u16,
        timeout: Option<u32>,
    ) -> Result<u32, ServiceError> {
        self.transact(handle, service_id, &[], timeout)
    }

    /// Issue `service_id` with an opaque request payload.
    ///
    /// On success the response payload is available from
    /// [`Services::response`] until the next request.
    pub fn transact(
        &mut self,
        handle: ServiceHandle,
        service_id: u16,
        payload: &[u8],
        timeout: Option<u32>,
    ) -> Result<u32, ServiceError> {
        let timeout = timeout.unwrap_or(self.config.default_timeout);

        self.buffer.prepare(service_id, payload)?;
        self.signals.clear_response();
        self.platform
            .clean_dcache(self.buffer.local_address(), self.buffer.len());

        self.send_msg(handle, self.global_address)?;

        let signals = self.signals;
        poll_with_budget(timeout, || signals.response_received()).map_err(|_| {
            warn!(
                "services: request {:#06x} on handle {} timed out",
                service_id,
                handle.raw()
            );
            ServiceError::Timeout
        })?;

        self.platform
            .invalidate_dcache(self.buffer.local_address(), self.buffer.len());

        let error_code = self.buffer.response().error_code();
        debug!(
            "services: request {:#06x} on handle {} -> {:#x}",
            service_id,
            handle.raw(),
            error_code
        );
        Ok(error_code)
    }

    /// The last response, as left in the packet buffer.
    pub fn response(&self) -> Response<'_> {
        self.buffer.response()
    }

    /// Heartbeat the enclave until it answers successfully.
    ///
    /// Returns the number of heartbeats it took. The enclave may still be
    /// booting, so nothing else should be sent before this succeeds.
    pub fn synchronize_with_se(&mut self, handle: ServiceHandle) -> Result<u32, SyncError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            if attempts > self.config.max_sync_retries {
                warn!("services: enclave silent after {} heartbeats", attempts - 1);
                return Err(SyncError { attempts });
            }
            if self.send_request(handle, SERVICE_MAINTENANCE_HEARTBEAT, None)
                == Ok(SERVICES_REQ_SUCCESS)
            {
                debug!("services: synchronized after {} heartbeat(s)", attempts);
                return Ok(attempts);
            }
        }
    }
}
