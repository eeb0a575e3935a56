//! A simulated secure enclave on the far side of real MHU drivers.
//!
//! The sender and receiver frames are plain heap memory. The enclave plays
//! the hardware and remote firmware in between: it grants access, consumes
//! the request word, writes the response into the packet buffer and rings
//! the receiver frame, calling the real drivers' interrupt handlers the way
//! the vector table would.

#![allow(dead_code)]

use std::cell::{Cell, RefCell, UnsafeCell};
use std::collections::VecDeque;
use std::ptr::{read_volatile, write_volatile};

use mhu::regs::{
    ACC_RDY, CHANNEL_STRIDE, FRAME_SIZE, FrameInterrupt, channel_group, frame, recv_ch, send_ch,
};
use mhu::{MessageSender, MhuReceiver, MhuSender, SendError, SenderConfig};
use se_abi::{RequestHeader, ResponseHeader};
use se_services::{PacketBuffer, Platform, Services, ServicesConfig, Signals};
use zerocopy::{FromBytes, IntoBytes};

/// Global address the board maps the packet buffer to.
pub const GLOBAL_BUFFER: u32 = 0x6000_0000;

#[repr(C, align(4096))]
pub struct FakeFrame(UnsafeCell<[u32; FRAME_SIZE / 4]>);

impl FakeFrame {
    pub fn leak() -> &'static FakeFrame {
        Box::leak(Box::new(FakeFrame(UnsafeCell::new([0; FRAME_SIZE / 4]))))
    }

    pub fn base(&self) -> usize {
        self.0.get() as usize
    }

    pub fn peek(&self, offset: usize) -> u32 {
        unsafe { read_volatile((self.base() + offset) as *const u32) }
    }

    pub fn poke(&self, offset: usize, value: u32) {
        unsafe { write_volatile((self.base() + offset) as *mut u32, value) }
    }
}

/// What the board saw, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOp {
    Clean(u32, usize),
    Invalidate(u32, usize),
    Send(usize, usize, u32),
}

/// Cache hooks and address translation. The buffer lives at whatever local
/// address the allocator gave it and is published at [`GLOBAL_BUFFER`].
#[derive(Default)]
pub struct Board {
    local_base: Cell<usize>,
    ops: RefCell<Vec<BoardOp>>,
}

impl Board {
    pub fn ops(&self) -> Vec<BoardOp> {
        self.ops.borrow().clone()
    }

    pub fn count(&self, matches: impl Fn(&BoardOp) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| matches(op)).count()
    }

    fn global_to_local(&self, addr: u32) -> usize {
        self.local_base.get() + (addr - GLOBAL_BUFFER) as usize
    }

    fn global(&self, addr: usize) -> u32 {
        GLOBAL_BUFFER + (addr - self.local_base.get()) as u32
    }
}

impl Platform for Board {
    fn clean_dcache(&self, addr: usize, len: usize) {
        self.ops.borrow_mut().push(BoardOp::Clean(self.global(addr), len));
    }

    fn invalidate_dcache(&self, addr: usize, len: usize) {
        self.ops.borrow_mut().push(BoardOp::Invalidate(self.global(addr), len));
    }

    fn local_to_global(&self, addr: usize) -> u32 {
        self.local_base.set(addr);
        GLOBAL_BUFFER
    }
}

/// How the enclave answers the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Consume the word, never answer.
    Silent,
    /// Write a response header and payload, then send the buffer address
    /// back.
    Respond { error_code: u32, payload: Vec<u8> },
    /// Send the buffer address back without touching the buffer.
    Echo,
    /// Send back a word that is not the buffer address.
    WrongWord(u32),
}

impl Reply {
    pub fn status(error_code: u32) -> Self {
        Reply::Respond {
            error_code,
            payload: Vec::new(),
        }
    }
}

/// A request as the enclave read it out of the packet buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub service_id: u16,
    pub flags: u16,
    pub error_code: u32,
    pub payload: Vec<u8>,
}

pub struct Enclave<'a> {
    board: &'a Board,
    buffer_len: usize,
    pub tx: &'static FakeFrame,
    pub rx: &'static FakeFrame,
    sender: MhuSender,
    receiver: MhuReceiver,
    /// Grant `ACCESS_READY` when asked.
    pub ready: Cell<bool>,
    /// Clear the channel (and so ACK) after each write.
    pub acks: Cell<bool>,
    replies: RefCell<VecDeque<Reply>>,
    seen: RefCell<Vec<SeenRequest>>,
}

impl<'a> Enclave<'a> {
    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.borrow().clone()
    }

    /// Queue answers; once the queue is empty every request goes unanswered.
    pub fn script(&self, replies: impl IntoIterator<Item = Reply>) {
        self.replies.borrow_mut().extend(replies);
    }

    fn buffer_ptr(&self, global: u32) -> *mut u8 {
        self.board.global_to_local(global) as *mut u8
    }

    fn read_request(&self, global: u32) -> SeenRequest {
        let bytes = unsafe { std::slice::from_raw_parts(self.buffer_ptr(global), self.buffer_len) };
        let (header, payload) = ResponseHeader::read_from_prefix(bytes).unwrap();
        SeenRequest {
            service_id: header.service_id(),
            flags: header.flags(),
            error_code: header.error_code(),
            payload: payload.to_vec(),
        }
    }

    fn ring_receiver(&self, frame_id: usize, channel: usize, word: u32) {
        let (group, bit) = channel_group(channel);
        self.rx.poke(channel * CHANNEL_STRIDE + recv_ch::CH_ST, word);
        self.rx.poke(frame::CH_INT_ST0 + group * 4, bit);
        self.receiver.handle_interrupt(frame_id);
        self.rx.poke(frame::CH_INT_ST0 + group * 4, 0);
        self.rx.poke(channel * CHANNEL_STRIDE + recv_ch::CH_ST, 0);
    }
}

impl MessageSender for Enclave<'_> {
    fn send(&self, frame_id: usize, channel: usize, data: u32) -> Result<(), SendError> {
        self.board
            .ops
            .borrow_mut()
            .push(BoardOp::Send(frame_id, channel, data));

        self.tx
            .poke(frame::ACCESS_READY, if self.ready.get() { ACC_RDY } else { 0 });
        self.sender.send(frame_id, channel, data)?;

        let word = self.tx.peek(channel * CHANNEL_STRIDE + send_ch::CH_SET);
        self.seen.borrow_mut().push(self.read_request(word));

        if !self.acks.get() {
            return Ok(());
        }
        self.tx.poke(frame::INT_ST, FrameInterrupt::CHCOMB.bits());
        self.sender.handle_interrupt(frame_id);
        self.tx.poke(frame::INT_ST, 0);

        let reply = self.replies.borrow_mut().pop_front().unwrap_or(Reply::Silent);
        match reply {
            Reply::Silent => {}
            Reply::Respond {
                error_code,
                payload,
            } => {
                let bytes = unsafe {
                    std::slice::from_raw_parts_mut(self.buffer_ptr(word), self.buffer_len)
                };
                let request = RequestHeader::read_from_prefix(&*bytes).unwrap().0;
                let header = ResponseHeader {
                    request,
                    error_code: error_code.into(),
                };
                bytes[..ResponseHeader::PAYLOAD_OFFSET].copy_from_slice(header.as_bytes());
                bytes[ResponseHeader::PAYLOAD_OFFSET..][..payload.len()].copy_from_slice(&payload);
                self.ring_receiver(frame_id, channel, word);
            }
            Reply::Echo => self.ring_receiver(frame_id, channel, word),
            Reply::WrongWord(other) => self.ring_receiver(frame_id, channel, other),
        }

        Ok(())
    }
}

/// Small budgets so the failure paths finish quickly.
pub fn test_config() -> ServicesConfig {
    ServicesConfig {
        default_timeout: 1_000,
        ack_budget: 1_000,
        max_sync_retries: se_abi::MAX_SYNC_RETRIES,
    }
}

pub fn leaked_signals() -> &'static Signals {
    Box::leak(Box::new(Signals::new()))
}

/// One sender frame, one receiver frame, a `buffer_len`-byte packet buffer.
pub fn enclave<'a>(board: &'a Board, signals: &'static Signals, buffer_len: usize) -> (Enclave<'a>, PacketBuffer) {
    let tx = FakeFrame::leak();
    let rx = FakeFrame::leak();
    let sender = unsafe {
        MhuSender::with_config(
            Box::leak(Box::new([tx.base()])),
            signals,
            SenderConfig { access_budget: 64 },
        )
    };
    let receiver = unsafe { MhuReceiver::new(Box::leak(Box::new([rx.base()])), signals) };
    let buffer = PacketBuffer::new(Box::leak(vec![0xEE; buffer_len].into_boxed_slice())).unwrap();

    let enclave = Enclave {
        board,
        buffer_len,
        tx,
        rx,
        sender,
        receiver,
        ready: Cell::new(true),
        acks: Cell::new(true),
        replies: RefCell::new(VecDeque::new()),
        seen: RefCell::new(Vec::new()),
    };
    (enclave, buffer)
}

pub type TestServices<'e, 'a> = Services<&'e Enclave<'a>, &'a Board>;

pub fn services<'e, 'a>(
    enclave: &'e Enclave<'a>,
    board: &'a Board,
    buffer: PacketBuffer,
    signals: &'static Signals,
) -> TestServices<'e, 'a> {
    Services::new(buffer, enclave, board, signals, test_config())
}
