//! Heap-backed stand-ins for MHU frames.

use std::boxed::Box;
use std::cell::UnsafeCell;
use std::ptr::{read_volatile, write_volatile};
use std::vec::Vec;

use crate::regs::FRAME_SIZE;

/// One frame worth of plain memory. Registers have no side effects: a write
/// is visible to the next read of the same offset and nothing else.
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

    pub fn snapshot(&self) -> Vec<u32> {
        (0..FRAME_SIZE).step_by(4).map(|offset| self.peek(offset)).collect()
    }
}
