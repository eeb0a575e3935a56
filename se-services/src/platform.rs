//! Hooks the board provides to the services layer.

/// Cache maintenance and address translation for the shared packet buffer.
pub trait Platform {
    /// Write back any dirty data cache lines covering `addr..addr + len`.
    fn clean_dcache(&self, addr: usize, len: usize);

    /// Discard data cache lines covering `addr..addr + len` so the next read
    /// comes from memory.
    fn invalidate_dcache(&self, addr: usize, len: usize);

    /// Translate a local address (e.g. in tightly-coupled memory) into the
    /// system address the enclave uses to reach the same bytes.
    fn local_to_global(&self, addr: usize) -> u32;
}

impl<P: Platform + ?Sized> Platform for &P {
    fn clean_dcache(&self, addr: usize, len: usize) {
        (**self).clean_dcache(addr, len)
    }

    fn invalidate_dcache(&self, addr: usize, len: usize) {
        (**self).invalidate_dcache(addr, len)
    }

    fn local_to_global(&self, addr: usize) -> u32 {
        (**self).local_to_global(addr)
    }
}

/// The interrupt controller (NVIC on Cortex-M).
pub trait InterruptController {
    fn enable(&self, irq: u16);
    fn disable(&self, irq: u16);
    fn clear_pending(&self, irq: u16);
    fn set_priority(&self, irq: u16, priority: u8);
}
