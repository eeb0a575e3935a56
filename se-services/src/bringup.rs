//! MHU interrupt wiring at boot.

use log::debug;

use crate::platform::InterruptController;

/// Board description of the MHU interrupt lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MhuIrqConfig<'a> {
    /// One combined interrupt per sender frame, indexed by frame id.
    pub sender_irqs: &'a [u16],
    /// One combined interrupt per receiver frame, indexed by frame id.
    pub receiver_irqs: &'a [u16],
    pub priority: u8,
}

impl MhuIrqConfig<'_> {
    fn irqs(&self) -> impl Iterator<Item = u16> + '_ {
        self.sender_irqs.iter().chain(self.receiver_irqs).copied()
    }
}

/// Unmask every MHU interrupt line.
///
/// Call after the sender and receiver drivers are initialized; any interrupt
/// latched before that is dropped.
pub fn enable_mhu_interrupts(nvic: &impl InterruptController, config: &MhuIrqConfig<'_>) {
    for irq in config.irqs() {
        nvic.clear_pending(irq);
        nvic.set_priority(irq, config.priority);
        nvic.enable(irq);
    }
    debug!(
        "MHU interrupts enabled: {} sender, {} receiver, priority {}",
        config.sender_irqs.len(),
        config.receiver_irqs.len(),
        config.priority
    );
}

/// Mask every MHU interrupt line and drop anything pending.
pub fn disable_mhu_interrupts(nvic: &impl InterruptController, config: &MhuIrqConfig<'_>) {
    for irq in config.irqs() {
        nvic.disable(irq);
        nvic.clear_pending(irq);
    }
}
