//! Bounded busy-wait polling.
//!
//! There is no timer on this path: every wait is a spin count. Each failed
//! poll issues a spin-loop hint and nothing else, so the caller keeps the CPU
//! until the condition holds or the budget runs out.

/// The polling budget ran out before the condition became true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout;

/// Poll `ready` at most `budget` times.
///
/// Returns the number of polls consumed (1-based) once `ready` returns true.
pub fn poll_with_budget(budget: u32, mut ready: impl FnMut() -> bool) -> Result<u32, Timeout> {
    for attempt in 1..=budget {
        if ready() {
            return Ok(attempt);
        }
        core::hint::spin_loop();
    }
    Err(Timeout)
}
