//! Free-running counter and one-shot alarm
//!
//! The hardware timer exposes a microsecond counter that wraps at 2^32
//! and a single one-shot alarm derived from it. Alarm bookkeeping (the
//! pending slot, cancellation, replacement semantics as seen by callers)
//! lives in the core; this trait is only the hardware surface.

/// Free-running hardware counter with a one-shot alarm.
pub trait TickCounter {
    /// Current counter value in ticks.
    ///
    /// Monotonic except for wraparound at 2^32; callers handle wrap with
    /// unsigned-difference arithmetic.
    fn now(&self) -> u32;

    /// Schedule the one-shot hardware alarm `delay` ticks from now.
    ///
    /// Scheduling while an alarm is already pending replaces the pending
    /// alarm; at most one hardware expiry is outstanding at a time. A
    /// delay of zero still expires.
    ///
    /// Expiry is delivered out of band (interrupt context); the glue code
    /// routes it into the core's alarm slot.
    fn start_alarm(&mut self, delay: u32);
}
