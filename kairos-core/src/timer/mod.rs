//! Free-running timer
//!
//! Tick/millisecond conversions, the reference-context sample used by the
//! MAC's timing math, and the single one-shot alarm slot. The counter
//! wraps at 2^32 ticks; all difference arithmetic here is wrapping, and
//! callers are expected to do the same.

pub mod alarm;

pub use alarm::{AlarmEvent, AlarmState};

use kairos_hal::time::TickCounter;

/// Counter ticks per millisecond (1 MHz tick)
pub const TICKS_PER_MS: u32 = 1000;

/// Convert milliseconds to counter ticks
pub const fn ticks_from_millis(ms: u32) -> u32 {
    ms.wrapping_mul(TICKS_PER_MS)
}

/// Convert counter ticks to whole milliseconds
pub const fn millis_from_ticks(ticks: u32) -> u32 {
    ticks / TICKS_PER_MS
}

/// Events produced by the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    /// The armed alarm elapsed
    Elapsed,
}

/// Timer handle
///
/// Owns the hardware counter, the single reference-context sample, and
/// the alarm slot. One caller at a time: the slot and context are shared
/// process state, and callers in different tasks serialize externally.
pub struct Timer<C: TickCounter> {
    counter: C,
    context: u32,
    alarm: AlarmState,
}

impl<C: TickCounter> Timer<C> {
    /// Create a timer over `counter`
    pub fn new(counter: C) -> Self {
        Self {
            counter,
            context: 0,
            alarm: AlarmState::Idle,
        }
    }

    /// Current counter value in ticks
    pub fn now(&self) -> u32 {
        self.counter.now()
    }

    /// Smallest alarm delay the hardware honors (1 ms in ticks)
    pub fn minimum_timeout(&self) -> u32 {
        ticks_from_millis(1)
    }

    /// Capture the current counter value as the reference context
    pub fn set_context(&mut self) -> u32 {
        self.context = self.counter.now();
        self.context
    }

    /// Last captured reference context
    pub fn context(&self) -> u32 {
        self.context
    }

    /// Ticks elapsed since the reference context, wraparound-safe
    pub fn elapsed_since_context(&self) -> u32 {
        self.counter.now().wrapping_sub(self.context)
    }

    /// Schedule the alarm `delay` ticks from now.
    ///
    /// Replaces any pending alarm; at most one is outstanding. A delay of
    /// zero is scheduled like any other and still fires.
    pub fn arm_alarm(&mut self, delay: u32) {
        self.counter.start_alarm(delay);
        self.alarm = self.alarm.transition(AlarmEvent::Arm);
    }

    /// Cancel the pending alarm, if any.
    ///
    /// The slot is idle when this returns. If the hardware expiry has
    /// already entered dispatch on another context, that firing proceeds;
    /// the race window is inherent to the hardware and documented rather
    /// than closed.
    pub fn cancel_alarm(&mut self) {
        self.alarm = self.alarm.transition(AlarmEvent::Cancel);
    }

    /// Current alarm slot state
    pub fn alarm_state(&self) -> AlarmState {
        self.alarm
    }

    /// Hardware expiry entry point; call from the counter interrupt.
    ///
    /// The slot transitions to idle *before* the event is handed back, so
    /// the downstream handler may arm a fresh alarm from within its own
    /// dispatch without tripping over stale state. Expiries that arrive
    /// with the slot idle (cancelled, or superseded by a re-arm) produce
    /// no event.
    pub fn alarm_expired(&mut self) -> Option<TimerEvent> {
        let was_armed = self.alarm.is_armed();
        self.alarm = self.alarm.transition(AlarmEvent::Expire);
        was_armed.then_some(TimerEvent::Elapsed)
    }

    /// Busy-wait for `ms` milliseconds on the free-running counter
    pub fn delay_millis(&self, ms: u32) {
        let start = self.counter.now();
        let ticks = ticks_from_millis(ms);
        while self.counter.now().wrapping_sub(start) < ticks {}
    }

    /// Temperature compensation hook for alarm periods.
    ///
    /// This board has no temperature-compensated oscillator model;
    /// periods pass through unchanged.
    pub fn compensate_drift(&self, period_ms: u32, _temperature: f32) -> u32 {
        period_ms
    }
}
