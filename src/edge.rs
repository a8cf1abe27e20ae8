//! Edge-interrupt handler: event counting and inter-event timing.
//!
//! The reed switch (or button) pad is armed both as an interrupt source and
//! as a standby wake source, so the handler can run with the PERIPH domain
//! powered off. Its body is therefore a fixed ritual:
//!
//! 1. re-power PERIPH and spin until the domain reports ON — touching a GPIO
//!    register in an unpowered domain corrupts system state;
//! 2. capture the free-running RTC and update the event timer;
//! 3. with the interrupt masked, read and clear the pad event flags, then
//!    **re-read and spin until the register actually reads clear**. The clear
//!    is not synchronous with the write; skipping the re-read produces a
//!    spurious re-entry that observes a flag value of zero;
//! 4. power PERIPH back down (clock gate first) and burn a few instructions
//!    so a stale pending bit cannot re-enter the handler immediately.

use crate::consts::EDGE_PIN_MASK;
use crate::hal::{EdgeHal, PowerHal, RtcHal};
use crate::power;
use crate::watchdog::{Stall, StallGuard, WaitPoint};
use core::cell::RefCell;
use critical_section::Mutex;

/// Timing state of the edge input, owned by the interrupt handler.
///
/// Single-writer discipline: only the interrupt context mutates this; the
/// main loop takes one snapshot per transmit cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct EdgeEventTimer {
    /// RTC capture of the event before last.
    pub previous: u32,
    /// RTC capture of the last event.
    pub last: u32,
    /// `last - previous` as an unsigned, wraparound-safe tick difference.
    pub delta: u32,
    /// Number of events observed since power-up.
    pub count: u32,
}

impl EdgeEventTimer {
    /// Records one event at counter value `now`, ping-ponging the two
    /// capture slots. Two events in the same tick yield a delta of 0.
    pub fn capture(&mut self, now: u32) {
        self.previous = self.last;
        self.last = now;
        self.delta = self.last.wrapping_sub(self.previous);
        self.count = self.count.wrapping_add(1);
    }
}

/// [`EdgeEventTimer`] shared between the interrupt context (writer) and the
/// main loop (reader).
pub struct SharedEdgeTimer {
    inner: Mutex<RefCell<EdgeEventTimer>>,
}

impl core::fmt::Debug for SharedEdgeTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Not read under the critical section; a Debug format must never
        // contend with the interrupt context.
        f.write_str("SharedEdgeTimer { .. }")
    }
}

impl SharedEdgeTimer {
    /// A zeroed timer, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(EdgeEventTimer {
                previous: 0,
                last: 0,
                delta: 0,
                count: 0,
            })),
        }
    }

    /// Records one event at counter value `now`. Interrupt context only.
    pub fn record(&self, now: u32) {
        critical_section::with(|cs| {
            self.inner.borrow(cs).borrow_mut().capture(now);
        });
    }

    /// Copies the current timing state out. Called by the main loop once per
    /// transmit cycle, while this is the only running context that reads it.
    pub fn snapshot(&self) -> EdgeEventTimer {
        critical_section::with(|cs| *self.inner.borrow(cs).borrow())
    }
}

impl Default for SharedEdgeTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Full body of the edge-detect interrupt handler. See the module docs for
/// the sequence; the flag-clear spin is the part that must never be removed.
pub fn service_edge_interrupt<P, E, R, G>(
    power_hal: &mut P,
    edge: &mut E,
    rtc: &R,
    timer: &SharedEdgeTimer,
    guard: &mut G,
) -> Result<(), Stall>
where
    P: PowerHal,
    E: EdgeHal,
    R: RtcHal,
    G: StallGuard,
{
    // PERIPH is off during standby; GPIO registers are dead until it is back.
    power::periph_up(power_hal, guard)?;

    timer.record(rtc.now());

    // No new flag can arrive while the interrupt is masked, so the spin
    // below terminates as soon as the hardware catches up with the clear.
    edge.interrupt_disable();
    let flags = edge.event_flags() & EDGE_PIN_MASK;
    if flags != 0 {
        edge.clear_event_flags(flags);
        while edge.event_flags() & EDGE_PIN_MASK != 0 {
            guard.note(WaitPoint::EdgeFlagClear)?;
        }
    }
    edge.interrupt_enable();

    power::periph_down(power_hal);

    // The pending bit in the NVIC lags the flag register; a handful of
    // instructions here prevents one spurious re-entry.
    edge.short_delay();
    Ok(())
}
