//! Interrupt-context glue.
//!
//! The crate never registers interrupt vectors itself — that is
//! target-specific. Instead this module provides the statics the interrupt
//! bodies need ([`RADIO_FLAGS`], [`EDGE_TIMER`]) and entry functions the
//! board's `#[interrupt]` handlers delegate to, in the usual
//! `critical_section`-guarded global-singleton arrangement.
//!
//! The radio completion entries are trivial flag stores and safe from any
//! context. The edge and RTC entries borrow their hardware handles from a
//! global slot the board fills once at startup.

use crate::edge::{self, SharedEdgeTimer};
use crate::hal::{EdgeHal, PowerHal, RtcHal};
use crate::radio::RadioFlags;
use crate::sleep;
use crate::watchdog::{Stall, StallGuard};
use core::cell::RefCell;
use critical_section::Mutex;

/// Completion flags shared between the radio interrupt routines and the
/// main-loop sequencer.
pub static RADIO_FLAGS: RadioFlags = RadioFlags::new();

/// Edge-event timing shared between the edge interrupt and the main loop.
pub static EDGE_TIMER: SharedEdgeTimer = SharedEdgeTimer::new();

/// Radio command-acknowledge interrupt body: the boot command completed.
pub fn radio_boot_done_entry() {
    RADIO_FLAGS.set_boot_done();
}

/// Radio last-command-done interrupt body: setup completed.
pub fn radio_setup_done_entry() {
    RADIO_FLAGS.set_setup_done();
}

/// Radio last-command-done interrupt body: the advertisement train finished.
pub fn radio_advertising_done_entry() {
    RADIO_FLAGS.set_advertising_done();
}

/// Hardware handles the edge interrupt needs, bundled so they can live in
/// one global slot. On real boards the three handles are distinct
/// zero-sized register proxies.
#[derive(Debug)]
pub struct EdgeIsrContext<P, E, R, G> {
    /// Power controller handle (PERIPH re-power).
    pub power: P,
    /// Edge pad handle (flag read/clear, masking).
    pub edge: E,
    /// Free-running counter handle (event timestamping).
    pub rtc: R,
    /// Stall guard; [`crate::watchdog::NeverTrip`] on hardware.
    pub guard: G,
}

impl<P, E, R, G> EdgeIsrContext<P, E, R, G>
where
    P: PowerHal,
    E: EdgeHal,
    R: RtcHal,
    G: StallGuard,
{
    /// Runs the full edge-interrupt service against [`EDGE_TIMER`].
    pub fn service(&mut self) -> Result<(), Stall> {
        edge::service_edge_interrupt(
            &mut self.power,
            &mut self.edge,
            &self.rtc,
            &EDGE_TIMER,
            &mut self.guard,
        )
    }
}

/// Hardware handles the RTC wake interrupt needs.
#[derive(Debug)]
pub struct RtcIsrContext<R, G> {
    /// Counter handle (event-flag clear).
    pub rtc: R,
    /// Stall guard; [`crate::watchdog::NeverTrip`] on hardware.
    pub guard: G,
}

impl<R, G> RtcIsrContext<R, G>
where
    R: RtcHal,
    G: StallGuard,
{
    /// Clears the RTC wake event, spinning out the asynchronous clear.
    pub fn service(&mut self) -> Result<(), Stall> {
        sleep::clear_rtc_event(&mut self.rtc, &mut self.guard)
    }
}

/// Used to initialize the global static [`EdgeIsrContext`] slot for use with
/// `critical_section`.
pub const fn global_edge_context_init<P, E, R, G>() -> Mutex<RefCell<Option<EdgeIsrContext<P, E, R, G>>>>
{
    Mutex::new(RefCell::new(None))
}

/// Fills the global edge-context slot. Call once from `main` before the
/// edge interrupt is unmasked.
pub fn global_edge_context_setup<P, E, R, G>(
    slot: &'static Mutex<RefCell<Option<EdgeIsrContext<P, E, R, G>>>>,
    context: EdgeIsrContext<P, E, R, G>,
) where
    P: Send,
    E: Send,
    R: Send,
    G: Send,
{
    critical_section::with(|cs| {
        let _ = slot.borrow(cs).replace(Some(context));
    });
}

/// Full edge-interrupt body for the board's `#[interrupt]` handler. A stall
/// cannot surface here (hardware uses [`crate::watchdog::NeverTrip`], which
/// never trips), so the result is discarded.
pub fn global_edge_interrupt<P, E, R, G>(
    slot: &'static Mutex<RefCell<Option<EdgeIsrContext<P, E, R, G>>>>,
) where
    P: PowerHal + Send,
    E: EdgeHal + Send,
    R: RtcHal + Send,
    G: StallGuard + Send,
{
    critical_section::with(|cs| {
        if let Some(context) = slot.borrow(cs).borrow_mut().as_mut() {
            let _ = context.service();
        }
    });
}

/// Used to initialize the global static [`RtcIsrContext`] slot.
pub const fn global_rtc_context_init<R, G>() -> Mutex<RefCell<Option<RtcIsrContext<R, G>>>> {
    Mutex::new(RefCell::new(None))
}

/// Fills the global RTC-context slot. Call once from `main` before the
/// wake compare channel is armed.
pub fn global_rtc_context_setup<R, G>(
    slot: &'static Mutex<RefCell<Option<RtcIsrContext<R, G>>>>,
    context: RtcIsrContext<R, G>,
) where
    R: Send,
    G: Send,
{
    critical_section::with(|cs| {
        let _ = slot.borrow(cs).replace(Some(context));
    });
}

/// Full RTC wake-interrupt body for the board's `#[interrupt]` handler.
pub fn global_rtc_wake_interrupt<R, G>(slot: &'static Mutex<RefCell<Option<RtcIsrContext<R, G>>>>)
where
    R: RtcHal + Send,
    G: StallGuard + Send,
{
    critical_section::with(|cs| {
        if let Some(context) = slot.borrow(cs).borrow_mut().as_mut() {
            let _ = context.service();
        }
    });
}
