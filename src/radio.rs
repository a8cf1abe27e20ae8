//! Radio transaction flags and the boot→setup→advertise sequencer.
//!
//! The radio co-processor is driven by commands and answers with interrupts;
//! its completion routines set three flags that the main thread sleeps on.
//! The flags are the only genuinely racy state in the system, so they are
//! atomics. Everything else relies on quiescence: the sequencer clears all
//! three flags before arming the radio, which makes the interrupt context
//! the single writer for the rest of the cycle.
//!
//! No timeout, no retry: a completion that never arrives leaves the system
//! idling forever, with the external watchdog as the only backstop.

use crate::hal::{PowerHal, RadioHal};
use crate::power::{self, PowerDomain};
use crate::sleep;
use crate::watchdog::{Stall, StallGuard, WaitPoint};
use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

/// Completion handshake with the radio co-processor. Set from the radio's
/// interrupt context, cleared by the sequencer at the start of every cycle.
#[derive(Debug, Default)]
pub struct RadioFlags {
    boot_done: AtomicBool,
    setup_done: AtomicBool,
    advertising_done: AtomicBool,
}

impl RadioFlags {
    /// All flags clear. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            boot_done: AtomicBool::new(false),
            setup_done: AtomicBool::new(false),
            advertising_done: AtomicBool::new(false),
        }
    }

    /// Clears all three flags. Main thread, before re-arming the radio.
    pub fn clear_all(&self) {
        self.boot_done.store(false, Ordering::SeqCst);
        self.setup_done.store(false, Ordering::SeqCst);
        self.advertising_done.store(false, Ordering::SeqCst);
    }

    /// Marks the boot command done. Radio interrupt context.
    pub fn set_boot_done(&self) {
        self.boot_done.store(true, Ordering::SeqCst);
    }

    /// Marks radio setup done. Radio interrupt context.
    pub fn set_setup_done(&self) {
        self.setup_done.store(true, Ordering::SeqCst);
    }

    /// Marks the advertisement train done. Radio interrupt context.
    pub fn set_advertising_done(&self) {
        self.advertising_done.store(true, Ordering::SeqCst);
    }

    /// True once the boot command completed.
    pub fn boot_done(&self) -> bool {
        self.boot_done.load(Ordering::SeqCst)
    }

    /// True once radio setup completed.
    pub fn setup_done(&self) -> bool {
        self.setup_done.load(Ordering::SeqCst)
    }

    /// True once the advertisement train completed.
    pub fn advertising_done(&self) -> bool {
        self.advertising_done.load(Ordering::SeqCst)
    }

    /// Non-blocking poll of the advertising-done flag.
    pub fn poll_advertising_done(&self) -> nb::Result<(), Infallible> {
        if self.advertising_done() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

/// Drives one radio transaction per transmit cycle.
///
/// The sequence is split in two so the caller can sample sensors between
/// radio boot and the actual transmission, while the crystal is already
/// running: [`boot`](RadioSequencer::boot) covers phases 1–3 of the
/// handshake, [`transmit`](RadioSequencer::transmit) phase 4.
#[derive(Debug, Default)]
pub struct RadioSequencer;

impl RadioSequencer {
    /// Phases 1–3: clear the done-flags, wait for the RF core domain, arm
    /// the radio interrupts, boot, idle-sleep until `boot_done`, claim the
    /// system bus, patch, start the timebase and switch the system clock to
    /// the crystal (spin-retry until the hardware confirms).
    pub fn boot<H, G>(
        &mut self,
        hal: &mut H,
        flags: &RadioFlags,
        guard: &mut G,
    ) -> Result<(), Stall>
    where
        H: PowerHal + RadioHal,
        G: StallGuard,
    {
        flags.clear_all();

        // The radio must not be touched before its power domain reports on.
        power::wait_on(hal, PowerDomain::RfCore, guard)?;
        hal.init_interrupts();
        hal.boot();

        // AUX must be up before the oscillator interface is used.
        power::wait_aux_ready(hal, guard)?;
        hal.xosc_turn_on();

        sleep::idle_until(hal, guard, WaitPoint::RadioBootDone, || flags.boot_done())?;

        // Keep the system bus claimed for the command stream that follows.
        hal.bus_request(true);
        hal.apply_patch();
        hal.start_timebase();

        // Radio setup reads trim values from flash while the CPU idles.
        power::enable(hal, PowerDomain::FlashInIdle);

        while !hal.xosc_attempt_switch() {
            guard.note(WaitPoint::XoscSwitch)?;
        }
        Ok(())
    }

    /// Phase 4: bind the payload, issue setup + advertise, idle-sleep until
    /// `setup_done`, drop flash from idle again, idle-sleep until the
    /// advertisement train is done, release the bus claim.
    pub fn transmit<H, G>(
        &mut self,
        hal: &mut H,
        flags: &RadioFlags,
        payload: &[u8],
        guard: &mut G,
    ) -> Result<(), Stall>
    where
        H: PowerHal + RadioHal,
        G: StallGuard,
    {
        hal.update_adv_data(payload);
        hal.setup_and_advertise();

        sleep::idle_until(hal, guard, WaitPoint::RadioSetupDone, || flags.setup_done())?;

        // Trim reads are over once setup is done.
        power::disable(hal, PowerDomain::FlashInIdle);

        sleep::idle_until(hal, guard, WaitPoint::RadioAdvertisingDone, || {
            flags.advertising_done()
        })?;

        hal.bus_request(false);
        Ok(())
    }
}
