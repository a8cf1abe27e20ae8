//! Power-domain controller.
//!
//! Thin, ordered primitives over [`PowerHal`]: request a domain state, and
//! block until the status register agrees. There is deliberately no timeout
//! and no error path — a domain that never reaches its requested state is an
//! unrecoverable hardware fault and the spin loop simply never exits (see
//! [`crate::watchdog`] for the test-only escape hatch).
//!
//! The one rule that prevents corruption in this system is ordering, not
//! locking: a domain is powered before anything inside it is touched, and
//! teardown runs in the exact inverse order of bring-up. [`periph_up`] and
//! [`periph_down`] encode the one ordering pair that recurs everywhere
//! (PERIPH domain + GPIO clock gate).

use crate::hal::PowerHal;
use crate::watchdog::{Stall, StallGuard, WaitPoint};
use core::convert::Infallible;

/// An independently power-gateable region of the chip.
///
/// `FlashInIdle`, `Cache` and `CacheRetention` are controlled through the
/// same request/status scheme as the true domains and are modelled alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PowerDomain {
    /// Peripheral bus domain; must be ON for any GPIO or sensor-bus access.
    Periph,
    /// Serial (I2C/SPI) domain; kept OFF while sensors are powered down to
    /// minimise leakage.
    Serial,
    /// RF core domain hosting the radio co-processor.
    RfCore,
    /// AUX subsystem (oscillator interface, comparators).
    Aux,
    /// Flash availability while the CPU is off in idle.
    FlashInIdle,
    /// Instruction cache.
    Cache,
    /// Cache SRAM retention. Must be on in idle whenever the flash domain is
    /// off, or the cache contents are lost.
    CacheRetention,
}

impl PowerDomain {
    /// Number of domains, for fixed-size status tables.
    pub const COUNT: usize = 7;

    /// Stable index of this domain for table-driven hardware models.
    pub fn index(self) -> usize {
        match self {
            PowerDomain::Periph => 0,
            PowerDomain::Serial => 1,
            PowerDomain::RfCore => 2,
            PowerDomain::Aux => 3,
            PowerDomain::FlashInIdle => 4,
            PowerDomain::Cache => 5,
            PowerDomain::CacheRetention => 6,
        }
    }
}

/// Requests `domain` on. Returns immediately; pair with [`wait_on`] when the
/// caller is about to touch registers inside the domain.
pub fn enable<P: PowerHal>(hal: &mut P, domain: PowerDomain) {
    hal.domain_request(domain, true);
}

/// Requests `domain` off. The caller must have completed the peripheral's own
/// shutdown sequence first.
pub fn disable<P: PowerHal>(hal: &mut P, domain: PowerDomain) {
    hal.domain_request(domain, false);
}

/// Non-blocking poll of a domain status register.
pub fn poll_on<P: PowerHal>(hal: &P, domain: PowerDomain) -> nb::Result<(), Infallible> {
    if hal.domain_is_on(domain) {
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

/// Busy-spins until `domain` reports ON.
pub fn wait_on<P: PowerHal, G: StallGuard>(
    hal: &P,
    domain: PowerDomain,
    guard: &mut G,
) -> Result<(), Stall> {
    while !hal.domain_is_on(domain) {
        guard.note(WaitPoint::DomainOn(domain))?;
    }
    Ok(())
}

/// Busy-spins until `domain` reports OFF.
pub fn wait_off<P: PowerHal, G: StallGuard>(
    hal: &P,
    domain: PowerDomain,
    guard: &mut G,
) -> Result<(), Stall> {
    while hal.domain_is_on(domain) {
        guard.note(WaitPoint::DomainOff(domain))?;
    }
    Ok(())
}

/// Busy-spins until AUX is powered and connected to the system bus.
pub fn wait_aux_ready<P: PowerHal, G: StallGuard>(hal: &P, guard: &mut G) -> Result<(), Stall> {
    while !hal.aux_is_ready() {
        guard.note(WaitPoint::AuxReady)?;
    }
    Ok(())
}

/// Brings the PERIPH domain up for GPIO access: domain request, GPIO clock
/// gate, clock-setting load, then spin until the domain reports ON.
pub fn periph_up<P: PowerHal, G: StallGuard>(hal: &mut P, guard: &mut G) -> Result<(), Stall> {
    hal.domain_request(PowerDomain::Periph, true);
    hal.gpio_clock_run_mode(true);
    hal.load_clock_settings();
    wait_on(hal, PowerDomain::Periph, guard)
}

/// Tears PERIPH back down in the inverse order of [`periph_up`]: the GPIO
/// clock gate goes first, then the clock load, then the domain request.
pub fn periph_down<P: PowerHal>(hal: &mut P) {
    hal.gpio_clock_run_mode(false);
    hal.load_clock_settings();
    hal.domain_request(PowerDomain::Periph, false);
}
