//! Sleep/wake scheduling: idle waits, the standby sequence, and the RTC.
//!
//! "Sleep" here always means the CPU clock request is dropped and a
//! deep-sleep instruction is issued; the CPU halts until an enabled wake
//! source fires. Whether that reaches full power-down or only light idle is
//! decided by the MCU power-down request bit, which [`standby_prep`] sets
//! and [`wake_restore`] clears again.
//!
//! The entry and exit sequences walk the power domains in a fixed order.
//! The order is a hardware dependency chain, not a style choice — e.g. the
//! AON sync barrier before sleep entry is what guarantees AUX has actually
//! powered off, and cache retention must be restored before the cache.

use crate::hal::{PowerHal, RtcHal};
use crate::power::{self, PowerDomain};
use crate::watchdog::{Stall, StallGuard, WaitPoint};

/// Phase of the wake/transmit/sleep cycle. Advanced only by the main loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum CyclePhase {
    /// Awake; reading the harvester and sampling sensors.
    #[default]
    ActiveSampling,
    /// Payload latched; driving the radio handshake.
    Transmitting,
    /// Walking the power domains down towards standby.
    StandbyPrep,
    /// CPU halted in standby; only a wake source ends this phase.
    DeepSleep,
    /// Re-powering domains after wake.
    WakeRestore,
}

/// Idles the CPU until `done` returns true. Each iteration requests the CPU
/// domain off and issues a deep sleep; the wake interrupt that sets the
/// condition also resumes execution here.
///
/// With the MCU power-down request clear this only ever reaches light idle,
/// so RAM, flash access and the running oscillators are all preserved.
pub fn idle_until<P, G, F>(
    hal: &mut P,
    guard: &mut G,
    point: WaitPoint,
    mut done: F,
) -> Result<(), Stall>
where
    P: PowerHal,
    G: StallGuard,
    F: FnMut() -> bool,
{
    while !done() {
        guard.note(point)?;
        hal.cpu_domain_request(false);
        hal.deep_sleep();
    }
    Ok(())
}

/// Walks the system down to the standby threshold after a transmission:
/// crystal released, radio domain off, HF clock back on the RC oscillator,
/// AUX allowed to power down, MCU power-down requested, cache and cache
/// retention dropped, the recharge period for the coming power-down
/// computed, and finally the AON sync barrier so AUX is genuinely off
/// before the sleep instruction.
pub fn standby_prep<P: PowerHal>(hal: &mut P) {
    hal.xtal_request(false);
    power::disable(hal, PowerDomain::RfCore);
    hal.osc_switch_to_rc();
    hal.aux_force_on(false);
    hal.mcu_power_down_request(true);
    power::disable(hal, PowerDomain::Cache);
    power::disable(hal, PowerDomain::CacheRetention);
    hal.set_recharge_before_power_down();
    hal.aon_sync();
}

/// Enters standby and handles the bookkeeping on the way out: AON state is
/// latched, the recharge algorithm is adjusted from the measured power-down
/// period, and a final sync closes the window.
pub fn enter_standby<P: PowerHal>(hal: &mut P) {
    hal.cpu_domain_request(false);
    hal.deep_sleep();

    // Execution resumes here on the RTC or pad wake event.
    hal.aon_update();
    hal.adjust_recharge_after_power_down();
    hal.aon_sync();
}

/// Restores the domains a wake cycle needs: RF core requested back on, AUX
/// forced on for the oscillator interface, cache retention then cache, and
/// the MCU power-down request cleared so in-cycle waits stay in light idle.
pub fn wake_restore<P: PowerHal>(hal: &mut P) {
    power::enable(hal, PowerDomain::RfCore);
    hal.aux_force_on(true);
    power::enable(hal, PowerDomain::CacheRetention);
    power::enable(hal, PowerDomain::Cache);
    hal.mcu_power_down_request(false);
}

/// Clears the RTC wake event, spinning until the flag actually reads clear.
/// Same asynchronous-clear hardware as the pad event flags.
pub fn clear_rtc_event<R: RtcHal, G: StallGuard>(rtc: &mut R, guard: &mut G) -> Result<(), Stall> {
    rtc.clear_event();
    while rtc.event_pending() {
        guard.note(WaitPoint::RtcEventClear)?;
        rtc.clear_event();
    }
    Ok(())
}

/// Converts a wake interval in milliseconds to RTC compare ticks (16.16
/// fixed point, upper half whole seconds), rounding to the nearest tick.
pub fn wake_ticks_from_millis(millis: f32) -> u32 {
    libm::round((millis as f64 / 1000.0) * 65536.0) as u32
}

/// Compile-time twin of [`wake_ticks_from_millis`], truncating instead of
/// rounding.
pub const fn const_wake_ticks_from_millis(millis: u32) -> u32 {
    ((millis as u64 * 65536) / 1000) as u32
}
