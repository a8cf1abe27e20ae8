//! Chip-block traits: the seam between the beacon core and the silicon.
//!
//! The core never touches registers directly. Board support code implements
//! these traits with the real register writes (on the reference chip each
//! method is one or two `HWREG` accesses); hosted tests implement them with a
//! scripted model so every spin wait can be driven deterministically.
//!
//! None of these operations return errors. A domain that never reaches its
//! requested state, or a radio command that never completes, surfaces only as
//! a wait that does not end; see [`crate::watchdog`] for how that is kept
//! testable.
//!
//! Ordering is the caller's responsibility throughout: a domain must be
//! powered before any register inside it is touched, and PERIPH must be ON
//! before the GPIO clock gate is driven. The traits do not check.

use crate::power::PowerDomain;

/// Power, clock, oscillator and sleep control.
pub trait PowerHal {
    /// Request a power state for `domain` by writing its control register.
    /// For clock-gated domains this is the gate bit itself.
    fn domain_request(&mut self, domain: PowerDomain, on: bool);

    /// Read the status register of `domain`.
    fn domain_is_on(&self, domain: PowerDomain) -> bool;

    /// Drive the GPIO clock gate for CPU run mode. PERIPH must already be ON.
    fn gpio_clock_run_mode(&mut self, enable: bool);

    /// Latch pending clock-gate configuration into the hardware.
    fn load_clock_settings(&mut self);

    /// Divide the infrastructure clock used during deep sleep.
    fn divide_inf_clock_deep_sleep(&mut self, div: u32);

    /// Force the AUX subsystem on (overrides any power-down request).
    fn aux_force_on(&mut self, on: bool);

    /// True once AUX is powered and connected to the system bus.
    fn aux_is_ready(&self) -> bool;

    /// Let AUX request its own power-down. Takes effect only after the
    /// force-on override is released.
    fn aux_power_down_request(&mut self);

    /// Enable or disable AUX RAM retention.
    fn aux_ram_retention(&mut self, on: bool);

    /// Set or clear the MCU power-down request. While clear, deep sleep only
    /// reaches light idle and the CPU rail stays up.
    fn mcu_power_down_request(&mut self, on: bool);

    /// Request the CPU domain off for the next deep-sleep entry.
    fn cpu_domain_request(&mut self, on: bool);

    /// Halt the CPU until any enabled wake source fires. This is the only
    /// inter-cycle suspension point in the system.
    fn deep_sleep(&mut self);

    /// Enable the clock for the oscillator control interface.
    fn xtal_interface_enable(&mut self);

    /// Start the HF crystal oscillator (does not switch to it yet).
    fn xosc_turn_on(&mut self);

    /// Attempt to switch the HF clock source to the crystal. Returns false
    /// until the hardware confirms the switch.
    fn xosc_attempt_switch(&mut self) -> bool;

    /// Request or release the crystal as HF clock source.
    fn xtal_request(&mut self, on: bool);

    /// Switch the HF clock source back to the RC oscillator.
    fn osc_switch_to_rc(&mut self);

    /// Compute and apply the recharge timing to use during the coming
    /// power-down period.
    fn set_recharge_before_power_down(&mut self);

    /// Adjust the recharge algorithm from the measured power-down period.
    fn adjust_recharge_after_power_down(&mut self);

    /// Block until all pending writes to the always-on domain have landed.
    /// Issued before sleep entry so AUX has genuinely powered off.
    fn aon_sync(&mut self);

    /// Latch always-on domain state captured during power-down.
    fn aon_update(&mut self);

    /// Power off the debug interface so standby can be entered.
    fn jtag_power_off(&mut self);
}

/// Edge-detect pad: interrupt arming, event flags and wake configuration.
///
/// Flag clearing is asynchronous in hardware: the register may still read
/// set immediately after a clear is written. Callers must re-read and spin.
pub trait EdgeHal {
    /// Mask the edge-detect interrupt at the interrupt controller.
    fn interrupt_disable(&mut self);

    /// Unmask the edge-detect interrupt.
    fn interrupt_enable(&mut self);

    /// Read the pad event flags, masked to the serviced pins.
    fn event_flags(&self) -> u32;

    /// Write-one-to-clear the given event flags.
    fn clear_event_flags(&mut self, flags: u32);

    /// Configure the input pad for edge detection and standby wake.
    /// `rising` selects the active edge; the pull follows the edge polarity.
    fn configure_wake_pin(&mut self, rising: bool);

    /// Route the pad event as MCU wake-up source.
    fn select_wake_source_pad(&mut self);

    /// Short fixed instruction delay. Used on ISR exit so a stale pending
    /// flag cannot re-enter the handler.
    fn short_delay(&mut self);
}

/// Always-on real-time counter used for wake scheduling and event timing.
///
/// Tick values are 16.16 fixed point: the upper half counts whole seconds.
/// Event-flag clearing is asynchronous, as for [`EdgeHal`].
pub trait RtcHal {
    /// Start the counter.
    fn enable(&mut self);

    /// Read the free-running counter.
    fn now(&self) -> u32;

    /// Program the next wake compare `ticks` from now.
    fn set_wake_compare(&mut self, ticks: u32);

    /// True while the wake-channel event flag is set.
    fn event_pending(&self) -> bool;

    /// Write-one-to-clear the wake-channel event flag.
    fn clear_event(&mut self);
}

/// Command surface of the radio co-processor.
///
/// Completion is signalled out-of-band: the radio's own interrupt routines
/// set the flags in [`crate::radio::RadioFlags`], never a return value here.
pub trait RadioHal {
    /// Arm the radio completion interrupts for the coming cycle.
    fn init_interrupts(&mut self);

    /// Issue the boot command to the radio co-processor.
    fn boot(&mut self);

    /// Ask the radio to keep (or stop keeping) the system bus claimed.
    fn bus_request(&mut self, keep_on: bool);

    /// Apply the radio firmware patch. Required once per boot, before the
    /// timebase starts.
    fn apply_patch(&mut self);

    /// Start the radio's internal timebase.
    fn start_timebase(&mut self);

    /// Point the radio at the advertising payload for the next setup.
    fn update_adv_data(&mut self, payload: &[u8]);

    /// Issue the chained setup + advertise command.
    fn setup_and_advertise(&mut self);
}
