//! Injectable guard for unconditional hardware waits.
//!
//! Every wait loop in this crate spins until a hardware condition becomes
//! true, with no timeout and no error return; a condition that never becomes
//! true hangs the system until the external reset or watchdog fires. That is
//! the correct contract at the hardware boundary, but it would also hang a
//! hosted test process. Each spin loop therefore reports every iteration to a
//! [`StallGuard`]:
//!
//! - on hardware, [`NeverTrip`] compiles the report away and the hang
//!   semantics are preserved exactly;
//! - in tests, [`SpinBudget`] bounds the loop so a harness can assert that a
//!   given path *would* hang, without hanging.

use thiserror::Error;

/// Identifies which hardware wait a spin loop is stuck on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum WaitPoint {
    /// Waiting for a power domain status register to report ON.
    DomainOn(crate::power::PowerDomain),
    /// Waiting for a power domain status register to report OFF.
    DomainOff(crate::power::PowerDomain),
    /// Waiting for the AUX subsystem to connect to the system bus.
    AuxReady,
    /// Spin-retrying the switch of the HF clock source to the crystal.
    XoscSwitch,
    /// Idle-sleeping until the radio reports its boot command done.
    RadioBootDone,
    /// Idle-sleeping until the radio reports setup done.
    RadioSetupDone,
    /// Idle-sleeping until the radio reports the advertisement train done.
    RadioAdvertisingDone,
    /// Waiting for the pad event-flag register to read clear after a clear.
    EdgeFlagClear,
    /// Waiting for the RTC event flag to read clear after a clear.
    RtcEventClear,
    /// Re-polling a sensor that keeps returning the error sentinel.
    SensorRetry,
}

/// A hardware wait observed by a [`SpinBudget`] ran out of iterations.
///
/// Never constructed when the guard is [`NeverTrip`]; on hardware the wait
/// simply does not return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[error("hardware wait stalled at {point:?}")]
pub struct Stall {
    /// The wait that exhausted its budget.
    pub point: WaitPoint,
}

/// Observer for spin-wait iterations.
///
/// Implementations decide whether a wait may keep spinning. The guard is
/// consulted once per iteration, before the condition is re-polled.
pub trait StallGuard {
    /// Record one spin iteration at `point`.
    ///
    /// Returning `Err` aborts the wait and propagates out of the cycle as a
    /// [`Stall`].
    fn note(&mut self, point: WaitPoint) -> Result<(), Stall>;
}

/// The hardware guard: spins forever, exactly like the bare-metal loops it
/// stands in for.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverTrip;

impl StallGuard for NeverTrip {
    #[inline(always)]
    fn note(&mut self, _point: WaitPoint) -> Result<(), Stall> {
        Ok(())
    }
}

/// A bounded guard for hosted tests: trips after a fixed number of
/// iterations across all wait points.
#[derive(Debug, Clone, Copy)]
pub struct SpinBudget {
    remaining: u32,
}

impl SpinBudget {
    /// Creates a guard that allows `budget` spin iterations in total.
    pub fn new(budget: u32) -> Self {
        Self { remaining: budget }
    }
}

impl StallGuard for SpinBudget {
    fn note(&mut self, point: WaitPoint) -> Result<(), Stall> {
        if self.remaining == 0 {
            return Err(Stall { point });
        }
        self.remaining -= 1;
        Ok(())
    }
}
