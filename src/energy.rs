//! Harvester energy policy.
//!
//! Once per wake cycle the harvester front end's status byte is read over the
//! sensor bus and folded into a tri-level [`EnergyState`]. The state controls
//! two things: how long the system sleeps until the next wake (the RTC
//! compare delta) and which sensors are sampled this cycle (none, one in
//! rotation, or all).

use crate::consts::{
    HARVESTER_DEVICE, HARVESTER_STATUS_REG, HARVESTER_T_HRV_MEAS_REG, HARVESTER_T_HRV_PERIOD,
    HARVESTER_T_HRV_PERIOD_REG, STS_APL_MIN_HI, STS_APL_MIN_LO, STS_LTS_BAT_MIN_HI,
    STS_LTS_BAT_MIN_LO, WAKE_INTERVAL_HIGH_ENERGY, WAKE_INTERVAL_LOW_ENERGY,
    WAKE_INTERVAL_MIDDLE_ENERGY,
};
use crate::sensors::SensorBus;

/// Tri-level classification of the energy available from the harvesting
/// source. Derived fresh every wake cycle; never cached across sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum EnergyState {
    /// Harvest barely covers sleep current: longest wake interval, no sensor
    /// reads, advertisement carries counters only.
    #[default]
    Low,
    /// Moderate harvest: middle wake interval, exactly one sensor sampled per
    /// wake in fixed rotation.
    Middle,
    /// Surplus harvest: shortest wake interval, all sensors sampled every
    /// wake.
    High,
}

/// The three sensors governed by the sampling policy, in ring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum SensorKind {
    /// Barometric pressure.
    Pressure,
    /// Ambient temperature.
    Temperature,
    /// Relative humidity.
    Humidity,
}

/// Decodes the harvester status byte into an energy state.
///
/// Priority order as observed on the reference hardware: the
/// application-supply-min bits dominate and classify `Middle`; otherwise the
/// long-term-storage battery-min bits classify `High`; otherwise `Low`.
///
/// Note the inversion this produces: a critically low battery under a light
/// load still reads `Middle`, not `Low`. Whether that is intentional
/// brownout avoidance or a decode bug is a question for the front end's
/// datasheet; the observed behaviour is preserved as-is and pinned by a test.
pub fn decode_status(status: u8) -> EnergyState {
    if status & (STS_APL_MIN_HI | STS_APL_MIN_LO) != 0 {
        EnergyState::Middle
    } else if status & (STS_LTS_BAT_MIN_HI | STS_LTS_BAT_MIN_LO) != 0 {
        EnergyState::High
    } else {
        EnergyState::Low
    }
}

/// Reads the harvester status byte over the bus and decodes it.
///
/// A failed bus read decodes as all-clear, i.e. [`EnergyState::Low`] — the
/// conservative cadence when the front end cannot be reached.
pub fn read_energy_state<B: SensorBus>(bus: &mut B) -> EnergyState {
    bus.select(HARVESTER_DEVICE);
    let mut status = [0u8; 1];
    if !bus.read_register(HARVESTER_STATUS_REG, &mut status) {
        status[0] = 0;
    }
    let state = decode_status(status[0]);
    #[cfg(feature = "log")]
    log::trace!("harvester status {:#04x} -> {:?}", status[0], state);
    state
}

/// Programs the harvester's harvest-period registers. Done once at power-up.
pub fn configure_harvester<B: SensorBus>(bus: &mut B) -> bool {
    bus.select(HARVESTER_DEVICE);
    bus.write_register(HARVESTER_T_HRV_PERIOD_REG, &[HARVESTER_T_HRV_PERIOD])
        && bus.write_register(HARVESTER_T_HRV_MEAS_REG, &[HARVESTER_T_HRV_PERIOD])
}

/// Per-state wake intervals in RTC ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeIntervals {
    /// Ticks between wakes in the low energy state.
    pub low: u32,
    /// Ticks between wakes in the middle energy state.
    pub middle: u32,
    /// Ticks between wakes in the high energy state.
    pub high: u32,
}

impl Default for WakeIntervals {
    fn default() -> Self {
        Self {
            low: WAKE_INTERVAL_LOW_ENERGY,
            middle: WAKE_INTERVAL_MIDDLE_ENERGY,
            high: WAKE_INTERVAL_HIGH_ENERGY,
        }
    }
}

/// Maps an energy state to its configured wake interval.
pub fn wake_interval_ticks(state: EnergyState, intervals: &WakeIntervals) -> u32 {
    match state {
        EnergyState::Low => intervals.low,
        EnergyState::Middle => intervals.middle,
        EnergyState::High => intervals.high,
    }
}

/// Persistent 3-way rotation over the sensors, used in the middle energy
/// state. The index survives across wake cycles (it lives in retained state)
/// and advances only when a middle-state cycle actually consumes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorRing {
    index: u8,
}

impl SensorRing {
    /// Returns the sensor to sample this cycle and advances the rotation.
    pub fn advance(&mut self) -> SensorKind {
        let kind = match self.index {
            0 => SensorKind::Pressure,
            1 => SensorKind::Temperature,
            _ => SensorKind::Humidity,
        };
        self.index = (self.index + 1) % 3;
        kind
    }
}

/// Which sensors a single wake cycle should sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct SamplePlan {
    /// Sample the pressure sensor this cycle.
    pub pressure: bool,
    /// Sample the temperature sensor this cycle.
    pub temperature: bool,
    /// Sample the humidity sensor this cycle.
    pub humidity: bool,
}

impl SamplePlan {
    /// Builds the plan for `state`, consuming one ring position only in the
    /// middle state.
    pub fn for_state(state: EnergyState, ring: &mut SensorRing) -> Self {
        match state {
            EnergyState::Low => Self::default(),
            EnergyState::Middle => {
                let mut plan = Self::default();
                match ring.advance() {
                    SensorKind::Pressure => plan.pressure = true,
                    SensorKind::Temperature => plan.temperature = true,
                    SensorKind::Humidity => plan.humidity = true,
                }
                plan
            }
            EnergyState::High => Self {
                pressure: true,
                temperature: true,
                humidity: true,
            },
        }
    }

    /// Number of sensors the plan samples.
    pub fn count(&self) -> usize {
        usize::from(self.pressure) + usize::from(self.temperature) + usize::from(self.humidity)
    }
}
