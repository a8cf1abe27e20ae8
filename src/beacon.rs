//! The assembled beacon: configuration, bring-up and the wake cycle.
//!
//! [`Beacon`] ties the power controller, energy policy, payload builder and
//! radio sequencer into the single sequential loop the device runs: wake,
//! classify the harvest, sample accordingly, advertise, sleep. There is no
//! task scheduler anywhere — one control thread plus the interrupt contexts
//! in [`crate::isr`], synchronized only by power-state ordering and the
//! cleared-before-armed flag discipline.
//!
//! Boards that used to exist as separate firmware images (different sensor
//! fits, different transmit cadence) are configuration values here, not
//! duplicated control flow: see [`BeaconConfig`].

use crate::consts::INF_CLOCK_DIV_DEEP_SLEEP;
use crate::edge::SharedEdgeTimer;
use crate::energy::{
    self, EnergyState, SamplePlan, SensorRing, WakeIntervals, read_energy_state,
    wake_interval_ticks,
};
use crate::hal::{EdgeHal, PowerHal, RadioHal, RtcHal};
use crate::payload::{AdvertisingPayload, Readings, SequenceNumber};
use crate::power::{self, PowerDomain};
use crate::radio::{RadioFlags, RadioSequencer};
use crate::sensors::{AuxRails, Sensor, SensorBus, SensorSuite, read_polled};
use crate::sleep::{self, CyclePhase};
use crate::watchdog::{Stall, StallGuard};
use embedded_hal::digital::OutputPin;

/// Build-out of one beacon variant. The defaults reproduce the reference
/// board: all three sensors fitted, every wake transmits, rising-edge reed
/// input.
#[derive(Debug, Clone, Copy)]
pub struct BeaconConfig {
    /// Wake interval per energy state, in RTC ticks.
    pub intervals: WakeIntervals,
    /// Transmit on every Nth wake; intermediate wakes still read the
    /// harvester and reprogram the wake timer. 0 and 1 both mean "every
    /// wake".
    pub transmit_every: u8,
    /// Which sensors are physically fitted. The energy policy's plan is
    /// intersected with this, so an absent sensor is never powered.
    pub fitted: SamplePlan,
    /// Bound on sentinel-retry polls per sensor read.
    pub read_attempts: u8,
    /// Active edge of the event input.
    pub edge_rising: bool,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            intervals: WakeIntervals::default(),
            transmit_every: 1,
            fitted: SamplePlan {
                pressure: true,
                temperature: true,
                humidity: true,
            },
            read_attempts: 5,
            edge_rising: true,
        }
    }
}

/// What one wake cycle did, for callers that track behaviour (and for
/// tests; the device itself has no other observable surface than the air).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct CycleReport {
    /// Energy state decoded this wake.
    pub energy: EnergyState,
    /// Whether an advertisement train was transmitted.
    pub transmitted: bool,
    /// Sequence number carried by the advertisement, when transmitted.
    pub sequence: Option<u16>,
    /// Sensors actually sampled this cycle.
    pub sampled: SamplePlan,
}

/// The beacon core. Generic over the chip handle `H` (all four chip-block
/// traits), the sensor bus `B` and the stall guard `G` ([`crate::watchdog::NeverTrip`]
/// on hardware).
#[derive(Debug)]
pub struct Beacon<'a, H, B, G> {
    hal: H,
    bus: B,
    guard: G,
    config: BeaconConfig,
    flags: &'a RadioFlags,
    edge_timer: &'a SharedEdgeTimer,
    sequencer: RadioSequencer,
    payload: AdvertisingPayload,
    sequence: SequenceNumber,
    ring: SensorRing,
    phase: CyclePhase,
    cycles: u32,
}

impl<'a, H, B, G> Beacon<'a, H, B, G>
where
    H: PowerHal + EdgeHal + RtcHal + RadioHal,
    B: SensorBus,
    G: StallGuard,
{
    /// Assembles a beacon around its chip handle, bus and guard. The flags
    /// and edge timer normally live in [`crate::isr`] statics so the
    /// interrupt entries can reach them.
    pub fn new(
        hal: H,
        bus: B,
        guard: G,
        config: BeaconConfig,
        flags: &'a RadioFlags,
        edge_timer: &'a SharedEdgeTimer,
    ) -> Self {
        Self {
            hal,
            bus,
            guard,
            config,
            flags,
            edge_timer,
            sequencer: RadioSequencer,
            payload: AdvertisingPayload::new(),
            sequence: SequenceNumber::default(),
            ring: SensorRing::default(),
            phase: CyclePhase::default(),
            cycles: 0,
        }
    }

    /// Current phase of the cycle state machine.
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// The value the next transmitted advertisement will carry.
    pub fn next_sequence(&self) -> u16 {
        self.sequence.current()
    }

    /// The last frame built, as bytes.
    pub fn payload_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    /// One-time bring-up after reset. Leaves every domain in the state the
    /// first wake cycle expects: AUX forced on, RF core requested, sensors
    /// and their rails dark, serial domain off, edge input armed as
    /// interrupt and wake source, flash out of idle, cache retention on.
    pub fn power_up<PS, TS, HS, P>(
        &mut self,
        sensors: &mut SensorSuite<PS, TS, HS>,
        rails: &mut AuxRails<P>,
    ) -> Result<(), Stall>
    where
        PS: Sensor<B>,
        TS: Sensor<B>,
        HS: Sensor<B>,
        P: OutputPin,
    {
        // Debug port off, or standby can never be reached.
        self.hal.jtag_power_off();

        self.hal.aux_force_on(true);
        power::enable(&mut self.hal, PowerDomain::RfCore);
        self.hal.xtal_interface_enable();
        self.hal
            .divide_inf_clock_deep_sleep(INF_CLOCK_DIV_DEEP_SLEEP);
        RtcHal::enable(&mut self.hal);

        power::periph_up(&mut self.hal, &mut self.guard)?;

        // Quiesce everything that could draw during standby, then drop the
        // serial domain the sensor configuration had powered.
        sensors.shutdown_all(&mut self.bus);
        rails.power_down();
        let _ = energy::configure_harvester(&mut self.bus);
        power::disable(&mut self.hal, PowerDomain::Serial);
        power::wait_off(&self.hal, PowerDomain::Serial, &mut self.guard)?;

        self.hal.configure_wake_pin(self.config.edge_rising);
        self.hal.select_wake_source_pad();
        self.hal.interrupt_enable();

        power::periph_down(&mut self.hal);

        power::disable(&mut self.hal, PowerDomain::FlashInIdle);
        // Retention must be on in idle while the flash domain is off, or
        // the cache contents are corrupted.
        power::enable(&mut self.hal, PowerDomain::CacheRetention);
        self.hal.aux_power_down_request();
        self.hal.aux_ram_retention(false);

        self.phase = CyclePhase::ActiveSampling;
        Ok(())
    }

    /// Runs one full wake cycle and returns what it did. Blocks (in idle or
    /// standby) at every point the hardware blocks; the only error is an
    /// injected guard tripping.
    pub fn run_cycle<PS, TS, HS>(
        &mut self,
        sensors: &mut SensorSuite<PS, TS, HS>,
    ) -> Result<CycleReport, Stall>
    where
        PS: Sensor<B>,
        TS: Sensor<B>,
        HS: Sensor<B>,
    {
        self.phase = CyclePhase::ActiveSampling;

        // Classify the harvest and reschedule the next wake first, so even
        // a cycle that stalls later has pushed the compare value forward.
        self.bus_window_open()?;
        let energy = read_energy_state(&mut self.bus);
        self.bus_window_close();
        self.hal
            .set_wake_compare(wake_interval_ticks(energy, &self.config.intervals));

        self.cycles = self.cycles.wrapping_add(1);
        let every = u32::from(self.config.transmit_every.max(1));
        let transmit = self.cycles % every == 0;

        let mut report = CycleReport {
            energy,
            transmitted: false,
            sequence: None,
            sampled: SamplePlan::default(),
        };

        if transmit {
            self.sequencer
                .boot(&mut self.hal, self.flags, &mut self.guard)?;

            let mut plan = SamplePlan::for_state(energy, &mut self.ring);
            plan.pressure &= self.config.fitted.pressure;
            plan.temperature &= self.config.fitted.temperature;
            plan.humidity &= self.config.fitted.humidity;

            let mut readings = Readings::default();
            if plan.count() > 0 {
                self.bus_window_open()?;
                if plan.pressure {
                    readings.pressure = read_polled(
                        &mut sensors.pressure,
                        &mut self.bus,
                        self.config.read_attempts,
                        &mut self.guard,
                    );
                }
                if plan.temperature {
                    readings.temperature = read_polled(
                        &mut sensors.temperature,
                        &mut self.bus,
                        self.config.read_attempts,
                        &mut self.guard,
                    );
                }
                if plan.humidity {
                    readings.humidity = read_polled(
                        &mut sensors.humidity,
                        &mut self.bus,
                        self.config.read_attempts,
                        &mut self.guard,
                    );
                }
                self.bus_window_close();
            }

            let events = self.edge_timer.snapshot();
            let sequence = self.sequence.advance();
            self.payload.rebuild(sequence, events.delta, &readings);

            self.phase = CyclePhase::Transmitting;
            #[cfg(feature = "log")]
            log::trace!("advertising seq={sequence} energy={energy:?}");
            self.sequencer.transmit(
                &mut self.hal,
                self.flags,
                self.payload.as_bytes(),
                &mut self.guard,
            )?;

            report.transmitted = true;
            report.sequence = Some(sequence);
            report.sampled = plan;
        }

        self.phase = CyclePhase::StandbyPrep;
        sleep::standby_prep(&mut self.hal);

        self.phase = CyclePhase::DeepSleep;
        sleep::enter_standby(&mut self.hal);

        self.phase = CyclePhase::WakeRestore;
        sleep::wake_restore(&mut self.hal);

        Ok(report)
    }

    /// Powers the bus path up for register traffic: PERIPH first, then the
    /// serial domain.
    fn bus_window_open(&mut self) -> Result<(), Stall> {
        power::periph_up(&mut self.hal, &mut self.guard)?;
        power::enable(&mut self.hal, PowerDomain::Serial);
        power::wait_on(&self.hal, PowerDomain::Serial, &mut self.guard)
    }

    /// Inverse of [`bus_window_open`](Self::bus_window_open): serial domain
    /// off before PERIPH comes down.
    fn bus_window_close(&mut self) {
        power::disable(&mut self.hal, PowerDomain::Serial);
        power::periph_down(&mut self.hal);
    }
}
