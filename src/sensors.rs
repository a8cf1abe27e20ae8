//! Sensor collaborator seams.
//!
//! The individual sensor register protocols are out of scope for this crate;
//! what lives here is the narrow surface the core calls: a byte-register bus,
//! a per-sensor enable/read/convert contract with a reserved error sentinel,
//! and the bounded retry discipline applied when a sensor is not ready. The
//! auxiliary supply rails that must be forced off at bring-up are ordinary
//! [`OutputPin`]s.

use crate::consts::SENSOR_ERROR;
use crate::watchdog::{StallGuard, WaitPoint};
use embedded_hal::digital::OutputPin;

/// Byte-register transaction bus shared by the sensors and the harvester
/// front end. One device is selected at a time.
pub trait SensorBus {
    /// Select the device subsequent register operations address.
    fn select(&mut self, device: u8);

    /// Read `out.len()` bytes from `reg`. Returns false on a failed
    /// transaction; `out` is unspecified in that case.
    fn read_register(&mut self, reg: u8, out: &mut [u8]) -> bool;

    /// Write `data` to `reg`. Returns false on a failed transaction.
    fn write_register(&mut self, reg: u8, data: &[u8]) -> bool;
}

/// One environmental sensor as seen by the sampling policy.
///
/// `read_raw` returns [`SENSOR_ERROR`] while the measurement is failed or
/// not yet ready; `convert` turns a good raw value into the physical value
/// serialized into the advertising payload.
pub trait Sensor<B: SensorBus> {
    /// Power the sensor measurement up or down.
    fn enable(&mut self, bus: &mut B, on: bool);

    /// Read the raw measurement, or [`SENSOR_ERROR`].
    fn read_raw(&mut self, bus: &mut B) -> u32;

    /// Convert a raw measurement to its physical value.
    fn convert(&self, raw: u32) -> u32;
}

/// Polls a sensor until it stops returning the error sentinel, bounded by
/// `attempts`. Returns the converted physical value, or `None` when the
/// field never resolved — which zero-fills that payload field but does not
/// abort the cycle.
pub fn read_polled<B, S, G>(
    sensor: &mut S,
    bus: &mut B,
    attempts: u8,
    guard: &mut G,
) -> Option<u32>
where
    B: SensorBus,
    S: Sensor<B>,
    G: StallGuard,
{
    sensor.enable(bus, true);
    let mut value = None;
    for _ in 0..attempts {
        let raw = sensor.read_raw(bus);
        if raw != SENSOR_ERROR {
            value = Some(sensor.convert(raw));
            break;
        }
        if guard.note(WaitPoint::SensorRetry).is_err() {
            break;
        }
    }
    sensor.enable(bus, false);
    value
}

/// The three environmental sensors of one board, grouped so the bring-up and
/// sampling code can take them as a unit.
#[derive(Debug)]
pub struct SensorSuite<PS, TS, HS> {
    /// Barometric pressure sensor.
    pub pressure: PS,
    /// Ambient temperature sensor.
    pub temperature: TS,
    /// Relative humidity sensor.
    pub humidity: HS,
}

impl<PS, TS, HS> SensorSuite<PS, TS, HS> {
    /// Groups the three sensors.
    pub fn new(pressure: PS, temperature: TS, humidity: HS) -> Self {
        Self {
            pressure,
            temperature,
            humidity,
        }
    }

    /// Powers every sensor down. Called at bring-up before the serial domain
    /// is switched off; the sensors must already be quiescent at that point.
    pub fn shutdown_all<B: SensorBus>(&mut self, bus: &mut B)
    where
        PS: Sensor<B>,
        TS: Sensor<B>,
        HS: Sensor<B>,
    {
        self.pressure.enable(bus, false);
        self.temperature.enable(bus, false);
        self.humidity.enable(bus, false);
    }
}

/// Auxiliary supply rails and indicator LEDs that must be driven low at
/// bring-up so they cannot leak during standby.
#[derive(Debug)]
pub struct AuxRails<P: OutputPin> {
    /// Inertial unit supply rail.
    pub imu: P,
    /// Microphone supply rail.
    pub mic: P,
    /// Indicator LEDs, all forced off.
    pub leds: [P; 2],
}

impl<P: OutputPin> AuxRails<P> {
    /// Drives every rail and LED low. Pin errors are ignored: there is
    /// nothing to do about a rail that cannot be driven, and bring-up must
    /// proceed.
    pub fn power_down(&mut self) {
        let _ = self.imu.set_low();
        let _ = self.mic.set_low();
        for led in &mut self.leds {
            let _ = led.set_low();
        }
    }
}
