//! Advertising payload builder.
//!
//! One fixed 24-byte frame, rebuilt from scratch every transmit cycle so a
//! field populated on a previous cycle can never leak into the next. Layout
//! and offsets live in [`crate::consts`]; multi-byte fields are big-endian.

use crate::consts::{
    ADV_TAG, ADVLEN, OFF_CHECKSUM, OFF_DELTA, OFF_HUMIDITY, OFF_PRESSURE, OFF_SEQUENCE,
    OFF_TEMPERATURE,
};

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// 16-bit advertisement sequence counter. Wraps modulo 65536; a receiver
/// uses it to detect loss and duplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct SequenceNumber(u16);

impl SequenceNumber {
    /// Starts the counter at `value`.
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// The value the next advertisement will carry.
    pub fn current(&self) -> u16 {
        self.0
    }

    /// Returns the value to serialize and steps the counter by exactly one.
    /// Called once per transmitted advertisement, never on skipped cycles.
    pub fn advance(&mut self) -> u16 {
        let value = self.0;
        self.0 = self.0.wrapping_add(1);
        value
    }
}

/// Physical sensor values gathered this cycle. A field the sampling policy
/// did not populate stays `None` and serializes as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Readings {
    /// Pressure in pascal; serialized as 24-bit big-endian.
    pub pressure: Option<u32>,
    /// Temperature in milli-degrees; serialized as 16-bit big-endian.
    pub temperature: Option<u32>,
    /// Relative humidity in tenths of a percent; 16-bit big-endian.
    pub humidity: Option<u32>,
}

/// The advertising frame. The buffer is allocated once and reused in place;
/// [`rebuild`](AdvertisingPayload::rebuild) clears and refills all 24 bytes.
#[derive(Debug, Default)]
pub struct AdvertisingPayload {
    #[cfg(not(feature = "std"))]
    buf: Vec<u8, ADVLEN>,
    #[cfg(feature = "std")]
    buf: Vec<u8>,
}

impl AdvertisingPayload {
    /// An empty payload. Not valid on air until the first
    /// [`rebuild`](AdvertisingPayload::rebuild).
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes one frame: length byte, fixed tag, sequence number,
    /// inter-event delta, and whichever sensor fields are populated.
    /// Reserved bytes and the checksum field are written as zero.
    pub fn rebuild(&mut self, sequence: u16, delta: u32, readings: &Readings) {
        self.buf.clear();
        let mut frame = [0u8; ADVLEN];

        frame[0] = (ADVLEN - 1) as u8;
        frame[1..4].copy_from_slice(&ADV_TAG);

        frame[OFF_SEQUENCE..OFF_SEQUENCE + 2].copy_from_slice(&sequence.to_be_bytes());
        frame[OFF_DELTA..OFF_DELTA + 4].copy_from_slice(&delta.to_be_bytes());

        let pressure = readings.pressure.unwrap_or(0);
        frame[OFF_PRESSURE] = (pressure >> 16) as u8;
        frame[OFF_PRESSURE + 1] = (pressure >> 8) as u8;
        frame[OFF_PRESSURE + 2] = pressure as u8;

        let temperature = readings.temperature.unwrap_or(0) as u16;
        frame[OFF_TEMPERATURE..OFF_TEMPERATURE + 2].copy_from_slice(&temperature.to_be_bytes());

        let humidity = readings.humidity.unwrap_or(0) as u16;
        frame[OFF_HUMIDITY..OFF_HUMIDITY + 2].copy_from_slice(&humidity.to_be_bytes());

        // Checksum bytes stay zero: no integrity check is implemented.
        frame[OFF_CHECKSUM] = 0;
        frame[OFF_CHECKSUM + 1] = 0;

        let _ = self.buf.extend_from_slice(&frame);
    }

    /// The frame as bytes, exactly [`ADVLEN`] long after a rebuild.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}
