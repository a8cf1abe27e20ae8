//! Constants shared across the beacon core.
//!
//! This module pins down the externally observable artifacts of the system:
//! the fixed advertising payload layout, the harvester status-register bit
//! assignments, and the default wake cadence per energy state.
//!
//! ## Key Concepts
//!
//! - **Payload layout**: a single 24-byte advertising frame; byte offsets are
//!   part of the over-the-air contract and must never drift.
//! - **Harvester status bits**: threshold comparator outputs of the harvester
//!   power-management front end, read as one byte over the sensor bus.
//! - **Wake intervals**: RTC compare deltas in 16.16 fixed point (upper 16
//!   bits whole seconds), strictly ordered `HIGH < MIDDLE < LOW` in duration.
//! - **Sensor sentinel**: reserved raw value signalling a failed sensor read.

/// Total length of the advertising payload in bytes.
pub const ADVLEN: usize = 24;

/// Fixed type/manufacturer tag occupying payload bytes 1..=3.
pub const ADV_TAG: [u8; 3] = [0x03, 0xDE, 0xBA];

/// Payload offset of the length byte (always [`ADVLEN`]` - 1`).
pub const OFF_LEN: usize = 0;
/// Payload offset of the first tag byte.
pub const OFF_TAG: usize = 1;
/// Payload offset of the big-endian 16-bit sequence number.
pub const OFF_SEQUENCE: usize = 4;
/// Payload offset of the big-endian 32-bit inter-event delta.
pub const OFF_DELTA: usize = 6;
/// Payload offset of the big-endian 24-bit pressure field (one reserved byte
/// precedes it at offset 10).
pub const OFF_PRESSURE: usize = 11;
/// Payload offset of the big-endian 16-bit temperature field (two reserved
/// bytes precede it).
pub const OFF_TEMPERATURE: usize = 16;
/// Payload offset of the big-endian 16-bit humidity field (two reserved
/// bytes precede it).
pub const OFF_HUMIDITY: usize = 20;
/// Payload offset of the 16-bit checksum field. No integrity check is
/// implemented; both bytes are always zero.
pub const OFF_CHECKSUM: usize = 22;

/// Reserved raw value returned by a sensor when a read failed or the
/// conversion was not ready.
pub const SENSOR_ERROR: u32 = 0x8000_0000;

/// Bus address of the harvester power-management front end.
pub const HARVESTER_DEVICE: u8 = 0x01;
/// Harvester register holding the eight threshold status bits.
pub const HARVESTER_STATUS_REG: u8 = 0x22;
/// Harvester register selecting the harvest period.
pub const HARVESTER_T_HRV_PERIOD_REG: u8 = 0x00;
/// Harvester register selecting the harvest measurement window.
pub const HARVESTER_T_HRV_MEAS_REG: u8 = 0x01;
/// Harvest period value programmed at power-up.
pub const HARVESTER_T_HRV_PERIOD: u8 = 0x44;

/// Status bit: long-term storage above battery-min threshold (high side).
pub const STS_LTS_BAT_MIN_HI: u8 = 0x80;
/// Status bit: long-term storage above battery-min threshold (low side).
pub const STS_LTS_BAT_MIN_LO: u8 = 0x40;
/// Status bit: short-term storage above battery-max threshold (high side).
pub const STS_BAT_MAX_HI: u8 = 0x20;
/// Status bit: short-term storage above battery-max threshold (low side).
pub const STS_BAT_MAX_LO: u8 = 0x10;
/// Status bit: application supply above application-min threshold (high side).
pub const STS_APL_MIN_HI: u8 = 0x08;
/// Status bit: application supply above application-min threshold (low side).
pub const STS_APL_MIN_LO: u8 = 0x04;
/// Status bit: short-term storage above battery-min threshold (high side).
pub const STS_BAT_MIN_HI: u8 = 0x02;
/// Status bit: short-term storage above battery-min threshold (low side).
pub const STS_BAT_MIN_LO: u8 = 0x01;

/// Default wake interval in RTC ticks for the low energy state (30 s).
pub const WAKE_INTERVAL_LOW_ENERGY: u32 = 30 << 16;
/// Default wake interval in RTC ticks for the middle energy state (5 s).
pub const WAKE_INTERVAL_MIDDLE_ENERGY: u32 = 5 << 16;
/// Default wake interval in RTC ticks for the high energy state (1 s).
pub const WAKE_INTERVAL_HIGH_ENERGY: u32 = 1 << 16;

/// Mask of pad event flags serviced by the edge-interrupt handler.
pub const EDGE_PIN_MASK: u32 = 0xFFFF_FFFF;

/// Deep-sleep infrastructure clock divider applied at power-up. Saves idle
/// power at the cost of interrupt latency.
pub const INF_CLOCK_DIV_DEEP_SLEEP: u32 = 32;
