//! # harvest-beacon
//!
//! A portable, no_std Rust core for an energy-harvesting BLE advertising
//! beacon in the style of the TI CC26xx sensor nodes: no battery, a
//! harvester power-management front end, and a duty cycle spent almost
//! entirely in standby.
//!
//! This crate implements the whole control flow of such a device:
//! - power-domain sequencing with strict bring-up/tear-down ordering
//! - a tri-level energy policy driven by the harvester's status byte
//! - sensor sampling in rotation or in full, depending on available energy
//! - a fixed 24-byte advertising payload rebuilt every transmit cycle
//! - the radio boot → setup → advertise handshake, slept through in idle
//! - the standby entry/exit sequences and RTC wake scheduling
//! - the edge-interrupt handler with its mandatory flag-clear spin
//!
//! The silicon itself stays behind the traits in [`hal`]; board support
//! implements them with the real register accesses, hosted tests with a
//! scripted model.
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]` support and replaces `heapless::Vec`s with `std::vec::Vec`s |
//! | `defmt-0-3` | Uses `defmt` logging |
//! | `log`       | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use harvest_beacon::beacon::{Beacon, BeaconConfig};
//! use harvest_beacon::isr::{EDGE_TIMER, RADIO_FLAGS};
//! use harvest_beacon::watchdog::NeverTrip;
//!
//! let mut beacon = Beacon::new(
//!     chip,
//!     bus,
//!     NeverTrip,
//!     BeaconConfig::default(),
//!     &RADIO_FLAGS,
//!     &EDGE_TIMER,
//! );
//! beacon.power_up(&mut sensors, &mut rails)?;
//! loop {
//!     let _ = beacon.run_cycle(&mut sensors)?;
//! }
//! ```
//!
//! The board's interrupt vectors delegate to the entry functions in
//! [`isr`]; nothing else runs concurrently.
//!
//! ## Integration Notes
//!
//! - Every hardware wait in the crate spins without timeout, exactly like
//!   the reference firmware; see [`watchdog`] for how tests bound them.
//! - The edge-interrupt handler re-powers the PERIPH domain itself and must
//!   stay registered whenever the edge input is armed as wake source.
//! - Only one beacon instance should exist per chip.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

pub use critical_section;

#[cfg(not(feature = "std"))]
pub use heapless;

pub mod beacon;
pub mod consts;
pub mod edge;
pub mod energy;
pub mod hal;
pub mod isr;
#[cfg(test)]
pub(crate) mod mock;
pub mod payload;
pub mod power;
pub mod radio;
pub mod sensors;
pub mod sleep;
pub mod watchdog;
