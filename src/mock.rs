//! Scripted hardware model for the hosted test suite.
//!
//! [`MockChip`] implements all four chip-block traits over one shared state
//! cell, records every ordered mutation as a log string, and lets tests
//! script the asynchronous behaviours the real silicon shows: domain status
//! lagging its request, event-flag clears lagging the write, and deep-sleep
//! wakes caused by radio completions or the RTC. Clones share state, which
//! is how a test holds a probe into a chip that was moved into the code
//! under test, and how the edge-interrupt tests present one chip as three
//! distinct trait objects.

use crate::hal::{EdgeHal, PowerHal, RadioHal, RtcHal};
use crate::power::PowerDomain;
use crate::radio::RadioFlags;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// What a scripted deep-sleep wake signifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MockEvent {
    /// The radio interrupt fired and marked the boot command done.
    BootDone,
    /// The radio interrupt fired and marked setup done.
    SetupDone,
    /// The radio interrupt fired and marked the advertisement train done.
    AdvertisingDone,
    /// The RTC wake compare fired; its event flag is now pending.
    RtcWake,
    /// A wake with no cause; the sleeping wait must re-check and go back.
    Spurious,
}

#[derive(Debug, Default)]
struct ChipState {
    log: Vec<String>,
    domain_on: [bool; PowerDomain::COUNT],
    domain_latency: [u32; PowerDomain::COUNT],
    domain_pending: [Option<(bool, u32)>; PowerDomain::COUNT],
    aux_ready: bool,
    mcu_power_down: bool,
    deep_sleeps: usize,
    events: VecDeque<MockEvent>,
    flags: Option<Rc<RadioFlags>>,
    recharge_adjusts: usize,
    edge_flags: u32,
    edge_clear_latency: u32,
    edge_pending_clear: Option<(u32, u32)>,
    rtc_now: u32,
    rtc_pending: u32,
    adv_data: Vec<u8>,
    wake_compare: Option<u32>,
}

/// The scripted chip. Cloning yields another handle onto the same state.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockChip {
    state: Rc<RefCell<ChipState>>,
}

impl MockChip {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Puts the chip in the state the beacon's power-up leaves behind:
    /// RF core requested, AUX connected, cache and its retention on.
    pub(crate) fn power_on_reset_defaults(&mut self) {
        let mut state = self.state.borrow_mut();
        state.domain_on[PowerDomain::RfCore.index()] = true;
        state.domain_on[PowerDomain::Cache.index()] = true;
        state.domain_on[PowerDomain::CacheRetention.index()] = true;
        state.aux_ready = true;
    }

    /// Wires the chip's scripted radio-completion wakes to a flag set.
    pub(crate) fn attach_flags(&mut self, flags: Rc<RadioFlags>) {
        self.state.borrow_mut().flags = Some(flags);
    }

    /// Queues what the next deep-sleep wake signifies. Unqueued sleeps wake
    /// spuriously.
    pub(crate) fn on_deep_sleep(&mut self, event: MockEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    pub(crate) fn clear_log(&mut self) {
        self.state.borrow_mut().log.clear();
    }

    /// Makes `domain`'s status register lag its request by `polls` reads.
    pub(crate) fn set_domain_latency(&mut self, domain: PowerDomain, polls: u32) {
        self.state.borrow_mut().domain_latency[domain.index()] = polls;
    }

    /// Latches pad event flags as if an edge had fired.
    pub(crate) fn raise_edge_flags(&mut self, mask: u32) {
        self.state.borrow_mut().edge_flags |= mask;
    }

    /// Makes a pad-flag clear land only after `reads` further flag reads.
    /// `u32::MAX` models a clear that never lands.
    pub(crate) fn set_edge_clear_latency(&mut self, reads: u32) {
        self.state.borrow_mut().edge_clear_latency = reads;
    }

    pub(crate) fn edge_flags_raw(&self) -> u32 {
        self.state.borrow().edge_flags
    }

    /// Raises the RTC wake event flag; it takes `clears` clear writes to
    /// actually drop, modelling the asynchronous clear.
    pub(crate) fn raise_rtc_event(&mut self, clears: u32) {
        self.state.borrow_mut().rtc_pending = clears;
    }

    pub(crate) fn deep_sleeps(&self) -> usize {
        self.state.borrow().deep_sleeps
    }

    pub(crate) fn recharge_adjusts(&self) -> usize {
        self.state.borrow().recharge_adjusts
    }

    pub(crate) fn mcu_power_down_requested(&self) -> bool {
        self.state.borrow().mcu_power_down
    }

    /// The payload bytes last handed to the radio.
    pub(crate) fn adv_data(&self) -> Vec<u8> {
        self.state.borrow().adv_data.clone()
    }

    /// The last programmed wake compare delta.
    pub(crate) fn wake_compare(&self) -> Option<u32> {
        self.state.borrow().wake_compare
    }

    /// Three handles onto the same chip, for call sites that take the
    /// power, edge and RTC blocks as separate arguments.
    pub(crate) fn split(&self) -> (MockChip, MockChip, MockChip) {
        (self.clone(), self.clone(), self.clone())
    }

    fn note(&self, entry: String) {
        self.state.borrow_mut().log.push(entry);
    }
}

impl PowerHal for MockChip {
    fn domain_request(&mut self, domain: PowerDomain, on: bool) {
        self.note(format!("domain_request({domain:?}, {on})"));
        let mut state = self.state.borrow_mut();
        let idx = domain.index();
        let latency = state.domain_latency[idx];
        if latency == 0 {
            state.domain_on[idx] = on;
            state.domain_pending[idx] = None;
        } else {
            state.domain_pending[idx] = Some((on, latency));
        }
    }

    fn domain_is_on(&self, domain: PowerDomain) -> bool {
        let mut state = self.state.borrow_mut();
        let idx = domain.index();
        if let Some((target, remaining)) = state.domain_pending[idx] {
            if remaining <= 1 {
                state.domain_on[idx] = target;
                state.domain_pending[idx] = None;
            } else {
                state.domain_pending[idx] = Some((target, remaining - 1));
            }
        }
        state.domain_on[idx]
    }

    fn gpio_clock_run_mode(&mut self, enable: bool) {
        self.note(format!("gpio_clock({enable})"));
    }

    fn load_clock_settings(&mut self) {
        self.note("load_clock_settings".into());
    }

    fn divide_inf_clock_deep_sleep(&mut self, div: u32) {
        self.note(format!("divide_inf_clock({div})"));
    }

    fn aux_force_on(&mut self, on: bool) {
        self.note(format!("aux_force_on({on})"));
        self.state.borrow_mut().aux_ready = on;
    }

    fn aux_is_ready(&self) -> bool {
        self.state.borrow().aux_ready
    }

    fn aux_power_down_request(&mut self) {
        self.note("aux_power_down_request".into());
    }

    fn aux_ram_retention(&mut self, on: bool) {
        self.note(format!("aux_ram_retention({on})"));
    }

    fn mcu_power_down_request(&mut self, on: bool) {
        self.note(format!("mcu_power_down_request({on})"));
        self.state.borrow_mut().mcu_power_down = on;
    }

    fn cpu_domain_request(&mut self, on: bool) {
        self.note(format!("cpu_domain_request({on})"));
    }

    fn deep_sleep(&mut self) {
        self.note("deep_sleep".into());
        let mut state = self.state.borrow_mut();
        state.deep_sleeps += 1;
        let flags = state.flags.clone();
        match state.events.pop_front() {
            Some(MockEvent::BootDone) => {
                if let Some(flags) = flags {
                    flags.set_boot_done();
                }
            }
            Some(MockEvent::SetupDone) => {
                if let Some(flags) = flags {
                    flags.set_setup_done();
                }
            }
            Some(MockEvent::AdvertisingDone) => {
                if let Some(flags) = flags {
                    flags.set_advertising_done();
                }
            }
            Some(MockEvent::RtcWake) => {
                state.rtc_pending = state.rtc_pending.max(1);
            }
            Some(MockEvent::Spurious) | None => {}
        }
    }

    fn xtal_interface_enable(&mut self) {
        self.note("xtal_interface_enable".into());
    }

    fn xosc_turn_on(&mut self) {
        self.note("xosc_turn_on".into());
    }

    fn xosc_attempt_switch(&mut self) -> bool {
        self.note("xosc_attempt_switch".into());
        true
    }

    fn xtal_request(&mut self, on: bool) {
        self.note(format!("xtal_request({on})"));
    }

    fn osc_switch_to_rc(&mut self) {
        self.note("osc_switch_to_rc".into());
    }

    fn set_recharge_before_power_down(&mut self) {
        self.note("set_recharge_before_power_down".into());
    }

    fn adjust_recharge_after_power_down(&mut self) {
        self.note("adjust_recharge_after_power_down".into());
        self.state.borrow_mut().recharge_adjusts += 1;
    }

    fn aon_sync(&mut self) {
        self.note("aon_sync".into());
    }

    fn aon_update(&mut self) {
        self.note("aon_update".into());
    }

    fn jtag_power_off(&mut self) {
        self.note("jtag_power_off".into());
    }
}

impl EdgeHal for MockChip {
    fn interrupt_disable(&mut self) {
        self.note("interrupt_disable".into());
    }

    fn interrupt_enable(&mut self) {
        self.note("interrupt_enable".into());
    }

    fn event_flags(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        if let Some((mask, remaining)) = state.edge_pending_clear {
            if remaining <= 1 {
                state.edge_flags &= !mask;
                state.edge_pending_clear = None;
            } else {
                state.edge_pending_clear = Some((mask, remaining - 1));
            }
        }
        state.edge_flags
    }

    fn clear_event_flags(&mut self, flags: u32) {
        self.note("clear_event_flags".into());
        let mut state = self.state.borrow_mut();
        if state.edge_clear_latency == 0 {
            state.edge_flags &= !flags;
        } else {
            let latency = state.edge_clear_latency;
            state.edge_pending_clear = Some((flags, latency));
        }
    }

    fn configure_wake_pin(&mut self, rising: bool) {
        self.note(format!("configure_wake_pin({rising})"));
    }

    fn select_wake_source_pad(&mut self) {
        self.note("select_wake_source_pad".into());
    }

    fn short_delay(&mut self) {
        self.note("short_delay".into());
    }
}

impl RtcHal for MockChip {
    fn enable(&mut self) {
        self.note("rtc_enable".into());
    }

    fn now(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.rtc_now = state.rtc_now.wrapping_add(64);
        state.rtc_now
    }

    fn set_wake_compare(&mut self, ticks: u32) {
        self.note(format!("set_wake_compare({ticks})"));
        self.state.borrow_mut().wake_compare = Some(ticks);
    }

    fn event_pending(&self) -> bool {
        self.state.borrow().rtc_pending > 0
    }

    fn clear_event(&mut self) {
        self.note("rtc_clear_event".into());
        let mut state = self.state.borrow_mut();
        if state.rtc_pending > 0 {
            state.rtc_pending -= 1;
        }
    }
}

impl RadioHal for MockChip {
    fn init_interrupts(&mut self) {
        self.note("init_radio_interrupts".into());
    }

    fn boot(&mut self) {
        self.note("radio_boot".into());
    }

    fn bus_request(&mut self, keep_on: bool) {
        self.note(format!("bus_request({keep_on})"));
    }

    fn apply_patch(&mut self) {
        self.note("apply_patch".into());
    }

    fn start_timebase(&mut self) {
        self.note("start_timebase".into());
    }

    fn update_adv_data(&mut self, payload: &[u8]) {
        self.note("update_adv_data".into());
        self.state.borrow_mut().adv_data = payload.to_vec();
    }

    fn setup_and_advertise(&mut self) {
        self.note("setup_and_advertise".into());
    }
}

/// Scripted register bus: a device selector and a register → bytes map.
#[derive(Debug, Default)]
pub(crate) struct MockBus {
    registers: HashMap<u8, Vec<u8>>,
    selected: Option<u8>,
    fail_reads: bool,
}

impl MockBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seeds the bytes a register read will return.
    pub(crate) fn set_register(&mut self, reg: u8, data: &[u8]) {
        let _ = self.registers.insert(reg, data.to_vec());
    }

    /// Makes every read fail, as if the device were unreachable.
    pub(crate) fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// The device last selected.
    pub(crate) fn selected(&self) -> Option<u8> {
        self.selected
    }
}

impl crate::sensors::SensorBus for MockBus {
    fn select(&mut self, device: u8) {
        self.selected = Some(device);
    }

    fn read_register(&mut self, reg: u8, out: &mut [u8]) -> bool {
        if self.fail_reads {
            return false;
        }
        match self.registers.get(&reg) {
            Some(data) => {
                let n = out.len().min(data.len());
                out[..n].copy_from_slice(&data[..n]);
                true
            }
            None => false,
        }
    }

    fn write_register(&mut self, reg: u8, data: &[u8]) -> bool {
        let _ = self.registers.insert(reg, data.to_vec());
        true
    }
}

/// Scripted sensor: a sequence of raw values handed out one per read, with
/// the error sentinel once the script runs out. Conversion is identity.
#[derive(Debug, Default)]
pub(crate) struct MockSensor {
    script: Vec<u32>,
    next: usize,
    reads: usize,
    enables: Vec<bool>,
}

impl MockSensor {
    pub(crate) fn new(script: &[u32]) -> Self {
        Self {
            script: script.to_vec(),
            ..Self::default()
        }
    }

    /// Every `enable` transition the sensor saw, in order.
    pub(crate) fn enables(&self) -> &[bool] {
        &self.enables
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads
    }
}

impl crate::sensors::Sensor<MockBus> for MockSensor {
    fn enable(&mut self, _bus: &mut MockBus, on: bool) {
        self.enables.push(on);
    }

    fn read_raw(&mut self, _bus: &mut MockBus) -> u32 {
        self.reads += 1;
        let raw = self
            .script
            .get(self.next)
            .copied()
            .unwrap_or(crate::consts::SENSOR_ERROR);
        self.next += 1;
        raw
    }

    fn convert(&self, raw: u32) -> u32 {
        raw
    }
}
