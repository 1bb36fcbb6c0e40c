//! Simulated HT502x bus for unit tests.
//!
//! Records every access in order and models the parts of the controller the
//! sequencer depends on: the WPREG/FLASHLOCK protection, the operation latch
//! in FLASHCON, the busy bit, and the effect of erase/program triggers on a
//! byte array.

use std::collections::BTreeMap;

use crate::config::Geometry;
use crate::port::RegisterPort;
use crate::registers::{
    Control, RegisterMap, LOCK_KEY_UNLOCK, UNLOCK_ARM, WATCHDOG_CLEAR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read32 { addr: u32, value: u32 },
    Read8 { addr: u32, value: u8 },
    Write32 { addr: u32, value: u32 },
    Write16 { addr: u32, value: u16 },
    Write8 { addr: u32, value: u8 },
}

pub struct SimBus {
    pub map: RegisterMap,
    pub geometry: Geometry,
    /// Number of FLASHCON reads that report busy after each trigger.
    /// `None` keeps the busy bit set forever.
    pub busy_polls: Option<u32>,
    pub log: Vec<Access>,
    /// Set if FLASHLOCK was re-locked while an operation was still running.
    pub relocked_while_busy: bool,
    /// Triggers that arrived while the controller was locked.
    pub rejected_triggers: u32,
    registers: BTreeMap<u32, u32>,
    memory: BTreeMap<u32, u8>,
    busy_remaining: u32,
    busy: bool,
}

impl SimBus {
    pub fn new(busy_polls: u32) -> Self {
        Self {
            map: RegisterMap::HT502X,
            geometry: Geometry::HT502X,
            busy_polls: Some(busy_polls),
            log: Vec::new(),
            relocked_while_busy: false,
            rejected_triggers: 0,
            registers: BTreeMap::new(),
            memory: BTreeMap::new(),
            busy_remaining: 0,
            busy: false,
        }
    }

    /// A controller whose busy bit never clears.
    pub fn stuck() -> Self {
        Self {
            busy_polls: None,
            ..Self::new(0)
        }
    }

    pub fn register(&self, addr: u32) -> u32 {
        self.registers.get(&addr).copied().unwrap_or(0)
    }

    pub fn byte(&self, addr: u32) -> u8 {
        self.memory
            .get(&addr)
            .copied()
            .unwrap_or(self.geometry.erased_value)
    }

    pub fn preload(&mut self, addr: u32, data: &[u8]) {
        for (offset, value) in data.iter().enumerate() {
            self.memory.insert(addr + offset as u32, *value);
        }
    }

    pub fn is_locked(&self) -> bool {
        self.register(self.map.lock()) == 0 && self.register(self.map.unlock()) == 0
    }

    pub fn watchdog_clears(&self) -> usize {
        self.log
            .iter()
            .filter(|a| {
                **a == Access::Write16 {
                    addr: self.map.watchdog_clear,
                    value: WATCHDOG_CLEAR,
                }
            })
            .count()
    }

    pub fn busy_reads(&self) -> usize {
        let control = self.map.control();
        self.log
            .iter()
            .filter(|a| matches!(a, Access::Read32 { addr, value } if *addr == control && Control::from_bits_retain(*value).contains(Control::BUSY)))
            .count()
    }

    /// Flash-array writes in the order they were issued, registers excluded.
    pub fn array_writes(&self) -> Vec<Access> {
        self.log
            .iter()
            .filter(|a| match a {
                Access::Write32 { addr, .. } | Access::Write8 { addr, .. } => self.in_array(*addr),
                _ => false,
            })
            .copied()
            .collect()
    }

    /// Values written to FLASHCON, in order.
    pub fn operation_codes(&self) -> Vec<u32> {
        let control = self.map.control();
        self.log
            .iter()
            .filter_map(|a| match a {
                Access::Write32 { addr, value } if *addr == control => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn in_array(&self, addr: u32) -> bool {
        self.geometry.contains(addr)
    }

    fn unlocked(&self) -> bool {
        self.register(self.map.unlock()) == UNLOCK_ARM
            && self.register(self.map.lock()) == LOCK_KEY_UNLOCK
    }

    fn trigger(&mut self, addr: u32, data: Option<u8>) {
        if !self.unlocked() {
            self.rejected_triggers += 1;
            return;
        }
        match self.register(self.map.control()) & Control::OPERATION.bits() {
            0x01 => {
                if let Some(value) = data {
                    let old = self.byte(addr);
                    self.memory.insert(addr, old & value);
                }
            }
            0x02 => {
                let size = self.geometry.sector_size;
                if let Some(base) = self.geometry.sector_base(addr) {
                    self.memory.retain(|a, _| *a < base || *a >= base + size);
                }
            }
            0x03 => self.memory.clear(),
            _ => {
                self.rejected_triggers += 1;
                return;
            }
        }
        self.busy = true;
        self.busy_remaining = self.busy_polls.unwrap_or(0);
        if self.busy_polls == Some(0) {
            self.busy = false;
        }
    }

    fn read_control(&mut self) -> u32 {
        let latched = self.register(self.map.control()) & Control::OPERATION.bits();
        if !self.busy {
            return latched;
        }
        if self.busy_polls.is_some() {
            self.busy_remaining -= 1;
            if self.busy_remaining == 0 {
                self.busy = false;
            }
        }
        latched | Control::BUSY.bits()
    }
}

impl RegisterPort for SimBus {
    fn read_u32(&mut self, addr: u32) -> u32 {
        let value = if addr == self.map.control() {
            self.read_control()
        } else if self.in_array(addr) {
            u32::from_le_bytes([
                self.byte(addr),
                self.byte(addr + 1),
                self.byte(addr + 2),
                self.byte(addr + 3),
            ])
        } else {
            self.register(addr)
        };
        self.log.push(Access::Read32 { addr, value });
        value
    }

    fn read_u8(&mut self, addr: u32) -> u8 {
        let value = self.byte(addr);
        self.log.push(Access::Read8 { addr, value });
        value
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        self.log.push(Access::Write32 { addr, value });
        if self.in_array(addr) {
            self.trigger(addr, None);
            return;
        }
        if addr == self.map.lock() && value == 0 && self.busy {
            self.relocked_while_busy = true;
        }
        self.registers.insert(addr, value);
    }

    fn write_u16(&mut self, addr: u32, value: u16) {
        self.log.push(Access::Write16 { addr, value });
        if addr != self.map.watchdog_clear {
            self.registers.insert(addr, u32::from(value));
        }
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        self.log.push(Access::Write8 { addr, value });
        if self.in_array(addr) {
            self.trigger(addr, Some(value));
        }
    }
}
