//! In-memory stand-in for the tone generator register block.
//!
//! Used by host tests in place of `impl_tone_generator!`. It keeps the
//! last value written to every register, records the write history and
//! simulates the audio clock domain answering the CDC handshake.

use core::cell::Cell;
use heapless::Vec;

use crate::registers::{Register, Registers};

/// Enough carrier slots for the widest enable bitmap.
pub const MAX_VOICES: usize = 32;
pub const HISTORY_DEPTH: usize = 256;

/// How the simulated audio domain answers REQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckBehaviour {
    /// ACK follows REQ on the next poll.
    Immediate,
    /// ACK follows REQ after this many extra polls.
    Delayed(u32),
    /// Audio domain never answers.
    StuckLow,
    /// ACK never drops.
    StuckHigh,
}

pub struct DummyRegisters {
    carrier_fcw: [u32; MAX_VOICES],
    leds: u32,
    mod_fcw: u32,
    mod_shift: u32,
    note_enable: u32,
    synth_shift: u32,
    req: u32,
    ack: Cell<bool>,
    ack_pending: Cell<u32>,
    ack_polls: Cell<u32>,
    ack_behaviour: AckBehaviour,
    cycle_counter: Cell<u32>,
    cycle_step: u32,
    handshakes: u32,
    history: Vec<(Register, u32), HISTORY_DEPTH>,
}

impl DummyRegisters {
    pub fn new() -> Self {
        Self {
            carrier_fcw: [0; MAX_VOICES],
            leds: 0,
            mod_fcw: 0,
            mod_shift: 0,
            note_enable: 0,
            synth_shift: 0,
            req: 0,
            ack: Cell::new(false),
            ack_pending: Cell::new(0),
            ack_polls: Cell::new(0),
            ack_behaviour: AckBehaviour::Immediate,
            cycle_counter: Cell::new(0),
            cycle_step: 0,
            handshakes: 0,
            history: Vec::new(),
        }
    }

    pub fn set_ack_behaviour(&mut self, behaviour: AckBehaviour) {
        self.ack_behaviour = behaviour;
        match behaviour {
            AckBehaviour::StuckLow => self.ack.set(false),
            AckBehaviour::StuckHigh => self.ack.set(true),
            _ => {}
        }
    }

    pub fn set_cycle_counter(&mut self, value: u32) {
        self.cycle_counter.set(value);
    }

    /// Advance the cycle counter by `step` after every read of it.
    pub fn set_cycle_step(&mut self, step: u32) {
        self.cycle_step = step;
    }

    /// Completed REQ pulses (rising then falling edge).
    pub fn handshakes(&self) -> u32 {
        self.handshakes
    }

    pub fn ack_polls(&self) -> u32 {
        self.ack_polls.get()
    }

    /// Every write since construction or the last `clear_history`,
    /// oldest first. Writes past `HISTORY_DEPTH` are not recorded.
    pub fn history(&self) -> &[(Register, u32)] {
        &self.history
    }

    pub fn history_of(&self, reg: Register) -> Vec<u32, HISTORY_DEPTH> {
        self.history
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn poll_ack(&self) -> bool {
        self.ack_polls.set(self.ack_polls.get() + 1);
        match self.ack_behaviour {
            AckBehaviour::StuckLow => false,
            AckBehaviour::StuckHigh => true,
            AckBehaviour::Immediate | AckBehaviour::Delayed(_) => {
                let target = self.req & 0x1 != 0;
                if self.ack.get() != target {
                    let pending = self.ack_pending.get();
                    if pending == 0 {
                        self.ack.set(target);
                    } else {
                        self.ack_pending.set(pending - 1);
                    }
                }
                self.ack.get()
            }
        }
    }

    fn write_req(&mut self, value: u32) {
        let old = self.req & 0x1;
        let new = value & 0x1;
        if old != new {
            if let AckBehaviour::Delayed(n) = self.ack_behaviour {
                self.ack_pending.set(n);
            }
            if old == 1 {
                self.handshakes += 1;
            }
        }
        self.req = value;
    }
}

impl Default for DummyRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers for DummyRegisters {
    fn read(&self, reg: Register) -> u32 {
        match reg {
            Register::CycleCounter => {
                let now = self.cycle_counter.get();
                self.cycle_counter.set(now.wrapping_add(self.cycle_step));
                now
            }
            Register::Leds => self.leds,
            Register::CarrierFcw(voice) => self.carrier_fcw.get(voice).copied().unwrap_or(0),
            Register::ModFcw => self.mod_fcw,
            Register::ModShift => self.mod_shift,
            Register::NoteEnable => self.note_enable,
            Register::SynthShift => self.synth_shift,
            Register::CpuReq => self.req,
            Register::CpuAck => self.poll_ack() as u32,
        }
    }

    fn write(&mut self, reg: Register, value: u32) {
        if reg.is_read_only() {
            return;
        }
        self.history.push((reg, value)).ok();
        match reg {
            Register::Leds => self.leds = value,
            Register::CarrierFcw(voice) => {
                if let Some(slot) = self.carrier_fcw.get_mut(voice) {
                    *slot = value;
                }
            }
            Register::ModFcw => self.mod_fcw = value,
            Register::ModShift => self.mod_shift = value,
            Register::NoteEnable => self.note_enable = value,
            Register::SynthShift => self.synth_shift = value,
            Register::CpuReq => self.write_req(value),
            Register::CycleCounter | Register::CpuAck => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_writes_are_ignored() {
        let mut regs = DummyRegisters::new();
        regs.set_cycle_counter(42);
        regs.write(Register::CycleCounter, 7);
        regs.write(Register::CpuAck, 1);
        assert_eq!(regs.cycle_counter(), 42);
        assert!(regs.history().is_empty());
    }

    #[test]
    fn test_cycle_counter_free_runs() {
        let mut regs = DummyRegisters::new();
        regs.set_cycle_counter(100);
        regs.set_cycle_step(10);
        assert_eq!(regs.cycle_counter(), 100);
        assert_eq!(regs.cycle_counter(), 110);
        assert_eq!(regs.cycle_counter(), 120);
    }

    #[test]
    fn test_ack_follows_req() {
        let mut regs = DummyRegisters::new();
        assert!(!regs.ack());
        regs.write(Register::CpuReq, 1);
        assert!(regs.ack());
        regs.write(Register::CpuReq, 0);
        assert!(!regs.ack());
        assert_eq!(regs.handshakes(), 1);
    }
}
