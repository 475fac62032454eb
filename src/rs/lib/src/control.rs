// Command dispatch between the host, the voice pool and the tone
// generator registers.
//
// Commands are handled strictly one at a time. Every configuration
// write is followed by a CDC handshake, so by the time the next command
// is decoded the audio domain has latched all effects of this one.

use embedded_hal_nb::serial::Read;
use log::{debug, info, warn};

use piano_hal::cdc;
use piano_hal::registers::{Register, Registers};

use crate::command::{self, Command};
use crate::fcw::fcw_to_freq;
use crate::voice::VoicePool;

pub struct Controller<R: Registers, const N: usize> {
    regs: R,
    voices: VoicePool<N>,
}

impl<R: Registers, const N: usize> Controller<R, N> {
    /// Take ownership of the register block and bring it to the same
    /// state as a `Reset` command would.
    pub fn new(regs: R) -> Self {
        let mut controller = Self {
            regs,
            voices: VoicePool::new(),
        };
        controller.clear_config();
        info!("control: {} voices ready", N);
        controller
    }

    pub fn voices(&self) -> &VoicePool<N> {
        &self.voices
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Apply one decoded command, then refresh the status LEDs.
    pub fn process(&mut self, command: Command) {
        let name: &'static str = command.into();
        match command {
            Command::SetModFcw(fcw) => {
                debug!("control: {} {:#x}", name, fcw);
                self.regs.write(Register::ModFcw, fcw);
                cdc::handshake(&mut self.regs);
            }
            Command::SetModShift(shift) => {
                debug!("control: {} {}", name, shift);
                self.regs.write(Register::ModShift, shift as u32);
                cdc::handshake(&mut self.regs);
            }
            Command::SetSynthShift(shift) => {
                debug!("control: {} {}", name, shift);
                self.regs.write(Register::SynthShift, shift as u32);
                cdc::handshake(&mut self.regs);
            }
            Command::StartPlay(fcw) => {
                let now = self.regs.cycle_counter();
                let voice = self.voices.start_note(fcw, now);
                debug!("control: {} {:#x} ({:.1}Hz) on voice {}",
                       name, fcw, fcw_to_freq(fcw), voice);
                self.regs.write(Register::CarrierFcw(voice), fcw);
                self.regs.write(Register::NoteEnable, self.voices.active_bitmap());
                cdc::handshake(&mut self.regs);
            }
            Command::StopPlay(fcw) => {
                if let Some(voice) = self.voices.stop_note(fcw) {
                    debug!("control: {} {:#x} on voice {}", name, fcw, voice);
                    self.regs.write(Register::NoteEnable, self.voices.active_bitmap());
                    cdc::handshake(&mut self.regs);
                } else {
                    // Evicted earlier, or never started.
                    debug!("control: {} {:#x} not playing", name, fcw);
                }
            }
            Command::Reset => {
                debug!("control: {}", name);
                self.clear_config();
                self.voices.reset();
            }
            Command::NoOp(op) => {
                debug!("control: ignore opcode {:#x}", op);
            }
        }
        self.regs.write(Register::Leds, self.voices.active_bitmap());
    }

    /// Decode and apply one command. Blocks until a complete command
    /// has arrived.
    pub fn step<S: Read<u8>>(&mut self, serial: &mut S) -> Result<Command, S::Error> {
        let command = command::decode(serial)?;
        self.process(command);
        Ok(command)
    }

    /// Handle commands forever. Transport errors drop the current
    /// command and resume at the next byte.
    pub fn run<S: Read<u8>>(&mut self, serial: &mut S) -> ! {
        loop {
            if let Err(e) = self.step(serial) {
                warn!("control: transport error {:?}", e);
            }
        }
    }

    fn clear_config(&mut self) {
        self.regs.write(Register::NoteEnable, 0);
        self.regs.write(Register::CpuReq, 0);
        self.regs.write(Register::ModShift, 0);
        self.regs.write(Register::ModFcw, 0);
        self.regs.write(Register::SynthShift, 0);
        cdc::handshake(&mut self.regs);
    }
}
