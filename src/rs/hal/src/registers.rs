// Register-level interface to the tone generator peripheral.
//
// Everything above the HAL talks to hardware through the `Registers`
// trait. The firmware binds it to volatile MMIO with `impl_tone_generator!`,
// host tests bind it to `dummy::DummyRegisters`.

use strum_macros::IntoStaticStr;

/// Named registers of the tone generator and the SoC blocks around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Register {
    /// Free-running cycle counter (read-only).
    CycleCounter,
    /// Status indicator LEDs.
    Leds,
    /// Carrier frequency control word of one voice.
    CarrierFcw(usize),
    ModFcw,
    ModShift,
    /// One bit per voice, bit i enables voice i.
    NoteEnable,
    SynthShift,
    /// CPU side of the clock-domain crossing handshake.
    CpuReq,
    /// Audio side of the handshake, bit 0 only (read-only).
    CpuAck,
}

/// Offsets from the IO base. The tone generator block starts at 0x100.
pub const CYCLE_COUNTER_OFFSET: usize = 0x010;
pub const LEDS_OFFSET: usize          = 0x030;
pub const CARRIER_FCW_OFFSET: usize   = 0x100;
pub const MOD_FCW_OFFSET: usize       = 0x200;
pub const MOD_SHIFT_OFFSET: usize     = 0x204;
pub const NOTE_EN_OFFSET: usize       = 0x208;
pub const SYNTH_SHIFT_OFFSET: usize   = 0x20C;
pub const CPU_REQ_OFFSET: usize       = 0x210;
pub const CPU_ACK_OFFSET: usize       = 0x214;

impl Register {
    pub const fn offset(self) -> usize {
        match self {
            Register::CycleCounter => CYCLE_COUNTER_OFFSET,
            Register::Leds         => LEDS_OFFSET,
            Register::CarrierFcw(voice) => CARRIER_FCW_OFFSET + 4*voice,
            Register::ModFcw       => MOD_FCW_OFFSET,
            Register::ModShift     => MOD_SHIFT_OFFSET,
            Register::NoteEnable   => NOTE_EN_OFFSET,
            Register::SynthShift   => SYNTH_SHIFT_OFFSET,
            Register::CpuReq       => CPU_REQ_OFFSET,
            Register::CpuAck       => CPU_ACK_OFFSET,
        }
    }

    /// Registers that are driven by hardware and ignore writes.
    pub const fn is_read_only(self) -> bool {
        matches!(self, Register::CycleCounter | Register::CpuAck)
    }
}

/// Capability to read and write tone generator registers.
///
/// Implementations are not expected to be shared between execution
/// contexts; all mutation goes through `&mut self`.
pub trait Registers {
    fn read(&self, reg: Register) -> u32;
    fn write(&mut self, reg: Register, value: u32);

    fn cycle_counter(&self) -> u32 {
        self.read(Register::CycleCounter)
    }

    fn ack(&self) -> bool {
        self.read(Register::CpuAck) & 0x1 != 0
    }
}

impl<R: Registers + ?Sized> Registers for &mut R {
    fn read(&self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

/// Bind `Registers` to volatile accesses at a fixed IO base address.
///
/// `$N_VOICES` bounds the carrier fcw slots, writes to voices outside
/// of it are dropped with a warning.
#[macro_export]
macro_rules! impl_tone_generator {
    ($(
        $TONEGENX:ident: $IO_BASE:expr, $N_VOICES:expr;
    )+) => {
        $(
            #[derive(Debug)]
            pub struct $TONEGENX {
                base: usize,
            }

            impl $TONEGENX {
                /// # Safety
                ///
                /// Only one instance may exist, and the IO base must map the
                /// tone generator register block.
                pub unsafe fn steal() -> Self {
                    Self { base: $IO_BASE }
                }

                fn addr(&self, reg: hal::registers::Register) -> *mut u32 {
                    (self.base + reg.offset()) as *mut u32
                }
            }

            impl hal::registers::Registers for $TONEGENX {
                fn read(&self, reg: hal::registers::Register) -> u32 {
                    if let hal::registers::Register::CarrierFcw(voice) = reg {
                        if voice >= $N_VOICES {
                            return 0;
                        }
                    }
                    unsafe { core::ptr::read_volatile(self.addr(reg)) }
                }

                fn write(&mut self, reg: hal::registers::Register, value: u32) {
                    if reg.is_read_only() {
                        return;
                    }
                    if let hal::registers::Register::CarrierFcw(voice) = reg {
                        if voice >= $N_VOICES {
                            log::warn!("tone_generator: no carrier slot for voice {}", voice);
                            return;
                        }
                    }
                    unsafe { core::ptr::write_volatile(self.addr(reg), value) }
                }
            }
        )+
    };
}
