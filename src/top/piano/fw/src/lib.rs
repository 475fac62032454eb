#![no_std]
#![no_main]

pub use piano_hal as hal;

/// Voices built into the tone generator bitstream.
pub const N_VOICES: usize = 4;

/// Start of the IO window: UART, counters, LEDs and the tone generator.
pub const IO_BASE: usize = 0x8000_0000;

hal::impl_piano_soc!(IO_BASE, N_VOICES);

pub mod handlers;
