// Host command protocol.
//
// One opcode byte, optionally followed by a payload. Words are 3 bytes
// little-endian, zero-extended to 32 bits. There is no framing: a short
// payload simply blocks until the missing bytes arrive, and a byte
// stream that loses sync stays out of sync.

use embedded_hal_nb::serial::Read;
use strum_macros::{FromRepr, IntoStaticStr};

pub const WORD_BYTES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum Opcode {
    SetModFcw     = 1,
    SetModShift   = 2,
    StartPlay     = 3,
    StopPlay      = 4,
    SetSynthShift = 5,
    Reset         = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Command {
    SetModFcw(u32),
    SetModShift(u8),
    SetSynthShift(u8),
    StartPlay(u32),
    StopPlay(u32),
    Reset,
    /// Unrecognised opcode, already consumed.
    NoOp(u8),
}

/// Block until the next byte arrives.
pub fn read_byte<S: Read<u8>>(serial: &mut S) -> Result<u8, S::Error> {
    nb::block!(serial.read())
}

pub fn read_word<S: Read<u8>>(serial: &mut S) -> Result<u32, S::Error> {
    let mut bytes = [0u8; 4];
    for byte in bytes.iter_mut().take(WORD_BYTES) {
        *byte = read_byte(serial)?;
    }
    Ok(u32::from_le_bytes(bytes))
}

/// Read and decode one command, blocking until its payload is complete.
pub fn decode<S: Read<u8>>(serial: &mut S) -> Result<Command, S::Error> {
    let op = read_byte(serial)?;
    let command = match Opcode::from_repr(op) {
        Some(Opcode::SetModFcw)     => Command::SetModFcw(read_word(serial)?),
        Some(Opcode::SetModShift)   => Command::SetModShift(read_byte(serial)?),
        Some(Opcode::StartPlay)     => Command::StartPlay(read_word(serial)?),
        Some(Opcode::StopPlay)      => Command::StopPlay(read_word(serial)?),
        Some(Opcode::SetSynthShift) => Command::SetSynthShift(read_byte(serial)?),
        Some(Opcode::Reset)         => Command::Reset,
        None                        => Command::NoOp(op),
    };
    Ok(command)
}

/// Encode a command the way a host would send it. Returns the number of
/// bytes written to `buf`. `NoOp` encodes its raw opcode byte.
pub fn encode(command: &Command, buf: &mut [u8; 1 + WORD_BYTES]) -> usize {
    let word = |buf: &mut [u8; 1 + WORD_BYTES], op: Opcode, w: u32| {
        buf[0] = op as u8;
        buf[1..].copy_from_slice(&w.to_le_bytes()[..WORD_BYTES]);
        1 + WORD_BYTES
    };
    let byte = |buf: &mut [u8; 1 + WORD_BYTES], op: Opcode, b: u8| {
        buf[0] = op as u8;
        buf[1] = b;
        2
    };
    match *command {
        Command::SetModFcw(w)     => word(buf, Opcode::SetModFcw, w),
        Command::SetModShift(b)   => byte(buf, Opcode::SetModShift, b),
        Command::SetSynthShift(b) => byte(buf, Opcode::SetSynthShift, b),
        Command::StartPlay(w)     => word(buf, Opcode::StartPlay, w),
        Command::StopPlay(w)      => word(buf, Opcode::StopPlay, w),
        Command::Reset => {
            buf[0] = Opcode::Reset as u8;
            1
        }
        Command::NoOp(op) => {
            buf[0] = op;
            1
        }
    }
}
