// Byte UART on the CPU's IO bus.
//
// Three words: a status register, a receive data register (reading it
// pops the byte) and a transmit data register. A UART can be split into
// an `Rx` and a `Tx` half, which touch disjoint data registers and only
// share the read-only status word.

use core::convert::Infallible;

use embedded_hal_nb::serial::{ErrorType, Read, Write};

pub const UART_CTRL_OFFSET: usize    = 0x0;
pub const UART_RX_DATA_OFFSET: usize = 0x4;
pub const UART_TX_DATA_OFFSET: usize = 0x8;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UartStatus: u32 {
        const TX_READY = 1 << 0;
        const RX_VALID = 1 << 1;
    }
}

#[doc(hidden)]
pub mod raw {
    use super::*;

    fn reg(base: usize, offset: usize) -> *mut u32 {
        (base + offset) as *mut u32
    }

    /// # Safety
    ///
    /// `base` must map a UART register block.
    pub unsafe fn status(base: usize) -> UartStatus {
        UartStatus::from_bits_truncate(core::ptr::read_volatile(reg(base, UART_CTRL_OFFSET)))
    }

    /// # Safety
    ///
    /// As for [`status`], and no other receiver may exist for `base`.
    pub unsafe fn read(base: usize) -> nb::Result<u8, Infallible> {
        if status(base).contains(UartStatus::RX_VALID) {
            Ok(core::ptr::read_volatile(reg(base, UART_RX_DATA_OFFSET)) as u8)
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// # Safety
    ///
    /// As for [`status`], and no other transmitter may exist for `base`.
    pub unsafe fn write(base: usize, word: u8) -> nb::Result<(), Infallible> {
        if status(base).contains(UartStatus::TX_READY) {
            core::ptr::write_volatile(reg(base, UART_TX_DATA_OFFSET), word as u32);
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// # Safety
    ///
    /// As for [`status`].
    pub unsafe fn flush(base: usize) -> nb::Result<(), Infallible> {
        if status(base).contains(UartStatus::TX_READY) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

/// Receive half of a split UART.
#[derive(Debug)]
pub struct Rx {
    base: usize,
}

/// Transmit half of a split UART.
#[derive(Debug)]
pub struct Tx {
    base: usize,
}

impl Rx {
    /// # Safety
    ///
    /// Only one `Rx` may exist per UART, and `base` must map its
    /// register block.
    #[doc(hidden)]
    pub unsafe fn new(base: usize) -> Self {
        Self { base }
    }
}

impl Tx {
    /// # Safety
    ///
    /// Only one `Tx` may exist per UART, and `base` must map its
    /// register block.
    #[doc(hidden)]
    pub unsafe fn new(base: usize) -> Self {
        Self { base }
    }
}

impl ErrorType for Rx {
    type Error = Infallible;
}

impl ErrorType for Tx {
    type Error = Infallible;
}

impl Read<u8> for Rx {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        unsafe { raw::read(self.base) }
    }
}

impl Write<u8> for Tx {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        unsafe { raw::write(self.base, word) }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        unsafe { raw::flush(self.base) }
    }
}

impl core::fmt::Write for Tx {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            nb::block!(Write::write(self, byte)).ok();
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! impl_serial {
    ($(
        $SERIALX:ident: $UART_BASE:expr;
    )+) => {
        $(
            #[derive(Debug)]
            pub struct $SERIALX {
                base: usize,
            }

            impl $SERIALX {
                /// # Safety
                ///
                /// Only one instance may exist, and the base address must map
                /// the UART register block. Use [`Self::split`] to hand the
                /// receiver and transmitter to different owners.
                pub unsafe fn steal() -> Self {
                    Self { base: $UART_BASE }
                }

                pub fn status(&self) -> hal::serial::UartStatus {
                    unsafe { hal::serial::raw::status(self.base) }
                }

                pub fn split(self) -> (hal::serial::Rx, hal::serial::Tx) {
                    unsafe { (hal::serial::Rx::new(self.base), hal::serial::Tx::new(self.base)) }
                }
            }

            impl hal::hal_nb::serial::ErrorType for $SERIALX {
                type Error = core::convert::Infallible;
            }

            impl hal::hal_nb::serial::Read<u8> for $SERIALX {
                fn read(&mut self) -> hal::nb::Result<u8, Self::Error> {
                    unsafe { hal::serial::raw::read(self.base) }
                }
            }

            impl hal::hal_nb::serial::Write<u8> for $SERIALX {
                fn write(&mut self, word: u8) -> hal::nb::Result<(), Self::Error> {
                    unsafe { hal::serial::raw::write(self.base, word) }
                }

                fn flush(&mut self) -> hal::nb::Result<(), Self::Error> {
                    unsafe { hal::serial::raw::flush(self.base) }
                }
            }

            impl core::fmt::Write for $SERIALX {
                fn write_str(&mut self, s: &str) -> core::fmt::Result {
                    use hal::hal_nb::serial::Write;
                    for byte in s.bytes() {
                        hal::nb::block!(self.write(byte)).ok();
                    }
                    Ok(())
                }
            }
        )+
    };
}
