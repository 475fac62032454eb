#![cfg_attr(not(test), no_std)]
#![allow(clippy::inline_always)]
#![allow(clippy::must_use_candidate)]

#[cfg(test)]
#[macro_use]
extern crate std;

// modules
pub mod cdc;
pub mod dummy;
pub mod registers;
pub mod serial;

pub use embedded_hal_nb as hal_nb;

#[macro_use]
extern crate bitflags;

pub use nb;

// Peripherals present on every piano SoC.
#[macro_export]
macro_rules! impl_piano_soc {
    ($IO_BASE:expr, $N_VOICES:expr) => {
        piano_hal::impl_serial! {
            Serial0: $IO_BASE;
        }

        piano_hal::impl_tone_generator! {
            ToneGenerator0: $IO_BASE, $N_VOICES;
        }
    };
}

#[cfg(test)]
mod tests {
    use crate as hal;
    use crate::registers::{Register, Registers};
    use crate::serial::*;
    use embedded_hal_nb::serial::{Read, Write};

    use std::sync::Once;

    static INIT: Once = Once::new();

    pub fn setup_logger() {
      INIT.call_once(env_logger::init);
    }

    // Fake register windows so the MMIO macros can be exercised on the host.
    // Tests run in parallel, so each UART test gets its own window.
    static mut UART_WINDOW: [u32; 4] = [0; 4];
    static mut SPLIT_UART_WINDOW: [u32; 4] = [0; 4];
    static mut TONEGEN_WINDOW: [u32; 0x100] = [0; 0x100];

    crate::impl_serial! {
        TestSerial: unsafe { core::ptr::addr_of_mut!(UART_WINDOW) as usize };
        SplitSerial: unsafe { core::ptr::addr_of_mut!(SPLIT_UART_WINDOW) as usize };
    }

    crate::impl_tone_generator! {
        TestToneGenerator: unsafe { core::ptr::addr_of_mut!(TONEGEN_WINDOW) as usize }, 4;
    }

    fn uart_word(offset: usize) -> *mut u32 {
        unsafe { (core::ptr::addr_of_mut!(UART_WINDOW) as *mut u32).add(offset / 4) }
    }

    fn split_uart_word(offset: usize) -> *mut u32 {
        unsafe { (core::ptr::addr_of_mut!(SPLIT_UART_WINDOW) as *mut u32).add(offset / 4) }
    }

    #[test]
    fn test_serial_blocks_until_rx_valid() {
        setup_logger();
        let mut serial = unsafe { TestSerial::steal() };
        unsafe {
            uart_word(UART_CTRL_OFFSET).write_volatile(0);
            uart_word(UART_RX_DATA_OFFSET).write_volatile(0x1A5);
        }
        assert!(matches!(serial.read(), Err(nb::Error::WouldBlock)));
        unsafe { uart_word(UART_CTRL_OFFSET).write_volatile(UartStatus::RX_VALID.bits()) };
        // Only the low byte of the data register is meaningful.
        assert_eq!(serial.read().ok(), Some(0xA5));

        assert!(matches!(serial.write(b'x'), Err(nb::Error::WouldBlock)));
        unsafe { uart_word(UART_CTRL_OFFSET).write_volatile(UartStatus::TX_READY.bits()) };
        assert!(serial.write(b'x').is_ok());
        assert_eq!(unsafe { uart_word(UART_TX_DATA_OFFSET).read_volatile() }, b'x' as u32);
    }

    #[test]
    fn test_split_halves_share_status() {
        setup_logger();
        let (mut rx, mut tx) = unsafe { SplitSerial::steal() }.split();
        unsafe {
            split_uart_word(UART_CTRL_OFFSET).write_volatile(UartStatus::TX_READY.bits());
            split_uart_word(UART_RX_DATA_OFFSET).write_volatile(0x42);
        }
        // Transmitting does not consume or fake a received byte.
        core::fmt::Write::write_str(&mut tx, "ok").unwrap();
        assert_eq!(unsafe { split_uart_word(UART_TX_DATA_OFFSET).read_volatile() }, b'k' as u32);
        assert!(matches!(rx.read(), Err(nb::Error::WouldBlock)));
        unsafe { split_uart_word(UART_CTRL_OFFSET).write_volatile(UartStatus::RX_VALID.bits()) };
        assert_eq!(rx.read().ok(), Some(0x42));
        assert!(matches!(tx.write(b'!'), Err(nb::Error::WouldBlock)));
    }

    #[test]
    fn test_tone_generator_register_window() {
        setup_logger();
        let mut tonegen = unsafe { TestToneGenerator::steal() };
        tonegen.write(Register::CarrierFcw(2), 0x1234);
        tonegen.write(Register::NoteEnable, 0b0100);
        // Beyond the configured voice count, dropped.
        tonegen.write(Register::CarrierFcw(4), 0xdead);
        let window = unsafe { &*core::ptr::addr_of!(TONEGEN_WINDOW) };
        assert_eq!(window[Register::CarrierFcw(2).offset() / 4], 0x1234);
        assert_eq!(window[Register::NoteEnable.offset() / 4], 0b0100);
        assert_eq!(window[Register::CarrierFcw(4).offset() / 4], 0);
        assert_eq!(tonegen.read(Register::CarrierFcw(2)), 0x1234);
    }
}
