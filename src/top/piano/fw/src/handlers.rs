use log::LevelFilter;
use piano_lib::logger::WriteLogger;

use crate::hal::serial::Tx;

static LOGGER: WriteLogger<Tx> = WriteLogger::new(LevelFilter::Info);

/// Route `log` output to the UART transmitter. Command bytes only flow
/// the other way, so the two never interleave on the wire.
pub fn logger_init(serial: Tx) {
    LOGGER.attach(serial);
    // Single hart, called once before anything logs.
    unsafe {
        log::set_logger_racy(&LOGGER).ok();
        log::set_max_level_racy(LOGGER.level());
    }
}
