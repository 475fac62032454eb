// `log` backend that formats records onto a `core::fmt::Write` sink,
// normally the UART transmitter. The sink sits behind a critical
// section so a logger can live in a `static`.

use core::cell::RefCell;
use core::fmt::Write;

use critical_section::Mutex;
use log::{LevelFilter, Log, Metadata, Record};

pub struct WriteLogger<W> {
    writer: Mutex<RefCell<Option<W>>>,
    level: LevelFilter,
}

impl<W: Write + Send> WriteLogger<W> {
    pub const fn new(level: LevelFilter) -> Self {
        Self {
            writer: Mutex::new(RefCell::new(None)),
            level,
        }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Start emitting records to `writer`. Records logged before a
    /// writer is attached are dropped.
    pub fn attach(&self, writer: W) {
        critical_section::with(|cs| {
            self.writer.borrow_ref_mut(cs).replace(writer);
        });
    }

    pub fn detach(&self) -> Option<W> {
        critical_section::with(|cs| self.writer.borrow_ref_mut(cs).take())
    }
}

impl<W: Write + Send> Log for WriteLogger<W> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        critical_section::with(|cs| {
            if let Some(writer) = self.writer.borrow_ref_mut(cs).as_mut() {
                write!(writer, "[{}] {}\r\n", record.level(), record.args()).ok();
            }
        });
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;
    use log::Level;

    fn emit<W: Write + Send>(logger: &WriteLogger<W>, level: Level, msg: &str) {
        logger.log(&Record::builder()
            .level(level)
            .target("test")
            .args(format_args!("{}", msg))
            .build());
    }

    #[test]
    fn test_records_are_filtered_and_formatted() {
        let logger: WriteLogger<String<128>> = WriteLogger::new(LevelFilter::Info);
        emit(&logger, Level::Info, "dropped, nothing attached");
        logger.attach(String::new());
        emit(&logger, Level::Info, "hello");
        emit(&logger, Level::Debug, "too verbose");
        emit(&logger, Level::Warn, "careful");
        let out = logger.detach().unwrap();
        assert_eq!(out.as_str(), "[INFO] hello\r\n[WARN] careful\r\n");
        assert!(logger.detach().is_none());
    }
}
