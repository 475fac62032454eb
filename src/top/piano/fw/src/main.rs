#![no_std]
#![no_main]

use core::fmt::Write;
use log::info;
use riscv_rt::entry;

use panic_halt as _;

use piano_fw::*;
use piano_lib::control::Controller;

#[entry]
fn main() -> ! {
    // The logger owns the transmitter, the command loop the receiver.
    let (mut commands, mut console) = unsafe { Serial0::steal() }.split();
    console.write_str("\r\n").ok();
    handlers::logger_init(console);

    info!("Hello from piano! ({} voices)", N_VOICES);

    let tonegen = unsafe { ToneGenerator0::steal() };
    let mut controller: Controller<ToneGenerator0, N_VOICES> = Controller::new(tonegen);
    controller.run(&mut commands)
}
