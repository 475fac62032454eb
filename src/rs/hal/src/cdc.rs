// Request/acknowledge handshake with the audio clock domain.
//
// The tone generator latches its configuration registers in its own
// clock domain. After writing any of them, the CPU raises REQ and the
// audio side answers on ACK once the new values are visible there:
//
//   REQ  ___/‾‾‾‾‾‾‾‾‾\_________
//   ACK  ______/‾‾‾‾‾‾‾‾‾‾\_____
//
// The next configuration write is only meaningful once ACK has
// dropped again.

use crate::registers::{Register, Registers};
use strum_macros::IntoStaticStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum HandshakePhase {
    AckHigh,
    AckLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdcError {
    AckTimeout { phase: HandshakePhase },
}

/// Run the full handshake, spinning forever if the audio domain never
/// answers. A stalled ACK halts the firmware here.
pub fn handshake<R: Registers>(regs: &mut R) {
    regs.write(Register::CpuReq, 1);
    while !regs.ack() {}
    regs.write(Register::CpuReq, 0);
    while regs.ack() {}
}

/// Same sequence as [`handshake`], but each spin gives up after
/// `max_polls` reads of ACK. REQ is always left deasserted.
pub fn handshake_bounded<R: Registers>(regs: &mut R, max_polls: u32) -> Result<(), CdcError> {
    regs.write(Register::CpuReq, 1);
    let acked = wait_for_ack(regs, true, max_polls);
    regs.write(Register::CpuReq, 0);
    if !acked {
        return Err(timeout(HandshakePhase::AckHigh, max_polls));
    }
    if !wait_for_ack(regs, false, max_polls) {
        return Err(timeout(HandshakePhase::AckLow, max_polls));
    }
    Ok(())
}

fn wait_for_ack<R: Registers>(regs: &R, level: bool, max_polls: u32) -> bool {
    (0..max_polls).any(|_| regs.ack() == level)
}

fn timeout(phase: HandshakePhase, max_polls: u32) -> CdcError {
    let name: &'static str = phase.into();
    log::warn!("cdc: gave up waiting for {} after {} polls", name, max_polls);
    CdcError::AckTimeout { phase }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{AckBehaviour, DummyRegisters};
    use crate::tests::setup_logger;

    #[test]
    fn test_handshake_toggles_req() {
        setup_logger();
        let mut regs = DummyRegisters::new();
        handshake(&mut regs);
        assert_eq!(regs.read(Register::CpuReq), 0);
        assert!(!regs.ack());
        assert_eq!(regs.handshakes(), 1);
        assert_eq!(regs.history_of(Register::CpuReq).as_slice(), &[1, 0]);
    }

    #[test]
    fn test_handshake_waits_for_slow_ack() {
        setup_logger();
        let mut regs = DummyRegisters::new();
        regs.set_ack_behaviour(AckBehaviour::Delayed(5));
        handshake(&mut regs);
        assert_eq!(regs.handshakes(), 1);
        assert!(regs.ack_polls() >= 10);
    }

    #[test]
    fn test_bounded_handshake_completes() {
        setup_logger();
        let mut regs = DummyRegisters::new();
        regs.set_ack_behaviour(AckBehaviour::Delayed(3));
        assert_eq!(handshake_bounded(&mut regs, 16), Ok(()));
        assert_eq!(regs.handshakes(), 1);
    }

    #[test]
    fn test_bounded_handshake_times_out_on_stuck_low() {
        setup_logger();
        let mut regs = DummyRegisters::new();
        regs.set_ack_behaviour(AckBehaviour::StuckLow);
        assert_eq!(handshake_bounded(&mut regs, 8),
                   Err(CdcError::AckTimeout { phase: HandshakePhase::AckHigh }));
        // REQ must not be left asserted.
        assert_eq!(regs.read(Register::CpuReq), 0);
    }

    #[test]
    fn test_bounded_handshake_times_out_on_stuck_high() {
        setup_logger();
        let mut regs = DummyRegisters::new();
        regs.set_ack_behaviour(AckBehaviour::StuckHigh);
        assert_eq!(handshake_bounded(&mut regs, 8),
                   Err(CdcError::AckTimeout { phase: HandshakePhase::AckLow }));
        assert_eq!(regs.read(Register::CpuReq), 0);
    }
}
