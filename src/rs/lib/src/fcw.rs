// Frequency control words for the tone generator NCOs.
//
// Every voice is a numerically controlled oscillator with a 24-bit
// phase accumulator, incremented by its fcw once per sample.

pub const PHASE_ACC_BITS: u32 = 24;
pub const FCW_MAX: u32 = (1 << PHASE_ACC_BITS) - 1;

/// 150MHz system clock divided down by 2500.
pub const SAMPLE_RATE_HZ: f32 = 60_000.0;

const PHASE_ACC_RANGE: f32 = (1u32 << PHASE_ACC_BITS) as f32;

/// Nearest fcw for `freq_hz`, saturating at both ends of the
/// accumulator range.
pub fn freq_to_fcw(freq_hz: f32) -> u32 {
    let fcw = freq_hz / SAMPLE_RATE_HZ * PHASE_ACC_RANGE;
    if fcw <= 0.0 {
        0
    } else if fcw >= FCW_MAX as f32 {
        FCW_MAX
    } else {
        (fcw + 0.5) as u32
    }
}

pub fn fcw_to_freq(fcw: u32) -> f32 {
    (fcw & FCW_MAX) as f32 * SAMPLE_RATE_HZ / PHASE_ACC_RANGE
}

/// Frequency step between adjacent fcw values.
pub fn resolution_hz() -> f32 {
    SAMPLE_RATE_HZ / PHASE_ACC_RANGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4() {
        // 440 / 60000 * 2^24 = 123032.92
        assert_eq!(freq_to_fcw(440.0), 123033);
        let back = fcw_to_freq(123033);
        assert!((back - 440.0).abs() < resolution_hz());
    }

    #[test]
    fn test_saturation() {
        assert_eq!(freq_to_fcw(-10.0), 0);
        assert_eq!(freq_to_fcw(0.0), 0);
        assert_eq!(freq_to_fcw(SAMPLE_RATE_HZ), FCW_MAX);
    }

    #[test]
    fn test_resolution() {
        assert!((resolution_hz() - 0.003_576_28).abs() < 1e-6);
    }
}
