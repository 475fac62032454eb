// Voice allocation for the tone generator.
//
// Each hardware oscillator is a voice. Notes are identified by their
// frequency control word, so a pool never holds the same fcw on two
// active voices. When every voice is busy the note that started
// earliest is evicted (least-recently-started, not least-recently-used).
//
// The pool is plain data mutated through `&mut self` and is not meant
// to be shared between execution contexts.

use log::{debug, warn};

pub type VoiceIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoiceSlot {
    pub active: bool,
    /// Only meaningful while `active`.
    pub frequency_control_word: u32,
    /// Cycle counter snapshot at assignment, only meaningful while `active`.
    pub start_time: u32,
}

impl VoiceSlot {
    pub const IDLE: VoiceSlot = VoiceSlot {
        active: false,
        frequency_control_word: 0,
        start_time: 0,
    };

    fn plays(&self, fcw: u32) -> bool {
        self.active && self.frequency_control_word == fcw
    }

    fn assign(&mut self, fcw: u32, now: u32) {
        *self = VoiceSlot {
            active: true,
            frequency_control_word: fcw,
            start_time: now,
        };
    }
}

/// Fixed pool of `N` voices. The enable bitmap is 32 bits wide, so
/// `N` is limited to 1..=32.
#[derive(Debug, Clone)]
pub struct VoicePool<const N: usize> {
    slots: [VoiceSlot; N],
}

impl<const N: usize> VoicePool<N> {
    const CAPACITY_CHECK: () = assert!(N > 0 && N <= 32, "voice count must be within 1..=32");

    pub const fn new() -> Self {
        let () = Self::CAPACITY_CHECK;
        Self { slots: [VoiceSlot::IDLE; N] }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn slots(&self) -> &[VoiceSlot; N] {
        &self.slots
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Voice currently playing `fcw`, if any.
    pub fn voice_for(&self, fcw: u32) -> Option<VoiceIndex> {
        self.slots.iter().position(|s| s.plays(fcw))
    }

    /// Assign a voice to `fcw`, returning its index.
    ///
    /// - If `fcw` is already playing, its voice is returned untouched
    ///   (start time is not refreshed).
    /// - Otherwise the lowest-numbered free voice is used.
    /// - Otherwise the voice with the smallest start time is evicted,
    ///   the lowest index winning ties.
    pub fn start_note(&mut self, fcw: u32, now: u32) -> VoiceIndex {
        if let Some(voice) = self.voice_for(fcw) {
            debug!("voice: fcw={:#x} already on voice {}", fcw, voice);
            return voice;
        }

        if let Some(voice) = self.slots.iter().position(|s| !s.active) {
            self.slots[voice].assign(fcw, now);
            return voice;
        }

        let mut oldest = 0;
        for (i, slot) in self.slots.iter().enumerate().skip(1) {
            if slot.start_time < self.slots[oldest].start_time {
                oldest = i;
            }
        }
        debug!("voice: evict voice {} (fcw={:#x}, started {}) for fcw={:#x}",
               oldest, self.slots[oldest].frequency_control_word,
               self.slots[oldest].start_time, fcw);
        self.slots[oldest].assign(fcw, now);
        oldest
    }

    /// Release the voice playing `fcw`. Returns `None` and changes
    /// nothing if no voice plays it.
    ///
    /// The scan does not stop at the first match: should two voices
    /// ever hold the same fcw, the highest-numbered one is released.
    pub fn stop_note(&mut self, fcw: u32) -> Option<VoiceIndex> {
        let mut found = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.plays(fcw) {
                if let Some(previous) = found {
                    warn!("voice: fcw={:#x} active on voices {} and {}", fcw, previous, i);
                }
                found = Some(i);
            }
        }
        let voice = found?;
        self.slots[voice] = VoiceSlot::IDLE;
        Some(voice)
    }

    pub fn reset(&mut self) {
        self.slots = [VoiceSlot::IDLE; N];
    }

    /// Bit `i` set iff voice `i` is active.
    pub fn active_bitmap(&self) -> u32 {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .fold(0u32, |en, (i, _)| en | (1 << i))
    }
}

impl<const N: usize> Default for VoicePool<N> {
    fn default() -> Self {
        Self::new()
    }
}
