use crate::{time_diff, ONE_BIT_MAX_US, ONE_BIT_MIN_US, ZERO_BIT_MAX_US, ZERO_BIT_MIN_US};

/// Classification of one low phase by its duration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PulseClass {
    /// Carrier dip of a 0 bit.
    Short,
    /// Carrier dip of a 1 bit.
    Long,
    /// Outside both bit windows.
    Other,
}

/// Classifies a low-phase duration into one of the three pulse classes.
pub fn classify(dur_us: u32) -> PulseClass {
    if (ZERO_BIT_MIN_US..=ZERO_BIT_MAX_US).contains(&dur_us) {
        PulseClass::Short
    } else if (ONE_BIT_MIN_US..=ONE_BIT_MAX_US).contains(&dur_us) {
        PulseClass::Long
    } else {
        PulseClass::Other
    }
}

/// Scans adjacent edge pairs into low-phase pulses and rising-edge
/// timestamps.
///
/// A `1→0` pair opens a low phase at the later timestamp; the next `0→1`
/// pair closes it, emitting `(start, duration)` and the rising timestamp.
/// Same-level pairs are glitches: they neither open nor close a phase, and
/// an open phase survives them. A phase still open at the end of the window
/// is dropped, as is a zero-duration phase. Returns `(pulses, risings)`
/// written to the output slices.
pub fn extract_pulses(
    times: &[u32],
    levels: &[u8],
    low_starts: &mut [u32],
    low_durs: &mut [u32],
    rising: &mut [u32],
) -> (usize, usize) {
    debug_assert_eq!(times.len(), levels.len());
    let mut pulses = 0;
    let mut risings = 0;
    let mut low_start = 0u32;
    let mut low_active = false;
    for i in 0..times.len().saturating_sub(1) {
        let a = levels[i];
        let b = levels[i + 1];
        let tb = times[i + 1];
        if a == 1 && b == 0 {
            low_start = tb;
            low_active = true;
        } else if a == 0 && b == 1 && low_active {
            let dur = time_diff(low_start, tb);
            if dur > 0 {
                low_starts[pulses] = low_start;
                low_durs[pulses] = dur;
                pulses += 1;
            }
            low_active = false;
            rising[risings] = tb;
            risings += 1;
        }
    }
    (pulses, risings)
}
