use crate::pulse::{classify, PulseClass};
use crate::{time_diff, FRAME_BITS, MAX_FRAMES_PER_CYCLE, MINUTE_GAP_MIN_US};
use heapless::Vec;

/// Date and time carried by one decoded minute frame.
///
/// The year is the year of the century; the weekday runs Monday = 1 to
/// Sunday = 7, as transmitted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Frame {
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub weekday: u8,
    pub month: u8,
    pub year: u8,
}

// BCD weights per field, sized exactly to the field's data bits.
const MINUTE_WEIGHTS: [u8; 7] = [1, 2, 4, 8, 10, 20, 40];
const HOUR_WEIGHTS: [u8; 6] = [1, 2, 4, 8, 10, 20];
const DAY_WEIGHTS: [u8; 6] = [1, 2, 4, 8, 10, 20];
const WEEKDAY_WEIGHTS: [u8; 3] = [1, 2, 4];
const MONTH_WEIGHTS: [u8; 5] = [1, 2, 4, 8, 10];
const YEAR_WEIGHTS: [u8; 8] = [1, 2, 4, 8, 10, 20, 40, 80];

/// True when the set bits in `data` plus the parity bit are even in number.
fn even_parity(data: &[u8], parity_bit: u8) -> bool {
    let ones = data.iter().filter(|&&b| b != 0).count();
    (ones + parity_bit as usize) % 2 == 0
}

/// Sums the weights of the set bits. With a parity bit given, the field is
/// valid only when the even-parity rule holds.
fn decode_bcd(bits: &[u8], weights: &[u8], parity_bit: Option<u8>) -> Option<u8> {
    debug_assert_eq!(bits.len(), weights.len());
    if let Some(p) = parity_bit {
        if !even_parity(bits, p) {
            return None;
        }
    }
    let mut sum = 0;
    for (bit, weight) in bits.iter().zip(weights) {
        if *bit != 0 {
            sum += weight;
        }
    }
    Some(sum)
}

/// Decodes one aligned 59-bit frame.
///
/// Rejects the frame when the start-of-minute marker (bit 0) is not 0, the
/// start-of-time marker (bit 20) is not 1, or any of the three parities
/// (minutes, hours, date block) fails.
pub fn decode_frame(bits: &[u8; FRAME_BITS]) -> Option<Frame> {
    if bits[0] != 0 || bits[20] != 1 {
        return None;
    }
    let minute = decode_bcd(&bits[21..28], &MINUTE_WEIGHTS, Some(bits[28]))?;
    let hour = decode_bcd(&bits[29..35], &HOUR_WEIGHTS, Some(bits[35]))?;
    // a single parity bit covers the whole date block
    if !even_parity(&bits[36..58], bits[58]) {
        return None;
    }
    let day = decode_bcd(&bits[36..42], &DAY_WEIGHTS, None)?;
    let weekday = decode_bcd(&bits[42..45], &WEEKDAY_WEIGHTS, None)?;
    let month = decode_bcd(&bits[45..50], &MONTH_WEIGHTS, None)?;
    let year = decode_bcd(&bits[50..58], &YEAR_WEIGHTS, None)?;
    Some(Frame {
        minute,
        hour,
        day,
        weekday,
        month,
        year,
    })
}

/// Finds minute-aligned runs of pulses and decodes them into frames.
///
/// A gap of at least [`MINUTE_GAP_MIN_US`] between consecutive pulse starts
/// is the skipped 59th second, so the pulse after it is second 0. A
/// candidate is abandoned as soon as one of its 59 pulses fits neither bit
/// window; scanning then continues at the next gap. Stops once the output
/// vector is full.
pub fn scan_frames(
    low_starts: &[u32],
    low_durs: &[u32],
    frames: &mut Vec<Frame, MAX_FRAMES_PER_CYCLE>,
) {
    debug_assert_eq!(low_starts.len(), low_durs.len());
    frames.clear();
    let pulse_count = low_starts.len();
    for i in 0..pulse_count.saturating_sub(1) {
        if frames.is_full() {
            break;
        }
        if time_diff(low_starts[i], low_starts[i + 1]) < MINUTE_GAP_MIN_US {
            continue;
        }
        let start = i + 1;
        if start + FRAME_BITS > pulse_count {
            continue;
        }
        let mut bits = [0u8; FRAME_BITS];
        let mut valid = true;
        for (j, bit) in bits.iter_mut().enumerate() {
            match classify(low_durs[start + j]) {
                PulseClass::Short => *bit = 0,
                PulseClass::Long => *bit = 1,
                PulseClass::Other => {
                    valid = false;
                    break;
                }
            }
        }
        if !valid {
            continue;
        }
        if let Some(frame) = decode_frame(&bits) {
            frames.push(frame).ok();
        }
    }
}

#[cfg(test)]
pub(crate) mod wire {
    //! Builders for well-formed frames, shared by the unit tests.

    use super::*;

    fn parity_of(bits: &[u8]) -> u8 {
        (bits.iter().filter(|&&b| b != 0).count() % 2) as u8
    }

    fn encode_bcd(value: u8, bits: &mut [u8], weights: &[u8]) {
        let mut rest = value;
        for i in (0..weights.len()).rev() {
            if rest >= weights[i] {
                bits[i] = 1;
                rest -= weights[i];
            }
        }
        assert_eq!(rest, 0, "value {} does not fit the weights", value);
    }

    /// Encodes a frame with correct markers and all three parities.
    pub(crate) fn encode_frame(frame: &Frame) -> [u8; FRAME_BITS] {
        let mut bits = [0u8; FRAME_BITS];
        bits[20] = 1;
        encode_bcd(frame.minute, &mut bits[21..28], &MINUTE_WEIGHTS);
        bits[28] = parity_of(&bits[21..28]);
        encode_bcd(frame.hour, &mut bits[29..35], &HOUR_WEIGHTS);
        bits[35] = parity_of(&bits[29..35]);
        encode_bcd(frame.day, &mut bits[36..42], &DAY_WEIGHTS);
        encode_bcd(frame.weekday, &mut bits[42..45], &WEEKDAY_WEIGHTS);
        encode_bcd(frame.month, &mut bits[45..50], &MONTH_WEIGHTS);
        encode_bcd(frame.year, &mut bits[50..58], &YEAR_WEIGHTS);
        bits[58] = parity_of(&bits[36..58]);
        bits
    }
}
