//! DCF77 signal-quality pipeline: debounced edge capture, pulse extraction,
//! reception scoring and minute-frame decoding.
//!
//! Everything in this crate is plain data plus arithmetic, with no
//! allocation and no I/O, so the firmware can run it between edge
//! interrupts and the host can run the tests.
#![cfg_attr(not(test), no_std)]

pub mod edge_buffer;
pub mod frame;
pub mod pulse;
pub mod quality;
pub mod report;

pub use edge_buffer::{EdgeBuffer, EdgeSnapshot};
pub use frame::{decode_frame, Frame};
pub use pulse::PulseClass;
pub use quality::QualitySummary;
pub use report::{Report, SignalAnalyzer, LINE_WIDTH};

/// Capacity of the edge ring and of all scratch buffers derived from it.
pub const EDGE_BUFFER_SIZE: usize = 2048;

/// Transitions closer together than this are receiver chatter, not pulse
/// boundaries.
pub const DEBOUNCE_US: u32 = 20_000;

/// Low-phase duration window of a 0 bit (~100 ms carrier dip).
pub const ZERO_BIT_MIN_US: u32 = 60_000;
pub const ZERO_BIT_MAX_US: u32 = 140_000;

/// Low-phase duration window of a 1 bit (~200 ms carrier dip).
pub const ONE_BIT_MIN_US: u32 = 160_000;
pub const ONE_BIT_MAX_US: u32 = 260_000;

/// Rising-edge gap window that matches the 1 Hz carrier.
pub const SECOND_GAP_MIN_US: u32 = 900_000;
pub const SECOND_GAP_MAX_US: u32 = 1_100_000;

/// Rising-edge gap long enough to be the skipped 59th second.
pub const MINUTE_GAP_MIN_US: u32 = 1_200_000;

/// Bits in one DCF77 minute frame.
pub const FRAME_BITS: usize = 59;

/// Upper bound on frames decoded per analysis cycle.
pub const MAX_FRAMES_PER_CYCLE: usize = 10;

/// Microseconds from `t0` to `t1`, correct across the 2^32 wrap of the
/// timestamp counter.
pub fn time_diff(t0: u32, t1: u32) -> u32 {
    t1.wrapping_sub(t0)
}
