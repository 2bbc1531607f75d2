use crate::frame::{scan_frames, Frame};
use crate::pulse::{classify, extract_pulses, PulseClass};
use crate::quality::{count_rising_gaps, QualitySummary};
use crate::{EDGE_BUFFER_SIZE, MAX_FRAMES_PER_CYCLE};
use core::fmt::Write;
use heapless::{String, Vec};

/// Width of one display status line.
pub const LINE_WIDTH: usize = 8;

/// One status line for the display.
pub type StatusLine = String<LINE_WIDTH>;

/// Outcome of one analysis cycle.
///
/// The three lines are rewritten in full every cycle and never mutated
/// piecemeal.
pub struct Report {
    pub score: u8,
    /// First frame decoded in the window, if any.
    pub frame: Option<Frame>,
    pub line1: StatusLine,
    pub line2: StatusLine,
    pub line3: StatusLine,
}

/// Builds one status line, keeping whatever fits the line width.
fn status_line(args: core::fmt::Arguments) -> StatusLine {
    let mut line = StatusLine::new();
    let _ = line.write_fmt(args);
    line
}

impl Report {
    /// Report for a window with nothing to analyze.
    fn without_signal(reason: &str) -> Self {
        Self {
            score: 0,
            frame: None,
            line1: status_line(format_args!("0")),
            line2: status_line(format_args!("{}", reason)),
            line3: StatusLine::new(),
        }
    }

    /// Applies the status policy; the first matching rule wins.
    fn from_summary(summary: &QualitySummary, frame: Option<Frame>) -> Self {
        let score = summary.score();
        let (line2, line3) = if let Some(frame) = frame {
            (
                status_line(format_args!("{:02}:{:02}", frame.hour, frame.minute)),
                status_line(format_args!("{:02}/{:02}", frame.day, frame.month)),
            )
        } else if score >= 50 {
            (
                status_line(format_args!("GOOD")),
                status_line(format_args!("NO FRAME")),
            )
        } else if score >= 30 {
            (
                status_line(format_args!("WEAK")),
                status_line(format_args!("{}/{}", summary.short_count, summary.long_count)),
            )
        } else {
            (status_line(format_args!("NOISE")), StatusLine::new())
        };
        Self {
            score,
            frame,
            line1: status_line(format_args!("{}", score)),
            line2,
            line3,
        }
    }
}

/// Runs the pulse, quality and frame stages over one edge snapshot.
///
/// Owns every scratch buffer the pipeline needs, so a cycle allocates
/// nothing and the buffers are reused from one report to the next.
pub struct SignalAnalyzer {
    low_starts: [u32; EDGE_BUFFER_SIZE],
    low_durs: [u32; EDGE_BUFFER_SIZE],
    rising: [u32; EDGE_BUFFER_SIZE],
    frames: Vec<Frame, MAX_FRAMES_PER_CYCLE>,
}

impl SignalAnalyzer {
    pub const fn new() -> Self {
        Self {
            low_starts: [0; EDGE_BUFFER_SIZE],
            low_durs: [0; EDGE_BUFFER_SIZE],
            rising: [0; EDGE_BUFFER_SIZE],
            frames: Vec::new(),
        }
    }

    /// Analyzes one time-ordered edge window and formats the status lines.
    pub fn analyze(&mut self, times: &[u32], levels: &[u8]) -> Report {
        if times.len() < 4 {
            return Report::without_signal("NO SIG");
        }
        let (pulse_count, rising_count) = extract_pulses(
            times,
            levels,
            &mut self.low_starts,
            &mut self.low_durs,
            &mut self.rising,
        );
        if pulse_count == 0 {
            return Report::without_signal("NO PULSE");
        }
        let mut short_count = 0;
        let mut long_count = 0;
        for &dur in &self.low_durs[..pulse_count] {
            match classify(dur) {
                PulseClass::Short => short_count += 1,
                PulseClass::Long => long_count += 1,
                PulseClass::Other => {}
            }
        }
        let (second_gaps, minute_gaps) = count_rising_gaps(&self.rising[..rising_count]);
        scan_frames(
            &self.low_starts[..pulse_count],
            &self.low_durs[..pulse_count],
            &mut self.frames,
        );
        let summary = QualitySummary {
            pulse_count,
            short_count,
            long_count,
            second_gaps,
            minute_gaps,
            frames_decoded: self.frames.len(),
        };
        Report::from_summary(&summary, self.frames.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::wire::encode_frame;
    use crate::FRAME_BITS;

    /// Edge-stream builder: the window opens on a rising edge so the first
    /// appended pulse has a preceding high phase.
    struct Waveform {
        times: std::vec::Vec<u32>,
        levels: std::vec::Vec<u8>,
    }

    impl Waveform {
        fn starting_high(t: u32) -> Self {
            Self {
                times: vec![t],
                levels: vec![1],
            }
        }

        /// Appends a low pulse: falling edge at `start`, rising at
        /// `start + dur_us`.
        fn pulse(&mut self, start: u32, dur_us: u32) -> &mut Self {
            self.times.push(start);
            self.levels.push(0);
            self.times.push(start + dur_us);
            self.levels.push(1);
            self
        }

        fn analyze(&self) -> Report {
            SignalAnalyzer::new().analyze(&self.times, &self.levels)
        }
    }

    fn afternoon_frame() -> Frame {
        Frame {
            minute: 37,
            hour: 14,
            day: 5,
            weekday: 3,
            month: 11,
            year: 24,
        }
    }

    /// One leading pulse, a 1.9 s minute gap, then the 59 frame pulses at
    /// one-second spacing.
    fn minute_waveform(bits: &[u8; FRAME_BITS]) -> Waveform {
        let mut wave = Waveform::starting_high(0);
        wave.pulse(500_000, 100_000);
        let mut start = 2_400_000;
        for &bit in bits {
            wave.pulse(start, if bit != 0 { 200_000 } else { 100_000 });
            start += 1_000_000;
        }
        wave
    }

    #[test]
    fn empty_window_reports_no_signal() {
        let report = SignalAnalyzer::new().analyze(&[], &[]);
        assert_eq!(report.score, 0);
        assert_eq!(report.line1.as_str(), "0");
        assert_eq!(report.line2.as_str(), "NO SIG");
        assert_eq!(report.line3.as_str(), "");
    }

    #[test]
    fn stuck_low_input_reports_no_pulse() {
        // a falling edge followed by same-level glitches: enough edges to
        // analyze, but no closed pulse
        let times = [0, 1_000_000, 2_000_000, 3_000_000];
        let levels = [1, 0, 0, 0];
        let report = SignalAnalyzer::new().analyze(&times, &levels);
        assert_eq!(report.score, 0);
        assert_eq!(report.line2.as_str(), "NO PULSE");
        assert!(report.frame.is_none());
    }

    #[test]
    fn clean_second_ticks_without_a_frame_report_good() {
        let mut wave = Waveform::starting_high(0);
        for i in 1..=12u32 {
            wave.pulse(i * 1_000_000, 100_000);
        }
        let report = wave.analyze();
        // 11 second gaps (40) + all-short ratio (20) + no others (10)
        assert_eq!(report.score, 70);
        assert_eq!(report.line1.as_str(), "70");
        assert_eq!(report.line2.as_str(), "GOOD");
        assert_eq!(report.line3.as_str(), "NO FRAME");
        assert!(report.frame.is_none());
    }

    #[test]
    fn clean_minute_frame_decodes_and_shows_the_time() {
        let report = minute_waveform(&encode_frame(&afternoon_frame())).analyze();
        assert_eq!(report.frame, Some(afternoon_frame()));
        assert!(report.score >= 80);
        assert_eq!(report.line2.as_str(), "14:37");
        assert_eq!(report.line3.as_str(), "05/11");
    }

    #[test]
    fn parity_violation_falls_through_to_the_score_branches() {
        let mut bits = encode_frame(&afternoon_frame());
        bits[21] ^= 1;
        let report = minute_waveform(&bits).analyze();
        assert!(report.frame.is_none());
        // the pulses still classify cleanly, only the decode is lost
        assert_eq!(report.score, 90);
        assert_eq!(report.line2.as_str(), "GOOD");
        assert_eq!(report.line3.as_str(), "NO FRAME");
    }

    #[test]
    fn pure_noise_reports_noise() {
        // 50 unclassifiable pulses, rising edges pinned 1.15 s apart so the
        // gap histograms stay empty
        let mut wave = Waveform::starting_high(0);
        let mut rising = 500_000;
        for i in 0..50u32 {
            let dur = 300_000 + (i * 61 % 601) * 1_000;
            let start = rising + 1_150_000 - dur;
            wave.pulse(start, dur);
            rising = start + dur;
        }
        let report = wave.analyze();
        assert!(report.score <= 10);
        assert_eq!(report.line2.as_str(), "NOISE");
        assert_eq!(report.line3.as_str(), "");
    }

    #[test]
    fn weak_signal_reports_the_class_counts() {
        // 6 classifiable pulses at second spacing, 6 unclassifiable ones
        // spread out: 5 second gaps (20) + 0.5 ratio (10) = 30
        let mut wave = Waveform::starting_high(0);
        for i in 0..6u32 {
            wave.pulse(1_000_000 + i * 1_000_000, if i % 2 == 0 { 100_000 } else { 200_000 });
        }
        let mut rising_t = 6_200_000;
        for _ in 0..6 {
            rising_t += 1_150_000;
            wave.pulse(rising_t - 400_000, 400_000);
        }
        let report = wave.analyze();
        assert_eq!(report.score, 30);
        assert_eq!(report.line2.as_str(), "WEAK");
        assert_eq!(report.line3.as_str(), "3/3");
    }

    #[test]
    fn score_stays_in_range_for_adversarial_windows() {
        let mut degenerate = Waveform::starting_high(0);
        degenerate.pulse(100_000, 30_000).pulse(400_000, 30_000);
        for wave in [
            minute_waveform(&encode_frame(&afternoon_frame())),
            degenerate,
        ] {
            let report = wave.analyze();
            assert!(report.score <= 100);
        }
    }
}
