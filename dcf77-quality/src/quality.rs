use crate::{time_diff, MINUTE_GAP_MIN_US, SECOND_GAP_MAX_US, SECOND_GAP_MIN_US};

/// Counts second-like and minute-like gaps between adjacent rising edges.
///
/// Second-like gaps sit inside the 1 Hz carrier window; minute-like gaps
/// are long enough to be the skipped 59th second.
pub fn count_rising_gaps(rising: &[u32]) -> (usize, usize) {
    let mut second_gaps = 0;
    let mut minute_gaps = 0;
    for pair in rising.windows(2) {
        let gap = time_diff(pair[0], pair[1]);
        if (SECOND_GAP_MIN_US..=SECOND_GAP_MAX_US).contains(&gap) {
            second_gaps += 1;
        }
        if gap >= MINUTE_GAP_MIN_US {
            minute_gaps += 1;
        }
    }
    (second_gaps, minute_gaps)
}

/// Evidence gathered from one analysis window.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct QualitySummary {
    pub pulse_count: usize,
    pub short_count: usize,
    pub long_count: usize,
    /// Adjacent rising gaps inside the 1 Hz carrier window.
    pub second_gaps: usize,
    /// Adjacent rising gaps long enough to be a minute mark.
    pub minute_gaps: usize,
    pub frames_decoded: usize,
}

impl QualitySummary {
    /// Pulses that fit neither bit window.
    pub fn other_count(&self) -> usize {
        self.pulse_count - self.short_count - self.long_count
    }

    /// Additive reception score in 0..=100.
    ///
    /// Each term is a separate evidence channel. The tiers are fixed and a
    /// value on a tier boundary takes the higher tier; the ratio tiers use
    /// integer cross-products so the boundaries are exact.
    pub fn score(&self) -> u8 {
        let mut score = 0;
        if self.second_gaps >= 10 {
            score += 40;
        } else if self.second_gaps >= 5 {
            score += 20;
        } else if self.second_gaps >= 2 {
            score += 10;
        }
        if self.minute_gaps >= 1 {
            score += 20;
        }
        if self.pulse_count > 0 {
            // (short + long) / total against 0.7 and 0.5
            let classified = self.short_count + self.long_count;
            if classified * 10 >= self.pulse_count * 7 {
                score += 20;
            } else if classified * 2 >= self.pulse_count {
                score += 10;
            }
            // other / total against 0.2 and 0.4
            let other = self.other_count();
            if other * 5 <= self.pulse_count {
                score += 10;
            } else if other * 5 <= self.pulse_count * 2 {
                score += 5;
            }
        }
        if self.frames_decoded > 0 {
            score += 10;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_windows_are_inclusive() {
        let rising = [0, 900_000, 2_000_000, 2_899_999, 4_099_999, 5_299_999];
        // gaps: 900_000, 1_100_000, 899_999, 1_200_000, 1_200_000
        let (second_gaps, minute_gaps) = count_rising_gaps(&rising);
        assert_eq!(second_gaps, 2);
        assert_eq!(minute_gaps, 2);
    }

    #[test]
    fn gap_just_under_a_second_does_not_count() {
        let (second_gaps, minute_gaps) = count_rising_gaps(&[0, 899_999]);
        assert_eq!((second_gaps, minute_gaps), (0, 0));
    }

    #[test]
    fn empty_summary_scores_zero() {
        assert_eq!(QualitySummary::default().score(), 0);
    }

    #[test]
    fn perfect_reception_scores_one_hundred() {
        let summary = QualitySummary {
            pulse_count: 60,
            short_count: 40,
            long_count: 20,
            second_gaps: 58,
            minute_gaps: 1,
            frames_decoded: 1,
        };
        assert_eq!(summary.score(), 100);
    }

    #[test]
    fn ratio_boundaries_take_the_higher_tier() {
        let exactly_seventy_percent = QualitySummary {
            pulse_count: 10,
            short_count: 7,
            ..QualitySummary::default()
        };
        // 0.7 classified earns 20; 0.3 other is within 0.4 and earns 5
        assert_eq!(exactly_seventy_percent.score(), 25);

        let exactly_half = QualitySummary {
            pulse_count: 10,
            short_count: 3,
            long_count: 2,
            ..QualitySummary::default()
        };
        // 0.5 classified earns 10; 0.5 other earns nothing
        assert_eq!(exactly_half.score(), 10);

        let exactly_one_fifth_other = QualitySummary {
            pulse_count: 10,
            short_count: 8,
            ..QualitySummary::default()
        };
        assert_eq!(exactly_one_fifth_other.score(), 30);
    }

    #[test]
    fn second_gap_tiers() {
        let base = QualitySummary::default();
        for (gaps, points) in [(0, 0), (1, 0), (2, 10), (5, 20), (9, 20), (10, 40)] {
            let summary = QualitySummary {
                second_gaps: gaps,
                ..base
            };
            assert_eq!(summary.score(), points, "second_gaps = {}", gaps);
        }
    }

    #[test]
    fn class_counts_always_partition_the_pulses() {
        let summary = QualitySummary {
            pulse_count: 50,
            short_count: 12,
            long_count: 30,
            ..QualitySummary::default()
        };
        assert_eq!(
            summary.short_count + summary.long_count + summary.other_count(),
            summary.pulse_count
        );
    }
}
