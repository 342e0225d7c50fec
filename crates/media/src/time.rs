//! Time types used for synchronizing decoded frames with a playback clock.

use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Neg, Sub};
use std::time::Duration;

/// A signed position on the playback timeline with millisecond precision.
///
/// Unlike [Duration], a [PlaybackTime] can be negative. This matters because
/// the difference between two playback times (e.g. a synchronization gap) is
/// itself a [PlaybackTime].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaybackTime(i64);

impl PlaybackTime {
    /// The start of the timeline.
    pub const ZERO: Self = Self(0);

    /// Construct from a number of milliseconds.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Construct from a (non-negative) [Duration], truncating to whole
    /// milliseconds. Durations too long to fit saturate.
    pub fn from_duration(duration: Duration) -> Self {
        Self(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
    }

    /// The number of milliseconds since the start of the timeline.
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// The time in (fractional) seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Whether this time lies before [PlaybackTime::ZERO].
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Convert a timestamp in `time_base` units to playback time, measured
    /// from `start_time` (an unknown start time counts as `0`).
    ///
    /// The result is truncated towards zero to whole milliseconds. Timestamps
    /// too far from the start time saturate.
    pub fn from_stream_timestamp(
        timestamp: i64,
        start_time: Option<i64>,
        time_base: Rational,
    ) -> Self {
        let ticks = timestamp.saturating_sub(start_time.unwrap_or(0));
        Self((1000.0 * ticks as f64 * time_base.to_f64()) as i64)
    }
}

impl Add for PlaybackTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for PlaybackTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for PlaybackTime {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Display for PlaybackTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A rational number, used for stream time bases (the length of one timestamp
/// tick in seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub numerator: i32,
    pub denominator: i32,
}

impl Rational {
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// The value as a float. A zero denominator yields `0.0`.
    pub fn to_f64(self) -> f64 {
        if self.denominator == 0 {
            0.0
        } else {
            f64::from(self.numerator) / f64::from(self.denominator)
        }
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn differences_can_be_negative() {
        let gap = PlaybackTime::from_millis(0) - PlaybackTime::from_millis(45);
        assert_eq!(gap, PlaybackTime::from_millis(-45));
        assert!(gap.is_negative());
        assert!(!PlaybackTime::ZERO.is_negative());
    }

    #[test]
    fn stream_timestamps_are_scaled_to_milliseconds() {
        let time_base = Rational::new(1, 1000);
        let time = PlaybackTime::from_stream_timestamp(40, None, time_base);
        assert_eq!(time.as_millis(), 40);

        let time = PlaybackTime::from_stream_timestamp(3, None, Rational::new(1, 2));
        assert_eq!(time.as_millis(), 1500);
    }

    #[test]
    fn start_time_is_subtracted() {
        let time_base = Rational::new(1, 1000);
        let time = PlaybackTime::from_stream_timestamp(1_080, Some(1_000), time_base);
        assert_eq!(time.as_millis(), 80);
    }

    #[test]
    fn extreme_timestamps_saturate() {
        let time_base = Rational::new(1, 1000);
        let time = PlaybackTime::from_stream_timestamp(i64::MAX - 10, Some(-100), time_base);
        assert_eq!(time, PlaybackTime::from_millis(i64::MAX));

        let time = PlaybackTime::from_stream_timestamp(i64::MIN + 10, Some(100), time_base);
        assert_eq!(time, PlaybackTime::from_millis(i64::MIN));
    }

    #[test]
    fn fractional_milliseconds_are_truncated() {
        // 1 tick of 1/30s is 33.33...ms.
        let time = PlaybackTime::from_stream_timestamp(1, None, Rational::new(1, 30));
        assert_eq!(time.as_millis(), 33);
    }

    #[test]
    fn durations_convert_to_whole_milliseconds() {
        let time = PlaybackTime::from_duration(Duration::from_micros(45_999));
        assert_eq!(time.as_millis(), 45);
    }

    #[test]
    fn zero_denominators_do_not_divide_by_zero() {
        assert_eq!(Rational::new(1, 0).to_f64(), 0.0);
    }
}
