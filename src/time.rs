//! Tools for working with time.

use std::{fmt, ops::Add, time::Duration};

use anyhow::anyhow;

use crate::Result;

/// A point in time, measured from the start of the video. Stored as integer
/// microseconds so that repeated arithmetic and formatting never accumulate
/// floating-point drift. This is a lightweight structure which implements
/// `Copy`, so it can be passed by value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    micros: u64,
}

impl Timestamp {
    /// Create a timestamp from a raw microsecond count.
    pub const fn from_micros(micros: u64) -> Timestamp {
        Timestamp { micros }
    }

    /// The timestamp at which the specified frame is displayed, given a
    /// fixed frame rate.
    pub fn from_frame(frame: u64, fps: f64) -> Timestamp {
        debug_assert!(fps > 0.0);
        Timestamp {
            micros: (frame as f64 / fps * 1_000_000.0).round() as u64,
        }
    }

    /// This timestamp as a raw microsecond count.
    pub fn micros(self) -> u64 {
        self.micros
    }

    /// The time elapsed between `earlier` and this timestamp, saturating to
    /// zero if `earlier` is actually later.
    pub fn duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.micros.saturating_sub(earlier.micros))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp {
            micros: self.micros + rhs.as_micros() as u64,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.micros as f64 / 1_000_000.0)
    }
}

/// A period of time. The beginning is guaranteed to be less than the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    begin: Timestamp,
    end: Timestamp,
}

impl Period {
    /// Create a new time period.
    pub fn new(begin: Timestamp, end: Timestamp) -> Result<Period> {
        if begin < end {
            Ok(Period { begin, end })
        } else {
            Err(anyhow!(
                "beginning of period is not before end: {}-{}",
                begin,
                end
            ))
        }
    }

    /// The beginning of this time period.
    pub fn begin(&self) -> Timestamp {
        self.begin
    }

    /// The end of this time period.
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// How long this time period lasts.
    pub fn duration(&self) -> Duration {
        self.end.duration_since(self.begin)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn timestamp_from_frame() {
        assert_eq!(Timestamp::from_micros(0), Timestamp::from_frame(0, 30.0));
        assert_eq!(
            Timestamp::from_micros(333_333),
            Timestamp::from_frame(10, 30.0)
        );
        // NTSC-style fractional rates round to the nearest microsecond.
        assert_eq!(
            Timestamp::from_micros(33_367),
            Timestamp::from_frame(1, 30000.0 / 1001.0)
        );
    }

    #[test]
    fn timestamp_arithmetic() {
        let t = Timestamp::from_micros(1_500_000) + Duration::from_millis(500);
        assert_eq!(Timestamp::from_micros(2_000_000), t);
        assert_eq!(
            Duration::from_micros(500_000),
            t.duration_since(Timestamp::from_micros(1_500_000))
        );
        // Saturates rather than panicking when the order is reversed.
        assert_eq!(
            Duration::ZERO,
            Timestamp::from_micros(1).duration_since(Timestamp::from_micros(2))
        );
    }

    #[test]
    fn period_requires_begin_before_end() {
        let t1 = Timestamp::from_micros(1_000_000);
        let t2 = Timestamp::from_micros(5_000_000);
        let period = Period::new(t1, t2).unwrap();
        assert_eq!(t1, period.begin());
        assert_eq!(t2, period.end());
        assert_eq!(Duration::from_secs(4), period.duration());
        assert!(Period::new(t2, t1).is_err());
        assert!(Period::new(t1, t1).is_err());
    }
}
