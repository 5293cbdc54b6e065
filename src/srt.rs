//! SRT-format subtitle support.

use crate::time::{Period, Timestamp};

/// Format a timestamp using the standard SRT time format.
pub fn format_time(time: Timestamp) -> String {
    let millis = time.micros() / 1000;
    let (h, rem) = (millis / 3_600_000, millis % 3_600_000);
    let (m, rem) = (rem / 60_000, rem % 60_000);
    let (s, ms) = (rem / 1000, rem % 1000);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// A single SRT-format subtitle, minus the optional fields used in various
/// extended versions of the file format.
#[derive(Debug, PartialEq, Clone)]
pub struct Subtitle {
    /// The index of this subtitle. Indices start at 1 and increase with
    /// each subtitle, but may contain gaps where a detected subtitle was
    /// discarded for being too short.
    pub index: u64,

    /// The time period during which this subtitle is shown.
    pub period: Period,

    /// The text of this subtitle.
    pub content: String,
}

impl Subtitle {
    /// Serialize this subtitle as one SRT file entry, including the
    /// trailing blank line which separates entries.
    pub fn to_srt(&self) -> String {
        format!(
            "{}\n{} --> {}\n{}\n\n",
            self.index,
            format_time(self.period.begin()),
            format_time(self.period.end()),
            self.content
        )
    }
}
