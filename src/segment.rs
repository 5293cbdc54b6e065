//! Temporal segmentation of per-frame OCR readings into subtitle intervals.
//!
//! OCR gives us one noisy reading per frame. The [`Segmenter`] compares each
//! reading to the previous frame's and decides when a subtitle appeared or
//! disappeared; the [`SegmentBuilder`] turns a closed interval into a
//! [`Subtitle`] if it lasted long enough to be real.

use std::time::Duration;

use log::{debug, trace};

use crate::{
    normalize::{normalize_for_comparison, normalize_for_display, SpellCorrect},
    similarity::similarity,
    srt::Subtitle,
    time::{Period, Timestamp},
    Result,
};

/// Tunable constants for the segmentation engine.
#[derive(Clone, Copy, Debug)]
pub struct SegmenterConfig {
    /// The frame rate used to convert frame indices into timestamps.
    pub fps: f64,

    /// Two consecutive readings with a character-set similarity at or below
    /// this value are treated as different on-screen text.
    pub sim_threshold: f64,

    /// Detected subtitles lasting no longer than this are discarded as
    /// noise.
    pub min_duration: Duration,

    /// A fixed offset added to every boundary timestamp. The default
    /// shifts all subtitles forward by 2 seconds; it's unclear whether
    /// this compensates for OCR detection lag or is a historical
    /// accident, so it stays a named, overridable setting rather than
    /// being baked into the timestamp math.
    pub lead_bias: Duration,
}

impl SegmenterConfig {
    /// Default tuning for the given frame rate.
    pub fn new(fps: f64) -> SegmenterConfig {
        SegmenterConfig {
            fps,
            sim_threshold: 0.7,
            min_duration: Duration::from_millis(500),
            lead_bias: Duration::from_secs(2),
        }
    }
}

/// A boundary event detected while stepping the segmenter. One frame can
/// produce both: the end of one subtitle and the start of the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentEvent {
    /// New on-screen text was detected and a candidate interval opened.
    Opened {
        /// The subtitle number assigned to this candidate.
        index: u64,
        /// When the candidate starts (lead bias already applied).
        start: Timestamp,
    },

    /// The tracked text disappeared or changed, closing the candidate.
    Closed {
        /// The subtitle number assigned when the candidate opened.
        index: u64,
        /// When the candidate started.
        start: Timestamp,
        /// When the candidate ended (lead bias already applied).
        end: Timestamp,
        /// Display text of the reading that was on screen.
        content: String,
    },
}

/// A subtitle interval we're still tracking, waiting for its end.
#[derive(Clone, Debug)]
struct Candidate {
    index: u64,
    start: Timestamp,
}

/// The segmentation state machine. Feed it one `(frame, raw_text)` pair at
/// a time; it emits zero, one, or two [`SegmentEvent`]s per frame.
pub struct Segmenter {
    config: SegmenterConfig,
    speller: Box<dyn SpellCorrect>,
    /// The candidate currently being tracked, if any. `Some` exactly while
    /// the machine is in its tracking state.
    candidate: Option<Candidate>,
    previous_raw: String,
    previous_key: String,
    /// The next subtitle number to assign. Advances when a candidate
    /// *opens*, so a candidate later discarded as too short leaves a gap.
    next_index: u64,
}

impl Segmenter {
    /// Create a segmenter with the given tuning and spell-corrector.
    pub fn new(config: SegmenterConfig, speller: Box<dyn SpellCorrect>) -> Segmenter {
        Segmenter {
            config,
            speller,
            candidate: None,
            previous_raw: String::new(),
            previous_key: String::new(),
            next_index: 0,
        }
    }

    /// Is a candidate interval currently open?
    pub fn is_tracking(&self) -> bool {
        self.candidate.is_some()
    }

    /// Process one frame's OCR reading. Returns boundary events in the
    /// order they occurred: an end before a start.
    ///
    /// Both checks are driven by the same similarity value, comparing this
    /// frame's normalized key against the previous frame's. A close and an
    /// open can fire in the same frame when one subtitle is replaced by
    /// another with no blank frame in between.
    pub fn step(&mut self, frame: u64, raw_text: &str) -> Vec<SegmentEvent> {
        let key = normalize_for_comparison(raw_text, self.speller.as_ref());
        let sim = similarity(&key, &self.previous_key);
        let changed = sim <= self.config.sim_threshold;
        let boundary = self.timestamp(frame);
        trace!(
            "frame {}: sim {:.3} against previous, key {:?}",
            frame,
            sim,
            key
        );

        let mut events = Vec::with_capacity(2);

        if changed {
            if let Some(candidate) = self.candidate.take() {
                debug!("subtitle {} ended at {}", candidate.index, boundary);
                events.push(SegmentEvent::Closed {
                    index: candidate.index,
                    start: candidate.start,
                    end: boundary,
                    content: normalize_for_display(&self.previous_raw),
                });
            }

            if !raw_text.is_empty() {
                self.next_index += 1;
                debug!("subtitle {} started at {}", self.next_index, boundary);
                self.candidate = Some(Candidate {
                    index: self.next_index,
                    start: boundary,
                });
                events.push(SegmentEvent::Opened {
                    index: self.next_index,
                    start: boundary,
                });
            }
        }

        self.previous_raw = raw_text.to_owned();
        self.previous_key = key;
        events
    }

    /// Tell the segmenter no more frames are coming. A still-open candidate
    /// is dropped without emission: a trailing subtitle is never
    /// auto-closed at end of stream.
    pub fn finish(mut self) {
        if let Some(candidate) = self.candidate.take() {
            debug!(
                "dropping unterminated subtitle {} (started at {}) at end of stream",
                candidate.index, candidate.start
            );
        }
    }

    /// The boundary timestamp for a frame, with the lead bias applied.
    fn timestamp(&self, frame: u64) -> Timestamp {
        Timestamp::from_frame(frame, self.config.fps) + self.config.lead_bias
    }
}

/// Converts closed candidate intervals into final subtitles, applying the
/// minimum-duration filter.
pub struct SegmentBuilder {
    min_duration: Duration,
}

impl SegmentBuilder {
    /// Create a builder which discards intervals lasting no longer than
    /// `min_duration`.
    pub fn new(min_duration: Duration) -> SegmentBuilder {
        SegmentBuilder { min_duration }
    }

    /// Build a subtitle from a closed interval, or return `None` if the
    /// interval was too short to be a real subtitle. A discard is a normal
    /// outcome, not an error.
    pub fn build(
        &self,
        index: u64,
        start: Timestamp,
        end: Timestamp,
        content: String,
    ) -> Result<Option<Subtitle>> {
        let duration = end.duration_since(start);
        if duration <= self.min_duration {
            debug!(
                "discarding subtitle {}: lasted only {:.3}s",
                index,
                duration.as_secs_f64()
            );
            return Ok(None);
        }
        Ok(Some(Subtitle {
            index,
            period: Period::new(start, end)?,
            content,
        }))
    }
}
