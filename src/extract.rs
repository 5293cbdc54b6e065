//! The frame-processing pipeline: decode, recognize, segment, emit.

use indicatif::ProgressBar;
use log::debug;

use crate::{
    ocr::TextRecognizer,
    segment::{SegmentBuilder, SegmentEvent, Segmenter},
    sink::SegmentSink,
    video::FrameSource,
    Result,
};

/// Scan a video for burned-in subtitles, writing each one to every sink as
/// soon as its end boundary is confirmed. Returns the number of subtitles
/// emitted.
///
/// Strictly sequential: each frame is fully processed before the next one
/// is decoded. Stopping early (end of stream or decoder exit) drops any
/// open candidate and leaves the sinks with everything emitted so far.
pub fn extract_subtitles(
    frames: &mut dyn FrameSource,
    recognizer: &mut dyn TextRecognizer,
    mut segmenter: Segmenter,
    builder: &SegmentBuilder,
    sinks: &mut [&mut dyn SegmentSink],
    progress: ProgressBar,
) -> Result<u64> {
    let mut emitted = 0;
    let mut frame_index = 0;
    while let Some(image) = frames.next_frame()? {
        let raw_text = recognizer.recognize(&image)?;
        for event in segmenter.step(frame_index, &raw_text) {
            if let SegmentEvent::Closed {
                index,
                start,
                end,
                content,
            } = event
            {
                if let Some(subtitle) = builder.build(index, start, end, content)? {
                    for sink in sinks.iter_mut() {
                        sink.emit(&subtitle)?;
                    }
                    emitted += 1;
                }
            }
        }
        frame_index += 1;
        progress.inc(1);
    }
    segmenter.finish();
    progress.finish();
    debug!("processed {} frames, emitted {} subtitles", frame_index, emitted);
    Ok(emitted)
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use image::GrayImage;

    use super::*;
    use crate::{
        normalize::NoopSpeller,
        segment::SegmenterConfig,
        sink::MemorySink,
        time::Timestamp,
    };

    /// A frame source that yields a fixed number of dummy frames.
    struct FrameCounter {
        remaining: usize,
    }

    impl FrameSource for FrameCounter {
        fn next_frame(&mut self) -> Result<Option<GrayImage>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(GrayImage::new(1, 1)))
        }
    }

    /// An OCR engine that plays back one scripted reading per frame.
    struct ScriptedOcr {
        readings: std::vec::IntoIter<String>,
    }

    impl TextRecognizer for ScriptedOcr {
        fn recognize(&mut self, _image: &GrayImage) -> Result<String> {
            Ok(self.readings.next().expect("script ran out of readings"))
        }
    }

    const FPS: f64 = 30.0;

    /// Run the pipeline over scripted readings with default tuning and
    /// return the emitted subtitles.
    fn run(readings: Vec<String>) -> Vec<crate::srt::Subtitle> {
        let mut frames = FrameCounter {
            remaining: readings.len(),
        };
        let mut ocr = ScriptedOcr {
            readings: readings.into_iter(),
        };
        let config = SegmenterConfig::new(FPS);
        let segmenter = Segmenter::new(config, Box::new(NoopSpeller));
        let builder = SegmentBuilder::new(config.min_duration);
        let mut memory = MemorySink::new();
        let mut sinks: [&mut dyn SegmentSink; 1] = [&mut memory];
        extract_subtitles(
            &mut frames,
            &mut ocr,
            segmenter,
            &builder,
            &mut sinks,
            ProgressBar::hidden(),
        )
        .unwrap();
        memory.into_segments()
    }

    fn ts(frame: u64) -> Timestamp {
        Timestamp::from_frame(frame, FPS) + Duration::from_secs(2)
    }

    fn readings(script: &[(usize, &str)]) -> Vec<String> {
        let mut out = vec![];
        for &(count, text) in script {
            out.extend(std::iter::repeat(text.to_owned()).take(count));
        }
        out
    }

    #[test]
    fn single_subtitle() {
        // Frames 0-9 empty, "BONJOUR" on frames 10-59, empty again at 60.
        let segments =
            run(readings(&[(10, ""), (50, "BONJOUR"), (1, "")]));
        assert_eq!(1, segments.len());
        let sub = &segments[0];
        assert_eq!(1, sub.index);
        assert_eq!(ts(10), sub.period.begin());
        assert_eq!(ts(60), sub.period.end());
        assert_eq!("BONJOUR", sub.content);
    }

    #[test]
    fn short_subtitle_leaves_index_gap() {
        // A 5-frame flash at 30 fps lasts about 167ms and is discarded,
        // but it still consumed subtitle number 1.
        let segments = run(readings(&[
            (5, ""),
            (5, "COURT"),
            (10, ""),
            (60, "DURABLE"),
            (1, ""),
        ]));
        assert_eq!(1, segments.len());
        assert_eq!(2, segments[0].index);
        assert_eq!("DURABLE", segments[0].content);
    }

    #[test]
    fn flickering_text_emits_nothing() {
        // Text alternating every frame: every frame closes one candidate
        // and opens another, and none lives long enough to keep.
        let mut script = vec![];
        for i in 0..100 {
            script.push(if i % 2 == 0 { "A".to_owned() } else { "B".to_owned() });
        }
        let segments = run(script);
        assert!(segments.is_empty());
    }

    #[test]
    fn trailing_subtitle_is_dropped() {
        // Text still on screen when the stream ends is never emitted.
        let segments = run(readings(&[(10, ""), (100, "FIN")]));
        assert!(segments.is_empty());
    }

    #[test]
    fn indices_strictly_increase_and_times_are_ordered() {
        let segments = run(readings(&[
            (30, "UN"),
            (30, "DEUX"),
            (30, ""),
            (30, "TROIS"),
            (5, "ÉCLAIR"),
            (30, "QUATRE"),
            (30, ""),
        ]));
        assert!(segments.len() >= 3);
        for pair in segments.windows(2) {
            assert!(pair[0].index < pair[1].index);
            assert!(pair[0].period.begin() <= pair[1].period.begin());
        }
        for sub in &segments {
            assert!(sub.period.end() > sub.period.begin());
            assert!(sub.period.duration() > Duration::from_millis(500));
        }
    }
}
