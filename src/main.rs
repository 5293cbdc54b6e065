//! Extract burned-in ("hard") subtitles from video files using OCR.

#![warn(missing_docs)]

use std::{path::PathBuf, time::Duration};

use anyhow::bail;
pub use anyhow::{Error, Result};
use clap::Parser;
use log::info;

use crate::{
    extract::extract_subtitles,
    normalize::NoopSpeller,
    ocr::TesseractOcr,
    segment::{SegmentBuilder, Segmenter, SegmenterConfig},
    sink::{MemorySink, SegmentSink, SrtFileSink},
    ui::Ui,
    video::{CropRegion, FrameStream},
};

pub mod errors;
pub mod extract;
pub mod normalize;
pub mod ocr;
pub mod segment;
pub mod similarity;
pub mod sink;
pub mod srt;
pub mod time;
pub mod ui;
pub mod video;

/// Scan a video for burned-in subtitles and write them to an SRT file. The
/// file is written incrementally, so an interrupted run still leaves a
/// valid, truncated subtitle file behind. Requires `ffmpeg`, `ffprobe`, and
/// `tesseract` on the PATH.
#[derive(Debug, Parser)]
#[command(name = "hardsub", version)]
struct Args {
    /// Path to the video file.
    video: PathBuf,

    /// Where to write the subtitles. Defaults to the video path with an
    /// `.srt` extension.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Overwrite the output file if it already exists.
    #[arg(long, short = 'f')]
    force: bool,

    /// Tesseract language to recognize.
    #[arg(long, default_value = "fra")]
    lang: String,

    /// The Tesseract executable to run.
    #[arg(long, default_value = "tesseract")]
    tesseract_cmd: PathBuf,

    /// Region of the frame to scan for subtitles, as W:H:X:Y in pixels.
    /// Defaults to the bottom sixth of the frame.
    #[arg(long)]
    crop: Option<CropRegion>,

    /// Consecutive readings with a similarity at or below this value are
    /// treated as different on-screen text.
    #[arg(long, default_value_t = 0.7)]
    sim_threshold: f64,

    /// Discard detected subtitles lasting no longer than this many seconds.
    #[arg(long, default_value_t = 0.5)]
    min_duration: f64,

    /// Fixed offset added to every subtitle timestamp, in seconds.
    #[arg(long, default_value_t = 2.0)]
    lead_bias: f64,
}

fn main() -> Result<()> {
    let ui = Ui::init();
    let args = Args::parse();
    cmd_extract(&ui, &args)
}

fn cmd_extract(ui: &Ui, args: &Args) -> Result<()> {
    let output = match &args.output {
        Some(path) => path.to_owned(),
        None => args.video.with_extension("srt"),
    };
    if output.exists() && !args.force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            output.display()
        );
    }

    let info = video::probe(&args.video)?;
    info!(
        "processing {} frames at {:.3} fps",
        info.frame_count, info.fps
    );
    let region = args
        .crop
        .unwrap_or_else(|| CropRegion::default_for(info.width, info.height));
    info!("scanning region {} of {}x{}", region, info.width, info.height);

    let mut frames = FrameStream::open(&args.video, region)?;
    let mut recognizer =
        TesseractOcr::new(args.tesseract_cmd.clone(), args.lang.clone())?;
    let config = SegmenterConfig {
        fps: info.fps,
        sim_threshold: args.sim_threshold,
        min_duration: Duration::from_secs_f64(args.min_duration),
        lead_bias: Duration::from_secs_f64(args.lead_bias),
    };
    let segmenter = Segmenter::new(config, Box::new(NoopSpeller));
    let builder = SegmentBuilder::new(config.min_duration);

    let mut srt_sink = SrtFileSink::create(&output)?;
    let mut memory = MemorySink::new();
    let emitted = {
        let mut sinks: [&mut dyn SegmentSink; 2] = [&mut srt_sink, &mut memory];
        extract_subtitles(
            &mut frames,
            &mut recognizer,
            segmenter,
            &builder,
            &mut sinks,
            ui.new_progress_bar(info.frame_count),
        )?
    };

    if let Some(last) = memory.segments().last() {
        info!("last subtitle ends at {}", last.period.end());
    }
    println!(
        "Wrote {} subtitles to {}",
        emitted,
        srt_sink.path().display()
    );
    Ok(())
}
