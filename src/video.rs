//! Tools for working with video files: metadata probing and raw frame
//! decoding, both via external ffmpeg tools.

use std::{
    fmt,
    io::Read,
    path::Path,
    process::{Child, ChildStdout, Command, Stdio},
    result,
    str::{from_utf8, FromStr},
};

use anyhow::{anyhow, Context};
use image::GrayImage;
use log::debug;
use num::rational::Ratio;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::{errors::RunCommandError, Result};

/// Individual streams inside a video are labelled with a codec type.
#[derive(Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CodecType {
    Audio,
    Video,
    Subtitle,
    Other(String),
}

impl<'de> Deserialize<'de> for CodecType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        match &s[..] {
            "audio" => Ok(CodecType::Audio),
            "video" => Ok(CodecType::Video),
            "subtitle" => Ok(CodecType::Subtitle),
            s => Ok(CodecType::Other(s.to_owned())),
        }
    }
}

/// A wrapper around `Ratio` for parsing ffprobe's `"num/den"` frame rates.
#[derive(Debug, PartialEq, Eq)]
pub struct Fraction(Ratio<u32>);

impl Fraction {
    /// This fraction as a float.
    pub fn as_f64(&self) -> f64 {
        *self.0.numer() as f64 / *self.0.denom() as f64
    }
}

impl FromStr for Fraction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Fraction> {
        let re = Regex::new(r"^(\d+)/(\d+)$").unwrap();
        let cap = re
            .captures(s)
            .ok_or_else(|| anyhow!("expected fraction: {}", s))?;
        let num = cap.get(1).unwrap().as_str().parse::<u32>()?;
        let denom = cap.get(2).unwrap().as_str().parse::<u32>()?;
        if denom == 0 {
            Err(anyhow!("found fraction with a denominator of 0: {}", s))
        } else {
            Ok(Fraction(Ratio::new(num, denom)))
        }
    }
}

/// An individual content stream within a video, as reported by ffprobe.
/// Frame rates and counts arrive as strings, and audio streams report the
/// nonsense rate `"0/0"`, so numeric fields stay raw until we've picked the
/// stream we want.
#[derive(Debug, Deserialize)]
struct Stream {
    index: usize,
    codec_type: CodecType,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// Metadata associated with a video.
#[derive(Debug, Deserialize)]
struct Metadata {
    streams: Vec<Stream>,
}

/// What we need to know about a video before scanning it for subtitles.
#[derive(Clone, Copy, Debug)]
pub struct VideoInfo {
    /// Width of the video stream, in pixels.
    pub width: u32,
    /// Height of the video stream, in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: f64,
    /// Total number of frames, possibly estimated from the duration.
    pub frame_count: u64,
}

/// Probe a video file with ffprobe and extract what we need from its first
/// video stream.
pub fn probe(path: &Path) -> Result<VideoInfo> {
    // Ensure we have an actual file before doing anything else.
    if !path.is_file() {
        return Err(anyhow!("no such file {}", path.display()));
    }

    let mkerr = || RunCommandError::new("ffprobe");
    let cmd = Command::new("ffprobe")
        .arg("-v")
        .arg("quiet")
        .arg("-show_streams")
        .arg("-of")
        .arg("json")
        .arg(path)
        .output();
    let output = cmd.context(mkerr())?;
    let stdout = from_utf8(&output.stdout).context(mkerr())?;
    debug!("video metadata: {}", stdout);
    let metadata: Metadata = serde_json::from_str(stdout).context(mkerr())?;

    let stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type == CodecType::Video)
        .ok_or_else(|| anyhow!("no video stream in {}", path.display()))?;
    video_info(stream)
        .with_context(|| format!("could not read video stream of {}", path.display()))
}

/// Extract our video info from a raw ffprobe stream entry.
fn video_info(stream: &Stream) -> Result<VideoInfo> {
    let width = stream
        .width
        .ok_or_else(|| anyhow!("video stream {} has no width", stream.index))?;
    let height = stream
        .height
        .ok_or_else(|| anyhow!("video stream {} has no height", stream.index))?;
    let rate = stream
        .avg_frame_rate
        .as_deref()
        .ok_or_else(|| anyhow!("video stream {} has no frame rate", stream.index))?;
    let fps = rate.parse::<Fraction>()?.as_f64();
    if fps <= 0.0 {
        return Err(anyhow!("video stream {} has frame rate 0", stream.index));
    }

    // Many containers don't record a frame count, so fall back to
    // estimating one from the duration. Decoding stops at the real end of
    // stream either way.
    let frame_count = match &stream.nb_frames {
        Some(n) => n
            .parse::<u64>()
            .with_context(|| format!("bad frame count: {:?}", n))?,
        None => {
            let duration = stream
                .duration
                .as_deref()
                .ok_or_else(|| {
                    anyhow!("video stream {} has no frame count or duration", stream.index)
                })?
                .parse::<f64>()?;
            (duration * fps).round() as u64
        }
    };

    Ok(VideoInfo {
        width,
        height,
        fps,
        frame_count,
    })
}

/// The rectangle of each frame handed to OCR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRegion {
    /// Width of the region, in pixels.
    pub width: u32,
    /// Height of the region, in pixels.
    pub height: u32,
    /// Left edge of the region.
    pub x: u32,
    /// Top edge of the region.
    pub y: u32,
}

impl CropRegion {
    /// The default subtitle region for a frame of the given size: the
    /// bottom sixth of the frame, trimmed at the left and right where
    /// subtitles never reach.
    pub fn default_for(width: u32, height: u32) -> CropRegion {
        let x = (width as f64 / 5.0) as u32;
        let right = (2.0 * width as f64 / 2.3) as u32;
        let y = (height as f64 / 1.2) as u32;
        CropRegion {
            width: right - x,
            height: height - y,
            x,
            y,
        }
    }

    /// This region as an ffmpeg `crop` filter argument.
    fn to_filter(self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

impl FromStr for CropRegion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<CropRegion> {
        let re = Regex::new(r"^(\d+):(\d+):(\d+):(\d+)$").unwrap();
        let cap = re
            .captures(s)
            .ok_or_else(|| anyhow!("expected crop region W:H:X:Y, found {:?}", s))?;
        let field = |i: usize| -> Result<u32> {
            Ok(cap.get(i).unwrap().as_str().parse::<u32>()?)
        };
        let region = CropRegion {
            width: field(1)?,
            height: field(2)?,
            x: field(3)?,
            y: field(4)?,
        };
        if region.width == 0 || region.height == 0 {
            return Err(anyhow!("crop region {:?} is empty", s));
        }
        Ok(region)
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// A source of decoded grayscale frames, in display order.
pub trait FrameSource {
    /// Decode the next frame, or return `None` at the end of the stream.
    fn next_frame(&mut self) -> Result<Option<GrayImage>>;
}

/// Decodes a video with ffmpeg, yielding the cropped subtitle region of
/// each frame as an 8-bit grayscale image, read synchronously from the
/// decoder's stdout.
pub struct FrameStream {
    child: Child,
    stdout: ChildStdout,
    region: CropRegion,
    frame: Vec<u8>,
    done: bool,
}

impl FrameStream {
    /// Start decoding the specified video, cropped to `region`.
    pub fn open(path: &Path, region: CropRegion) -> Result<FrameStream> {
        let mut child = Command::new("ffmpeg")
            .arg("-v")
            .arg("quiet")
            .arg("-i")
            .arg(path)
            .arg("-vf")
            .arg(region.to_filter())
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("gray")
            .arg("pipe:1")
            .stdout(Stdio::piped())
            .spawn()
            .context(RunCommandError::new("ffmpeg"))?;
        let stdout = child
            .stdout
            .take()
            .expect("stdout requested from ffmpeg child");
        let frame = vec![0; region.width as usize * region.height as usize];
        Ok(FrameStream {
            child,
            stdout,
            region,
            frame,
            done: false,
        })
    }
}

impl FrameSource for FrameStream {
    fn next_frame(&mut self) -> Result<Option<GrayImage>> {
        if self.done {
            return Ok(None);
        }

        // Fill one frame's worth of bytes. EOF at a frame boundary is a
        // clean end of stream; EOF in the middle of a frame is not.
        let mut filled = 0;
        while filled < self.frame.len() {
            let n = self
                .stdout
                .read(&mut self.frame[filled..])
                .context("error reading frames from ffmpeg")?;
            if n == 0 {
                self.done = true;
                self.child.wait().context("error waiting for ffmpeg")?;
                if filled == 0 {
                    return Ok(None);
                }
                return Err(anyhow!(
                    "ffmpeg stopped in the middle of a frame ({} of {} bytes)",
                    filled,
                    self.frame.len()
                ));
            }
            filled += n;
        }

        let image = GrayImage::from_raw(
            self.region.width,
            self.region.height,
            self.frame.clone(),
        )
        .expect("frame buffer sized to the crop region");
        Ok(Some(image))
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        if !self.done {
            // Stop a decoder we abandoned mid-stream.
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
