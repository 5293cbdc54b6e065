//! Recognizing text in the cropped subtitle region of a frame.

use std::{
    path::PathBuf,
    process::Command,
    str::from_utf8,
};

use anyhow::Context;
use image::GrayImage;
use log::trace;
use tempfile::TempDir;

use crate::{errors::RunCommandError, Result};

/// Burned-in subtitles are nearly pure white. Everything darker than this
/// is background and gets cleared before OCR.
const BINARIZE_THRESHOLD: u8 = 252;

/// Maps the subtitle region of a frame to raw recognized text. May return
/// the empty string when no text is visible.
pub trait TextRecognizer {
    /// Recognize the text in one preprocessed frame image.
    fn recognize(&mut self, image: &GrayImage) -> Result<String>;
}

/// Clear every pixel darker than the subtitle text, leaving white glyphs on
/// a black background for the OCR engine.
pub fn binarize(image: &mut GrayImage) {
    for pixel in image.pixels_mut() {
        if pixel.0[0] < BINARIZE_THRESHOLD {
            pixel.0[0] = 0;
        }
    }
}

/// Recognizes text by running the Tesseract command-line tool over a
/// scratch PNG of each frame.
pub struct TesseractOcr {
    command: PathBuf,
    lang: String,
    scratch: TempDir,
}

impl TesseractOcr {
    /// Create a recognizer using the given Tesseract executable and
    /// language.
    pub fn new(command: PathBuf, lang: String) -> Result<TesseractOcr> {
        let scratch = TempDir::new().context("could not create scratch directory")?;
        Ok(TesseractOcr {
            command,
            lang,
            scratch,
        })
    }
}

impl TextRecognizer for TesseractOcr {
    fn recognize(&mut self, image: &GrayImage) -> Result<String> {
        let mut image = image.clone();
        binarize(&mut image);

        let png = self.scratch.path().join("frame.png");
        image
            .save(&png)
            .with_context(|| format!("could not write {}", png.display()))?;

        let mkerr = || RunCommandError::new("tesseract");
        let output = Command::new(&self.command)
            .arg(&png)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("--psm")
            .arg("6")
            .arg("--oem")
            .arg("1")
            .output()
            .context(mkerr())?;
        if !output.status.success() {
            return Err(mkerr().into());
        }
        let text = from_utf8(&output.stdout).context(mkerr())?;
        trace!("recognized text: {:?}", text);
        Ok(text.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn binarize_clears_background() {
        let mut image = GrayImage::from_raw(2, 2, vec![0, 128, 251, 255]).unwrap();
        binarize(&mut image);
        assert_eq!(&vec![0, 0, 0, 255], image.as_raw());
    }

    #[test]
    fn binarize_keeps_threshold_pixel() {
        let mut image = GrayImage::from_raw(2, 1, vec![252, 253]).unwrap();
        binarize(&mut image);
        assert_eq!(&vec![252, 253], image.as_raw());
    }
}
