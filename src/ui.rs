//! Application UI. For now, this is logging setup plus progress bars.

use indicatif::{ProgressBar, ProgressStyle};

/// Application UI state.
pub struct Ui {
    _priv: (),
}

impl Ui {
    /// Create a new UI. This sets up logging.
    pub fn init() -> Ui {
        env_logger::init();
        Ui { _priv: () }
    }

    /// Create a new progress bar with default settings.
    pub fn new_progress_bar(&self, len: u64) -> ProgressBar {
        ProgressBar::new(len).with_style(default_progress_style())
    }
}

fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {msg:20} {pos:>6}/{len:6} {elapsed_precise} {wide_bar:.cyan/blue} {eta_precise}")
        .expect("bad progress bar template")
}
