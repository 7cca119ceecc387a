//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one indicatif bar per orchestration run, advanced per input
//! row. Non-TTY mode: hidden bars, logs are the progress indicator.

use std::io::IsTerminal;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Central progress context managing multi-progress bars.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }

    /// Bar over the input rows of one orchestration run.
    ///
    /// Hidden off-TTY. Update with `pb.set_message(...)` to show the key
    /// currently being extracted.
    pub fn row_bar(&self, label: &str, rows: u64) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(rows));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} {prefix:<14.cyan.bold} [{bar:30.green/dim}] {pos}/{len} {wide_msg:.dim}",
            )
            .expect("invalid template")
            .progress_chars("=>-"),
        );
        pb.set_prefix(label.to_string());
        pb
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}
