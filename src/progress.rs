//! Progress reporting using indicatif.
//!
//! Enriching a fresh schedule takes one search request per movie; a progress
//! bar on stderr shows how far along it is. Runs served from the cache finish
//! before a bar would be useful and never create one.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Receives progress updates from the listing pipeline.
pub trait ProgressCallback {
    /// Enrichment of `total` listings starts.
    fn on_start(&self, total: usize);

    /// Listing number `current` (1-based) titled `title` is being looked up.
    fn on_progress(&self, current: usize, title: &str);

    /// Enrichment finished.
    fn on_finish(&self);
}

/// Callback that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&self, _total: usize) {}
    fn on_progress(&self, _current: usize, _title: &str) {}
    fn on_finish(&self) {}
}

/// Progress bar reporter.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a reporter. With `quiet` set nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use cinerank::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_start(&self, total: usize) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::style());
        pb.println(format!(
            "Data for {total} movies will be downloaded from the internet. This may take a while."
        ));
        pb.set_message("Fetching ratings");
        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_progress(&self, current: usize, title: &str) {
        if let Ok(bar) = self.bar.lock() {
            if let Some(pb) = bar.as_ref() {
                pb.set_position(current as u64);
                pb.set_message(truncate_title(title, 30));
            }
        }
    }

    fn on_finish(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Shorten a title to at most `max_chars` characters for display.
fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }

    let kept: String = title.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
