//! Single-line progress reporting shared by concurrent download tasks.
//!
//! All writes go through one [`ProgressReporter`] whose surface sits behind a
//! mutex, so status lines from tasks in the same batch are never interleaved.
//! The lock is only held for the duration of one synchronous write.

use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Carriage return plus ANSI "erase entire line".
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Percentage of `bytes` out of `content_length`, rounded and capped at 100.
///
/// Returns `None` when the length is unknown or zero.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn percent(bytes: u64, content_length: Option<u64>) -> Option<u8> {
    let total = content_length.filter(|len| *len > 0)?;
    let pct = (bytes as f64 / total as f64 * 100.0).round();
    Some(pct.min(100.0) as u8)
}

/// Terminal state of one task's status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineStatus {
    Done,
    Skipped,
    Failed(String),
}

/// Formats an in-flight status line.
#[must_use]
pub fn status_line(filename: &str, percent: Option<u8>, current: u64, total: u64) -> String {
    match percent {
        Some(pct) => format!("{filename} {pct:>3}% [{current}/{total}]"),
        None => format!("{filename}  --% [{current}/{total}]"),
    }
}

/// Formats the final line for a settled task.
#[must_use]
pub fn finished_line(filename: &str, status: &LineStatus, current: u64, total: u64) -> String {
    match status {
        LineStatus::Done => format!("{filename} done [{current}/{total}]"),
        LineStatus::Skipped => format!("{filename} exists, skipped [{current}/{total}]"),
        LineStatus::Failed(reason) => format!("{filename} failed: {reason} [{current}/{total}]"),
    }
}

enum Surface {
    /// Interactive terminal: the bar's message is the live line.
    Bar(ProgressBar),
    /// Raw in-place output using carriage return and line clear.
    InPlace(Box<dyn Write + Send>),
    /// Non-interactive output: only settled lines are written.
    Lines(Box<dyn Write + Send>),
    Hidden,
}

/// Owner of the shared status line.
pub struct ProgressReporter {
    surface: Mutex<Surface>,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}

impl ProgressReporter {
    /// Picks a surface for stdout: a live line on a TTY, settled lines
    /// otherwise, nothing when `quiet`.
    #[must_use]
    pub fn for_stdout(quiet: bool) -> Self {
        if quiet {
            return Self::hidden();
        }
        if std::io::stdout().is_terminal() {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
            bar.set_style(
                ProgressStyle::with_template("{wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            Self::from_surface(Surface::Bar(bar))
        } else {
            Self::lines(std::io::stdout())
        }
    }

    /// Reporter that redraws one line in place on `writer`.
    #[must_use]
    pub fn in_place(writer: impl Write + Send + 'static) -> Self {
        Self::from_surface(Surface::InPlace(Box::new(writer)))
    }

    /// Reporter that writes only settled lines to `writer`.
    #[must_use]
    pub fn lines(writer: impl Write + Send + 'static) -> Self {
        Self::from_surface(Surface::Lines(Box::new(writer)))
    }

    /// Reporter that discards everything.
    #[must_use]
    pub fn hidden() -> Self {
        Self::from_surface(Surface::Hidden)
    }

    fn from_surface(surface: Surface) -> Self {
        Self {
            surface: Mutex::new(surface),
        }
    }

    /// Overwrites the live line with the given progress.
    pub fn report(&self, filename: &str, percent: Option<u8>, current: u64, total: u64) {
        let line = status_line(filename, percent, current, total);
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *surface {
            Surface::Bar(bar) => bar.set_message(line),
            Surface::InPlace(out) => {
                let _ = write!(out, "{CLEAR_LINE}{line}");
                let _ = out.flush();
            }
            Surface::Lines(_) | Surface::Hidden => {}
        }
    }

    /// Writes the settled line for a task, terminated with a newline so the
    /// next live line does not overwrite it.
    pub fn finish_line(&self, filename: &str, status: &LineStatus, current: u64, total: u64) {
        let line = finished_line(filename, status, current, total);
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *surface {
            Surface::Bar(bar) => {
                bar.set_message(String::new());
                bar.println(line);
            }
            Surface::InPlace(out) => {
                let _ = writeln!(out, "{CLEAR_LINE}{line}");
                let _ = out.flush();
            }
            Surface::Lines(out) => {
                let _ = writeln!(out, "{line}");
                let _ = out.flush();
            }
            Surface::Hidden => {}
        }
    }

    /// Clears any live line and flushes the surface.
    pub fn finish(&self) {
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *surface {
            Surface::Bar(bar) => bar.finish_and_clear(),
            Surface::InPlace(out) => {
                let _ = write!(out, "{CLEAR_LINE}");
                let _ = out.flush();
            }
            Surface::Lines(out) => {
                let _ = out.flush();
            }
            Surface::Hidden => {}
        }
    }

    /// Creates the per-task progress handle for the item at `index` of `total`.
    #[must_use]
    pub fn task(self: &Arc<Self>, filename: impl Into<String>, index: u64, total: u64) -> TaskProgress {
        TaskProgress {
            reporter: Arc::clone(self),
            filename: filename.into(),
            index,
            total,
            content_length: None,
            bytes: 0,
            last_percent: None,
        }
    }
}

/// Byte-level progress of one download, forwarded to the shared reporter.
#[derive(Debug)]
pub struct TaskProgress {
    reporter: Arc<ProgressReporter>,
    filename: String,
    index: u64,
    total: u64,
    content_length: Option<u64>,
    bytes: u64,
    last_percent: Option<u8>,
}

impl TaskProgress {
    /// Records the expected size of the body, when known.
    pub fn set_content_length(&mut self, content_length: Option<u64>) {
        self.content_length = content_length;
    }

    /// Cumulative bytes received so far.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Percent last shown for this task.
    #[must_use]
    pub fn last_percent(&self) -> Option<u8> {
        self.last_percent
    }

    /// Adds a received chunk and redraws if the visible state changed.
    pub fn advance(&mut self, chunk_len: u64) {
        self.bytes = self.bytes.saturating_add(chunk_len);
        match percent(self.bytes, self.content_length) {
            Some(pct) if self.last_percent == Some(pct) => {}
            Some(pct) => {
                self.last_percent = Some(pct);
                self.redraw();
            }
            // Unknown length: keep the last known percent, still refresh counters.
            None => self.redraw(),
        }
    }

    /// Writes this task's settled line. Consumes the handle so it happens once.
    pub fn finish(self, status: &LineStatus) {
        self.reporter
            .finish_line(&self.filename, status, self.index, self.total);
    }

    fn redraw(&self) {
        self.reporter
            .report(&self.filename, self.last_percent, self.index, self.total);
    }
}
