//! Turning result pages into download tasks with stable sequence indices.

use std::path::{Path, PathBuf};

use tracing::warn;
use url::Url;

use crate::api::{PAGE_SIZE, ResultItem};

/// One file to download, with its 1-based position across the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Global sequence index, used only for progress display.
    pub index: u64,
    /// Remote image URL.
    pub url: String,
    /// Local file the image is written to.
    pub destination: PathBuf,
    /// Size advertised by the search API, used when the response has no length.
    pub size_hint: Option<u64>,
}

impl DownloadTask {
    /// Destination filename for display.
    #[must_use]
    pub fn filename(&self) -> String {
        self.destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Offset subtracted from raw page positions so a run starting at
/// `start_page` numbers its first file 1.
#[must_use]
pub fn offset_index_for_start_page(start_page: u32) -> u64 {
    u64::from(start_page.saturating_sub(1)) * PAGE_SIZE
}

/// Global index of the item at zero-based `offset_in_page` on `page`.
///
/// Computes `(page - 1) * PAGE_SIZE + offset_in_page + 1 - offset_index`,
/// floored at 1 for pages before the run's start page.
#[must_use]
pub fn global_index(page: u32, offset_in_page: usize, offset_index: u64) -> u64 {
    let raw = u64::from(page.saturating_sub(1)) * PAGE_SIZE + offset_in_page as u64 + 1;
    raw.saturating_sub(offset_index).max(1)
}

/// Filename for a result URL: its last non-empty path segment, percent-decoded.
///
/// Returns `None` when there is no segment or the decoded name could escape
/// the target directory.
#[must_use]
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.rev().find(|s| !s.is_empty())?;
    let decoded = urlencoding::decode(last).ok()?;
    let name = decoded.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return None;
    }
    Some(name.to_string())
}

/// A planned unit of work for one result item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedTask {
    /// Ready to be downloaded.
    Ready(DownloadTask),
    /// The item's URL has no usable filename; reported as failed without I/O.
    Invalid { index: u64, url: String },
}

impl PlannedTask {
    /// Global index of this item.
    #[must_use]
    pub fn index(&self) -> u64 {
        match self {
            Self::Ready(task) => task.index,
            Self::Invalid { index, .. } => *index,
        }
    }
}

/// Plans the tasks for one page. Indices are fixed here, in enumeration order,
/// and never depend on completion order.
#[must_use]
pub fn plan_page(
    items: &[ResultItem],
    page: u32,
    start_page: u32,
    target_dir: &Path,
) -> Vec<PlannedTask> {
    let offset_index = offset_index_for_start_page(start_page);
    items
        .iter()
        .enumerate()
        .map(|(offset, item)| {
            let index = global_index(page, offset, offset_index);
            match filename_from_url(&item.path) {
                Some(filename) => PlannedTask::Ready(DownloadTask {
                    index,
                    url: item.path.clone(),
                    destination: target_dir.join(filename),
                    size_hint: item.file_size,
                }),
                None => {
                    warn!(url = %item.path, index, "result item has no usable filename");
                    PlannedTask::Invalid {
                        index,
                        url: item.path.clone(),
                    }
                }
            }
        })
        .collect()
}
