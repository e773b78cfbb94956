//! Progress bars and report printing for CLI downloads.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

use crate::api::FileRecord;
use crate::download::{DownloadOutcome, DownloadProgress};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Creates a progress bar for a single file download.
pub fn make_progress_bar(size: u64, name: &str) -> ProgressBar {
    let bar = ProgressBar::new(size);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec} - {msg}",
        )
        .expect("progress template is valid")
        .progress_chars("━━╌"),
    );
    bar.set_message(name.to_string());
    bar
}

/// Progress sink that prints a `[i/n]` line per file and drives an
/// indicatif bar from the chunk callbacks.
pub struct CliProgress {
    total_files: usize,
    started: AtomicUsize,
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Creates a progress sink for a batch of `total_files` files.
    #[must_use]
    pub const fn new(total_files: usize) -> Self {
        Self {
            total_files,
            started: AtomicUsize::new(0),
            bar: Mutex::new(None),
        }
    }
}

impl DownloadProgress for CliProgress {
    fn on_file_start(&self, path: &str, total: u64) {
        let index = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[{index}/{}] Downloading: {path}", self.total_files);

        let name = path.rsplit('/').next().unwrap_or(path);
        let bar = make_progress_bar(total, name);
        *self.bar.lock().expect("progress bar lock") = Some(bar);
    }

    fn on_chunk(&self, bytes: u64) {
        if let Some(bar) = self.bar.lock().expect("progress bar lock").as_ref() {
            bar.inc(bytes);
        }
    }

    fn on_file_complete(&self, _path: &str) {
        if let Some(bar) = self.bar.lock().expect("progress bar lock").take() {
            bar.finish_and_clear();
        }
    }

    fn on_error(&self, path: &str, error: &str) {
        if let Some(bar) = self.bar.lock().expect("progress bar lock").take() {
            bar.abandon();
        }
        eprintln!("Error downloading {path}: {error}");
    }
}

/// Formats a byte count as a human-readable string (B, KB, MB, GB).
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [(&str, u64); 3] = [
        ("GB", 1024 * 1024 * 1024),
        ("MB", 1024 * 1024),
        ("KB", 1024),
    ];
    for (unit, scale) in UNITS {
        if bytes >= scale {
            return format!("{:.2} {unit}", bytes as f64 / scale as f64);
        }
    }
    format!("{bytes} B")
}

/// Prints the scanned file list as a table, mirroring the remote paths.
pub fn print_file_list(files: &[FileRecord]) {
    if files.is_empty() {
        println!("No files matched.");
        return;
    }

    let total_size: u64 = files.iter().map(|f| f.size).sum();

    println!("{:<25}  {:>10}  File Path", "Last Modified Time", "File Size");
    println!("{SEPARATOR}");
    for file in files {
        println!(
            "{:<25}  {:>10}  {}",
            file.last_modified,
            format_bytes(file.size),
            file.file_path
        );
    }
    println!("{SEPARATOR}");
    println!("  {} file(s), {} total", files.len(), format_bytes(total_size));
}

/// Prints the end-of-run summary.
pub fn print_summary(outcome: &DownloadOutcome) {
    println!("{SEPARATOR}");
    println!("  {} file(s) downloaded", outcome.downloaded);
    if !outcome.failed.is_empty() {
        println!("  {} file(s) failed:", outcome.failed.len());
        for (path, error) in &outcome.failed {
            println!("    {path}: {error}");
        }
    }
    println!("{SEPARATOR}");
}
