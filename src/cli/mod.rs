//! CLI surface: argument parsing and the scan → confirm → download flow.

mod progress;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::ShareClient;
use crate::config::DownloadConfig;
use crate::download::Downloader;
use crate::error::Result;
use crate::link::{derive_share_key, pattern_to_regex};
use crate::walk::walk;

pub use progress::{CliProgress, format_bytes, print_file_list, print_summary};

/// Download files from a Tsinghua Cloud share link.
#[derive(Parser, Debug)]
#[command(name = "thu-dl", version, about)]
pub struct Args {
    /// Share link of Tsinghua Cloud
    #[arg(short, long)]
    pub link: String,

    /// Password of the share link
    #[arg(short, long, default_value = "")]
    pub password: String,

    /// Save directory
    #[arg(short, long, default_value = ".")]
    pub save: PathBuf,

    /// File name pattern with `*` wildcard; downloads all files if not set
    #[arg(short, long)]
    pub file: Option<String>,

    /// Skip the confirmation prompt and start downloading immediately
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Whole-request timeout in seconds (no timeout if not set)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Port for the blocking "start downloading?" prompt, so automation and
/// tests can substitute a non-interactive answer.
pub trait Confirmation {
    /// Returns `true` if the download phase should proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive confirmation on the terminal.
pub struct InteractivePrompt;

impl Confirmation for InteractivePrompt {
    fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Always answers yes; selected by `--yes`.
pub struct AutoConfirm;

impl Confirmation for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Runs the full scan-and-download flow for the parsed arguments.
///
/// # Errors
///
/// Returns the fatal errors described in [`crate::Error`]: an invalid
/// link, a failed password handshake, or a broken directory listing.
/// Per-file download failures are reported and do not surface here.
pub async fn run(args: Args) -> Result<()> {
    let confirmation: Box<dyn Confirmation> = if args.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(InteractivePrompt)
    };
    run_with_confirmation(args, confirmation.as_ref()).await
}

/// Same as [`run`] but with an injected confirmation port.
///
/// # Errors
///
/// See [`run`].
pub async fn run_with_confirmation(args: Args, confirmation: &dyn Confirmation) -> Result<()> {
    let config = DownloadConfig::new()
        .with_save_dir(&args.save)
        .with_timeout(args.timeout.map(Duration::from_secs));

    let share_key = derive_share_key(&args.link)?;
    println!("Share key: {share_key}");

    let client = ShareClient::new(share_key, &config)?;
    client.authenticate(&args.password).await?;

    let filter = args.file.as_deref().map(pattern_to_regex).transpose()?;

    println!("Searching for files to be downloaded...");
    let files = walk(&client, filter.as_ref()).await?;
    println!("Found {} file(s) in the share link.", files.len());
    print_file_list(&files);

    if files.is_empty() {
        return Ok(());
    }

    if !confirmation.confirm("Start downloading?") {
        println!("Aborted.");
        return Ok(());
    }

    let downloader = Downloader::new(client, config);
    let cli_progress = CliProgress::new(files.len());
    let outcome = downloader.download_all(&files, &cli_progress).await;
    print_summary(&outcome);

    println!("Download finished.");
    Ok(())
}
