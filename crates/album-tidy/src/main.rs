//! album-tidy: normalize the tags, numbering and cover art of one MP3 album.
//!
//! ## Pipeline
//! 1. **Read**: ffmpeg dumps every track's tags; the first track's cover is extracted and resized.
//! 2. **Reconcile**: album artist/album/genre/year are resolved and tracks renumbered 1..N.
//! 3. **Write**: each track is stripped, re-tagged and given the cover under
//!    `<output>/<artist>/<album>/`.
//!
//! The output root is deleted and rebuilt on every run.

use album_tidy::cli::Args;
use album_tidy::config::{FileConfig, RunConfig};
use album_tidy::runtime;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,album_tidy=info")
        }))
        .init();

    let file_config = match args.config.as_ref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = RunConfig::resolve(&args, &file_config)?;
    let summary = runtime::run(config)?;
    tracing::debug!(
        album_dir = ?summary.album_dir,
        tracks = summary.files.len(),
        cover = summary.cover,
        "run finished"
    );
    Ok(())
}
