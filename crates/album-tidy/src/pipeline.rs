//! Album pipeline: read tags, reconcile, rewrite every track into a clean tree.
//!
//! ## Stages
//! 1. **Prepare**: check the input, wipe the output root, create the work directory.
//! 2. **Read**: dump each track's tags; extract and resize the cover of the first track only.
//! 3. **Reconcile**: resolve album values and the final track order (`album_meta::reconcile`).
//! 4. **Write**: per track, strip tags, write the new ones, attach the cover.
//!
//! Each external call is awaited before the next starts. The first failure aborts the run
//! and leaves whatever was already written in place.

use std::path::{Path, PathBuf};

use album_meta::{ffmetadata, reconcile, FinalTrack, RawTrack};
use anyhow::{anyhow, bail, Context, Result};

use crate::config::RunConfig;
use crate::cover::{resized_cover_path, CoverResizer};
use crate::ffmpeg::Ffmpeg;
use crate::layout;
use crate::tool::{ToolError, ToolRunner};

/// Tags for the track being written; rewritten for every track.
const METADATA_FILE_NAME: &str = "meta.txt";

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub album_dir: PathBuf,
    /// Output tracks in album order.
    pub files: Vec<PathBuf>,
    /// Whether a cover was found and attached.
    pub cover: bool,
}

pub struct Pipeline<'a> {
    ffmpeg: Ffmpeg<'a>,
    resizer: &'a dyn CoverResizer,
    config: &'a RunConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        runner: &'a dyn ToolRunner,
        resizer: &'a dyn CoverResizer,
        config: &'a RunConfig,
    ) -> Self {
        Self {
            ffmpeg: Ffmpeg::new(runner, &config.ffmpeg),
            resizer,
            config,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let input = &self.config.input_dir;
        let output = &self.config.output_dir;
        check_directories(input, output).await?;

        let work = layout::work_dir(output);
        prepare_output(output, &work).await?;

        let sources = discover_tracks(input).await?;
        tracing::debug!(count = sources.len(), input = ?input, "tracks discovered");
        let (raw_tracks, cover) = self.read_tracks(&sources, &work).await?;

        let album = reconcile(raw_tracks, &self.config.reconcile)?;
        let context = &album.context;
        tracing::info!(
            artist = %context.artist,
            album = %context.album,
            genre = context.genre.as_deref().unwrap_or(""),
            year = context.year.as_deref().unwrap_or(""),
            tracks = album.tracks.len(),
            "album resolved"
        );

        let album_dir = layout::album_dir(output, &context.artist, &context.album);
        tokio::fs::create_dir_all(&album_dir)
            .await
            .with_context(|| format!("create album dir {:?}", album_dir))?;
        if let Some(cover) = cover.as_deref() {
            let target = album_dir.join(layout::COVER_FILE_NAME);
            tokio::fs::copy(cover, &target)
                .await
                .with_context(|| format!("copy cover to {:?}", target))?;
        }

        let mut files = Vec::with_capacity(album.tracks.len());
        for track in &album.tracks {
            let file = self
                .write_track(track, &work, &album_dir, cover.as_deref())
                .await?;
            files.push(file);
        }

        if let Err(err) = tokio::fs::remove_dir_all(&work).await {
            tracing::warn!(error = %err, dir = ?work, "work dir cleanup failed");
        }

        Ok(RunSummary {
            album_dir,
            files,
            cover: cover.is_some(),
        })
    }

    /// Dump tags of every track in listing order; only the first track is checked for a cover.
    async fn read_tracks(
        &self,
        sources: &[PathBuf],
        work: &Path,
    ) -> Result<(Vec<RawTrack>, Option<PathBuf>)> {
        let mut tracks = Vec::with_capacity(sources.len());
        let mut cover = None;
        for (index, source) in sources.iter().enumerate() {
            let file_name = source
                .file_name()
                .ok_or_else(|| anyhow!("track path has no file name: {:?}", source))?;
            let dump = layout::metadata_dump_path(work, file_name);
            self.ffmpeg
                .dump_metadata(source, &dump)
                .await
                .with_context(|| format!("read tags of {:?}", source))?;
            let bytes = tokio::fs::read(&dump)
                .await
                .with_context(|| format!("read metadata dump {:?}", dump))?;
            let tags = ffmetadata::parse(&String::from_utf8_lossy(&bytes));
            tracks.push(RawTrack::new(source.clone(), tags));

            if index == 0 {
                cover = self.prepare_cover(source, work).await?;
            }
        }
        Ok((tracks, cover))
    }

    /// Extract and resize the embedded cover. `None` when the track has none.
    async fn prepare_cover(&self, source: &Path, work: &Path) -> Result<Option<PathBuf>> {
        let extracted = work.join(layout::COVER_FILE_NAME);
        match self.ffmpeg.extract_cover(source, &extracted).await {
            Ok(()) => {}
            // ffmpeg exits non-zero when there is no picture stream to copy.
            Err(err @ ToolError::Exit { .. }) => {
                tracing::warn!(track = ?source, error = %err, "no embedded cover art");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("extract cover from {:?}", source));
            }
        }

        let extracted_len = tokio::fs::metadata(&extracted)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0);
        if extracted_len == 0 {
            return Ok(None);
        }

        let resized = resized_cover_path(work);
        self.resizer
            .resize(&extracted, &resized, self.config.cover_size)
            .await
            .with_context(|| format!("resize cover from {:?}", source))?;
        Ok(Some(resized))
    }

    async fn write_track(
        &self,
        track: &FinalTrack,
        work: &Path,
        album_dir: &Path,
        cover: Option<&Path>,
    ) -> Result<PathBuf> {
        let meta = &track.metadata;

        let stripped = layout::intermediate_path(work, &meta.track, 0);
        self.ffmpeg
            .strip_tags(&track.source, &stripped)
            .await
            .with_context(|| format!("strip tags of {:?}", track.source))?;

        let meta_file = work.join(METADATA_FILE_NAME);
        tokio::fs::write(&meta_file, ffmetadata::serialize(meta.entries()))
            .await
            .with_context(|| format!("write metadata {:?}", meta_file))?;
        let tagged = layout::intermediate_path(work, &meta.track, 1);
        self.ffmpeg
            .write_tags(&stripped, &meta_file, &tagged)
            .await
            .with_context(|| format!("write tags of {:?}", track.source))?;

        let file_name = layout::track_file_name(&meta.track, &meta.artist, &meta.title);
        let target = album_dir.join(&file_name);
        let written = match cover {
            Some(cover) => self.ffmpeg.attach_cover(&tagged, cover, &target).await,
            None => self.ffmpeg.copy_audio(&tagged, &target).await,
        };
        written.with_context(|| format!("write {:?}", target))?;

        tracing::info!(file = %file_name, source = ?track.source, "track written");
        Ok(target)
    }
}

async fn check_directories(input: &Path, output: &Path) -> Result<()> {
    let is_dir = tokio::fs::metadata(input)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        bail!("input directory not found: {:?}", input);
    }

    // The output root is wiped, so it must not hold the input.
    let input = tokio::fs::canonicalize(input)
        .await
        .with_context(|| format!("canonicalize input {:?}", input))?;
    let output = tokio::fs::canonicalize(output)
        .await
        .unwrap_or_else(|_| output.to_path_buf());
    if input.starts_with(&output) {
        bail!(
            "output directory {:?} must not contain the input directory {:?}",
            output,
            input
        );
    }
    Ok(())
}

/// Remove the previous output entirely so reruns never merge with old results.
async fn prepare_output(output: &Path, work: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(output).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err).with_context(|| format!("remove output {:?}", output)),
    }
    tokio::fs::create_dir_all(work)
        .await
        .with_context(|| format!("create work dir {:?}", work))?;
    Ok(())
}

/// MP3 files directly inside `input`, sorted by name.
async fn discover_tracks(input: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(input)
        .await
        .with_context(|| format!("list {:?}", input))?;
    let mut tracks = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("list {:?}", input))?
    {
        let path = entry.path();
        if !layout::is_track_file(&path) {
            continue;
        }
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            tracks.push(path);
        }
    }
    tracks.sort();
    Ok(tracks)
}
