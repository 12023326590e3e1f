//! Album reconciliation: turns per-track raw tags into one consistent album.
//!
//! 1. Resolve artist/album/genre/year from overrides or the first track that has them.
//! 2. Require that either every track carries a track number or none does.
//! 3. Order by track number, falling back to source path.
//! 4. Renumber 1..N and build the final per-track tags.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::ffmetadata::TagMap;
use crate::name_case::{normalize_case, Acronyms};

/// Tag keys inspected during reconciliation.
pub mod tag {
    pub const ARTIST: &str = "artist";
    pub const ALBUM: &str = "album";
    pub const GENRE: &str = "genre";
    pub const DATE: &str = "date";
    pub const TRACK: &str = "track";
    pub const TITLE: &str = "title";
}

/// One input track as read from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTrack {
    pub path: PathBuf,
    pub tags: TagMap,
}

impl RawTrack {
    pub fn new(path: impl Into<PathBuf>, tags: TagMap) -> Self {
        Self {
            path: path.into(),
            tags,
        }
    }

    /// Tag value, treating blank values as missing.
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Explicit album-level values that win over anything found in the tracks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlbumOverrides {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
}

/// Which derived values get passed through [`normalize_case`].
///
/// Derived genre is always normalized and has no flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseOptions {
    pub artist: bool,
    pub album: bool,
    pub title: bool,
}

impl Default for CaseOptions {
    fn default() -> Self {
        Self {
            artist: true,
            album: true,
            title: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub overrides: AlbumOverrides,
    pub case: CaseOptions,
    pub acronyms: Acronyms,
}

/// Values shared by every track of the album.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumContext {
    pub artist: String,
    pub album: String,
    pub genre: Option<String>,
    pub year: Option<String>,
}

/// Tags written back into each output track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalTrackMetadata {
    pub artist: String,
    pub album: String,
    /// Position in the album, zero-padded to at least two digits.
    pub track: String,
    pub title: String,
    pub genre: Option<String>,
    pub date: Option<String>,
}

impl FinalTrackMetadata {
    /// Tag entries in the order they are written to the metadata file.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![
            (tag::ARTIST, self.artist.as_str()),
            (tag::ALBUM, self.album.as_str()),
            (tag::TRACK, self.track.as_str()),
            (tag::TITLE, self.title.as_str()),
        ];
        if let Some(genre) = self.genre.as_deref() {
            entries.push((tag::GENRE, genre));
        }
        if let Some(date) = self.date.as_deref() {
            entries.push((tag::DATE, date));
        }
        entries
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalTrack {
    pub source: PathBuf,
    pub metadata: FinalTrackMetadata,
}

/// Reconciled album with tracks in final order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledAlbum {
    pub context: AlbumContext,
    pub tracks: Vec<FinalTrack>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    /// The input contained no tracks at all.
    NoTracks,
    /// No override and no track tag provided an artist.
    NoArtist,
    /// No override and no track tag provided an album.
    NoAlbum,
    /// Some, but not all, tracks carry a usable track number.
    InconsistentTrackNumbers { tagged: usize, total: usize },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::NoTracks => write!(f, "no tracks"),
            ReconcileError::NoArtist => write!(f, "no artist"),
            ReconcileError::NoAlbum => write!(f, "no album"),
            ReconcileError::InconsistentTrackNumbers { tagged, total } => write!(
                f,
                "inconsistent track numbering: {tagged} of {total} tracks have a track number"
            ),
        }
    }
}

impl std::error::Error for ReconcileError {}

/// Build the final album from the tracks in discovery order.
pub fn reconcile(
    tracks: Vec<RawTrack>,
    options: &ReconcileOptions,
) -> Result<ReconciledAlbum, ReconcileError> {
    if tracks.is_empty() {
        return Err(ReconcileError::NoTracks);
    }
    let context = resolve_context(&tracks, options)?;
    tracing::debug!(
        artist = %context.artist,
        album = %context.album,
        genre = ?context.genre,
        year = ?context.year,
        "album context resolved"
    );

    let numbers: Vec<Option<u32>> = tracks
        .iter()
        .map(|track| track.tag(tag::TRACK).and_then(parse_track_number))
        .collect();
    let tagged = numbers.iter().filter(|number| number.is_some()).count();
    if tagged > 0 && tagged < tracks.len() {
        return Err(ReconcileError::InconsistentTrackNumbers {
            tagged,
            total: tracks.len(),
        });
    }

    let mut ordered: Vec<(Option<u32>, RawTrack)> = numbers.into_iter().zip(tracks).collect();
    if tagged > 0 {
        ordered.sort_by_key(|(number, _)| *number);
    } else {
        ordered.sort_by(|(_, a), (_, b)| a.path.cmp(&b.path));
    }

    let tracks = ordered
        .into_iter()
        .enumerate()
        .map(|(index, (_, raw))| assemble_track(index + 1, raw, &context, options))
        .collect();
    Ok(ReconciledAlbum { context, tracks })
}

/// Leading-integer parse of a `track` tag: `"7"` and `"7/12"` give 7, `"A1"` gives `None`.
pub fn parse_track_number(value: &str) -> Option<u32> {
    let trimmed = value.trim_start();
    let end = trimmed
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    trimmed[..end].parse().ok()
}

/// Zero-pad a 1-based position to at least two digits.
pub fn track_label(position: usize) -> String {
    format!("{position:02}")
}

fn resolve_context(
    tracks: &[RawTrack],
    options: &ReconcileOptions,
) -> Result<AlbumContext, ReconcileError> {
    let overrides = &options.overrides;
    let acronyms = &options.acronyms;
    let case = options.case;

    let artist = resolve_field(overrides.artist.as_deref(), tracks, tag::ARTIST, |value| {
        apply_case(value, case.artist, acronyms)
    })
    .ok_or(ReconcileError::NoArtist)?;
    let album = resolve_field(overrides.album.as_deref(), tracks, tag::ALBUM, |value| {
        apply_case(value, case.album, acronyms)
    })
    .ok_or(ReconcileError::NoAlbum)?;
    let genre = resolve_field(overrides.genre.as_deref(), tracks, tag::GENRE, |value| {
        normalize_case(value, acronyms)
    });
    let year = resolve_field(overrides.year.as_deref(), tracks, tag::DATE, str::to_string);

    Ok(AlbumContext {
        artist,
        album,
        genre,
        year,
    })
}

/// Explicit value verbatim, else the first track's tag passed through `derive`.
fn resolve_field(
    explicit: Option<&str>,
    tracks: &[RawTrack],
    key: &str,
    derive: impl Fn(&str) -> String,
) -> Option<String> {
    if let Some(value) = explicit.filter(|value| !value.trim().is_empty()) {
        return Some(value.to_string());
    }
    tracks.iter().find_map(|track| track.tag(key)).map(derive)
}

fn apply_case(value: &str, enabled: bool, acronyms: &Acronyms) -> String {
    if enabled {
        normalize_case(value, acronyms)
    } else {
        value.to_string()
    }
}

fn assemble_track(
    position: usize,
    raw: RawTrack,
    context: &AlbumContext,
    options: &ReconcileOptions,
) -> FinalTrack {
    let title = match raw.tag(tag::TITLE) {
        Some(title) => title.to_string(),
        None => file_stem(&raw.path),
    };
    let title = apply_case(&title, options.case.title, &options.acronyms);
    FinalTrack {
        metadata: FinalTrackMetadata {
            artist: context.artist.clone(),
            album: context.album.clone(),
            track: track_label(position),
            title,
            genre: context.genre.clone(),
            date: context.year.clone(),
        },
        source: raw.path,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
