//! Output tree naming and file name sanitization.
//!
//! ```text
//! <output>/<artist>/<album>/cover.jpg
//! <output>/<artist>/<album>/<NN> <artist> - <title>.mp3
//! <output>/.tmp/                        (removed after a successful run)
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Working directory created under the output root for intermediates.
pub const WORK_DIR_NAME: &str = ".tmp";
pub const COVER_FILE_NAME: &str = "cover.jpg";
pub const TRACK_EXTENSION: &str = "mp3";

const REPLACEMENT: char = '!';
const MAX_NAME_CHARS: usize = 100;
const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const WINDOWS_DEVICES: [&str; 4] = ["con", "prn", "aux", "nul"];

/// Make `value` usable as a single path segment.
///
/// Reserved and control characters become `!`, leading dots collapse into one
/// `!`, trailing dots are dropped, runs of `!` are collapsed and trimmed from
/// both ends, Windows device names get a `!` suffix, and the result is capped
/// at 100 chars.
pub fn sanitize_filename(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|ch| {
            if RESERVED.contains(&ch) || is_control(ch) {
                REPLACEMENT
            } else {
                ch
            }
        })
        .collect();

    let without_dots = match replaced.strip_prefix('.') {
        Some(rest) => format!("{REPLACEMENT}{}", rest.trim_start_matches('.')),
        None => replaced,
    };
    let without_dots = without_dots.trim_end_matches('.');

    let mut collapsed = String::with_capacity(without_dots.len());
    for ch in without_dots.chars() {
        if ch == REPLACEMENT && collapsed.ends_with(REPLACEMENT) {
            continue;
        }
        collapsed.push(ch);
    }

    let mut name = if collapsed.chars().count() > 1 {
        let trimmed = collapsed.strip_prefix(REPLACEMENT).unwrap_or(&collapsed);
        trimmed
            .strip_suffix(REPLACEMENT)
            .unwrap_or(trimmed)
            .to_string()
    } else {
        collapsed
    };

    if is_windows_device(&name) {
        name.push(REPLACEMENT);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        name = name.chars().take(MAX_NAME_CHARS).collect();
    }
    if name.is_empty() {
        name.push(REPLACEMENT);
    }
    name
}

fn is_control(ch: char) -> bool {
    matches!(ch, '\u{0000}'..='\u{001f}' | '\u{0080}'..='\u{009f}')
}

fn is_windows_device(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if WINDOWS_DEVICES.contains(&lower.as_str()) {
        return true;
    }
    let bytes = lower.as_bytes();
    bytes.len() == 4
        && (lower.starts_with("com") || lower.starts_with("lpt"))
        && bytes[3].is_ascii_digit()
}

/// `<output>/<artist>/<album>` with both segments sanitized.
pub fn album_dir(output: &Path, artist: &str, album: &str) -> PathBuf {
    output
        .join(sanitize_filename(artist))
        .join(sanitize_filename(album))
}

/// `<NN> <artist> - <title>.mp3` with artist and title sanitized.
pub fn track_file_name(track: &str, artist: &str, title: &str) -> String {
    format!(
        "{} {} - {}.{}",
        track,
        sanitize_filename(artist),
        sanitize_filename(title),
        TRACK_EXTENSION
    )
}

pub fn work_dir(output: &Path) -> PathBuf {
    output.join(WORK_DIR_NAME)
}

/// Where the metadata dump of an input file goes.
pub fn metadata_dump_path(work_dir: &Path, file_name: &OsStr) -> PathBuf {
    let mut name = file_name.to_os_string();
    name.push(".txt");
    work_dir.join(name)
}

/// Intermediate audio file for `track` after pipeline `stage`.
pub fn intermediate_path(work_dir: &Path, track: &str, stage: u8) -> PathBuf {
    work_dir.join(format!("{track}{stage}.{TRACK_EXTENSION}"))
}

/// True for `.mp3` files, ignoring extension case.
pub fn is_track_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TRACK_EXTENSION))
}
