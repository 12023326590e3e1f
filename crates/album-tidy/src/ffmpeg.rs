//! ffmpeg operations used by the pipeline.
//!
//! Audio is always stream-copied; nothing here re-encodes.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::tool::{ToolError, ToolRunner};

pub const DEFAULT_PROGRAM: &str = "ffmpeg";

const COMMON_ARGS: [&str; 3] = ["-hide_banner", "-loglevel", "error"];

/// ffmpeg bound to a runner and a binary path.
pub struct Ffmpeg<'a> {
    runner: &'a dyn ToolRunner,
    program: &'a str,
}

impl<'a> Ffmpeg<'a> {
    pub fn new(runner: &'a dyn ToolRunner, program: &'a str) -> Self {
        Self { runner, program }
    }

    /// Dump the track's tags as an ffmetadata text file.
    pub async fn dump_metadata(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.run(dump_metadata_args(input, output)).await
    }

    /// Copy the embedded picture stream out of the track.
    pub async fn extract_cover(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.run(extract_cover_args(input, output)).await
    }

    /// Copy the audio stream only, dropping every tag and picture.
    pub async fn strip_tags(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.run(strip_tags_args(input, output)).await
    }

    /// Copy the audio stream, taking tags from an ffmetadata file.
    pub async fn write_tags(
        &self,
        input: &Path,
        metadata: &Path,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.run(write_tags_args(input, metadata, output)).await
    }

    /// Mux `cover` next to the audio stream as the front cover picture.
    pub async fn attach_cover(
        &self,
        input: &Path,
        cover: &Path,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.run(attach_cover_args(input, cover, output)).await
    }

    /// Remux the audio stream and its tags unchanged.
    pub async fn copy_audio(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.run(copy_audio_args(input, output)).await
    }

    async fn run(&self, args: Vec<OsString>) -> Result<(), ToolError> {
        self.runner.run(self.program, &args).await
    }
}

fn args<I, S>(parts: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    COMMON_ARGS
        .into_iter()
        .map(OsString::from)
        .chain(parts.into_iter().map(|part| part.as_ref().to_os_string()))
        .collect()
}

fn dump_metadata_args(input: &Path, output: &Path) -> Vec<OsString> {
    args([
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-y"),
        OsStr::new("-f"),
        OsStr::new("ffmetadata"),
        output.as_os_str(),
    ])
}

fn extract_cover_args(input: &Path, output: &Path) -> Vec<OsString> {
    args([
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-y"),
        OsStr::new("-an"),
        OsStr::new("-vcodec"),
        OsStr::new("copy"),
        output.as_os_str(),
    ])
}

fn strip_tags_args(input: &Path, output: &Path) -> Vec<OsString> {
    args([
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-y"),
        OsStr::new("-vn"),
        OsStr::new("-codec:a"),
        OsStr::new("copy"),
        OsStr::new("-map_metadata"),
        OsStr::new("-1"),
        output.as_os_str(),
    ])
}

fn write_tags_args(input: &Path, metadata: &Path, output: &Path) -> Vec<OsString> {
    args([
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-i"),
        metadata.as_os_str(),
        OsStr::new("-y"),
        OsStr::new("-vn"),
        OsStr::new("-codec:a"),
        OsStr::new("copy"),
        OsStr::new("-map_metadata"),
        OsStr::new("1"),
        OsStr::new("-write_id3v2"),
        OsStr::new("1"),
        output.as_os_str(),
    ])
}

fn attach_cover_args(input: &Path, cover: &Path, output: &Path) -> Vec<OsString> {
    args([
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-i"),
        cover.as_os_str(),
        OsStr::new("-y"),
        OsStr::new("-map"),
        OsStr::new("0:0"),
        OsStr::new("-map"),
        OsStr::new("1:0"),
        OsStr::new("-codec"),
        OsStr::new("copy"),
        OsStr::new("-id3v2_version"),
        OsStr::new("3"),
        OsStr::new("-metadata:s:v"),
        OsStr::new("title=Album cover"),
        OsStr::new("-metadata:s:v"),
        OsStr::new("comment=Cover (front)"),
        output.as_os_str(),
    ])
}

fn copy_audio_args(input: &Path, output: &Path) -> Vec<OsString> {
    args([
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-y"),
        OsStr::new("-map"),
        OsStr::new("0:0"),
        OsStr::new("-codec"),
        OsStr::new("copy"),
        output.as_os_str(),
    ])
}
