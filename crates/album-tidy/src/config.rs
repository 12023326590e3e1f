//! Configuration loading and resolution.
//!
//! An optional TOML file supplies defaults; explicit CLI flags win over it.

use std::path::{Path, PathBuf};

use album_meta::{Acronyms, AlbumOverrides, CaseOptions, ReconcileOptions};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::cli::Args;
use crate::cover::DEFAULT_COVER_SIZE;
use crate::ffmpeg::DEFAULT_PROGRAM;

/// Settings that may be kept in a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// ffmpeg binary name or path.
    pub ffmpeg: Option<String>,
    /// Square cover edge length in pixels.
    pub cover_size: Option<u32>,
    /// Words whose case is never changed.
    pub acronyms: Option<Vec<String>>,
    /// Capitalize the artist taken from tags.
    pub case_artist: Option<bool>,
    /// Capitalize the album taken from tags.
    pub case_album: Option<bool>,
    /// Capitalize track titles.
    pub case_title: Option<bool>,
}

impl FileConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<FileConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Everything one run needs, with defaults applied.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Absolute input directory.
    pub input_dir: PathBuf,
    /// Absolute output root.
    pub output_dir: PathBuf,
    /// ffmpeg binary to invoke.
    pub ffmpeg: String,
    /// Square cover edge length in pixels.
    pub cover_size: u32,
    /// Overrides, case flags and acronyms for reconciliation.
    pub reconcile: ReconcileOptions,
}

impl RunConfig {
    /// Merge CLI flags over the config file over built-in defaults.
    pub fn resolve(args: &Args, file: &FileConfig) -> Result<Self> {
        let input_dir = std::path::absolute(&args.input)
            .with_context(|| format!("resolve input {:?}", args.input))?;
        let output_dir = std::path::absolute(&args.output)
            .with_context(|| format!("resolve output {:?}", args.output))?;

        let cover_size = args
            .cover_size
            .or(file.cover_size)
            .unwrap_or(DEFAULT_COVER_SIZE);
        if cover_size == 0 {
            return Err(anyhow!("cover size must be greater than zero"));
        }

        let acronyms = match args.acronyms.as_ref().or(file.acronyms.as_ref()) {
            Some(words) => Acronyms::new(words.iter().cloned()),
            None => Acronyms::default(),
        };
        let defaults = CaseOptions::default();
        let case = CaseOptions {
            artist: args
                .case_artist
                .or(file.case_artist)
                .unwrap_or(defaults.artist),
            album: args.case_album.or(file.case_album).unwrap_or(defaults.album),
            title: args.case_title.or(file.case_title).unwrap_or(defaults.title),
        };

        Ok(Self {
            input_dir,
            output_dir,
            ffmpeg: args
                .ffmpeg
                .clone()
                .or_else(|| file.ffmpeg.clone())
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            cover_size,
            reconcile: ReconcileOptions {
                overrides: AlbumOverrides {
                    artist: args.artist.clone(),
                    album: args.album.clone(),
                    genre: args.genre.clone(),
                    year: args.year.map(|year| year.to_string()),
                },
                case,
                acronyms,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["album-tidy", "/music/in", "/music/out"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let cfg = RunConfig::resolve(&args(&[]), &FileConfig::default()).unwrap();
        assert_eq!(cfg.input_dir, PathBuf::from("/music/in"));
        assert_eq!(cfg.output_dir, PathBuf::from("/music/out"));
        assert_eq!(cfg.ffmpeg, "ffmpeg");
        assert_eq!(cfg.cover_size, 500);
        assert_eq!(cfg.reconcile.case, CaseOptions::default());
        assert_eq!(cfg.reconcile.acronyms, Acronyms::default());
        assert_eq!(cfg.reconcile.overrides, AlbumOverrides::default());
    }

    #[test]
    fn relative_paths_become_absolute() {
        let cfg = RunConfig::resolve(
            &Args::parse_from(["album-tidy", "in", "out"]),
            &FileConfig::default(),
        )
        .unwrap();
        assert!(cfg.input_dir.is_absolute());
        assert!(cfg.output_dir.ends_with("out"));
    }

    #[test]
    fn file_values_fill_gaps_and_flags_win() {
        let file: FileConfig = toml::from_str(
            r#"
            ffmpeg = "/opt/ffmpeg"
            cover_size = 600
            acronyms = ["DJ"]
            case_title = false
            case_album = false
            "#,
        )
        .unwrap();
        let cfg = RunConfig::resolve(&args(&["--cs", "300", "--cl", "true"]), &file).unwrap();
        assert_eq!(cfg.ffmpeg, "/opt/ffmpeg");
        assert_eq!(cfg.cover_size, 300);
        assert!(cfg.reconcile.acronyms.contains("DJ"));
        assert!(!cfg.reconcile.acronyms.contains("OST"));
        assert!(!cfg.reconcile.case.title);
        assert!(cfg.reconcile.case.album);
        assert!(cfg.reconcile.case.artist);
    }

    #[test]
    fn overrides_are_carried_through() {
        let cfg = RunConfig::resolve(
            &args(&["--artist", "Low", "--album", "Trust", "--genre", "slowcore", "--year", "2002"]),
            &FileConfig::default(),
        )
        .unwrap();
        assert_eq!(
            cfg.reconcile.overrides,
            AlbumOverrides {
                artist: Some("Low".to_string()),
                album: Some("Trust".to_string()),
                genre: Some("slowcore".to_string()),
                year: Some("2002".to_string()),
            }
        );
    }

    #[test]
    fn zero_cover_size_is_rejected() {
        assert!(RunConfig::resolve(&args(&["--cover-size", "0"]), &FileConfig::default()).is_err());
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("cover = 3").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = FileConfig::load(Path::new("/definitely/missing/album-tidy.toml")).unwrap_err();
        assert!(err.to_string().contains("read config"));
    }
}
