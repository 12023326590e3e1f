//! Command-line interface definitions.
//!
//! Values left unset here fall back to the config file, then to built-in defaults
//! (see [`crate::config::RunConfig::resolve`]).

use std::path::PathBuf;

use clap::{ArgAction, Parser};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "album-tidy",
    version = VERSION,
    about = "Normalize tags, track numbering and cover art of an MP3 album"
)]
pub struct Args {
    /// Directory with the album's tracks
    pub input: PathBuf,

    /// Output root; removed and rebuilt on every run
    pub output: PathBuf,

    /// Capitalize the artist name taken from tags [default: true]
    #[arg(long, visible_alias = "ca", action = ArgAction::Set, value_name = "BOOL")]
    pub case_artist: Option<bool>,

    /// Artist name (used verbatim, overrides tags)
    #[arg(long)]
    pub artist: Option<String>,

    /// Capitalize the album name taken from tags [default: true]
    #[arg(long, visible_alias = "cl", action = ArgAction::Set, value_name = "BOOL")]
    pub case_album: Option<bool>,

    /// Album name (used verbatim, overrides tags)
    #[arg(long)]
    pub album: Option<String>,

    /// Capitalize track titles [default: true]
    #[arg(long, visible_alias = "ct", action = ArgAction::Set, value_name = "BOOL")]
    pub case_title: Option<bool>,

    /// Genre (overrides tags)
    #[arg(long)]
    pub genre: Option<String>,

    /// Release year (overrides tags)
    #[arg(long)]
    pub year: Option<u32>,

    /// Cover edge length in pixels; the cover is square [default: 500]
    #[arg(long, visible_alias = "cs", value_name = "PIXELS")]
    pub cover_size: Option<u32>,

    /// Words whose case is never changed [default: OST EP LP feat]
    #[arg(long, num_args = 1.., value_name = "WORD")]
    pub acronyms: Option<Vec<String>>,

    /// Optional config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// ffmpeg binary to invoke [default: ffmpeg]
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_directories_only() {
        let args = Args::try_parse_from(["album-tidy", "in", "out"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in"));
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.case_artist, None);
        assert_eq!(args.cover_size, None);
        assert_eq!(args.acronyms, None);
    }

    #[test]
    fn case_flags_take_explicit_values_and_aliases() {
        let args = Args::try_parse_from([
            "album-tidy",
            "in",
            "out",
            "--case-artist",
            "false",
            "--cl",
            "true",
            "--ct",
            "false",
        ])
        .unwrap();
        assert_eq!(args.case_artist, Some(false));
        assert_eq!(args.case_album, Some(true));
        assert_eq!(args.case_title, Some(false));
    }

    #[test]
    fn overrides_and_lists() {
        let args = Args::try_parse_from([
            "album-tidy",
            "in",
            "out",
            "--artist",
            "Low",
            "--year",
            "2001",
            "--cs",
            "800",
            "--acronyms",
            "OST",
            "DJ",
        ])
        .unwrap();
        assert_eq!(args.artist.as_deref(), Some("Low"));
        assert_eq!(args.year, Some(2001));
        assert_eq!(args.cover_size, Some(800));
        assert_eq!(
            args.acronyms,
            Some(vec!["OST".to_string(), "DJ".to_string()])
        );
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let err = Args::try_parse_from(["album-tidy", "in", "out", "--colour", "red"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn year_must_be_numeric() {
        assert!(Args::try_parse_from(["album-tidy", "in", "out", "--year", "MMI"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
