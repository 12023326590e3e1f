//! Album metadata model shared by the `album-tidy` pipeline.
//!
//! Everything here is pure: no process spawning, no filesystem access.
//! - [`ffmetadata`]: ffmpeg's `;FFMETADATA1` key/value text format.
//! - [`name_case`]: word capitalization with an acronym exception list.
//! - [`reconcile`]: album-level tag resolution, track ordering and numbering.

pub mod ffmetadata;
pub mod name_case;
pub mod reconcile;

pub use ffmetadata::TagMap;
pub use name_case::{normalize_case, Acronyms};
pub use reconcile::{
    reconcile, AlbumContext, AlbumOverrides, CaseOptions, FinalTrack, FinalTrackMetadata,
    RawTrack, ReconcileError, ReconcileOptions, ReconciledAlbum,
};
