//! Core of the filenav console: a recycle bin that makes deletes reversible
//! and a regex content search over directory trees.
//! The interactive prompt in [`console`] is a thin layer over both.

pub mod config;
pub mod console;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod logging;
pub mod models;
pub mod recycle_bin;
pub mod search;

pub use config::{CollisionPolicy, Config};
pub use console::{Flow, Shell};
pub use errors::{CoreError, Result};
pub use fs::{FileSystem, RealFileSystem};
pub use helpers::{
    canonical_or_relaxed,
    list_drives,
    print_size,
    serialize_system_time,
    LISTING_TIME_FORMAT,
};
pub use models::{
    CommandKind,
    FileScan,
    SearchMatch,
    SearchResult,
    SkipReason,
    StagedEntry,
    StagedFile,
};
pub use recycle_bin::RecycleBin;
pub use search::{resolve_search_root, ContentSearch};

/// Re-export a small stable API surface for the console binary.
pub mod prelude {
    pub use crate::{
        config::*,
        errors::{CoreError, Result},
        fs::{FileSystem, RealFileSystem},
        models::*,
        recycle_bin::RecycleBin,
        search::ContentSearch,
    };
}
