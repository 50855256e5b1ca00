#![forbid(unsafe_code)]

//! Archive Reader: turns a zipped question set into manifest records and assets.

pub mod assets;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod reader;

pub use assets::{AssetHandle, AssetStore};
pub use error::ArchiveError;
pub use fetch::{ArchiveFetcher, ArchiveSource, SourceFetcher, load_archive};
pub use reader::{LoadedArchive, read_archive};
