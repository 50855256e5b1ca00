use std::io::{Cursor, Read};

use quiz_core::normalize::RawQuestionSource;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::assets::AssetStore;
use crate::error::ArchiveError;
use crate::manifest::{MANIFEST_NAMES, is_manifest_name, parse_manifest};

/// Output of the archive reader: manifest records plus owned assets.
#[derive(Debug)]
pub struct LoadedArchive {
    pub questions: Vec<RawQuestionSource>,
    pub assets: AssetStore,
}

/// Decode a zip archive held in memory.
///
/// # Errors
///
/// Returns `ArchiveError::Open` if the bytes are not a readable zip,
/// `ArchiveError::MissingManifest` if no manifest entry exists and
/// `ArchiveError::InvalidManifest` if the manifest cannot be parsed.
pub fn read_archive(bytes: &[u8]) -> Result<LoadedArchive, ArchiveError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;

    let manifest = read_manifest(&mut zip)?;
    let questions = parse_manifest(&manifest)?;

    let mut assets = AssetStore::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() || is_manifest_name(entry.name()) {
            continue;
        }
        let name = entry.name().to_owned();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        assets.insert(name, data);
    }

    log::info!(
        "archive read: {} questions, {} assets",
        questions.len(),
        assets.len()
    );
    Ok(LoadedArchive { questions, assets })
}

fn read_manifest(zip: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, ArchiveError> {
    for name in MANIFEST_NAMES {
        match zip.by_name(name) {
            Ok(mut entry) => {
                let mut text = String::new();
                entry.read_to_string(&mut text)?;
                return Ok(text);
            }
            Err(ZipError::FileNotFound) => {}
            Err(err) => return Err(err.into()),
        }
    }
    Err(ArchiveError::MissingManifest)
}
