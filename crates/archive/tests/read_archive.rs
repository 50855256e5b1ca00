use std::io::{Cursor, Write};

use archive::{
    ArchiveError, ArchiveFetcher, ArchiveSource, SourceFetcher, load_archive, read_archive,
};
use quiz_core::normalize::Scalar;
use quiz_core::render::AssetLookup;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const MANIFEST: &str = "questions:
  - id: 1
    type: multi
    content: |
      Which city?
      [img=img/map.png]
    choices: |
      #$ Paris
      ## Rome
";

fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
            continue;
        }
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn reads_manifest_and_assets() {
    let bytes = build_zip(&[
        ("questions.yaml", MANIFEST.as_bytes()),
        ("img/", b""),
        ("img/map.png", &[0x89, b'P', b'N', b'G']),
        ("notes.YML", b"ignored: true"),
    ]);

    let loaded = read_archive(&bytes).unwrap();
    assert_eq!(loaded.questions.len(), 1);
    assert_eq!(loaded.questions[0].id, Some(Scalar::Int(1)));
    assert_eq!(loaded.assets.paths(), vec!["img/map.png"]);
    assert!(loaded.assets.has_asset("img/map.png"));
    assert_eq!(
        loaded.assets.get("img/map.png").unwrap().bytes(),
        &[0x89, b'P', b'N', b'G']
    );
}

#[test]
fn falls_back_to_yml_manifest() {
    let bytes = build_zip(&[("questions.yml", MANIFEST.as_bytes())]);
    let loaded = read_archive(&bytes).unwrap();
    assert_eq!(loaded.questions.len(), 1);
    assert!(loaded.assets.is_empty());
}

#[test]
fn missing_manifest_is_an_archive_error() {
    let bytes = build_zip(&[("img/a.png", b"x")]);
    let err = read_archive(&bytes).unwrap_err();
    assert!(matches!(err, ArchiveError::MissingManifest));
}

#[test]
fn garbage_bytes_cannot_be_opened() {
    let err = read_archive(b"definitely not a zip").unwrap_err();
    assert!(matches!(err, ArchiveError::Open(_)));
}

#[tokio::test]
async fn loads_archive_from_local_file() {
    let bytes = build_zip(&[("questions.yaml", MANIFEST.as_bytes())]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("set.zip");
    std::fs::write(&path, &bytes).unwrap();

    let source = ArchiveSource::parse(path.to_str().unwrap()).unwrap();
    let fetcher = SourceFetcher::new();
    assert_eq!(fetcher.fetch(&source).await.unwrap(), bytes);

    let loaded = load_archive(&fetcher, &source).await.unwrap();
    assert_eq!(loaded.questions.len(), 1);
}

#[tokio::test]
async fn missing_local_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = ArchiveSource::Path(dir.path().join("absent.zip"));
    let err = load_archive(&SourceFetcher::new(), &source)
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Io(_)));
}
