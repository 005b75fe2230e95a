// tests/mime_database.rs

use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use filterchain::errors::FilterError;
use filterchain::mime::{ChainResolver, MimeDatabase, MimeType, TypeDetector};
use filterchain_test_utils::builders::{ConfigFileBuilder, sample_config};

type TestResult = Result<(), Box<dyn Error>>;

fn mime(s: &str) -> MimeType {
    s.parse().unwrap()
}

fn sample_db() -> MimeDatabase {
    MimeDatabase::from_config(&sample_config()).unwrap()
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn write_gzip(dir: &Path, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    let mut enc = GzEncoder::new(fs::File::create(&path)?, Compression::default());
    enc.write_all(contents)?;
    enc.finish()?;
    Ok(path)
}

#[test]
fn mime_type_parsing_normalises_case() {
    let m = mime("Application/PDF");
    assert_eq!(m.super_type(), "application");
    assert_eq!(m.subtype(), "pdf");
    assert_eq!(m.to_string(), "application/pdf");
}

#[test]
fn mime_type_parsing_rejects_garbage() {
    for bad in ["", "pdf", "/pdf", "application/", "a b/c", "averyverylongsupertype/x"] {
        let err = bad.parse::<MimeType>().unwrap_err();
        assert!(matches!(err, FilterError::InvalidMimeType(_)), "{bad}: {err:?}");
    }
}

#[test]
fn database_counts_types_and_filters() {
    let db = sample_db();
    assert_eq!(db.type_count(), 4);
    assert_eq!(db.filter_count(), 4);
}

#[test]
fn detects_by_magic_regardless_of_name() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "report.bin", b"%PDF-1.7\n...")?;

    let detected = sample_db().detect_type(&path)?;
    assert_eq!(detected.mime, mime("application/pdf"));
    assert!(!detected.compressed);
    Ok(())
}

#[test]
fn detects_by_extension_case_insensitively() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "NOTES.TXT", b"hello\n")?;

    let detected = sample_db().detect_type(&path)?;
    assert_eq!(detected.mime, mime("text/plain"));
    Ok(())
}

#[test]
fn detects_gzip_content_and_strips_gz_suffix() -> TestResult {
    let dir = tempfile::tempdir()?;

    let by_magic = write_gzip(dir.path(), "doc.gz", b"%!PS-Adobe-3.0\n")?;
    let detected = sample_db().detect_type(&by_magic)?;
    assert_eq!(detected.mime, mime("application/postscript"));
    assert!(detected.compressed);

    let by_name = write_gzip(dir.path(), "notes.txt.gz", b"plain words\n")?;
    let detected = sample_db().detect_type(&by_name)?;
    assert_eq!(detected.mime, mime("text/plain"));
    assert!(detected.compressed);
    Ok(())
}

#[test]
fn unknown_content_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "mystery.dat", b"\x00\x01\x02")?;

    let err = sample_db().detect_type(&path).unwrap_err();
    assert!(matches!(err, FilterError::UnknownSourceType(_)), "{err:?}");
    Ok(())
}

#[test]
fn missing_input_is_an_io_error() {
    let err = sample_db()
        .detect_type(Path::new("/nonexistent/input.pdf"))
        .unwrap_err();
    assert!(matches!(err, FilterError::IoError(_)), "{err:?}");
}

#[test]
fn resolves_cheapest_multi_hop_chain() -> TestResult {
    let db = sample_db();

    let chain = db.resolve_chain(&mime("text/plain"), &mime("application/vnd.cups-raster"))?;
    assert_eq!(chain.programs(), vec!["texttops", "pstoraster"]);
    assert_eq!(chain.total_cost(), 133);

    let chain = db.resolve_chain(&mime("application/pdf"), &mime("application/vnd.cups-raster"))?;
    assert_eq!(chain.programs(), vec!["pdftops", "pstoraster"]);
    Ok(())
}

#[test]
fn parallel_filters_pick_the_cheaper_one() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_type("text/plain", &["*.txt"], &[])
        .with_type("application/pdf", &["*.pdf"], &[])
        .with_filter("text/plain", "application/pdf", 90, "slowtopdf")
        .with_filter("text/plain", "application/pdf", 10, "fasttopdf")
        .build();
    let db = MimeDatabase::from_config(&cfg)?;

    let chain = db.resolve_chain(&mime("text/plain"), &mime("application/pdf"))?;
    assert_eq!(chain.programs(), vec!["fasttopdf"]);
    Ok(())
}

#[test]
fn no_route_is_reported() {
    let db = sample_db();

    let err = db
        .resolve_chain(&mime("application/vnd.cups-raster"), &mime("text/plain"))
        .unwrap_err();
    match err {
        FilterError::NoFilter {
            source_type,
            dest_type,
        } => {
            assert_eq!(source_type, "application/vnd.cups-raster");
            assert_eq!(dest_type, "text/plain");
        }
        other => panic!("expected NoFilter, got {other:?}"),
    }
}

#[test]
fn has_type_only_knows_declared_types() {
    let db = sample_db();
    assert!(db.has_type(&mime("application/postscript")));
    assert!(!db.has_type(&mime("image/png")));
}
