//! Reading one member of a zip archive through a lazily-fetched file
//!
//! The archive reader seeks and reads on its own; the cache must serve it
//! correctly while fetching only the directory and the member it opens.

use lazyfile::{LazyFile, MemoryProvider};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const METADATA: &[u8] = b"Metadata-Version: 2.1\nName: demo\nVersion: 1.0\n";

/// A wheel-shaped archive: a large module followed by the dist-info files
fn build_wheel() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    let payload: Vec<u8> = (0..200_000u32).map(|i| (i * 31 % 251) as u8).collect();
    writer.start_file("demo/_core.so", options).unwrap();
    writer.write_all(&payload).unwrap();

    writer.start_file("demo-1.0.dist-info/METADATA", options).unwrap();
    writer.write_all(METADATA).unwrap();

    writer.start_file("demo-1.0.dist-info/RECORD", options).unwrap();
    writer.write_all(b"demo/_core.so,,\n").unwrap();

    writer.finish().unwrap().into_inner()
}

#[test]
fn test_extract_member_fetches_small_fraction() {
    let wheel = build_wheel();
    let total = wheel.len() as u64;

    let file = LazyFile::new(MemoryProvider::new(wheel)).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();

    let name = archive
        .file_names()
        .find(|name| name.ends_with(".dist-info/METADATA"))
        .map(str::to_string)
        .expect("METADATA member present");

    let mut contents = Vec::new();
    archive
        .by_name(&name)
        .unwrap()
        .read_to_end(&mut contents)
        .unwrap();
    assert_eq!(contents, METADATA);

    let file = archive.into_inner();
    let stats = file.cache().metrics().get_stats();
    assert!(
        stats.bytes_fetched < total / 10,
        "fetched {} of {} bytes",
        stats.bytes_fetched,
        total
    );
    assert!(!file.cache().is_fully_cached());
}

#[test]
fn test_whole_archive_still_readable() {
    let wheel = build_wheel();
    let file = LazyFile::new(MemoryProvider::new(wheel)).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();

    let mut record = String::new();
    archive
        .by_name("demo-1.0.dist-info/RECORD")
        .unwrap()
        .read_to_string(&mut record)
        .unwrap();
    assert_eq!(record, "demo/_core.so,,\n");

    let mut core = Vec::new();
    archive
        .by_name("demo/_core.so")
        .unwrap()
        .read_to_end(&mut core)
        .unwrap();
    assert_eq!(core.len(), 200_000);
    assert_eq!(core[1], 31);
}
