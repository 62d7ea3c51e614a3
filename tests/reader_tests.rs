//! Tests for the random-access reader
//!
//! These tests verify:
//! - Reads return exactly the member's bytes, never padding or neighbours
//! - Repeated reads are byte-identical
//! - Lazy, process-local handle lifecycle
//! - Error kinds for directories, links, missing members, bad UTF-8
//! - Archives shrunk after indexing surface an IO error
//! - Overlapping readers on one thread

mod common;

use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::thread;

use tardataset::{ArchiveHandle, Config, MemberKind, MemberRecord, TarDataset, TarError};

use common::{color_entries, patch_file, setup_temp_archive, truncate_file, write_archive, Entry};

// =============================================================================
// Byte-Exact Read Tests
// =============================================================================

#[test]
fn test_read_returns_exact_content() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();

    assert_eq!(dataset.read_bytes("red/a.png").unwrap().as_ref(), b"red pixels");
    assert_eq!(
        dataset.read_bytes("green/b.png").unwrap().as_ref(),
        b"green pixels, slightly longer"
    );
    assert_eq!(dataset.read_bytes(2usize).unwrap().as_ref(), b"blue");
}

#[test]
fn test_read_never_passes_member_end() {
    let (_temp, path) = setup_temp_archive();
    write_archive(
        &path,
        &[Entry::File("first.bin", b"0123456789"), Entry::File("second.bin", b"zzzz")],
    );

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();
    let record = dataset.record("first.bin").unwrap().clone();

    // sentinel right after the content, inside the padding
    patch_file(&path, record.end(), &[0xAB; 16]);

    let content = dataset.read_bytes("first.bin").unwrap();
    assert_eq!(content.len() as u64, record.size);
    assert!(!content.contains(&0xAB));
    assert_eq!(content.as_ref(), b"0123456789");
}

#[test]
fn test_block_sized_member_stops_before_next_header() {
    let (_temp, path) = setup_temp_archive();
    let data = vec![b'x'; 512];
    write_archive(&path, &[Entry::File("block.bin", &data), Entry::File("next.bin", b"n")]);

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();
    let content = dataset.read_bytes("block.bin").unwrap();

    assert_eq!(content.len(), 512);
    assert!(content.iter().all(|&b| b == b'x'));
}

#[test]
fn test_small_buffer_reads() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &[Entry::File("f.txt", b"abcdefgh")]);

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();
    let mut reader = dataset.read("f.txt").unwrap();
    assert_eq!(reader.size(), 8);

    let mut buf = [0u8; 3];
    let mut collected = Vec::new();
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&buf[..n]);
    }

    assert_eq!(collected, b"abcdefgh");
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_empty_member_reads_nothing() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &[Entry::File("empty", b""), Entry::File("after", b"a")]);

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();
    assert!(dataset.read_bytes("empty").unwrap().is_empty());
}

#[test]
fn test_repeated_reads_identical() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();

    let first: Vec<_> = (0..dataset.len()).map(|i| dataset.read_bytes(i).unwrap()).collect();
    for _ in 0..3 {
        // read in reverse to force seeks backwards
        for i in (0..dataset.len()).rev() {
            assert_eq!(dataset.read_bytes(i).unwrap(), first[i]);
        }
    }
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_directory_not_readable() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();

    match dataset.read("red") {
        Err(TarError::NotReadable { name, kind }) => {
            assert_eq!(name, "red");
            assert_eq!(kind, MemberKind::Directory);
        }
        other => panic!("expected NotReadable, got {:?}", other),
    };
}

#[test]
fn test_symlink_not_readable() {
    let (_temp, path) = setup_temp_archive();
    write_archive(
        &path,
        &[Entry::File("target.txt", b"data"), Entry::Symlink("link.txt", "target.txt")],
    );

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();
    assert!(matches!(
        dataset.read_bytes("link.txt"),
        Err(TarError::NotReadable { kind: MemberKind::Other, .. })
    ));
}

#[test]
fn test_missing_member_not_found() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();

    assert!(matches!(dataset.read("yellow/d.png"), Err(TarError::NotFound(_))));
    assert!(matches!(dataset.read(99usize), Err(TarError::NotFound(_))));
}

#[test]
fn test_failed_read_leaves_others_readable() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();

    assert!(dataset.read("red").is_err());
    assert!(dataset.read("missing").is_err());
    assert_eq!(dataset.read_bytes("blue/c.png").unwrap().as_ref(), b"blue");
}

#[test]
fn test_read_text() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &[Entry::File("labels.txt", "cat\ndog\nñandú\n".as_bytes())]);

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();
    assert_eq!(dataset.read_text("labels.txt").unwrap(), "cat\ndog\nñandú\n");
}

#[test]
fn test_read_text_rejects_invalid_utf8() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &[Entry::File("bad.txt", &[b'o', b'k', 0xFF, 0xFE])]);

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();

    match dataset.read_text("bad.txt") {
        Err(TarError::Decode { name, source }) => {
            assert_eq!(name, "bad.txt");
            assert_eq!(source.valid_up_to(), 2);
        }
        other => panic!("expected Decode error, got {:?}", other),
    }
}

#[test]
fn test_archive_truncated_after_indexing() {
    let (_temp, path) = setup_temp_archive();
    let data = vec![3u8; 1500];
    write_archive(&path, &[Entry::File("big.bin", &data)]);

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();
    truncate_file(&path, 512 + 700);

    match dataset.read_bytes("big.bin") {
        Err(TarError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected IO error, got {:?}", other),
    }
}

#[test]
fn test_archive_removed_after_indexing() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::default()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        dataset.read_bytes("red/a.png"),
        Err(TarError::Open { .. })
    ));
}

// =============================================================================
// Handle Lifecycle Tests
// =============================================================================

#[test]
fn test_handle_opens_lazily() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();
    assert!(!dataset.is_handle_open());

    let _ = dataset.list().count();
    dataset.record(0usize).unwrap();
    assert!(!dataset.is_handle_open());

    dataset.read_bytes(0usize).unwrap();
    assert!(dataset.is_handle_open());
}

#[test]
fn test_close_is_idempotent_and_reopens() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();
    dataset.read_bytes(0usize).unwrap();

    dataset.close();
    assert!(!dataset.is_handle_open());
    dataset.close();

    assert_eq!(dataset.read_bytes(0usize).unwrap().as_ref(), b"red pixels");
    assert!(dataset.is_handle_open());
}

#[test]
fn test_archive_handle_direct_use() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();
    let record = dataset.record("green/b.png").unwrap();

    let handle = ArchiveHandle::new();
    assert!(!handle.is_open());
    assert!(!handle.close());

    let content = handle.open_member(&path, record).unwrap().into_vec().unwrap();
    assert_eq!(content, b"green pixels, slightly longer");
    assert!(handle.is_open());
    assert!(handle.close());
}

#[test]
fn test_clone_starts_with_closed_handle() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();
    dataset.read_bytes(0usize).unwrap();

    let worker = dataset.clone();
    assert!(!worker.is_handle_open());
    assert_eq!(worker.read_bytes(1usize).unwrap(), dataset.read_bytes(1usize).unwrap());
}

// =============================================================================
// Overlapping Reader Tests
// =============================================================================

#[test]
fn test_two_readers_alive_on_one_thread() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();

    let mut first = dataset.read("red/a.png").unwrap();
    let mut second = dataset.read("green/b.png").unwrap();
    assert!(first.is_shared());
    assert!(!second.is_shared());

    // interleave so each reader keeps its own position
    let mut a = [0u8; 4];
    let mut b = [0u8; 5];
    first.read_exact(&mut a).unwrap();
    second.read_exact(&mut b).unwrap();
    assert_eq!(&a, b"red ");
    assert_eq!(&b, b"green");

    let mut rest = Vec::new();
    first.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, b"pixels");
    assert_eq!(second.into_vec().unwrap(), b" pixels, slightly longer");
}

#[test]
fn test_handle_queries_while_reader_alive() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();
    let handle = ArchiveHandle::new();
    let record = dataset.record("blue/c.png").unwrap();

    let reader = handle.open_member(&path, record).unwrap();
    assert!(handle.is_open());
    assert!(!handle.close());
    assert!(handle.is_open());

    assert_eq!(reader.into_vec().unwrap(), b"blue");
    assert!(handle.close());
    assert!(!handle.is_open());

    let held = dataset.read(0usize).unwrap();
    assert!(dataset.is_handle_open());
    dataset.close();
    assert_eq!(held.into_vec().unwrap(), b"red pixels");
    assert!(dataset.is_handle_open());
}

#[test]
fn test_loader_reading_two_members_at_once() {
    let (_temp, path) = setup_temp_archive();
    let mut entries = color_entries();
    entries.push(Entry::File("labels.txt", b"red\ngreen\nblue\n"));
    write_archive(&path, &entries);

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();

    // image and label streamed together
    let loader = |ds: &TarDataset, record: &MemberRecord| -> tardataset::Result<(u64, u64)> {
        let image = ds.read_record(record)?;
        let labels = ds.read("labels.txt")?;
        Ok((image.size(), labels.size()))
    };

    for position in 0..dataset.len() {
        let (image, labels) = dataset.load(position, &loader).unwrap();
        assert_eq!(image, dataset.record(position).unwrap().size);
        assert_eq!(labels, 15);
    }
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_shared_dataset_across_threads() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = Arc::new(TarDataset::open(&path, &Config::images()).unwrap());
    let expected: Vec<_> = (0..dataset.len()).map(|i| dataset.read_bytes(i).unwrap()).collect();

    thread::scope(|s| {
        for t in 0..4 {
            let dataset = Arc::clone(&dataset);
            let expected = &expected;
            s.spawn(move || {
                for round in 0..50 {
                    let i = (t + round) % dataset.len();
                    assert_eq!(dataset.read_bytes(i).unwrap(), expected[i]);
                }
            });
        }
    });
}

#[test]
fn test_per_thread_clones() {
    let (_temp, path) = setup_temp_archive();
    write_archive(&path, &color_entries());

    let dataset = TarDataset::open(&path, &Config::images()).unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            let worker = dataset.clone();
            s.spawn(move || {
                assert!(!worker.is_handle_open());
                let names: Vec<String> = worker.list().map(|e| e.name.to_string()).collect();
                for name in &names {
                    assert!(!worker.read_bytes(name).unwrap().is_empty());
                }
                assert!(worker.is_handle_open());
            });
        }
    });

    assert!(!dataset.is_handle_open());
}
