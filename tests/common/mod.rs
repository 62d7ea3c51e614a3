//! Shared helpers: build real tar archives in temp directories

#![allow(dead_code)]

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tar::{Builder, EntryType, Header};
use tempfile::TempDir;

/// One member to put in a test archive
pub enum Entry<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
    Symlink(&'a str, &'a str),
    /// PAX header carrying `path`, followed by a file with a short header name
    PaxFile { short: &'a str, long: &'a str, data: &'a [u8] },
}

pub fn setup_temp_archive() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.tar");
    (temp_dir, path)
}

/// Write `entries` as a GNU tar archive at `path`
pub fn write_archive(path: &Path, entries: &[Entry<'_>]) {
    let file = File::create(path).unwrap();
    let mut builder = Builder::new(file);

    for entry in entries {
        match entry {
            Entry::File(name, data) => {
                let mut header = Header::new_gnu();
                header.set_entry_type(EntryType::Regular);
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                builder.append_data(&mut header, name, *data).unwrap();
            }
            Entry::Dir(name) => {
                let mut header = Header::new_gnu();
                header.set_entry_type(EntryType::Directory);
                header.set_size(0);
                header.set_mode(0o755);
                builder.append_data(&mut header, name, io::empty()).unwrap();
            }
            Entry::Symlink(name, target) => {
                let mut header = Header::new_gnu();
                header.set_entry_type(EntryType::Symlink);
                header.set_size(0);
                header.set_mode(0o777);
                builder.append_link(&mut header, name, target).unwrap();
            }
            Entry::PaxFile { short, long, data } => {
                let records = pax_record("path", long);
                let mut pax = Header::new_ustar();
                pax.set_entry_type(EntryType::XHeader);
                pax.set_path("PaxHeaders/entry").unwrap();
                pax.set_size(records.len() as u64);
                pax.set_mode(0o644);
                pax.set_cksum();
                builder.append(&pax, records.as_bytes()).unwrap();

                let mut header = Header::new_ustar();
                header.set_entry_type(EntryType::Regular);
                header.set_path(short).unwrap();
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder.append(&header, *data).unwrap();
            }
        }
    }

    builder.into_inner().unwrap().sync_all().unwrap();
}

/// One PAX record: "<len> <key>=<value>\n", where len counts itself
pub fn pax_record(key: &str, value: &str) -> String {
    let body = format!(" {}={}\n", key, value);
    let mut len = body.len() + 1;
    loop {
        let total = len.to_string().len() + body.len();
        if total == len {
            break;
        }
        len = total;
    }
    format!("{}{}", len, body)
}

/// Overwrite bytes at `offset` in an existing file
pub fn patch_file(path: &Path, offset: u64, bytes: &[u8]) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(bytes).unwrap();
    file.sync_all().unwrap();
}

/// Cut a file down to `len` bytes
pub fn truncate_file(path: &Path, len: u64) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(len).unwrap();
}

/// Append raw bytes to a file
pub fn append_bytes(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

/// The three-class image layout used across tests
pub fn color_entries() -> Vec<Entry<'static>> {
    vec![
        Entry::Dir("red/"),
        Entry::File("red/a.png", b"red pixels"),
        Entry::Dir("green/"),
        Entry::File("green/b.png", b"green pixels, slightly longer"),
        Entry::Dir("blue/"),
        Entry::File("blue/c.png", b"blue"),
    ]
}
