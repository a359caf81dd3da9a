//! Archive tests.
//!
//! These tests parse writer output with an independent reader and verify:
//! - Entry names, order and payloads survive a round trip
//! - CRCs match a bitwise reference implementation
//! - Local headers and central records agree
//! - Offsets for the two-entry layout
//! - Timestamps decode back to the stamped time

use chrono::NaiveDate;

use sheetpack::archive::{build_archive, crc32, ArchiveEntry, ArchiveWriter, DosDateTime};
use sheetpack::error::ArchiveError;

use super::test_utils::{read_zip, reference_crc32, Lcg};

fn fixed_writer() -> ArchiveWriter {
    let time = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(13, 45, 30)
        .unwrap();
    ArchiveWriter::with_timestamp(DosDateTime::from_naive(time))
}

#[test]
fn test_round_trip_many_entries() {
    let mut rng = Lcg::new(11);
    let entries: Vec<ArchiveEntry> = (0..25)
        .map(|i| {
            let len = rng.range(0, 5000) as usize;
            let payload: Vec<u8> = (0..len).map(|_| rng.next_u32() as u8).collect();
            ArchiveEntry::new(format!("dir/file-{i:02}.bin"), payload)
        })
        .collect();

    let archive = fixed_writer().build(&entries).unwrap();
    let parsed = read_zip(&archive);

    assert_eq!(parsed.entries.len(), entries.len());
    for (written, read) in entries.iter().zip(&parsed.entries) {
        assert_eq!(read.name, written.name);
        assert_eq!(read.data, written.payload.to_vec());
        assert_eq!(read.crc, crc32(&written.payload));
        assert_eq!(read.method, 0);
        assert_eq!(read.flags, 0x0800);
    }
}

#[test]
fn test_crc_matches_reference() {
    let mut rng = Lcg::new(3);
    for len in [0usize, 1, 2, 3, 7, 64, 255, 1000, 4097] {
        let data: Vec<u8> = (0..len).map(|_| rng.next_u32() as u8).collect();
        assert_eq!(crc32(&data), reference_crc32(&data), "length {len}");
    }
    assert_eq!(reference_crc32(b"123456789"), 0xCBF4_3926);
}

#[test]
fn test_two_entry_layout() {
    let entries = vec![
        ArchiveEntry::new("a.png", vec![0x11u8; 10]),
        ArchiveEntry::new("a-(translate).png", vec![0x22u8; 20]),
    ];
    let archive = build_archive(&entries).unwrap();
    let parsed = read_zip(&archive);

    assert_eq!(parsed.names(), vec!["a.png", "a-(translate).png"]);
    assert_eq!(parsed.entries[0].local_offset, 0);
    assert_eq!(parsed.entries[1].local_offset, 30 + 5 + 10);
    assert_eq!(parsed.central_directory_offset, 112);
    assert_eq!(parsed.central_directory_size, (46 + 5) + (46 + 17));
    assert_eq!(archive.len(), 112 + 51 + 63 + 22);
}

#[test]
fn test_timestamp_is_written_to_every_entry() {
    let writer = fixed_writer();
    let archive = writer
        .build(&[
            ArchiveEntry::new("one.txt", &b"1"[..]),
            ArchiveEntry::new("two.txt", &b"22"[..]),
        ])
        .unwrap();
    let parsed = read_zip(&archive);

    for entry in &parsed.entries {
        assert_eq!(entry.time, 0x6DAF);
        assert_eq!(entry.date, 0x586F);

        let decoded = DosDateTime {
            time: entry.time,
            date: entry.date,
        }
        .to_naive()
        .unwrap();
        assert_eq!(decoded.to_string(), "2024-03-15 13:45:30");
    }
}

#[test]
fn test_unicode_and_duplicate_names() {
    let entries = vec![
        ArchiveEntry::new("页面.png", vec![1u8, 2, 3]),
        ArchiveEntry::new("页面.png", vec![4u8]),
        ArchiveEntry::new("empty", Vec::<u8>::new()),
    ];
    let parsed = read_zip(&fixed_writer().build(&entries).unwrap());

    assert_eq!(parsed.names(), vec!["页面.png", "页面.png", "empty"]);
    assert_eq!(parsed.entries[1].data, vec![4u8]);
    assert!(parsed.entry("empty").unwrap().data.is_empty());
    assert_eq!(parsed.entry("empty").unwrap().crc, 0);
}

#[test]
fn test_empty_archive() {
    let archive = build_archive(&[]).unwrap();
    let parsed = read_zip(&archive);

    assert!(parsed.entries.is_empty());
    assert_eq!(parsed.central_directory_offset, 0);
    assert_eq!(archive.len(), 22);
}

#[test]
fn test_encoded_len_matches_output() {
    let entries = vec![
        ArchiveEntry::new("x", vec![0u8; 123]),
        ArchiveEntry::new("longer/name.png", vec![9u8; 7]),
    ];
    let archive = build_archive(&entries).unwrap();
    assert_eq!(ArchiveWriter::encoded_len(&entries), archive.len() as u64);
}

#[test]
fn test_overlong_name_produces_no_archive() {
    let entries = vec![
        ArchiveEntry::new("ok.png", vec![1u8]),
        ArchiveEntry::new("n".repeat(70_000), vec![2u8]),
    ];
    assert!(matches!(
        build_archive(&entries),
        Err(ArchiveError::NameTooLong { len: 70_000, .. })
    ));
}
