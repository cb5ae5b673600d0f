//! Archives written to disk read back identically in both formats.

use vecpipe::archive::{
    KeyedLookup, KeyedStream, RandomAccessReader, SequentialReader, TokenList, WriterOptions,
};
use vecpipe::vector::{Matrix, Vector};
use vecpipe::{ArchiveError, ArchiveWriter, KeyedSink};

use crate::common::{TestWorkspace, read_archive, write_archive};

fn sample_vectors() -> Vec<(&'static str, Vector)> {
    vec![
        ("u1", vec![1.0, -2.5, 0.125]),
        ("u2", vec![]),
        ("u3", vec![f32::MIN_POSITIVE, 1e-7, 3.4e38]),
    ]
}

#[test]
fn test_vectors_survive_binary_and_text() {
    let ws = TestWorkspace::new();

    for locator in [
        format!("ark:{}", ws.file("v.ark")),
        format!("ark,t:{}", ws.file("v.txt")),
        ws.file("bare.txt"),
    ] {
        write_archive(&locator, &sample_vectors());

        let records = read_archive::<Vector>(&locator);
        let expected: Vec<(String, Vector)> = sample_vectors()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(records, expected, "sequential read of {locator}");

        let lookup = RandomAccessReader::<Vector>::open(&locator).unwrap();
        assert_eq!(lookup.len(), 3);
        for (key, value) in &expected {
            assert_eq!(&lookup.value(key).unwrap(), value, "lookup of {key} in {locator}");
        }
        assert!(!lookup.has_key("u4"));
    }
}

#[test]
fn test_bare_path_is_text_unless_configured() {
    let ws = TestWorkspace::new();
    let path = ws.file("scores.txt");
    write_archive(&path, &[("u1", vec![1.0f32, 2.0])]);
    assert_eq!(ws.read("scores.txt"), "u1 [ 1 2 ]\n");

    let binary = ws.file("scores.bin");
    let options = WriterOptions {
        binary_by_default: true,
        flush_each_write: false,
    };
    let mut writer = ArchiveWriter::<Vector>::open(&binary, options).unwrap();
    assert!(writer.is_binary());
    writer.write("u1", &vec![1.0, 2.0]).unwrap();
    writer.flush().unwrap();
    drop(writer);

    let bytes = std::fs::read(ws.path().join("scores.bin")).unwrap();
    assert_eq!(&bytes[..4], b"VPAK");
    assert_eq!(read_archive::<Vector>(&binary)[0].1, vec![1.0, 2.0]);
}

#[test]
fn test_matrices_and_token_lists() {
    let ws = TestWorkspace::new();
    let m = Matrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
    let empty = Matrix::zeros(0, 0);

    for locator in [
        format!("ark:{}", ws.file("m.ark")),
        format!("ark,t:{}", ws.file("m.txt")),
    ] {
        write_archive(&locator, &[("r1", m.clone()), ("r2", empty.clone())]);
        let records = read_archive::<Matrix>(&locator);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].1, m);
        assert_eq!(records[1].1.num_rows(), 0);
    }
    assert_eq!(ws.read("m.txt"), "r1 [\n  1 0.5\n  0.5 1 ]\nr2 [ ]\n");

    let groups: Vec<(&str, TokenList)> = vec![
        ("r1", vec!["a".to_string(), "b".to_string()]),
        ("r2", vec![]),
    ];
    for locator in [
        format!("ark:{}", ws.file("g.ark")),
        format!("ark,t:{}", ws.file("g.txt")),
    ] {
        write_archive(&locator, &groups);
        let records = read_archive::<TokenList>(&locator);
        assert_eq!(records[0].1, vec!["a", "b"]);
        assert!(records[1].1.is_empty());
    }
    assert_eq!(ws.read("g.txt"), "r1 a b\nr2\n");
}

#[test]
fn test_handwritten_text_archive() {
    let ws = TestWorkspace::new();
    ws.add_file("vectors.txt", "\na [ 1 0 ]\n\n  b [ 0 1 ]\nc [ ]\n");

    let locator = format!("ark:{}", ws.file("vectors.txt"));
    let mut reader = SequentialReader::<Vector>::open(&locator).unwrap();
    let mut keys = Vec::new();
    while !reader.done() {
        keys.push(reader.key().to_string());
        reader.next().unwrap();
    }
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn test_duplicate_keys_first_wins_in_both_formats() {
    let ws = TestWorkspace::new();
    let entries = [("a", vec![1.0f32]), ("b", vec![2.0]), ("a", vec![3.0])];

    for locator in [
        format!("ark:{}", ws.file("dup.ark")),
        format!("ark,t:{}", ws.file("dup.txt")),
    ] {
        write_archive(&locator, &entries);
        let lookup = RandomAccessReader::<Vector>::open(&locator).unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.value("a").unwrap(), vec![1.0]);
    }
}

#[test]
fn test_truncated_binary_archive_is_reported() {
    let ws = TestWorkspace::new();
    let locator = format!("ark:{}", ws.file("cut.ark"));
    write_archive(&locator, &[("u1", vec![1.0f32, 2.0]), ("u2", vec![3.0, 4.0])]);

    let path = ws.path().join("cut.ark");
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

    let mut reader = SequentialReader::<Vector>::open(&locator).unwrap();
    assert_eq!(reader.key(), "u1");
    match reader.next() {
        Err(ArchiveError::InvalidFormat { record, .. }) => assert_eq!(record, 2),
        other => panic!("expected a format error, got {other:?}"),
    }

    assert!(matches!(
        RandomAccessReader::<Vector>::open(&locator),
        Err(ArchiveError::InvalidFormat { .. })
    ));
}

#[test]
fn test_wrong_value_kind_is_rejected() {
    let ws = TestWorkspace::new();
    let locator = format!("ark:{}", ws.file("v.ark"));
    write_archive(&locator, &[("u1", vec![1.0f32])]);

    assert!(matches!(
        SequentialReader::<Matrix>::open(&locator),
        Err(ArchiveError::InvalidFormat { .. })
    ));
}

#[test]
fn test_missing_file_and_bad_locators() {
    let ws = TestWorkspace::new();
    assert!(matches!(
        SequentialReader::<Vector>::open(&ws.file("absent.ark")),
        Err(ArchiveError::Open { .. })
    ));
    assert!(matches!(
        SequentialReader::<Vector>::open(&format!("scp:{}", ws.file("list.scp"))),
        Err(ArchiveError::InvalidLocator { .. })
    ));
    let bad_option = format!("ark,zz:{}", ws.file("o.ark"));
    assert!(matches!(
        ArchiveWriter::<Vector>::open(&bad_option, WriterOptions::default()),
        Err(ArchiveError::InvalidLocator { .. })
    ));
}
