//! Both pipelines run over file-backed archives.

use vecpipe::archive::{
    GroupReader, MatrixWriter, RandomAccessVectorReader, VectorReader, VectorWriter,
    WriterOptions,
};
use vecpipe::pipeline::{SimilarityOptions, StreamSide};
use vecpipe::vector::{Matrix, Vector};
use vecpipe::{PipelineError, RunSummary, append_vectors, compute_dot_products_dense};

use crate::common::{TestWorkspace, read_archive, write_archive};

#[test]
fn test_append_vectors_binary_inputs() {
    let ws = TestWorkspace::new();
    let a = format!("ark:{}", ws.file("a.ark"));
    let b = format!("ark:{}", ws.file("b.ark"));
    let out = format!("ark:{}", ws.file("ab.ark"));
    write_archive(&a, &[("u1", vec![1.0f32, 2.0]), ("u2", vec![3.0])]);
    write_archive(&b, &[("u1", vec![10.0f32]), ("u2", vec![20.0, 21.0])]);

    let summary = {
        let mut first = VectorReader::open(&a).unwrap();
        let mut second = VectorReader::open(&b).unwrap();
        let mut writer = VectorWriter::open(&out, WriterOptions::default()).unwrap();
        append_vectors(&mut first, &mut second, &mut writer).unwrap()
    };

    assert!(summary.is_success());
    assert_eq!(
        read_archive::<Vector>(&out),
        vec![
            ("u1".to_string(), vec![1.0, 2.0, 10.0]),
            ("u2".to_string(), vec![3.0, 20.0, 21.0]),
        ]
    );
}

#[test]
fn test_append_vectors_mixed_formats_with_leftover() {
    let ws = TestWorkspace::new();
    ws.add_file("a.txt", "u1 [ 1 ]\nu2 [ 2 ]\nu3 [ 3 ]\n");
    let b = format!("ark:{}", ws.file("b.ark"));
    write_archive(&b, &[("u1", vec![5.0f32]), ("u2", vec![6.0])]);
    let out = ws.file("out.txt");

    let summary = {
        let mut first = VectorReader::open(&ws.file("a.txt")).unwrap();
        let mut second = VectorReader::open(&b).unwrap();
        let mut writer = VectorWriter::open(&out, WriterOptions::default()).unwrap();
        append_vectors(&mut first, &mut second, &mut writer).unwrap()
    };

    assert_eq!(summary.num_done, 2);
    assert_eq!(summary.leftover, Some(StreamSide::First));
    assert!(!summary.is_success());
    assert_eq!(ws.read("out.txt"), "u1 [ 1 5 ]\nu2 [ 2 6 ]\n");
}

#[test]
fn test_append_vectors_mismatch_keeps_earlier_records() {
    let ws = TestWorkspace::new();
    ws.add_file("a.txt", "u1 [ 1 ]\nu2 [ 2 ]\n");
    ws.add_file("b.txt", "u1 [ 1 ]\nu3 [ 3 ]\n");
    let out = ws.file("out.txt");

    let err = {
        let mut first = VectorReader::open(&ws.file("a.txt")).unwrap();
        let mut second = VectorReader::open(&ws.file("b.txt")).unwrap();
        let mut writer = VectorWriter::open(&out, WriterOptions::default()).unwrap();
        append_vectors(&mut first, &mut second, &mut writer).unwrap_err()
    };

    assert!(matches!(err, PipelineError::KeyMismatch { .. }));
    assert_eq!(ws.read("out.txt"), "u1 [ 1 1 ]\n");
}

#[test]
fn test_dot_products_text_groups_binary_store() {
    let ws = TestWorkspace::new();
    ws.add_file("groups.txt", "r1 a b\nr2\nr3 b\n");
    let store = format!("ark:{}", ws.file("vectors.ark"));
    write_archive(&store, &[("a", vec![1.0f32, 0.0]), ("b", vec![0.0f32, 1.0])]);
    let out = format!("ark,t:{}", ws.file("scores.txt"));

    let summary = {
        let mut groups = GroupReader::open(&ws.file("groups.txt")).unwrap();
        let vectors = RandomAccessVectorReader::open(&store).unwrap();
        let mut writer = MatrixWriter::open(&out, WriterOptions::default()).unwrap();
        compute_dot_products_dense(&mut groups, &vectors, &mut writer, SimilarityOptions::default())
            .unwrap()
    };

    assert_eq!(summary.num_done, 2);
    assert_eq!(summary.num_err, 1);
    assert!(summary.is_success());
    assert_eq!(ws.read("scores.txt"), "r1 [\n  1 0\n  0 1 ]\nr3 [\n  1 ]\n");

    let matrices = read_archive::<Matrix>(&out);
    assert_eq!(matrices.len(), 2);
    assert!(matrices[0].1.is_square());
}

#[test]
fn test_dot_products_missing_member_on_disk() {
    let ws = TestWorkspace::new();
    ws.add_file("groups.txt", "r1 a\nr2 a ghost\n");
    ws.add_file("vectors.txt", "a [ 2 ]\n");
    let out = format!("ark:{}", ws.file("scores.ark"));

    let err = {
        let mut groups = GroupReader::open(&ws.file("groups.txt")).unwrap();
        let vectors = RandomAccessVectorReader::open(&ws.file("vectors.txt")).unwrap();
        let mut writer = MatrixWriter::open(&out, WriterOptions::default()).unwrap();
        compute_dot_products_dense(&mut groups, &vectors, &mut writer, SimilarityOptions::default())
            .unwrap_err()
    };

    match err {
        PipelineError::MissingVector { group, member } => {
            assert_eq!(group, "r2");
            assert_eq!(member, "ghost");
        }
        other => panic!("unexpected error: {other}"),
    }
    // The matrix for r1 was written before the failure.
    let written = read_archive::<Matrix>(&out);
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].1.as_slice(), &[4.0]);
}

#[test]
fn test_dot_products_with_script_store() {
    let ws = TestWorkspace::new();
    ws.add_file("groups.txt", "r1 a b\n");
    write_archive(&format!("ark,t:{}", ws.file("a.txt")), &[("a", vec![3.0f32, 4.0])]);
    write_archive(&format!("ark:{}", ws.file("b.ark")), &[("b", vec![1.0f32, 1.0])]);
    ws.add_file(
        "vectors.scp",
        &format!("a {}\nb ark:{}\n", ws.file("a.txt"), ws.file("b.ark")),
    );
    let out = format!("ark,t:{}", ws.file("scores.txt"));

    let summary = {
        let mut groups = GroupReader::open(&ws.file("groups.txt")).unwrap();
        let vectors = RandomAccessVectorReader::open(&format!("scp:{}", ws.file("vectors.scp")))
            .unwrap();
        let mut writer = MatrixWriter::open(&out, WriterOptions::default()).unwrap();
        compute_dot_products_dense(&mut groups, &vectors, &mut writer, SimilarityOptions::default())
            .unwrap()
    };

    assert_eq!(summary.num_done, 1);
    assert_eq!(ws.read("scores.txt"), "r1 [\n  25 7\n  7 2 ]\n");
}
