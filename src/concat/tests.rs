use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::*;

/// Durations keyed by file name; unknown names fail the probe.
struct FixedProbe(HashMap<String, u64>);

impl FixedProbe {
    fn new(entries: &[(&str, u64)]) -> Self {
        Self(entries.iter().map(|(n, d)| (n.to_string(), *d)).collect())
    }
}

impl DurationProbe for FixedProbe {
    fn duration_micros(&self, path: &Path) -> Result<u64, ConcatError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.0.get(name).copied().ok_or_else(|| ConcatError::Probe {
            path: path.to_path_buf(),
            reason: "no fixture".to_string(),
        })
    }
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|n| PathBuf::from("/book").join(n)).collect()
}

#[test]
fn track_names_split_into_number_and_title() {
    assert_eq!(
        parse_track_name("01 Chapter One.mp3"),
        Some((1, "Chapter One".to_string()))
    );
    assert_eq!(
        parse_track_name("0012-Epilogue.m4a"),
        Some((12, "-Epilogue".to_string()))
    );
    assert_eq!(parse_track_name("Chapter One.mp3"), None);
    // The title group needs at least one character, so a bare number gives
    // its last digit up as the title.
    assert_eq!(parse_track_name("01.mp3"), Some((0, "1".to_string())));
}

#[test]
fn two_tracks_produce_contiguous_chapters() {
    let files = paths(&["01 Chapter One.mp3", "02 Chapter Two.mp3"]);
    let probe = FixedProbe::new(&[
        ("01 Chapter One.mp3", 1_000_000),
        ("02 Chapter Two.mp3", 2_000_000),
    ]);

    let chapters = build_chapters(&files, &probe).unwrap();
    assert_eq!(chapters.len(), 2);
    assert_eq!(
        (chapters[0].start_micros, chapters[0].end_micros, chapters[0].title.as_str()),
        (0, 1_000_000, "Chapter One")
    );
    assert_eq!(
        (chapters[1].start_micros, chapters[1].end_micros, chapters[1].title.as_str()),
        (1_000_001, 3_000_001, "Chapter Two")
    );
}

#[test]
fn offsets_hold_for_any_number_of_tracks() {
    let durations = [5u64, 0, 1_234_567, 42, 999_999_999];
    let chapters = layout(
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("Part {i}"), *d)),
    );

    assert_eq!(chapters[0].start_micros, 0);
    for (i, chapter) in chapters.iter().enumerate() {
        assert_eq!(chapter.index, i);
        assert_eq!(chapter.end_micros, chapter.start_micros + durations[i]);
        if i > 0 {
            assert_eq!(chapter.start_micros, chapters[i - 1].end_micros + 1);
        }
    }
}

#[test]
fn sort_uses_numeric_prefix_not_lexical_order() {
    let mut files = paths(&["10 Ten.mp3", "2 Two.mp3", "01 One.mp3", "02 Another.mp3"]);
    sort_tracks(&mut files);
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, ["01 One.mp3", "02 Another.mp3", "2 Two.mp3", "10 Ten.mp3"]);
}

#[test]
fn unnumbered_track_aborts_the_build() {
    let files = paths(&["01 Start.mp3", "Interlude.mp3"]);
    let probe = FixedProbe::new(&[("01 Start.mp3", 10), ("Interlude.mp3", 10)]);

    let err = build_chapters(&files, &probe).unwrap_err();
    match err {
        ConcatError::PatternMismatch(path) => assert!(path.ends_with("Interlude.mp3")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn probe_failure_is_never_zero_filled() {
    let files = paths(&["01 Start.mp3", "02 Missing.mp3"]);
    let probe = FixedProbe::new(&[("01 Start.mp3", 10)]);

    assert!(matches!(
        build_chapters(&files, &probe),
        Err(ConcatError::Probe { .. })
    ));
}

#[test]
fn ffmetadata_document_has_one_block_per_chapter() {
    let chapters = layout([
        ("Chapter One".to_string(), 1_000_000),
        ("A = B; #2".to_string(), 2_000_000),
    ]);
    let doc = render_ffmetadata(&chapters);

    assert!(doc.starts_with(";FFMETADATA1\n"));
    assert_eq!(doc.matches("[CHAPTER]").count(), 2);
    assert_eq!(doc.matches("TIMEBASE=1/1000000").count(), 2);
    assert!(doc.contains("START=0\nEND=1000000\ntitle=Chapter One\n"));
    assert!(doc.contains("START=1000001\nEND=3000001\ntitle=A \\= B\\; \\#2\n"));
}

#[test]
fn seconds_parse_exactly_to_microseconds() {
    assert_eq!(parse_seconds("123.456789\n"), Some(123_456_789));
    assert_eq!(parse_seconds("1.5"), Some(1_500_000));
    assert_eq!(parse_seconds("7"), Some(7_000_000));
    assert_eq!(parse_seconds("0.0000019"), Some(1));
    assert_eq!(parse_seconds(".25"), Some(250_000));
    assert_eq!(parse_seconds("N/A"), None);
    assert_eq!(parse_seconds(""), None);
    assert_eq!(parse_seconds("-1.0"), None);
}

#[test]
fn file_list_uses_absolute_quoted_paths() {
    let list = render_file_list(&[
        PathBuf::from("/book/01 One.mp3"),
        PathBuf::from("/book/02 Bilbo's Party.mp3"),
    ])
    .unwrap();
    assert_eq!(
        list,
        "file '/book/01 One.mp3'\nfile '/book/02 Bilbo'\\''s Party.mp3'\n"
    );
}

#[test]
fn merge_job_names_its_files_after_the_output() {
    let job = MergeJob {
        destination: PathBuf::from("/out"),
        output_name: "book".to_string(),
        ffmpeg: PathBuf::from("ffmpeg"),
    };
    assert_eq!(job.file_list_path(), PathBuf::from("/out/files.txt"));
    assert_eq!(job.metadata_path(), PathBuf::from("/out/metadata.txt"));
    assert_eq!(job.intermediate_path(), PathBuf::from("/out/book.mp4"));
    assert_eq!(job.output_path(), PathBuf::from("/out/book.m4b"));
}

#[test]
fn merge_failure_is_fatal_and_leaves_inputs_behind() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");
    let job = MergeJob {
        destination: dest.clone(),
        output_name: "book".to_string(),
        ffmpeg: dir.path().join("no-such-ffmpeg"),
    };
    let chapters = layout([("One".to_string(), 10)]);

    let err = job
        .run(&[dir.path().join("01 One.mp3")], &chapters)
        .unwrap_err();
    assert!(matches!(err, ConcatError::Merge { .. }));
    assert!(dest.join("metadata.txt").is_file());
    assert!(dest.join("files.txt").is_file());
    assert!(!dest.join("book.m4b").exists());
}

#[test]
fn lofty_probe_rejects_non_audio() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("01 Fake.m4a");
    std::fs::write(&path, b"not audio at all").unwrap();

    assert!(matches!(
        LoftyProbe.duration_micros(&path),
        Err(ConcatError::Probe { .. })
    ));
}
