//! Integration tests for the card compilation pipeline
//!
//! These tests verify:
//! - Folder layout and generated file names on the destination
//! - Stale file removal without touching sibling folders
//! - Recoverable issues (missing sources, oversized folders)
//! - Byte codes, payloads and QR code batches for a whole config

use camino::{Utf8Path, Utf8PathBuf};
use mockall::mock;
use std::fs;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::TempDir;
use tonuino_cards::services::qrcode::{TextQrRenderer, render_batches};
use tonuino_cards::services::tags::{NoTags, TagReader};
use tonuino_cards::{CardCompiler, Config, Error, Issue, Metrics};

mock! {
    pub Tags {}

    impl TagReader for Tags {
        fn artist_title(&self, path: &Utf8Path) -> Option<(String, String)>;
        fn duration(&self, path: &Utf8Path) -> Option<Duration>;
    }
}

struct Fixture {
    _source: TempDir,
    _dest: TempDir,
    source: Utf8PathBuf,
    dest: Utf8PathBuf,
}

impl Fixture {
    /// Audio directory shaped like a small music collection
    fn new() -> Self {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = Utf8PathBuf::try_from(source_dir.path().to_path_buf()).unwrap();
        let dest = Utf8PathBuf::try_from(dest_dir.path().to_path_buf()).unwrap();

        fs::write(source.join("01. Tester - Test Sound 01.mp3"), b"one").unwrap();
        fs::write(source.join("02. Tester - Test Sound 02.mp3"), b"two").unwrap();
        fs::write(
            source.join("03. Tester - Test Sound 03 - without ID3.mp3"),
            b"three",
        )
        .unwrap();
        fs::write(source.join("cover.jpg"), b"jpg").unwrap();
        fs::create_dir(source.join("subdir_audio")).unwrap();
        fs::write(source.join("subdir_audio/A different file.mp3"), b"four").unwrap();

        Self {
            _source: source_dir,
            _dest: dest_dir,
            source,
            dest,
        }
    }

    fn config(&self, extra: &str, cards: &str) -> Config {
        let yaml = format!("sourcebasedir: '{}'\n{extra}cards:\n{cards}", self.source);
        Config::import(&serde_yaml_ng::from_str(&yaml).unwrap()).unwrap()
    }
}

fn file_names(dir: &Utf8Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

fn tester_tags() -> MockTags {
    let mut tags = MockTags::new();
    tags.expect_artist_title().returning(|path| {
        let name = path.file_name().unwrap_or_default();
        if name.contains("without ID3") || !name.contains("Tester") {
            None
        } else {
            let title = name.split(" - ").nth(1).unwrap_or_default();
            Some(("Tester".to_string(), title.trim_end_matches(".mp3").to_string()))
        }
    });
    tags.expect_duration()
        .returning(|_| Some(Duration::from_secs(90)));
    tags
}

#[test]
fn test_directory_source_layout() {
    let fx = Fixture::new();
    let mut config = fx.config(
        "",
        "  1:\n    source: '.'\n    mode: play-from-to\n    from_song: 2\n    to_song: 3\n",
    );
    let tags = tester_tags();

    let report = CardCompiler::new(&fx.dest, &tags)
        .compile(&mut config, &Metrics::new())
        .unwrap();

    assert_eq!(
        file_names(&fx.dest.join("01")),
        vec![
            "001-Tester-Test_Sound_01.mp3",
            "002-Tester-Test_Sound_02.mp3",
            "003-03_Tester_-_Test_Sound_03_-_without_ID3.mp3",
            "004-A_different_file.mp3",
        ]
    );
    assert_eq!(report.cards[0].bytecode, "1337B3470201070203");
    assert!(report.issues.is_empty());

    let toc = fs::read_to_string(fx.dest.join("tableofcontents.md")).unwrap();
    assert!(toc.contains("total 6:00"));
}

#[test]
fn test_stale_file_removed_sibling_kept() {
    let fx = Fixture::new();
    fs::create_dir(fx.dest.join("01")).unwrap();
    fs::create_dir(fx.dest.join("02")).unwrap();
    fs::write(fx.dest.join("02/bla.mp3"), b"stale").unwrap();

    let mut config = fx.config(
        "",
        "  1:\n    source: '01. Tester - Test Sound 01.mp3'\n  2:\n    source: '02. Tester - Test Sound 02.mp3'\n",
    );
    // Card 1 is compiled too, but its folder only has to exist afterwards
    let metrics = Metrics::new();
    CardCompiler::new(&fx.dest, &NoTags)
        .compile(&mut config, &metrics)
        .unwrap();

    assert!(!fx.dest.join("02/bla.mp3").exists());
    assert!(fx.dest.join("02/001-02_Tester_-_Test_Sound_02.mp3").is_file());
    assert!(fx.dest.join("01").is_dir());
    assert_eq!(metrics.stale_files_removed.load(Ordering::Relaxed), 1);
}

#[test]
fn test_sibling_folder_not_in_config_survives() {
    let fx = Fixture::new();
    fs::create_dir(fx.dest.join("07")).unwrap();
    fs::write(fx.dest.join("07/keep.mp3"), b"keep").unwrap();

    let mut config = fx.config("", "  1:\n    source: subdir_audio\n");
    CardCompiler::new(&fx.dest, &NoTags)
        .compile(&mut config, &Metrics::new())
        .unwrap();

    assert!(fx.dest.join("07/keep.mp3").is_file());
}

#[test]
fn test_missing_source_single_issue() {
    let fx = Fixture::new();
    let mut config = fx.config(
        "",
        "  1:\n    source:\n      - /this/path/does/not/exist1337\n      - subdir_audio\n",
    );

    let report = CardCompiler::new(&fx.dest, &NoTags)
        .compile(&mut config, &Metrics::new())
        .unwrap();

    assert_eq!(report.issues.len(), 1);
    let message = report.issues[0].to_string();
    assert!(message.contains("/this/path/does/not/exist1337 seems to be neither a file nor a directory"));
    assert!(message.contains("1st source"));
    assert_eq!(report.cards[0].files.len(), 1);
}

#[test]
fn test_too_many_files_warns_and_copies_all() {
    let fx = Fixture::new();
    let many = fx.source.join("many");
    fs::create_dir(&many).unwrap();
    for i in 0..285 {
        fs::write(many.join(format!("track{i:03}.mp3")), b"x").unwrap();
    }

    let mut config = fx.config(
        "filenametype: tracknumber\ncreate_tableofcontents: false\n",
        "  1:\n    source: many\n",
    );
    let metrics = Metrics::new();

    let report = CardCompiler::new(&fx.dest, &NoTags)
        .compile(&mut config, &metrics)
        .unwrap();

    assert_eq!(report.issues, vec![Issue::TooManyFiles { count: 285 }]);
    assert!(report.issues[0].to_string().contains("285"));
    assert_eq!(file_names(&fx.dest.join("01")).len(), 285);
    assert!(fx.dest.join("01/285.mp3").is_file());
    assert_eq!(metrics.warnings.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.files_copied.load(Ordering::Relaxed), 285);
}

#[test]
fn test_payloads_and_batches() {
    let fx = Fixture::new();
    let cards: String = (1..=5)
        .map(|n| format!("  {n}:\n    source: subdir_audio\n    description: Card {n}\n"))
        .collect();
    let mut config = fx.config("maxcardsperqrcode: 2\n", &cards);

    let report = CardCompiler::new(&fx.dest, &NoTags)
        .compile(&mut config, &Metrics::new())
        .unwrap();

    assert_eq!(report.cards.len(), 5);
    assert_eq!(report.batches.len(), 3);
    assert_eq!(
        report.batches[0].payloads[0],
        "1337B3470201010000;Card no. 1 (Card 1)"
    );

    let mut renderer = TextQrRenderer::new(Vec::new());
    render_batches(&report.batches, &mut renderer).unwrap();
    let output = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(output.contains("QR code for cards batch 3 (cards 5 - 5)"));
}

#[test]
fn test_qr_capacity_is_fatal() {
    let fx = Fixture::new();
    let long = "x".repeat(1600);
    let cards = format!(
        "  1:\n    source: subdir_audio\n    description: {long}\n  2:\n    source: subdir_audio\n    description: {long}\n"
    );
    let mut config = fx.config("", &cards);

    let err = CardCompiler::new(&fx.dest, &NoTags)
        .compile(&mut config, &Metrics::new())
        .unwrap_err();

    assert!(matches!(err, Error::QrCapacityExceeded { batch: 1, .. }));
}

#[test]
fn test_recompile_is_stable() {
    let fx = Fixture::new();
    let cards = "  1:\n    source: '.'\n";

    let mut first = fx.config("", cards);
    CardCompiler::new(&fx.dest, &NoTags)
        .compile(&mut first, &Metrics::new())
        .unwrap();
    let before = file_names(&fx.dest.join("01"));

    let mut second = fx.config("", cards);
    CardCompiler::new(&fx.dest, &NoTags)
        .compile(&mut second, &Metrics::new())
        .unwrap();

    assert_eq!(file_names(&fx.dest.join("01")), before);
    assert_eq!(before.len(), 4);
}
