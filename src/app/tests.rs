use anyhow::anyhow;
use clap::Parser;
use serde_json::Value;

use super::format::{activity_display, episode_display, truncate};
use super::playback::play_entry;
use super::record_from_args;
use crate::cli::{Cli, Command, RecordArgs};
use crate::config::PlayerConfig;
use crate::content::{CatalogSource, ContentKind, HistoryRecord, Label, PlaybackMode};
use crate::store::MemoryStore;
use crate::store::history::{HistoryCategory, HistoryStore};
use crate::store::writer::StorageWriter;

fn record_args(id: &str) -> RecordArgs {
    RecordArgs {
        id: id.to_string(),
        title: "Arrival".to_string(),
        kind: ContentKind::Movie,
        source: Some(CatalogSource::MetadataNetwork),
        mode: Some(PlaybackMode::Watch),
        episode: None,
        episode_title: None,
        season: None,
        episode_id: None,
        image: None,
        media: None,
    }
}

fn entry(id: &str, kind: ContentKind, timestamp: i64) -> HistoryRecord {
    HistoryRecord {
        id: Label::from(id),
        title: format!("Entry {id}"),
        image: None,
        content_kind: kind,
        source: Some(CatalogSource::MetadataNetwork),
        mode: Some(PlaybackMode::Watch),
        episode_number: None,
        episode_title: None,
        season_number: None,
        episode_id: None,
        timestamp,
        full_media: Value::Null,
    }
}

fn history_with(records: Vec<HistoryRecord>) -> (StorageWriter, HistoryStore) {
    let writer = StorageWriter::spawn(MemoryStore::default());
    let mut history = HistoryStore::load(&MemoryStore::default(), writer.sink());
    for record in records.into_iter().rev() {
        history.upsert(record);
    }
    (writer, history)
}

fn ids(history: &HistoryStore) -> Vec<String> {
    history.list_all().iter().map(|record| record.id.key()).collect()
}

#[test]
fn record_from_args_builds_a_history_record() {
    let mut args = record_args(" 329865 ");
    args.media = Some(r#"{"id":329865,"title":"Arrival","media_type":"movie"}"#.to_string());

    let record = record_from_args(args, 42).expect("args are valid");
    assert_eq!(record.id.key(), "329865");
    assert_eq!(record.timestamp, 42);
    assert_eq!(record.content_item().title(), "Arrival");
    assert!(HistoryCategory::GlobalWatch.matches(&record));
}

#[test]
fn record_from_args_rejects_blank_id_and_bad_media() {
    assert!(record_from_args(record_args("  "), 1).is_err());

    let mut args = record_args("7");
    args.media = Some("{oops".to_string());
    let err = record_from_args(args, 1).expect_err("media is not json");
    assert!(err.to_string().contains("--media"));
}

#[test]
fn play_entry_launches_and_moves_entry_to_front() {
    let (_writer, mut history) = history_with(vec![
        entry("1", ContentKind::Movie, 10),
        entry("2", ContentKind::Movie, 5),
    ]);
    let player = PlayerConfig {
        opener: Some("fake-open".to_string()),
        ..PlayerConfig::default()
    };

    let mut launched_with = None;
    let outcome = play_entry(&mut history, &player, "2", |opener, url| {
        launched_with = Some((opener.to_string(), url.to_string()));
        Ok(())
    })
    .expect("play succeeds");

    assert!(outcome.launched);
    assert_eq!(outcome.url, "https://vidsrc.cc/v2/embed/movie/2");
    assert_eq!(
        launched_with,
        Some(("fake-open".to_string(), outcome.url.clone()))
    );
    assert_eq!(ids(&history), ["2", "1"]);
    assert!(history.get("2").is_some_and(|record| record.timestamp > 5));
}

#[test]
fn play_entry_leaves_history_alone_when_launch_fails() {
    let (_writer, mut history) = history_with(vec![
        entry("1", ContentKind::Movie, 10),
        entry("2", ContentKind::Movie, 5),
    ]);
    let player = PlayerConfig {
        opener: Some("fake-open".to_string()),
        ..PlayerConfig::default()
    };

    let result = play_entry(&mut history, &player, "2", |_, _| Err(anyhow!("no display")));
    assert!(result.is_err());
    assert_eq!(ids(&history), ["1", "2"]);
    assert_eq!(history.get("2").map(|record| record.timestamp), Some(5));
}

#[test]
fn play_entry_without_opener_still_records_the_play() {
    let (_writer, mut history) = history_with(vec![
        entry("1", ContentKind::Movie, 10),
        entry("9", ContentKind::Tv, 5),
    ]);

    let outcome = play_entry(&mut history, &PlayerConfig::default(), "9", |_, _| {
        panic!("launcher must not run without an opener")
    })
    .expect("play succeeds");

    assert!(!outcome.launched);
    assert_eq!(outcome.url, "https://vidsrc.cc/v2/embed/tv/9/1/1");
    assert_eq!(ids(&history), ["9", "1"]);
}

#[test]
fn play_entry_reports_unknown_ids() {
    let (_writer, mut history) = history_with(Vec::new());
    let err = play_entry(&mut history, &PlayerConfig::default(), "404", |_, _| Ok(()))
        .expect_err("nothing to play");
    assert!(err.to_string().contains("404"));
}

#[test]
fn cli_parses_record_and_list_commands() {
    let cli = Cli::try_parse_from([
        "anishelf", "record", "--id", "1399", "--title", "Game of Thrones", "--kind", "tv",
        "--source", "metadata-network", "--mode", "download", "--season", "2", "--episode", "5",
    ])
    .expect("record parses");
    let Some(Command::Record(args)) = cli.command else {
        panic!("expected record command");
    };
    assert_eq!(args.kind, ContentKind::Tv);
    assert_eq!(args.mode, Some(PlaybackMode::Download));
    assert_eq!(args.season, Some(2));

    let cli = Cli::try_parse_from(["anishelf", "-vv", "list", "--category", "anime-watch"])
        .expect("list parses");
    assert_eq!(cli.verbose, 2);
    assert!(matches!(
        cli.command,
        Some(Command::List {
            category: HistoryCategory::AnimeWatch
        })
    ));

    assert!(Cli::try_parse_from(["anishelf", "record", "--id", "1"]).is_err());
}

#[test]
fn format_helpers_describe_positions() {
    let mut record = entry("1", ContentKind::Tv, 0);
    assert_eq!(episode_display(&record), "-");
    record.season_number = Some(2);
    record.episode_number = Some(Label::from(5u64));
    assert_eq!(episode_display(&record), "S2 E5");
    assert_eq!(activity_display(&record), "global · watch");

    record.content_kind = ContentKind::Anime;
    record.source = Some(CatalogSource::DownloadCatalog);
    record.season_number = None;
    assert_eq!(episode_display(&record), "E5");
    assert_eq!(activity_display(&record), "anime · download");

    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer title", 10), "a much ...");
}
