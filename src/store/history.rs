use std::collections::HashSet;

use clap::ValueEnum;
use tracing::{debug, info};

use super::writer::SnapshotSink;
use super::{KEY_WATCH_HISTORY, KeyValueStore, load_json_list};
use crate::content::{Activity, HistoryRecord, Label, Surface};

pub(crate) const HISTORY_LIMIT: usize = 100;

/// Tabs of the history view.
///
/// The split mixes two dimensions (catalog source for anime, playback mode for
/// everything else); see [`HistoryRecord::activity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum HistoryCategory {
    All,
    AnimeWatch,
    AnimeDownload,
    GlobalWatch,
    GlobalDownload,
}

impl HistoryCategory {
    pub(crate) const TABS: [Self; 5] = [
        Self::All,
        Self::AnimeWatch,
        Self::AnimeDownload,
        Self::GlobalWatch,
        Self::GlobalDownload,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::AnimeWatch => "Anime Watch",
            Self::AnimeDownload => "Anime Download",
            Self::GlobalWatch => "Global Watch",
            Self::GlobalDownload => "Global Download",
        }
    }

    pub(crate) fn matches(self, record: &HistoryRecord) -> bool {
        let wanted = match self {
            Self::All => return true,
            Self::AnimeWatch => (Surface::Anime, Activity::Watch),
            Self::AnimeDownload => (Surface::Anime, Activity::Download),
            Self::GlobalWatch => (Surface::Global, Activity::Watch),
            Self::GlobalDownload => (Surface::Global, Activity::Download),
        };
        record.activity().is_some_and(|activity| (record.surface(), activity) == wanted)
    }

    pub(crate) fn move_left(self) -> Self {
        let idx = self.position();
        Self::TABS[idx.saturating_sub(1)]
    }

    pub(crate) fn move_right(self) -> Self {
        let idx = self.position();
        Self::TABS[(idx + 1).min(Self::TABS.len() - 1)]
    }

    fn position(self) -> usize {
        Self::TABS.iter().position(|tab| *tab == self).unwrap_or(0)
    }
}

/// Coordinates needed to reopen playback where the user left off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResumePoint {
    pub(crate) episode_id: Option<Label>,
    pub(crate) season_number: Option<u32>,
    pub(crate) episode_number: Option<Label>,
}

/// Ordered watch history, most recently written first, one record per id.
pub(crate) struct HistoryStore {
    records: Vec<HistoryRecord>,
    sink: SnapshotSink,
}

impl HistoryStore {
    pub(crate) fn load(kv: &dyn KeyValueStore, sink: SnapshotSink) -> Self {
        let stored: Vec<HistoryRecord> = load_json_list(kv, KEY_WATCH_HISTORY);
        let records = normalize(stored);
        debug!(count = records.len(), "loaded watch history");
        Self { records, sink }
    }

    pub(crate) fn upsert(&mut self, record: HistoryRecord) {
        let key = record.id.key();
        self.records.retain(|existing| !existing.id.matches(&key));
        info!(id = %key, title = %record.title, "recorded watch progress");
        self.records.insert(0, record);
        self.records.truncate(HISTORY_LIMIT);
        self.persist();
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| !record.id.matches(id));
        let removed = self.records.len() != before;
        if removed {
            info!(id, "removed history entry");
            self.persist();
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        info!(count = self.records.len(), "cleared watch history");
        self.records.clear();
        self.persist();
    }

    pub(crate) fn list_all(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub(crate) fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|record| record.id.matches(id))
    }

    pub(crate) fn filter_by<P>(&self, predicate: P) -> Vec<&HistoryRecord>
    where
        P: Fn(&HistoryRecord) -> bool,
    {
        self.records.iter().filter(|record| predicate(record)).collect()
    }

    pub(crate) fn in_category(&self, category: HistoryCategory) -> Vec<&HistoryRecord> {
        self.filter_by(|record| category.matches(record))
    }

    pub(crate) fn anime_continue(&self) -> Vec<&HistoryRecord> {
        self.filter_by(|record| record.surface() == Surface::Anime)
    }

    pub(crate) fn global_continue(&self) -> Vec<&HistoryRecord> {
        self.filter_by(|record| record.surface() == Surface::Global)
    }

    pub(crate) fn resolve_resume_point(&self, id: &str) -> Option<ResumePoint> {
        let record = self.get(id)?;
        if record.episode_id.is_none()
            && record.season_number.is_none()
            && record.episode_number.is_none()
        {
            return None;
        }
        Some(ResumePoint {
            episode_id: record.episode_id.clone(),
            season_number: record.season_number,
            episode_number: record.episode_number.clone(),
        })
    }

    fn persist(&self) {
        self.sink.persist(KEY_WATCH_HISTORY, &self.records);
    }
}

/// Restores the store invariants on data written by older or foreign clients.
fn normalize(records: Vec<HistoryRecord>) -> Vec<HistoryRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.id.key()))
        .take(HISTORY_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::super::MemoryStore;
    use super::super::writer::StorageWriter;
    use super::*;
    use crate::content::{CatalogSource, ContentKind, PlaybackMode};

    fn rec(id: u64, timestamp: i64) -> HistoryRecord {
        HistoryRecord {
            id: Label::from(id),
            title: format!("Title {id}"),
            image: None,
            content_kind: ContentKind::Movie,
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

    fn anime(id: &str, source: CatalogSource) -> HistoryRecord {
        HistoryRecord {
            id: Label::from(id),
            content_kind: ContentKind::Anime,
            source: Some(source),
            mode: None,
            ..rec(0, 1)
        }
    }

    fn global(id: u64, kind: ContentKind, mode: PlaybackMode) -> HistoryRecord {
        HistoryRecord {
            content_kind: kind,
            mode: Some(mode),
            ..rec(id, 1)
        }
    }

    fn empty_store() -> (HistoryStore, StorageWriter, MemoryStore) {
        let kv = MemoryStore::default();
        let writer = StorageWriter::spawn(kv.clone());
        let store = HistoryStore::load(&kv, writer.sink());
        (store, writer, kv)
    }

    fn ids(records: &[&HistoryRecord]) -> Vec<String> {
        records.iter().map(|record| record.id.key()).collect()
    }

    #[test]
    fn upsert_replaces_and_promotes_existing_id() {
        let (mut store, _writer, _kv) = empty_store();
        store.upsert(rec(1, 1));
        store.upsert(rec(2, 2));
        let mut updated = rec(1, 3);
        updated.title = "A prime".to_string();
        store.upsert(updated.clone());

        assert_eq!(store.list_all(), &[updated, rec(2, 2)]);
    }

    #[test]
    fn upsert_dedupes_across_string_and_number_ids() {
        let (mut store, _writer, _kv) = empty_store();
        store.upsert(rec(42, 1));
        let mut text_id = rec(0, 2);
        text_id.id = Label::from("42");
        store.upsert(text_id);

        assert_eq!(store.list_all().len(), 1);
        assert_eq!(store.list_all()[0].timestamp, 2);
    }

    #[test]
    fn upsert_caps_history_and_evicts_oldest_insert() {
        let (mut store, _writer, _kv) = empty_store();
        for id in 1..=101 {
            store.upsert(rec(id, id as i64));
        }

        let all = store.list_all();
        assert_eq!(all.len(), HISTORY_LIMIT);
        assert!(store.get("1").is_none());
        assert_eq!(all[0].id.key(), "101");
        assert_eq!(all[HISTORY_LIMIT - 1].id.key(), "2");
    }

    #[test]
    fn insertion_order_wins_over_timestamps() {
        let (mut store, _writer, _kv) = empty_store();
        store.upsert(rec(1, 500));
        store.upsert(rec(2, 10));
        let all: Vec<&HistoryRecord> = store.list_all().iter().collect();
        assert_eq!(ids(&all), vec!["2", "1"]);
    }

    #[test]
    fn repeated_upserts_never_hold_duplicate_ids() {
        let (mut store, _writer, _kv) = empty_store();
        for step in 0..400_u64 {
            store.upsert(rec(step % 130, step as i64));
        }
        let mut seen = HashSet::new();
        assert!(store.list_all().len() <= HISTORY_LIMIT);
        assert!(store.list_all().iter().all(|record| seen.insert(record.id.key())));
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let (mut store, _writer, _kv) = empty_store();
        store.upsert(rec(1, 1));
        store.upsert(rec(2, 2));
        let before = store.list_all().to_vec();

        assert!(!store.remove("99"));
        assert_eq!(store.list_all(), before.as_slice());

        assert!(store.remove("1"));
        assert_eq!(store.list_all(), &[rec(2, 2)]);
    }

    #[test]
    fn clear_empties_the_store() {
        let (mut store, writer, kv) = empty_store();
        store.upsert(rec(1, 1));
        store.clear();
        assert!(store.list_all().is_empty());
        drop(writer);
        assert_eq!(kv.raw(KEY_WATCH_HISTORY).as_deref(), Some("[]"));
    }

    #[test]
    fn categories_partition_consistent_records() {
        let (mut store, _writer, _kv) = empty_store();
        store.upsert(anime("a-watch", CatalogSource::StreamCatalog));
        store.upsert(anime("a-dl", CatalogSource::DownloadCatalog));
        store.upsert(global(10, ContentKind::Movie, PlaybackMode::Watch));
        store.upsert(global(11, ContentKind::Tv, PlaybackMode::Download));
        store.upsert(global(12, ContentKind::Tv, PlaybackMode::Watch));

        assert_eq!(
            ids(&store.in_category(HistoryCategory::AnimeWatch)),
            vec!["a-watch"]
        );
        assert_eq!(
            ids(&store.in_category(HistoryCategory::AnimeDownload)),
            vec!["a-dl"]
        );
        assert_eq!(
            ids(&store.in_category(HistoryCategory::GlobalWatch)),
            vec!["12", "10"]
        );
        assert_eq!(
            ids(&store.in_category(HistoryCategory::GlobalDownload)),
            vec!["11"]
        );
        assert_eq!(store.in_category(HistoryCategory::All).len(), 5);

        for record in store.list_all() {
            let hits = HistoryCategory::TABS[1..]
                .iter()
                .filter(|tab| tab.matches(record))
                .count();
            assert_eq!(hits, 1, "record {} should be in exactly one tab", record.id);
        }
    }

    #[test]
    fn anime_mode_does_not_leak_into_global_tabs() {
        let (mut store, _writer, _kv) = empty_store();
        let mut odd = anime("a-1", CatalogSource::StreamCatalog);
        odd.mode = Some(PlaybackMode::Download);
        store.upsert(odd);

        assert!(store.in_category(HistoryCategory::GlobalDownload).is_empty());
        assert_eq!(store.in_category(HistoryCategory::AnimeWatch).len(), 1);
    }

    #[test]
    fn continue_rails_split_by_kind() {
        let (mut store, _writer, _kv) = empty_store();
        store.upsert(anime("a-1", CatalogSource::StreamCatalog));
        store.upsert(global(5, ContentKind::Tv, PlaybackMode::Watch));
        store.upsert(anime("a-2", CatalogSource::DownloadCatalog));

        assert_eq!(ids(&store.anime_continue()), vec!["a-2", "a-1"]);
        assert_eq!(ids(&store.global_continue()), vec!["5"]);
    }

    #[test]
    fn resolve_resume_point_returns_coordinates() {
        let (mut store, _writer, _kv) = empty_store();
        let mut tv = global(1396, ContentKind::Tv, PlaybackMode::Watch);
        tv.season_number = Some(2);
        tv.episode_number = Some(Label::from(5u64));
        store.upsert(tv);
        store.upsert(rec(7, 1));

        assert_eq!(
            store.resolve_resume_point("1396"),
            Some(ResumePoint {
                episode_id: None,
                season_number: Some(2),
                episode_number: Some(Label::from(5u64)),
            })
        );
        assert_eq!(store.resolve_resume_point("7"), None);
        assert_eq!(store.resolve_resume_point("missing"), None);
    }

    #[test]
    fn snapshot_round_trips_through_storage() {
        let (mut store, writer, kv) = empty_store();
        let mut episode = anime("s-1", CatalogSource::StreamCatalog);
        episode.episode_id = Some(Label::from("ep-abc"));
        episode.episode_number = Some(Label::from("13.5"));
        episode.full_media = json!({"session": "s-1", "title": "Frieren", "episodes": 28});
        store.upsert(rec(1, 1));
        store.upsert(episode);
        store.upsert(rec(2, 3));
        let expected = store.list_all().to_vec();
        drop(writer);

        let reloaded = HistoryStore::load(&kv, StorageWriter::spawn(MemoryStore::default()).sink());
        assert_eq!(reloaded.list_all(), expected.as_slice());
    }

    #[test]
    fn load_falls_back_to_empty_on_garbage() {
        let kv = MemoryStore::with_entry(KEY_WATCH_HISTORY, "[{\"id\":");
        let writer = StorageWriter::spawn(MemoryStore::default());
        let store = HistoryStore::load(&kv, writer.sink());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn one_malformed_record_does_not_discard_the_rest() {
        let mut broken = serde_json::to_value(rec(2, 2)).expect("serialize");
        if let Value::Object(fields) = &mut broken {
            fields.remove("title");
        }
        let stored = json!([
            serde_json::to_value(rec(1, 1)).expect("serialize"),
            broken,
            serde_json::to_value(rec(3, 3)).expect("serialize"),
        ]);
        let kv = MemoryStore::with_entry(KEY_WATCH_HISTORY, &stored.to_string());
        let writer = StorageWriter::spawn(kv.clone());
        let mut store = HistoryStore::load(&kv, writer.sink());
        let all: Vec<&HistoryRecord> = store.list_all().iter().collect();
        assert_eq!(ids(&all), vec!["1", "3"]);

        store.upsert(rec(4, 4));
        drop(writer);
        let persisted: Vec<HistoryRecord> =
            serde_json::from_str(&kv.raw(KEY_WATCH_HISTORY).expect("history written"))
                .expect("history parses");
        assert_eq!(persisted, vec![rec(4, 4), rec(1, 1), rec(3, 3)]);
    }

    #[test]
    fn load_normalizes_duplicates_and_overflow() {
        let mut stored: Vec<HistoryRecord> = (1..=120).map(|id| rec(id, id as i64)).collect();
        stored.insert(1, rec(1, 999));
        let kv = MemoryStore::with_entry(
            KEY_WATCH_HISTORY,
            &serde_json::to_string(&stored).expect("serialize"),
        );
        let writer = StorageWriter::spawn(MemoryStore::default());
        let store = HistoryStore::load(&kv, writer.sink());

        assert_eq!(store.list_all().len(), HISTORY_LIMIT);
        assert_eq!(store.list_all()[0].timestamp, 1);
        assert_eq!(store.list_all()[1].id.key(), "2");
    }

    #[test]
    fn category_navigation_respects_edges() {
        assert_eq!(HistoryCategory::All.move_left(), HistoryCategory::All);
        assert_eq!(HistoryCategory::All.move_right(), HistoryCategory::AnimeWatch);
        assert_eq!(
            HistoryCategory::GlobalWatch.move_right(),
            HistoryCategory::GlobalDownload
        );
        assert_eq!(
            HistoryCategory::GlobalDownload.move_right(),
            HistoryCategory::GlobalDownload
        );
    }
}
