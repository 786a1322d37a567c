use tracing::{debug, info};

use super::writer::SnapshotSink;
use super::{KEY_BOOKMARKS, KeyValueStore, load_json_list};
use crate::content::ContentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToggleOutcome {
    Saved,
    Removed,
}

impl ToggleOutcome {
    pub(crate) fn notice(self, title: &str) -> String {
        match self {
            Self::Saved => format!("Saved to your list: {title}"),
            Self::Removed => format!("Removed from your list: {title}"),
        }
    }
}

/// Saved content items, most recently toggled first.
pub(crate) struct BookmarkStore {
    items: Vec<ContentItem>,
    sink: SnapshotSink,
}

impl BookmarkStore {
    pub(crate) fn load(kv: &dyn KeyValueStore, sink: SnapshotSink) -> Self {
        let items: Vec<ContentItem> = load_json_list(kv, KEY_BOOKMARKS);
        debug!(count = items.len(), "loaded bookmarks");
        Self { items, sink }
    }

    pub(crate) fn toggle(&mut self, item: ContentItem) -> ToggleOutcome {
        let identity = item.identity();
        let outcome = match self.position(&identity) {
            Some(idx) => {
                self.items.remove(idx);
                ToggleOutcome::Removed
            }
            None => {
                self.items.insert(0, item);
                ToggleOutcome::Saved
            }
        };
        info!(identity = %identity, ?outcome, "toggled bookmark");
        self.sink.persist(KEY_BOOKMARKS, &self.items);
        outcome
    }

    pub(crate) fn is_saved(&self, identity: &str) -> bool {
        self.position(identity).is_some()
    }

    pub(crate) fn get(&self, identity: &str) -> Option<&ContentItem> {
        self.position(identity).map(|idx| &self.items[idx])
    }

    pub(crate) fn list_all(&self) -> &[ContentItem] {
        &self.items
    }

    fn position(&self, identity: &str) -> Option<usize> {
        self.items.iter().position(|item| item.identity() == identity)
    }
}
