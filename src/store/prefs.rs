use serde::{Deserialize, Serialize};
use tracing::info;

use super::writer::SnapshotSink;
use super::{KEY_REMINDER_SEEN, KEY_THEME, KeyValueStore, load_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

pub(crate) struct Preferences {
    theme: Theme,
    reminder_seen: bool,
    sink: SnapshotSink,
}

impl Preferences {
    pub(crate) fn load(kv: &dyn KeyValueStore, sink: SnapshotSink) -> Self {
        Self {
            theme: load_json(kv, KEY_THEME).unwrap_or_default(),
            reminder_seen: load_json(kv, KEY_REMINDER_SEEN).unwrap_or(false),
            sink,
        }
    }

    pub(crate) fn theme(&self) -> Theme {
        self.theme
    }

    pub(crate) fn set_theme(&mut self, theme: Theme) {
        if self.theme == theme {
            return;
        }
        info!(theme = theme.label(), "theme changed");
        self.theme = theme;
        self.sink.persist(KEY_THEME, &self.theme);
    }

    pub(crate) fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    pub(crate) fn reminder_seen(&self) -> bool {
        self.reminder_seen
    }

    pub(crate) fn mark_reminder_seen(&mut self) {
        if self.reminder_seen {
            return;
        }
        self.reminder_seen = true;
        self.sink.persist(KEY_REMINDER_SEEN, &true);
    }
}

#[cfg(test)]
mod tests {
    use super::super::MemoryStore;
    use super::super::writer::StorageWriter;
    use super::*;

    #[test]
    fn defaults_to_dark_theme_and_unseen_reminder() {
        let kv = MemoryStore::default();
        let writer = StorageWriter::spawn(kv.clone());
        let prefs = Preferences::load(&kv, writer.sink());
        assert_eq!(prefs.theme(), Theme::Dark);
        assert!(!prefs.reminder_seen());
    }

    #[test]
    fn theme_and_reminder_are_persisted_as_json() {
        let kv = MemoryStore::default();
        let writer = StorageWriter::spawn(kv.clone());
        let mut prefs = Preferences::load(&kv, writer.sink());
        assert_eq!(prefs.toggle_theme(), Theme::Light);
        prefs.mark_reminder_seen();
        drop(writer);

        assert_eq!(kv.raw(KEY_THEME).as_deref(), Some("\"light\""));
        assert_eq!(kv.raw(KEY_REMINDER_SEEN).as_deref(), Some("true"));

        let reloaded = Preferences::load(&kv, StorageWriter::spawn(MemoryStore::default()).sink());
        assert_eq!(reloaded.theme(), Theme::Light);
        assert!(reloaded.reminder_seen());
    }

    #[test]
    fn unknown_theme_value_falls_back_to_default() {
        let kv = MemoryStore::with_entry(KEY_THEME, "\"sepia\"");
        let writer = StorageWriter::spawn(kv.clone());
        let prefs = Preferences::load(&kv, writer.sink());
        assert_eq!(prefs.theme(), Theme::Dark);
    }
}
