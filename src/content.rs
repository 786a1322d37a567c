use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Identifier that upstream APIs hand out either as a JSON string or a number.
///
/// Two labels are equal when their string forms are equal, so `"42"` and `42`
/// refer to the same item. The original JSON shape is kept for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum Label {
    Number(Number),
    Text(String),
}

pub(crate) type ContentId = Label;

impl Label {
    pub(crate) fn key(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    pub(crate) fn matches(&self, key: &str) -> bool {
        match self {
            Self::Number(number) => number.to_string() == key,
            Self::Text(text) => text == key,
        }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Label {}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for Label {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ContentKind {
    Anime,
    Movie,
    Tv,
}

impl ContentKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Anime => "Anime",
            Self::Movie => "Movie",
            Self::Tv => "TV",
        }
    }
}

/// Upstream feed a piece of content was picked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub(crate) enum CatalogSource {
    DownloadCatalog,
    StreamCatalog,
    MetadataNetwork,
}

impl CatalogSource {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::DownloadCatalog => "download catalog",
            Self::StreamCatalog => "stream catalog",
            Self::MetadataNetwork => "metadata network",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PlaybackMode {
    Watch,
    Download,
}

/// Which browsing surface a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Surface {
    Anime,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Activity {
    Watch,
    Download,
}

impl Activity {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Watch => "watch",
            Self::Download => "download",
        }
    }
}

/// Last known playback position for one content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryRecord {
    pub(crate) id: ContentId,
    pub(crate) title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) image: Option<String>,
    pub(crate) content_kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) source: Option<CatalogSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) mode: Option<PlaybackMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) episode_number: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) episode_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) episode_id: Option<Label>,
    pub(crate) timestamp: i64,
    #[serde(default)]
    pub(crate) full_media: Value,
}

impl HistoryRecord {
    pub(crate) fn surface(&self) -> Surface {
        match self.content_kind {
            ContentKind::Anime => Surface::Anime,
            ContentKind::Movie | ContentKind::Tv => Surface::Global,
        }
    }

    /// Anime records carry their activity in `source`, everything else in `mode`.
    pub(crate) fn activity(&self) -> Option<Activity> {
        match self.surface() {
            Surface::Anime => match self.source? {
                CatalogSource::StreamCatalog => Some(Activity::Watch),
                CatalogSource::DownloadCatalog => Some(Activity::Download),
                CatalogSource::MetadataNetwork => None,
            },
            Surface::Global => self.mode.map(|mode| match mode {
                PlaybackMode::Watch => Activity::Watch,
                PlaybackMode::Download => Activity::Download,
            }),
        }
    }

    /// Content snapshot to bookmark when the record is saved from a history view.
    pub(crate) fn content_item(&self) -> ContentItem {
        if let Ok(item) = serde_json::from_value::<ContentItem>(self.full_media.clone()) {
            return item;
        }

        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(self.title.clone()));
        if let Some(image) = &self.image {
            fields.insert("image".to_string(), Value::String(image.clone()));
        }
        let media_type = match self.content_kind {
            ContentKind::Anime => "anime",
            ContentKind::Movie => "movie",
            ContentKind::Tv => "tv",
        };
        fields.insert(
            "media_type".to_string(),
            Value::String(media_type.to_string()),
        );
        ContentItem::Media(MediaItem {
            id: self.id.clone(),
            fields,
        })
    }
}

/// A saved content item, kept as the raw object it was saved from.
///
/// Anime series are keyed by `session`, everything else by `id`. An object
/// carrying both is treated as a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentItem {
    Series(SeriesItem),
    Media(MediaItem),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SeriesItem {
    pub(crate) session: Label,
    #[serde(flatten)]
    pub(crate) fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct MediaItem {
    pub(crate) id: Label,
    #[serde(flatten)]
    pub(crate) fields: Map<String, Value>,
}

impl ContentItem {
    pub(crate) fn identity(&self) -> String {
        match self {
            Self::Series(series) => series.session.key(),
            Self::Media(media) => media.id.key(),
        }
    }

    fn fields(&self) -> &Map<String, Value> {
        match self {
            Self::Series(series) => &series.fields,
            Self::Media(media) => &media.fields,
        }
    }

    pub(crate) fn title(&self) -> String {
        ["title", "name", "original_title", "original_name"]
            .iter()
            .find_map(|key| self.fields().get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Untitled ({})", self.identity()))
    }

    pub(crate) fn kind(&self) -> Option<ContentKind> {
        match self {
            Self::Series(_) => Some(ContentKind::Anime),
            Self::Media(media) => match media.fields.get("media_type").and_then(Value::as_str) {
                Some("movie") => Some(ContentKind::Movie),
                Some("tv") => Some(ContentKind::Tv),
                Some("anime") => Some(ContentKind::Anime),
                _ => None,
            },
        }
    }
}
