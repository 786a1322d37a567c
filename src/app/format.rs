use chrono::{Local, TimeZone, Utc};

use crate::content::{ContentKind, HistoryRecord};

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn format_timestamp(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}

/// Short position label: `S2 E5`, `E12`, or `-` when nothing is known.
pub(crate) fn episode_display(record: &HistoryRecord) -> String {
    match (record.season_number, &record.episode_number) {
        (Some(season), Some(episode)) => format!("S{season} E{episode}"),
        (Some(season), None) => format!("S{season}"),
        (None, Some(episode)) => format!("E{episode}"),
        (None, None) => "-".to_string(),
    }
}

/// Where the record shows up in the history tabs, e.g. `anime · watch`.
pub(crate) fn activity_display(record: &HistoryRecord) -> String {
    let surface = match record.content_kind {
        ContentKind::Anime => "anime",
        ContentKind::Movie | ContentKind::Tv => "global",
    };
    match record.activity() {
        Some(activity) => format!("{surface} · {}", activity.label()),
        None => surface.to_string(),
    }
}

pub(crate) fn source_display(record: &HistoryRecord) -> &'static str {
    record.source.map(|source| source.label()).unwrap_or("-")
}
