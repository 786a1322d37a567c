use anyhow::{Result, bail};

use crate::config::PlayerConfig;
use crate::content::{ContentKind, HistoryRecord};

/// Builds the embed player URL that resumes `record`.
pub(crate) fn player_url(config: &PlayerConfig, record: &HistoryRecord) -> Result<String> {
    let template = match record.content_kind {
        ContentKind::Anime => &config.anime_url,
        ContentKind::Movie => &config.movie_url,
        ContentKind::Tv => &config.tv_url,
    };

    let season = match (record.content_kind, record.season_number) {
        (_, Some(season)) => Some(season.to_string()),
        (ContentKind::Tv, None) => Some("1".to_string()),
        _ => None,
    };
    let episode = record
        .episode_number
        .as_ref()
        .map(|episode| episode.key())
        .or_else(|| (record.content_kind != ContentKind::Movie).then(|| "1".to_string()));

    let values = [
        ("id", Some(record.id.key())),
        ("episode_id", record.episode_id.as_ref().map(|id| id.key())),
        ("season", season),
        ("episode", episode),
    ];
    fill_template(template, &values, &record.id.key())
}

/// Replaces `{name}` placeholders. Unknown names are kept verbatim.
fn fill_template(
    template: &str,
    values: &[(&str, Option<String>)],
    record_id: &str,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let name = &after[..close];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, Some(value))) => out.push_str(value),
            Some((_, None)) => {
                bail!("player template needs `{{{name}}}` but entry {record_id} has none")
            }
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
