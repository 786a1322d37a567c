use anyhow::Result;

use crate::config::Config;
use crate::content::HistoryRecord;
use crate::store::Shelf;
use crate::store::history::HistoryCategory;

use super::super::embed::player_url;
use super::super::format::episode_display;
use super::super::playback::{launch_opener, play_entry};
use super::session::TerminalHandoff;
use super::{TuiState, View};

/// Row identities of the active table, in display order.
pub(super) fn row_ids(shelf: &Shelf, view: View, tab: HistoryCategory) -> Vec<String> {
    match view {
        View::History => shelf
            .history
            .in_category(tab)
            .into_iter()
            .map(|record| record.id.key())
            .collect(),
        View::Saved => shelf
            .bookmarks
            .list_all()
            .iter()
            .map(|item| item.identity())
            .collect(),
    }
}

pub(super) fn refresh_selection(shelf: &Shelf, state: &mut TuiState, preferred_id: Option<&str>) {
    let ids = row_ids(shelf, state.view, state.tab);
    if ids.is_empty() {
        state.table_state.select(None);
        return;
    }

    if let Some(id) = preferred_id
        && let Some(idx) = ids.iter().position(|row| row == id)
    {
        state.table_state.select(Some(idx));
        return;
    }

    match state.table_state.selected() {
        Some(selected) => state.table_state.select(Some(selected.min(ids.len() - 1))),
        None => state.table_state.select(Some(0)),
    }
}

pub(super) fn selected_id(shelf: &Shelf, state: &TuiState) -> Option<String> {
    let selected = state.table_state.selected()?;
    row_ids(shelf, state.view, state.tab).into_iter().nth(selected)
}

/// Records shown on the "Continue Watching" rail for `tab`.
pub(super) fn highlight_records(
    shelf: &Shelf,
    tab: HistoryCategory,
    limit: usize,
) -> Vec<&HistoryRecord> {
    let mut records = match tab {
        HistoryCategory::All => shelf.history.list_all().iter().collect(),
        HistoryCategory::AnimeWatch | HistoryCategory::AnimeDownload => {
            shelf.history.anime_continue()
        }
        HistoryCategory::GlobalWatch | HistoryCategory::GlobalDownload => {
            shelf.history.global_continue()
        }
    };
    records.truncate(limit);
    records
}

/// Saves or unsaves the selected row and returns the toast text.
pub(super) fn toggle_selected_bookmark(shelf: &mut Shelf, state: &TuiState) -> Option<String> {
    let id = selected_id(shelf, state)?;
    let item = match state.view {
        View::History => shelf.history.get(&id)?.content_item(),
        View::Saved => shelf.bookmarks.get(&id)?.clone(),
    };
    let title = item.title();
    let outcome = shelf.bookmarks.toggle(item);
    Some(outcome.notice(&title))
}

pub(super) fn play_selected<H: TerminalHandoff>(
    shelf: &mut Shelf,
    config: &Config,
    session: &mut H,
    id: &str,
) -> Result<String> {
    // Only an external opener needs the terminal back.
    let outcome = if config.player.opener.is_some() {
        session.suspended(|| play_entry(&mut shelf.history, &config.player, id, launch_opener))??
    } else {
        play_entry(&mut shelf.history, &config.player, id, launch_opener)?
    };
    if outcome.launched {
        Ok(format!("Resumed {}.", outcome.title))
    } else {
        Ok(format!("Resume {} at {}", outcome.title, outcome.url))
    }
}

pub(super) fn describe_resume(shelf: &Shelf, config: &Config, id: &str) -> String {
    let Some(record) = shelf.history.get(id) else {
        return format!("No watch history for {id}.\n\nPress any key to continue.");
    };

    let position = match shelf.history.resolve_resume_point(id) {
        Some(_) => episode_display(record),
        None => "from the beginning".to_string(),
    };
    let url = player_url(&config.player, record)
        .unwrap_or_else(|err| format!("unavailable ({err})"));
    format!(
        "{}\n\nResume: {position}\n{url}\n\nPress any key to continue.",
        record.title
    )
}

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}
