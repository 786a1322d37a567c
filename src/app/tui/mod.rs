mod actions;
mod render;
mod session;

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;
use tracing::{debug, info};

use crate::config::Config;
use crate::store::Shelf;
use crate::store::history::HistoryCategory;

use super::carousel::Carousel;
use super::format::truncate;

use self::actions::{
    describe_resume, highlight_records, play_selected, refresh_selection, row_ids, selected_id,
    status_error, status_info, toggle_selected_bookmark,
};
use self::render::draw_tui;
use self::session::TuiSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    History,
    Saved,
}

impl View {
    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::History => Self::Saved,
            Self::Saved => Self::History,
        }
    }
}

#[derive(Debug, Clone)]
pub(super) enum PendingConfirm {
    Delete { id: String, title: String },
    ClearAll { count: usize },
}

#[derive(Debug, Clone)]
pub(super) struct PendingNotice {
    pub(super) title: &'static str,
    pub(super) message: String,
    pub(super) marks_reminder: bool,
}

#[derive(Debug, Clone)]
pub(super) struct Toast {
    pub(super) message: String,
    pub(super) expires_at: Instant,
}

pub(super) struct TuiState {
    pub(super) view: View,
    pub(super) tab: HistoryCategory,
    pub(super) table_state: TableState,
    pub(super) carousel: Carousel,
    pub(super) pending_confirm: Option<PendingConfirm>,
    pub(super) pending_notice: Option<PendingNotice>,
    pub(super) toast: Option<Toast>,
    pub(super) status: String,
}

impl TuiState {
    fn new(status: String) -> Self {
        Self {
            view: View::History,
            tab: HistoryCategory::All,
            table_state: TableState::default(),
            carousel: Carousel::default(),
            pending_confirm: None,
            pending_notice: None,
            toast: None,
            status,
        }
    }

    /// Replaces any visible toast; the new one lives for `ttl` from `now`.
    fn show_toast(&mut self, message: String, now: Instant, ttl: Duration) {
        self.toast = Some(Toast {
            message,
            expires_at: now + ttl,
        });
    }

    /// Moves the highlight rail one slot, wrapping at both ends.
    fn nudge_carousel(&mut self, forward: bool) {
        while self.carousel.on_scroll_settled().is_some() {}
        let Some(slot) = self.carousel.neighbor_slot(forward) else {
            return;
        };
        if let Some(command) = self.carousel.on_user_scroll(slot as f32, 1.0) {
            debug!(slot = command.slot(), "carousel wrapped by user");
        }
    }

    fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| now >= toast.expires_at) {
            self.toast = None;
        }
    }
}

const REMINDER_TEXT: &str = "Welcome to anishelf.\n\n\
←/→ switch history tabs   Tab saved items\n\
Enter resume   b save   d delete   c clear all\n\
[ / ] browse highlights   t theme   ? this help\n\n\
Press any key to continue.";

pub(crate) fn run_tui(shelf: &mut Shelf, config: &Config) -> Result<()> {
    let mut session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let mut state = TuiState::new(if shelf.history.list_all().is_empty() {
        status_info("No history yet. Record plays with `anishelf record`.")
    } else {
        status_info("Ready.")
    });
    refresh_selection(shelf, &mut state, None);
    if !shelf.prefs.reminder_seen() {
        state.pending_notice = Some(PendingNotice {
            title: "Welcome",
            message: REMINDER_TEXT.to_string(),
            marks_reminder: true,
        });
    }

    let interval = config.ui.carousel_interval();
    let toast_ttl = config.ui.toast_duration();
    let mut last_advance = Instant::now();
    info!("tui started");

    loop {
        let now = Instant::now();
        state.expire_toast(now);

        let rail_len = highlight_records(shelf, state.tab, config.ui.highlight_count).len();
        state.carousel.set_len(rail_len);
        if state.carousel.is_scrolling() {
            if let Some(reset) = state.carousel.on_scroll_settled() {
                debug!(slot = reset.slot(), "carousel wrapped");
            }
        } else if now.duration_since(last_advance) >= interval {
            if let Some(advance) = state.carousel.tick() {
                debug!(slot = advance.slot(), "carousel advanced");
            }
            last_advance = now;
        }

        terminal.draw(|frame| draw_tui(frame, shelf, config, &mut state))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(notice) = state.pending_notice.take() {
            if notice.marks_reminder {
                shelf.prefs.mark_reminder_seen();
            }
            continue;
        }

        if let Some(confirm) = state.pending_confirm.clone() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    state.pending_confirm = None;
                    match confirm {
                        PendingConfirm::Delete { id, title } => {
                            if shelf.history.remove(&id) {
                                state.status = status_info(&format!("Deleted history entry: {title}"));
                            } else {
                                state.status =
                                    status_error("Delete failed: entry no longer exists.");
                            }
                        }
                        PendingConfirm::ClearAll { count } => {
                            shelf.history.clear();
                            state.status = status_info(&format!("Cleared {count} history entries."));
                        }
                    }
                    refresh_selection(shelf, &mut state, None);
                }
                KeyCode::Esc | KeyCode::Char('n') => {
                    state.pending_confirm = None;
                    state.status = status_info("Canceled.");
                }
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('?') => {
                state.pending_notice = Some(PendingNotice {
                    title: "Keys",
                    message: REMINDER_TEXT.to_string(),
                    marks_reminder: false,
                });
            }
            KeyCode::Tab => {
                state.view = state.view.toggled();
                state.table_state.select(None);
                refresh_selection(shelf, &mut state, None);
            }
            KeyCode::Left | KeyCode::Right if state.view == View::History => {
                state.tab = if key.code == KeyCode::Left {
                    state.tab.move_left()
                } else {
                    state.tab.move_right()
                };
                state.table_state.select(None);
                refresh_selection(shelf, &mut state, None);
                debug!(tab = state.tab.label(), "switched history tab");
            }
            KeyCode::Up => {
                if let Some(selected) = state.table_state.selected() {
                    state.table_state.select(Some(selected.saturating_sub(1)));
                }
            }
            KeyCode::Down => {
                let len = row_ids(shelf, state.view, state.tab).len();
                if let Some(selected) = state.table_state.selected()
                    && len > 0
                {
                    state.table_state.select(Some((selected + 1).min(len - 1)));
                }
            }
            KeyCode::Char('[') | KeyCode::Char(']') => {
                state.nudge_carousel(key.code == KeyCode::Char(']'));
                last_advance = Instant::now();
            }
            KeyCode::Char('t') => {
                let theme = shelf.prefs.toggle_theme();
                state.show_toast(format!("Theme: {}", theme.label()), Instant::now(), toast_ttl);
            }
            KeyCode::Char('b') => match toggle_selected_bookmark(shelf, &state) {
                Some(notice) => {
                    state.show_toast(notice, Instant::now(), toast_ttl);
                    refresh_selection(shelf, &mut state, None);
                }
                None => state.status = status_error("Nothing selected."),
            },
            KeyCode::Char('r') => {
                let Some(id) = selected_id(shelf, &state) else {
                    continue;
                };
                state.pending_notice = Some(PendingNotice {
                    title: "Resume Point",
                    message: describe_resume(shelf, config, &id),
                    marks_reminder: false,
                });
            }
            KeyCode::Char('d') if state.view == View::History => {
                let Some(id) = selected_id(shelf, &state) else {
                    state.status = status_error("Delete failed: no entry selected.");
                    continue;
                };
                let title = shelf
                    .history
                    .get(&id)
                    .map(|record| record.title.clone())
                    .unwrap_or_else(|| id.clone());
                state.pending_confirm = Some(PendingConfirm::Delete { id, title });
                state.status = status_info("Confirm delete: y/Enter to delete, n/Esc to cancel.");
            }
            KeyCode::Char('d') => {
                if let Some(notice) = toggle_selected_bookmark(shelf, &state) {
                    state.show_toast(notice, Instant::now(), toast_ttl);
                    refresh_selection(shelf, &mut state, None);
                }
            }
            KeyCode::Char('c') if state.view == View::History => {
                let count = shelf.history.list_all().len();
                if count == 0 {
                    state.status = status_info("History is already empty.");
                    continue;
                }
                state.pending_confirm = Some(PendingConfirm::ClearAll { count });
                state.status = status_info("Confirm clear: y/Enter to clear, n/Esc to cancel.");
            }
            KeyCode::Enter => {
                let Some(id) = selected_id(shelf, &state) else {
                    continue;
                };
                if shelf.history.get(&id).is_none() {
                    let title = shelf
                        .bookmarks
                        .get(&id)
                        .map(|item| item.title())
                        .unwrap_or_else(|| id.clone());
                    state.pending_notice = Some(PendingNotice {
                        title: "Nothing To Resume",
                        message: format!(
                            "No watch history for this item yet.\n\n{}\n\nPress any key to continue.",
                            truncate(&title, 50)
                        ),
                        marks_reminder: false,
                    });
                    continue;
                }

                match play_selected(shelf, config, &mut session, &id) {
                    Ok(message) => state.status = status_info(&message),
                    Err(err) => state.status = status_error(&format!("Resume failed: {err}")),
                }
                terminal.clear()?;
                if state.view == View::History {
                    refresh_selection(shelf, &mut state, Some(&id));
                }
            }
            _ => {}
        }
    }

    info!("tui stopped");
    terminal.show_cursor()?;
    session.leave()?;
    Ok(())
}
