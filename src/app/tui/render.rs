use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, Wrap};

use crate::config::Config;
use crate::content::ContentKind;
use crate::store::Shelf;
use crate::store::history::HistoryCategory;
use crate::store::prefs::Theme;

use super::super::format::{
    activity_display, episode_display, format_timestamp, source_display, truncate,
};
use super::actions::highlight_records;
use super::{PendingConfirm, TuiState, View};

#[derive(Debug, Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    border: Color,
    modal_border: Color,
    pill_idle_bg: Color,
    shadow: Color,
    error: Color,
    info: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Black,
                fg: Color::Rgb(230, 235, 242),
                muted: Color::Rgb(185, 195, 210),
                accent: Color::Rgb(110, 170, 255),
                border: Color::Rgb(125, 135, 150),
                modal_border: Color::Rgb(160, 190, 235),
                pill_idle_bg: Color::Rgb(72, 82, 96),
                shadow: Color::Rgb(14, 16, 24),
                error: Color::Rgb(255, 145, 120),
                info: Color::Rgb(205, 165, 255),
            },
            Theme::Light => Self {
                bg: Color::Rgb(245, 246, 248),
                fg: Color::Rgb(30, 34, 40),
                muted: Color::Rgb(95, 105, 120),
                accent: Color::Rgb(30, 100, 200),
                border: Color::Rgb(160, 168, 180),
                modal_border: Color::Rgb(30, 100, 200),
                pill_idle_bg: Color::Rgb(215, 220, 228),
                shadow: Color::Rgb(200, 204, 212),
                error: Color::Rgb(190, 50, 30),
                info: Color::Rgb(110, 60, 170),
            },
        }
    }
}

pub(super) fn draw_tui(frame: &mut Frame, shelf: &Shelf, config: &Config, state: &mut TuiState) {
    let palette = Palette::for_theme(shelf.prefs.theme());
    let bg = Block::default().style(Style::default().bg(palette.bg).fg(palette.fg));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], shelf, state, &palette);
    draw_highlights(frame, chunks[1], shelf, config, state, &palette);
    match state.view {
        View::History => draw_history(frame, chunks[2], shelf, state, &palette),
        View::Saved => draw_saved(frame, chunks[2], shelf, state, &palette),
    }

    let controls = Paragraph::new(Line::from(Span::styled(
        controls_text(state.view),
        Style::default().fg(palette.muted),
    )))
    .alignment(Alignment::Center)
    .block(panel_block("Controls", &palette));
    frame.render_widget(controls, chunks[3]);

    let (status_text, style) = match &state.toast {
        Some(toast) => (
            toast.message.clone(),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        None => (state.status.clone(), status_style(&state.status, &palette)),
    };
    let status_widget = Paragraph::new(status_text)
        .style(style)
        .block(panel_block("Status", &palette));
    frame.render_widget(status_widget, chunks[4]);

    if let Some(confirm) = &state.pending_confirm {
        let (title, popup_text) = match confirm {
            PendingConfirm::Delete { title, .. } => (
                "Confirm Delete",
                format!(
                    "Delete history entry?\n\n{}\n\nThis cannot be undone.\n\n[y / Enter] Delete   [n / Esc] Cancel",
                    truncate(title, 56)
                ),
            ),
            PendingConfirm::ClearAll { count } => (
                "Confirm Clear",
                format!(
                    "Clear all {count} history entries?\n\nThis cannot be undone.\n\n[y / Enter] Clear   [n / Esc] Cancel"
                ),
            ),
        };
        draw_popup(frame, title, popup_text, &palette);
    } else if let Some(notice) = &state.pending_notice {
        draw_popup(frame, notice.title, notice.message.clone(), &palette);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, shelf: &Shelf, state: &TuiState, palette: &Palette) {
    let mut spans = vec![
        Span::styled(
            "ANISHELF",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
    ];
    match state.view {
        View::History => {
            for tab in HistoryCategory::TABS {
                let style = if tab == state.tab {
                    pill_active(palette)
                } else {
                    pill_inactive(palette)
                };
                spans.push(Span::styled(format!(" {} ", tab.label()), style));
                spans.push(Span::raw(" "));
            }
        }
        View::Saved => {
            spans.push(Span::styled(" Saved ", pill_active(palette)));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("{} items", shelf.bookmarks.list_all().len()),
                Style::default().fg(palette.muted),
            ));
        }
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(panel_block("Dashboard", palette));
    frame.render_widget(header, area);
}

fn draw_highlights(
    frame: &mut Frame,
    area: Rect,
    shelf: &Shelf,
    config: &Config,
    state: &TuiState,
    palette: &Palette,
) {
    let records = highlight_records(shelf, state.tab, config.ui.highlight_count);
    let lines = match state.carousel.active_item().and_then(|idx| records.get(idx)) {
        Some(record) => {
            let dots: String = (0..state.carousel.len())
                .map(|idx| {
                    if Some(idx) == state.carousel.active_item() {
                        '●'
                    } else {
                        '○'
                    }
                })
                .collect();
            vec![
                Line::from(Span::styled(
                    truncate(&record.title, 60),
                    Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!(
                        "{} · {} · {}",
                        record.content_kind.label(),
                        episode_display(record),
                        format_timestamp(record.timestamp)
                    ),
                    Style::default().fg(palette.muted),
                )),
                Line::from(Span::styled(dots, Style::default().fg(palette.accent))),
            ]
        }
        None => vec![Line::from(Span::styled(
            "Nothing to continue yet.",
            Style::default().fg(palette.muted),
        ))],
    };

    let rail = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel_block("Continue Watching", palette));
    frame.render_widget(rail, area);
}

fn draw_history(frame: &mut Frame, area: Rect, shelf: &Shelf, state: &mut TuiState, palette: &Palette) {
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(area);

    let items = shelf.history.in_category(state.tab);
    let rows: Vec<Row> = items
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::from(item.title.clone()),
                Cell::from(item.content_kind.label()),
                Cell::from(episode_display(item)),
                Cell::from(activity_display(item)),
                Cell::from(format_timestamp(item.timestamp)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(18),
            Constraint::Length(17),
        ],
    )
    .header(Row::new(vec!["Title", "Type", "Episode", "Tab", "Watched"]).style(header_style(palette)))
    .block(panel_block("History", palette))
    .row_highlight_style(pill_active(palette))
    .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, body_chunks[0], &mut state.table_state);

    let details = match state.table_state.selected().and_then(|idx| items.get(idx)) {
        Some(item) => {
            let id = item.id.key();
            let resume = match shelf.history.resolve_resume_point(&id) {
                Some(point) => {
                    let mut text = episode_display(item);
                    if let Some(episode_id) = point.episode_id {
                        text.push_str(&format!(" ({episode_id})"));
                    }
                    text
                }
                None => "from the beginning".to_string(),
            };
            let saved = if shelf.bookmarks.is_saved(&item.content_item().identity()) {
                "yes"
            } else {
                "no"
            };
            format!(
                "Title\n{}\n\nResume\n{}\n\nSource\n{}\n\nID\n{}\n\nSaved\n{}",
                truncate(&item.title, 40),
                resume,
                source_display(item),
                truncate(&id, 28),
                saved,
            )
        }
        None => "No history entries here yet.\n\nUse `anishelf record` to add plays.".to_string(),
    };
    let selection = Paragraph::new(details)
        .style(Style::default().fg(palette.fg))
        .wrap(Wrap { trim: true })
        .block(panel_block("Selected", palette));
    frame.render_widget(selection, body_chunks[1]);
}

fn draw_saved(frame: &mut Frame, area: Rect, shelf: &Shelf, state: &mut TuiState, palette: &Palette) {
    let rows: Vec<Row> = shelf
        .bookmarks
        .list_all()
        .iter()
        .map(|item| {
            let watched = if shelf.history.get(&item.identity()).is_some() {
                "in history"
            } else {
                "-"
            };
            Row::new(vec![
                Cell::from(item.title()),
                Cell::from(item.kind().map(ContentKind::label).unwrap_or("-")),
                Cell::from(item.identity()),
                Cell::from(watched),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Length(6),
            Constraint::Length(24),
            Constraint::Length(12),
        ],
    )
    .header(Row::new(vec!["Title", "Type", "Identity", "Progress"]).style(header_style(palette)))
    .block(panel_block("Saved", palette))
    .row_highlight_style(pill_active(palette))
    .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, area, &mut state.table_state);
}

fn controls_text(view: View) -> &'static str {
    match view {
        View::History => {
            "←/→ tab  ↑/↓ move  Enter resume  r details  b save  d delete  c clear  [/] rail  t theme  Tab saved  q quit"
        }
        View::Saved => "↑/↓ move  Enter resume  d/b unsave  [/] rail  t theme  Tab history  q quit",
    }
}

fn draw_popup(frame: &mut Frame, title: &'static str, text: String, palette: &Palette) {
    let popup_area = popup_rect_for_text(frame.area(), &text);
    render_popup_shadow(frame, popup_area, palette);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(text)
        .style(Style::default().bg(palette.bg).fg(palette.fg))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(modal_block(title, palette));
    frame.render_widget(popup, popup_area);
}

fn panel_block(title: &'static str, palette: &Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .title(title)
}

fn modal_block(title: &'static str, palette: &Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(palette.modal_border)
                .add_modifier(Modifier::BOLD),
        )
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn header_style(palette: &Palette) -> Style {
    Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD)
}

fn pill_active(palette: &Palette) -> Style {
    Style::default()
        .bg(palette.accent)
        .fg(palette.bg)
        .add_modifier(Modifier::BOLD)
}

fn pill_inactive(palette: &Palette) -> Style {
    Style::default().bg(palette.pill_idle_bg).fg(palette.fg)
}

fn status_style(status: &str, palette: &Palette) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(palette.error)
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(palette.info)
    } else {
        Style::default().fg(palette.fg)
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect, palette: &Palette) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    frame.render_widget(Block::default().style(Style::default().bg(palette.shadow)), shadow);
}

fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let max_line_width = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let available_width = area.width.saturating_sub(2).max(1);
    let min_width = 48.min(available_width);
    let max_width = 72.min(available_width);
    let width = max_line_width.saturating_add(12).clamp(min_width, max_width);

    let available_height = area.height.saturating_sub(2).max(1);
    let min_height = 10.min(available_height);
    let max_height = 18.min(available_height);
    let height = line_count.saturating_add(6).clamp(min_height, max_height);

    centered_fixed_rect(width, height, area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered_and_clamped_to_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = popup_rect_for_text(area, "short\ntext");
        assert_eq!(popup.width, 48);
        assert_eq!(popup.height, 10);
        assert_eq!(popup.x, 26);
        assert_eq!(popup.y, 15);

        let tiny = popup_rect_for_text(Rect::new(0, 0, 20, 6), &"x".repeat(200));
        assert!(tiny.width <= 20 && tiny.height <= 6);
    }

    #[test]
    fn status_prefix_selects_style() {
        let palette = Palette::for_theme(Theme::Dark);
        assert_eq!(status_style("ERROR: nope", &palette).fg, Some(palette.error));
        assert_eq!(status_style("INFO: ok", &palette).fg, Some(palette.info));
        assert_eq!(status_style("plain", &palette).fg, Some(palette.fg));
    }
}
