mod carousel;
mod embed;
mod format;
mod playback;
mod tui;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cli::{BookmarkCommand, Cli, Command, RecordArgs, ThemeAction};
use crate::config::Config;
use crate::content::{ContentItem, ContentKind, HistoryRecord, Label};
use crate::db::Database;
use crate::logging::init_logging;
use crate::paths::{config_file_path, database_file_path, log_dir};
use crate::store::Shelf;
use crate::store::history::HistoryCategory;
use crate::store::prefs::Theme;
use crate::store::writer::StorageWriter;

use self::embed::player_url;
use self::format::{activity_display, episode_display, format_timestamp, now_millis, truncate};
use self::playback::{launch_opener, play_entry};

pub(crate) fn run(cli: Cli) -> Result<()> {
    let interactive = matches!(cli.command, Some(Command::Tui) | None);
    let logs = if interactive { Some(log_dir()?) } else { None };
    init_logging(cli.verbose, cli.quiet, logs.as_deref())?;

    let config = Config::load(&config_file_path()?)?;
    let db = open_db()?;
    let mut writer = StorageWriter::new();
    let mut shelf = Shelf::load(&db, writer.sink());
    writer.start(db);

    match cli.command {
        Some(Command::Record(args)) => run_record(&mut shelf, args)?,
        Some(Command::List { category }) => run_list(&shelf, category),
        Some(Command::Resume { id, open }) => run_resume(&mut shelf, &config, &id, open)?,
        Some(Command::Remove { id }) => run_remove(&mut shelf, &id),
        Some(Command::Clear) => run_clear(&mut shelf),
        Some(Command::Bookmark(command)) => run_bookmark(&mut shelf, command)?,
        Some(Command::Theme { action }) => run_theme(&mut shelf, action),
        Some(Command::Tui) | None => tui::run_tui(&mut shelf, &config)?,
    }

    drop(writer);
    Ok(())
}

fn open_db() -> Result<Database> {
    let db_path = database_file_path()?;
    debug!(path = %db_path.display(), "opening database");
    let db = Database::open(&db_path)?;
    db.migrate()?;
    Ok(db)
}

fn run_record(shelf: &mut Shelf, args: RecordArgs) -> Result<()> {
    let record = record_from_args(args, now_millis())?;
    let message = format!(
        "Recorded: {} | {}",
        record.title,
        episode_display(&record)
    );
    shelf.history.upsert(record);
    println!("{message}");
    Ok(())
}

pub(crate) fn record_from_args(args: RecordArgs, timestamp: i64) -> Result<HistoryRecord> {
    if args.id.trim().is_empty() {
        bail!("--id cannot be empty");
    }
    if args.kind == ContentKind::Anime && args.mode.is_some() {
        warn!("--mode is ignored for anime entries; use --source instead");
    }
    let full_media = match args.media.as_deref() {
        Some(raw) => serde_json::from_str(raw).context("--media is not valid JSON")?,
        None => Value::Null,
    };

    Ok(HistoryRecord {
        id: Label::from(args.id.trim()),
        title: args.title,
        image: args.image,
        content_kind: args.kind,
        source: args.source,
        mode: args.mode,
        episode_number: args.episode.map(Label::from),
        episode_title: args.episode_title,
        season_number: args.season,
        episode_id: args.episode_id.map(Label::from),
        timestamp,
        full_media,
    })
}

fn run_list(shelf: &Shelf, category: HistoryCategory) {
    let items = shelf.history.in_category(category);
    if items.is_empty() {
        println!("No history entries in {}.", category.label());
        return;
    }

    println!(
        "{:<14} {:<40} {:<6} {:<10} {:<18} {:<17}",
        "ID", "TITLE", "TYPE", "EPISODE", "TAB", "WATCHED"
    );
    for item in items {
        println!(
            "{:<14} {:<40} {:<6} {:<10} {:<18} {:<17}",
            truncate(&item.id.key(), 14),
            truncate(&item.title, 40),
            item.content_kind.label(),
            truncate(&episode_display(item), 10),
            activity_display(item),
            format_timestamp(item.timestamp)
        );
    }
}

fn run_resume(shelf: &mut Shelf, config: &Config, id: &str, open: bool) -> Result<()> {
    let Some(record) = shelf.history.get(id) else {
        println!("No history entry for {id}.");
        return Ok(());
    };

    println!("Title: {}", record.title);
    match shelf.history.resolve_resume_point(id) {
        Some(point) => {
            if let Some(season) = point.season_number {
                println!("  Season: {season}");
            }
            if let Some(episode) = &point.episode_number {
                println!("  Episode: {episode}");
            }
            if let Some(episode_id) = &point.episode_id {
                println!("  Episode ID: {episode_id}");
            }
        }
        None => println!("  No resume point recorded; playback starts from the beginning."),
    }

    if !open {
        println!("  Player: {}", player_url(&config.player, record)?);
        return Ok(());
    }

    if config.player.opener.is_none() {
        bail!("set player.opener in the config file to open the player");
    }
    let outcome = play_entry(&mut shelf.history, &config.player, id, launch_opener)?;
    println!("  Player: {}", outcome.url);
    println!("Resumed {}.", outcome.title);
    Ok(())
}

fn run_remove(shelf: &mut Shelf, id: &str) {
    if shelf.history.remove(id) {
        println!("Removed history entry {id}.");
    } else {
        println!("No history entry for {id}.");
    }
}

fn run_clear(shelf: &mut Shelf) {
    let count = shelf.history.list_all().len();
    shelf.history.clear();
    println!("Cleared {count} history entries.");
}

fn run_bookmark(shelf: &mut Shelf, command: BookmarkCommand) -> Result<()> {
    match command {
        BookmarkCommand::Toggle { item } => {
            let item: ContentItem = serde_json::from_str(&item)
                .context("bookmark item must be a JSON object with an `id` or `session` field")?;
            let title = item.title();
            let outcome = shelf.bookmarks.toggle(item);
            println!("{}", outcome.notice(&title));
        }
        BookmarkCommand::List => {
            let items = shelf.bookmarks.list_all();
            if items.is_empty() {
                println!("No saved items yet.");
                return Ok(());
            }
            println!("{:<24} {:<48} {:<6}", "IDENTITY", "TITLE", "TYPE");
            for item in items {
                println!(
                    "{:<24} {:<48} {:<6}",
                    truncate(&item.identity(), 24),
                    truncate(&item.title(), 48),
                    item.kind().map(ContentKind::label).unwrap_or("-")
                );
            }
        }
        BookmarkCommand::Check { identity } => {
            if !shelf.bookmarks.is_saved(&identity) {
                bail!("{identity} is not saved");
            }
            println!("{identity} is saved.");
        }
    }
    Ok(())
}

fn run_theme(shelf: &mut Shelf, action: ThemeAction) {
    let theme = match action {
        ThemeAction::Show => shelf.prefs.theme(),
        ThemeAction::Dark => {
            shelf.prefs.set_theme(Theme::Dark);
            Theme::Dark
        }
        ThemeAction::Light => {
            shelf.prefs.set_theme(Theme::Light);
            Theme::Light
        }
        ThemeAction::Toggle => shelf.prefs.toggle_theme(),
    };
    println!("Theme: {}", theme.label());
}
