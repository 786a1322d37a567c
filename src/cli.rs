use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::content::{CatalogSource, ContentKind, PlaybackMode};
use crate::store::history::HistoryCategory;

#[derive(Debug, Parser)]
#[command(
    name = "anishelf",
    version,
    about = "Keep watch history, resume points and bookmarks for anime, movies and TV"
)]
pub(crate) struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Record a play action in the watch history
    Record(RecordArgs),
    /// List watch history
    List {
        #[arg(long, value_enum, default_value_t = HistoryCategory::All)]
        category: HistoryCategory,
    },
    /// Show resume coordinates and the player link for an entry
    Resume {
        id: String,
        /// Launch the configured player opener and record the play
        #[arg(long)]
        open: bool,
    },
    /// Delete one history entry
    Remove { id: String },
    /// Delete the whole watch history
    Clear,
    #[command(subcommand)]
    Bookmark(BookmarkCommand),
    /// Show or change the theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
    Tui,
}

#[derive(Debug, Args)]
pub(crate) struct RecordArgs {
    #[arg(long)]
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) title: String,
    #[arg(long, value_enum)]
    pub(crate) kind: ContentKind,
    #[arg(long, value_enum)]
    pub(crate) source: Option<CatalogSource>,
    #[arg(long, value_enum)]
    pub(crate) mode: Option<PlaybackMode>,
    #[arg(long)]
    pub(crate) episode: Option<String>,
    #[arg(long)]
    pub(crate) episode_title: Option<String>,
    #[arg(long)]
    pub(crate) season: Option<u32>,
    #[arg(long)]
    pub(crate) episode_id: Option<String>,
    #[arg(long)]
    pub(crate) image: Option<String>,
    /// Full content object as JSON, kept verbatim
    #[arg(long)]
    pub(crate) media: Option<String>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum BookmarkCommand {
    /// Save a content item (JSON with an `id` or `session`), or remove it if already saved
    Toggle { item: String },
    List,
    /// Exit status tells whether the identity is saved
    Check { identity: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ThemeAction {
    Show,
    Dark,
    Light,
    Toggle,
}
