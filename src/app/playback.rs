use std::process::{Command as ProcessCommand, Stdio};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, warn};

use super::embed::player_url;
use super::format::now_millis;
use crate::config::PlayerConfig;
use crate::store::history::HistoryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlayOutcome {
    pub(crate) title: String,
    pub(crate) url: String,
    pub(crate) launched: bool,
}

/// Resumes the history entry `id`: builds its player URL, hands it to the
/// opener when one is configured, and re-records the entry as most recent.
///
/// A failed launch leaves the history untouched.
pub(crate) fn play_entry<L>(
    history: &mut HistoryStore,
    player: &PlayerConfig,
    id: &str,
    launch: L,
) -> Result<PlayOutcome>
where
    L: FnOnce(&str, &str) -> Result<()>,
{
    let mut record = history
        .get(id)
        .cloned()
        .ok_or_else(|| anyhow!("no history entry for {id}"))?;
    let url = player_url(player, &record)?;

    let launched = match player.opener.as_deref() {
        Some(opener) => {
            launch(opener, &url).inspect_err(|err| {
                warn!(id, opener, error = %err, "player launch failed");
            })?;
            true
        }
        None => false,
    };

    record.timestamp = now_millis();
    let title = record.title.clone();
    history.upsert(record);
    info!(id, launched, "resumed entry");
    Ok(PlayOutcome {
        title,
        url,
        launched,
    })
}

pub(crate) fn launch_opener(opener: &str, url: &str) -> Result<()> {
    let status = ProcessCommand::new(opener)
        .arg(url)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to launch {opener}"))?;
    if !status.success() {
        bail!("{opener} exited with status: {status}");
    }
    Ok(())
}
