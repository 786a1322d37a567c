use std::io;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

/// Raw mode + alternate screen, restored on drop even when the loop bails out.
pub(super) struct TuiSession {
    active: bool,
}

impl TuiSession {
    pub(super) fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .context("failed to enter alternate screen")?;
        Ok(Self { active: true })
    }

    pub(super) fn leave(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        disable_raw_mode().context("failed to disable raw mode")?;
        execute!(io::stdout(), LeaveAlternateScreen, Show)
            .context("failed to leave alternate screen")?;
        self.active = false;
        Ok(())
    }

    fn reacquire(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .context("failed to re-enter alternate screen")?;
        enable_raw_mode().context("failed to re-enable raw mode")?;
        self.active = true;
        Ok(())
    }
}

/// Something that can lend the terminal to another process for a while.
pub(super) trait TerminalHandoff {
    /// Hands the terminal to `f` (an external player, for instance) and takes it back.
    fn suspended<T>(&mut self, f: impl FnOnce() -> T) -> Result<T>;
}

impl TerminalHandoff for TuiSession {
    fn suspended<T>(&mut self, f: impl FnOnce() -> T) -> Result<T> {
        self.release()?;
        let out = f();
        self.reacquire()?;
        Ok(out)
    }
}

impl Drop for TuiSession {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        }
    }
}
