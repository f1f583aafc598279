//! Owns the live terminal for the form and puts it back on the way out.

use anyhow::Result;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};

pub type FormTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode, the alternate screen and the ratatui terminal drawing into it.
///
/// Dropping the guard leaves the alternate screen, so `?` returns restore
/// the shell too. Panics are covered by [`install_panic_hook`].
pub struct TerminalGuard {
    terminal: FormTerminal,
    restored: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            restore_terminal();
            return Err(e.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal();
                return Err(e.into());
            }
        };
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn terminal(&mut self) -> &mut FormTerminal {
        &mut self.terminal
    }

    /// Leave the alternate screen now instead of on drop
    pub fn leave(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.restored {
            self.restored = true;
            let _ = self.terminal.show_cursor();
            restore_terminal();
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Best effort; the terminal may already be gone
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    let _ = io::stdout().flush();
}

/// Restore the terminal before the previous hook prints the panic
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous(info);
    }));
}
