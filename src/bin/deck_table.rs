use anyhow::Context;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use deckhouse::config::Config;
use deckhouse::registry::DeckRegistry;
use deckhouse::store::{self, JsonDirStore};
use deckhouse::tui::{app::AppState, controller};
use ratatui::prelude::*;
use std::io::{self, IsTerminal, Stdout};
use std::sync::Arc;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Seed the table with the decks the server left in its data directory.
/// Changes made here are not written back.
fn load_registry(config: &Config) -> anyhow::Result<Arc<DeckRegistry>> {
    let registry = Arc::new(DeckRegistry::new());
    if let Some(dir) = &config.data_dir {
        let disk = JsonDirStore::open(dir)
            .with_context(|| format!("opening deck store {}", dir.display()))?;
        store::restore(&registry, &disk)?;
    }
    Ok(registry)
}

/// Run `body` inside the alternate screen, restoring the terminal even when
/// `body` fails.
fn in_alternate_screen<T>(
    body: impl FnOnce(&mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<T>,
) -> io::Result<T> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let mut term = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = body(&mut term);

    terminal::disable_raw_mode()?;
    crossterm::execute!(term.backend_mut(), LeaveAlternateScreen)?;
    term.show_cursor()?;
    res
}

fn main() -> anyhow::Result<()> {
    if !io::stdout().is_terminal() {
        println!("deck-table {} needs an interactive terminal.", deckhouse::VERSION);
        return Ok(());
    }
    let config = Config::from_env()?;
    let mut app = AppState::new(load_registry(&config)?);
    in_alternate_screen(|term| controller::run(term, &mut app, TICK_RATE))?;
    Ok(())
}
