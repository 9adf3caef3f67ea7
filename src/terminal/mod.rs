pub mod events;
pub mod fetch;
pub mod screens;
pub mod state;
pub mod ui;
pub mod widgets;

use anyhow::{Result, anyhow};
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

use crate::terminal::state::AppState;

const TICK: Duration = Duration::from_millis(100);

pub fn run_tui(mut state: AppState) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("{e}"))?;

    let terminal = ratatui::init();
    let result = run(terminal, &mut state);

    ratatui::restore();

    result
}

fn run(mut terminal: DefaultTerminal, state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, state))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && events::handle_key(key, state)
        {
            break;
        }

        state.tick();
    }
    Ok(())
}
