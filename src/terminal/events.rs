use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::router::Route;
use crate::terminal::screens::Screen;
use crate::terminal::state::AppState;

/// Returns `true` when the app should exit.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('L') if state.session.is_authenticated() => {
            state.logout();
            return false;
        }
        _ => {}
    }

    match state.screen {
        Screen::Login(_) => handle_login_keys(key, state),
        Screen::Dashboard(_) => handle_dashboard_keys(key, state),
        Screen::Detail(_) => handle_detail_keys(key, state),
    }
}

fn handle_login_keys(key: KeyEvent, state: &mut AppState) -> bool {
    match key.code {
        KeyCode::Enter => state.sign_in(),
        KeyCode::Esc => return true,
        _ => {}
    }
    false
}

fn handle_dashboard_keys(key: KeyEvent, state: &mut AppState) -> bool {
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Enter => state.open_selected(),
        KeyCode::Char(' ') => state.toggle_card(),
        KeyCode::Char('r') => state.load_dashboard(),
        _ => {
            let Screen::Dashboard(s) = &mut state.screen else {
                return false;
            };
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => s.move_selection(1),
                KeyCode::Up | KeyCode::Char('k') => s.move_selection(-1),
                KeyCode::Home => s.select_first(),
                KeyCode::End => s.select_last(),
                _ => {}
            }
        }
    }
    false
}

fn handle_detail_keys(key: KeyEvent, state: &mut AppState) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
            state.navigate(Route::Dashboard)
        }
        KeyCode::Char('r') => state.load_detail(),
        KeyCode::Char('t') => state.trash(),
        KeyCode::Char('d') => state.draft(),
        _ => {
            let Screen::Detail(s) = &mut state.screen else {
                return false;
            };
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => s.scroll(1),
                KeyCode::Up | KeyCode::Char('k') => s.scroll(-1),
                KeyCode::PageDown => s.scroll(10),
                KeyCode::PageUp => s.scroll(-10),
                KeyCode::Home => s.scroll = 0,
                _ => {}
            }
        }
    }
    false
}
