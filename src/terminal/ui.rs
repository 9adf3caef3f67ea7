use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::terminal::screens::{Screen, dashboard, detail, login};
use crate::terminal::state::AppState;

pub fn render(f: &mut Frame, state: &AppState) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .margin(1)
    .areas(f.area());

    // header only once signed in
    if state.session.is_authenticated() {
        let account = state.session.user_email().unwrap_or("signed in");
        let bar = Paragraph::new(Line::from(vec![
            Span::styled(
                " Gmail AI Assistant ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {account}  ")),
            Span::styled(format!("{}  ", state.router.current().path()), Style::default().fg(Color::DarkGray)),
            Span::styled("L", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" logout"),
        ]));
        f.render_widget(bar, header);
    }

    match &state.screen {
        Screen::Login(s) => login::render(f, body, s, state.tick),
        Screen::Dashboard(s) => dashboard::render(f, body, s, state.tick),
        Screen::Detail(s) => detail::render(f, body, s, state.tick),
    }

    let mut spans = Vec::new();
    for (key, what) in hints(&state.screen) {
        spans.push(Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(format!(" {what}  ")));
    }
    if let Some(n) = &state.notice {
        spans.push(Span::styled(n.clone(), Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), footer);
}

fn hints(screen: &Screen) -> &'static [(&'static str, &'static str)] {
    match screen {
        Screen::Login(_) => &[("Enter", "sign in"), ("q", "quit")],
        Screen::Dashboard(_) => &[
            ("j/k", "move"),
            ("Space", "analyze"),
            ("Enter", "open"),
            ("r", "refresh"),
            ("q", "quit"),
        ],
        Screen::Detail(_) => &[
            ("j/k", "scroll"),
            ("t", "trash"),
            ("d", "draft reply"),
            ("r", "reload"),
            ("b", "back"),
            ("q", "quit"),
        ],
    }
}
