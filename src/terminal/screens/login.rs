use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Wrap},
};

use crate::router::Route;
use crate::terminal::fetch::ReqId;
use crate::terminal::widgets::{error_line, loading_line};

pub const LOGIN_FAILED: &str = "Failed to initiate login. Please try again.";

#[derive(Debug, Default)]
pub struct LoginScreen {
    /// Where to go once signed in.
    pub from: Option<Route>,
    pub sign_in_req: Option<ReqId>,
    pub auth_url: Option<String>,
    pub error: Option<String>,
}

impl LoginScreen {
    pub fn new(from: Option<Route>) -> Self {
        Self {
            from,
            ..Default::default()
        }
    }

    pub fn signing_in(&self) -> bool {
        self.sign_in_req.is_some()
    }
}

pub fn render(f: &mut Frame, area: Rect, s: &LoginScreen, tick: usize) {
    let [card] = Layout::horizontal([Constraint::Max(64)])
        .flex(Flex::Center)
        .areas(area);
    let [card] = Layout::vertical([Constraint::Length(13)])
        .flex(Flex::Center)
        .areas(card);

    let mut lines = vec![
        Line::styled(
            "Sign in to Gmail AI Assistant",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            "Connect your Gmail account to get started",
            Style::default().fg(Color::Gray),
        ),
        Line::from(""),
    ];

    if let Some(err) = &s.error {
        lines.push(error_line(err, None));
        lines.push(Line::from(""));
    }

    if s.signing_in() {
        lines.push(loading_line(tick, "Signing in... finish in your browser"));
        if let Some(url) = &s.auth_url {
            lines.push(Line::from(""));
            lines.push(Line::styled(
                "If no browser opened, visit:",
                Style::default().fg(Color::DarkGray),
            ));
            lines.push(Line::styled(url.clone(), Style::default().fg(Color::Blue)));
        }
    } else {
        lines.push(Line::from(vec![
            Span::styled(
                "  Sign in with Google  ",
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  [Enter]", Style::default().fg(Color::DarkGray)),
        ]));
    }

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(p, card);
}
