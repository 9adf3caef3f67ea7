use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::decoders::{body_text, decode_mime_words, format_date};
use crate::domain::email::{DraftResponse, EmailAnalysis, EmailDetail};
use crate::terminal::fetch::{Fetch, ReqId};
use crate::terminal::widgets::{analysis, error_line, loading_line};

pub const LOAD_FAILED: &str = "Failed to load email details";
pub const TRASH_FAILED: &str = "Failed to move email to trash";
pub const DRAFT_FAILED: &str = "Failed to draft a response";

const BODY_WIDTH: usize = 100;

#[derive(Debug, Default)]
pub struct DetailScreen {
    pub id: String,
    pub load_req: Option<ReqId>,
    pub email: Fetch<EmailDetail>,
    /// Content as plain text, converted once when it arrives.
    pub body: String,
    pub analysis: Fetch<EmailAnalysis>,
    pub trash_req: Option<ReqId>,
    pub draft_req: Option<ReqId>,
    pub draft: Fetch<DraftResponse>,
    /// Failure of a user action (trash, draft), shown above the content.
    pub notice: Option<String>,
    pub scroll: u16,
}

impl DetailScreen {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn set_email(&mut self, email: EmailDetail) {
        self.body = body_text(&email.content, BODY_WIDTH);
        self.email = Fetch::Loaded(email);
        self.analysis = Fetch::Loading;
    }

    /// Trash is offered when the analysis recommends it.
    pub fn can_trash(&self) -> bool {
        self.trash_req.is_none() && self.analysis.loaded().is_some_and(|a| a.should_trash)
    }

    pub fn moving_to_trash(&self) -> bool {
        self.trash_req.is_some()
    }

    pub fn scroll(&mut self, delta: i32) {
        if delta < 0 {
            self.scroll = self.scroll.saturating_sub((-delta) as u16);
        } else {
            self.scroll = self.scroll.saturating_add(delta as u16);
        }
    }
}

pub fn render(f: &mut Frame, area: Rect, s: &DetailScreen, tick: usize) {
    let email = match &s.email {
        Fetch::Idle | Fetch::Loading => {
            let [mid] = Layout::vertical([Constraint::Length(1)])
                .flex(Flex::Center)
                .areas(area);
            f.render_widget(
                Paragraph::new(loading_line(tick, "Loading email...")).alignment(Alignment::Center),
                mid,
            );
            return;
        }
        Fetch::Failed(msg) => {
            f.render_widget(
                Paragraph::new(vec![error_line(msg, Some("r")), Line::from(""), back_hint()])
                    .block(Block::default().borders(Borders::ALL)),
                area,
            );
            return;
        }
        Fetch::Loaded(e) => e,
    };

    let draft_height = if matches!(s.draft, Fetch::Idle) { 0 } else { 10 };
    let notice_height = if s.notice.is_some() { 1 } else { 0 };
    let [notice_area, main, draft_area] = Layout::vertical([
        Constraint::Length(notice_height),
        Constraint::Min(0),
        Constraint::Length(draft_height),
    ])
    .areas(area);

    if let Some(n) = &s.notice {
        f.render_widget(Paragraph::new(error_line(n, None)), notice_area);
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(main);

    let mut lines = vec![
        Line::styled(
            decode_mime_words(&email.subject),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(vec![
            Span::styled("From: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(decode_mime_words(&email.from_address)),
        ]),
        Line::from(vec![
            Span::styled("Date: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format_date(&email.date)),
        ]),
        Line::from(""),
    ];
    lines.extend(s.body.lines().map(|l| Line::from(l.to_string())));

    let content = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((s.scroll, 0))
        .block(
            Block::default()
                .title(" Email ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(content, left);

    let mut side = match &s.analysis {
        Fetch::Idle | Fetch::Loading => vec![loading_line(tick, "Analyzing your email...")],
        Fetch::Failed(msg) => vec![error_line(msg, Some("r"))],
        Fetch::Loaded(a) => analysis::analysis_lines(a),
    };
    side.push(Line::from(""));
    if s.moving_to_trash() {
        side.push(loading_line(tick, "Moving to Trash..."));
    } else if s.can_trash() {
        side.push(Line::styled(
            "[t] Move to Trash",
            Style::default().fg(Color::White).bg(Color::Red),
        ));
    }
    side.push(back_hint());

    f.render_widget(
        Paragraph::new(side).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(" AI Analysis ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        right,
    );

    if draft_height > 0 {
        let lines: Vec<Line> = match &s.draft {
            Fetch::Loaded(d) => d.content.lines().map(|l| Line::from(l.trim().to_string())).collect(),
            Fetch::Failed(msg) => vec![error_line(msg, Some("d"))],
            _ => vec![loading_line(tick, "Drafting a reply...")],
        };
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().title(" Draft reply ").borders(Borders::ALL)),
            draft_area,
        );
    }
}

fn back_hint() -> Line<'static> {
    Line::styled("← [b] Back to emails", Style::default().fg(Color::Blue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::screens::tests::screen_text;

    fn loaded(should_trash: bool) -> DetailScreen {
        let mut s = DetailScreen::new("m1");
        s.set_email(EmailDetail {
            subject: "Flash sale".into(),
            from_address: "shop@example.com".into(),
            date: "not a date".into(),
            content: "<html><body><p>Everything must go</p></body></html>".into(),
        });
        s.analysis = Fetch::Loaded(EmailAnalysis {
            category: "promotional".into(),
            should_trash,
            ..Default::default()
        });
        s
    }

    #[test]
    fn trash_offered_only_when_recommended() {
        assert!(loaded(true).can_trash());
        assert!(!loaded(false).can_trash());

        let mut busy = loaded(true);
        busy.trash_req = Some(3);
        assert!(!busy.can_trash());
        assert!(busy.moving_to_trash());
    }

    #[test]
    fn renders_content_and_analysis() {
        let s = loaded(true);
        let text = screen_text(140, 30, |f| render(f, f.area(), &s, 0));
        assert!(text.contains("Flash sale"));
        assert!(text.contains("Everything must go"));
        assert!(text.contains("Promotional"));
        assert!(text.contains("Move to Trash"));
    }

    #[test]
    fn load_failure_message() {
        let s = DetailScreen {
            email: Fetch::Failed(LOAD_FAILED.into()),
            ..DetailScreen::new("x")
        };
        let text = screen_text(100, 10, |f| render(f, f.area(), &s, 0));
        assert!(text.contains(LOAD_FAILED));
    }

    #[test]
    fn scroll_never_underflows() {
        let mut s = DetailScreen::new("x");
        s.scroll(-5);
        assert_eq!(s.scroll, 0);
        s.scroll(3);
        assert_eq!(s.scroll, 3);
    }
}
