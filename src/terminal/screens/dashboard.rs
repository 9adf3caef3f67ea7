use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, List, ListState, Paragraph, Wrap},
};

use crate::domain::email::{Email, EmailAnalysis};
use crate::terminal::fetch::{DashboardData, Fetch, ReqId};
use crate::terminal::widgets::{analysis, email_card, error_line, loading_line, stats};

pub const FETCH_FAILED: &str = "Failed to fetch data. Please try again.";
pub const ANALYSIS_FAILED: &str = "Failed to analyze email. Please try again.";
pub const EMPTY_INBOX: &str = "No emails found in your inbox.";

/// Analysis requested from an expanded card. Collapsing drops it, so
/// expanding again asks the backend again.
#[derive(Debug)]
pub struct CardAnalysis {
    pub key: String,
    pub req: ReqId,
    pub fetch: Fetch<EmailAnalysis>,
}

#[derive(Debug, Default)]
pub struct DashboardScreen {
    pub load_req: Option<ReqId>,
    pub data: Fetch<DashboardData>,
    pub list_state: ListState,
    pub card: Option<CardAnalysis>,
}

impl DashboardScreen {
    pub fn emails(&self) -> &[Email] {
        self.data
            .loaded()
            .map(|d| d.list.emails.as_slice())
            .unwrap_or_default()
    }

    pub fn selected_email(&self) -> Option<&Email> {
        let idx = self.list_state.selected()?;
        self.emails().get(idx)
    }

    pub fn set_data(&mut self, data: DashboardData) {
        let empty = data.list.emails.is_empty();
        self.data = Fetch::Loaded(data);
        self.card = None;
        if empty {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.emails().len() as i32;
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let next = (cur + delta).clamp(0, len - 1) as usize;
        self.list_state.select(Some(next));
    }

    pub fn select_first(&mut self) {
        if !self.emails().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.emails().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    pub fn is_expanded(&self, email: &Email) -> bool {
        self.card.as_ref().is_some_and(|c| c.key == email.key())
    }
}

pub fn render(f: &mut Frame, area: Rect, s: &DashboardScreen, tick: usize) {
    match &s.data {
        Fetch::Idle | Fetch::Loading => {
            let [mid] = Layout::vertical([Constraint::Length(1)])
                .flex(ratatui::layout::Flex::Center)
                .areas(area);
            let p = Paragraph::new(loading_line(tick, "Loading your inbox..."))
                .alignment(Alignment::Center);
            f.render_widget(p, mid);
        }
        Fetch::Failed(msg) => {
            let [alert, _rest] =
                Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
            let p = Paragraph::new(error_line(msg, Some("r")))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                );
            f.render_widget(p, alert);
        }
        Fetch::Loaded(data) => render_loaded(f, area, s, data, tick),
    }
}

fn render_loaded(f: &mut Frame, area: Rect, s: &DashboardScreen, data: &DashboardData, tick: usize) {
    let [stats_area, inbox_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    stats::render(f, stats_area, &data.stats, data.list.moved_count);

    let inbox_block = Block::default()
        .title(format!(" Your Inbox ({}) ", data.list.emails.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    if data.list.emails.is_empty() {
        let p = Paragraph::new(vec![
            Line::from(""),
            Line::styled(EMPTY_INBOX, Style::default().fg(Color::Gray)),
            Line::from(""),
            Line::styled("[r] Refresh Inbox", Style::default().fg(Color::Yellow)),
        ])
        .alignment(Alignment::Center)
        .block(inbox_block);
        f.render_widget(p, inbox_area);
        return;
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .areas(inbox_area);

    let snippet_width = left.width.saturating_sub(6) as usize;
    let items: Vec<_> = data
        .list
        .emails
        .iter()
        .map(|e| email_card::card_item(e, s.is_expanded(e), snippet_width))
        .collect();
    let list = List::new(items)
        .block(inbox_block)
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));
    f.render_stateful_widget(list, left, &mut s.list_state.clone());

    let preview_block = Block::default()
        .title(" AI Analysis ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let lines = match (&s.card, s.selected_email()) {
        (Some(card), Some(sel)) if card.key == sel.key() => match &card.fetch {
            Fetch::Idle | Fetch::Loading => vec![
                loading_line(tick, "Analyzing your email..."),
                Line::styled(
                    "This may take a few moments",
                    Style::default().fg(Color::DarkGray),
                ),
            ],
            Fetch::Failed(msg) => vec![error_line(msg, Some("space"))],
            Fetch::Loaded(a) => analysis::analysis_lines(a),
        },
        _ => vec![Line::styled(
            "[space] analyze   [enter] open",
            Style::default().fg(Color::DarkGray),
        )],
    };

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(preview_block);
    f.render_widget(p, right);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::email::{EmailList, Stats};
    use crate::terminal::screens::tests::screen_text;

    fn data(emails: Vec<Email>) -> DashboardData {
        DashboardData {
            list: EmailList {
                emails,
                moved_count: None,
            },
            stats: Stats {
                total_moved_to_gator: 7,
                total_emails_processed: 42,
                email: "me@example.com".into(),
            },
        }
    }

    fn email(id: &str, subject: &str) -> Email {
        Email {
            id: id.into(),
            message_id: id.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_inbox_is_not_an_error() {
        let mut s = DashboardScreen::default();
        s.set_data(data(vec![]));
        let text = screen_text(120, 20, |f| render(f, f.area(), &s, 0));
        assert!(text.contains(EMPTY_INBOX));
        assert!(text.contains("Refresh Inbox"));
        assert!(!text.contains("Failed"));
        assert!(text.contains("42"));
    }

    #[test]
    fn failure_offers_retry() {
        let s = DashboardScreen {
            data: Fetch::Failed(FETCH_FAILED.into()),
            ..Default::default()
        };
        let text = screen_text(120, 20, |f| render(f, f.area(), &s, 0));
        assert!(text.contains(FETCH_FAILED));
        assert!(text.contains("Retry"));
    }

    #[test]
    fn cards_and_inline_analysis() {
        let mut s = DashboardScreen::default();
        s.set_data(data(vec![email("a", "Quarterly report"), email("b", "")]));
        s.card = Some(CardAnalysis {
            key: "a".into(),
            req: 1,
            fetch: Fetch::Loading,
        });
        let text = screen_text(140, 30, |f| render(f, f.area(), &s, 0));
        assert!(text.contains("Quarterly report"));
        assert!(text.contains("No Subject"));
        assert!(text.contains("Analyzing your email..."));
    }

    #[test]
    fn selection_is_clamped() {
        let mut s = DashboardScreen::default();
        s.set_data(data(vec![email("a", "1"), email("b", "2")]));
        s.move_selection(5);
        assert_eq!(s.selected_email().map(|e| e.id.as_str()), Some("b"));
        s.move_selection(-9);
        assert_eq!(s.selected_email().map(|e| e.id.as_str()), Some("a"));
        s.select_last();
        assert_eq!(s.list_state.selected(), Some(1));
    }
}
