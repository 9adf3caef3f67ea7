use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::ListItem;

use crate::decoders::{decode_mime_words, format_date, normalize_snippet};
use crate::domain::email::Email;

pub fn subject_or_placeholder(email: &Email) -> String {
    let subject = decode_mime_words(email.subject.trim());
    if subject.is_empty() {
        "No Subject".to_string()
    } else {
        subject
    }
}

fn label_span(label: &str) -> Span<'static> {
    let style = if label == "INBOX" {
        Style::default().fg(Color::Blue)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!("[{label}]"), style)
}

/// One inbox row: subject, sender and date, snippet, labels.
pub fn card_item(email: &Email, expanded: bool, snippet_width: usize) -> ListItem<'static> {
    let marker = if expanded { "▾ " } else { "▸ " };
    let mut lines = vec![
        Line::from(vec![
            Span::raw(marker),
            Span::styled(
                subject_or_placeholder(email),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("  From: {}", decode_mime_words(&email.from_address)),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                format!("  {}", format_date(&email.date)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::styled(
            format!("  {}", normalize_snippet(&email.snippet, snippet_width)),
            Style::default().fg(Color::Gray),
        ),
    ];

    if !email.labels.is_empty() {
        let mut spans = vec![Span::raw("  ")];
        for label in &email.labels {
            spans.push(label_span(label));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));

    ListItem::new(Text::from(lines))
}
