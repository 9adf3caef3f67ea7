pub mod analysis;
pub mod email_card;
pub mod stats;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub fn spinner(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

/// Spinner placeholder for a fetch in flight.
pub fn loading_line(tick: usize, label: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", spinner(tick)), Style::default().fg(Color::Cyan)),
        Span::raw(label.to_string()),
    ])
}

/// Inline error with the key that retries it.
pub fn error_line(message: &str, retry_key: Option<&str>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red),
    )];
    if let Some(key) = retry_key {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{key}] Retry"),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}
