use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::domain::email::Stats;

fn tile(f: &mut Frame, area: Rect, title: &str, value: String, color: Color) {
    let p = Paragraph::new(Line::from(Span::styled(
        value,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(p, area);
}

/// Two counters plus the connected account.
pub fn render(f: &mut Frame, area: Rect, stats: &Stats, moved_now: Option<u32>) {
    let [moved, processed, account] = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Percentage(40),
    ])
    .areas(area);

    let moved_value = match moved_now {
        Some(n) if n > 0 => format!("{}  (+{n} this refresh)", stats.total_moved_to_gator),
        _ => stats.total_moved_to_gator.to_string(),
    };
    tile(f, moved, "Moved to Lator Gator", moved_value, Color::Blue);
    tile(
        f,
        processed,
        "Total Emails Processed",
        stats.total_emails_processed.to_string(),
        Color::Magenta,
    );
    tile(f, account, "Connected Account", stats.email.clone(), Color::Reset);
}
