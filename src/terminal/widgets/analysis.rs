use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::decoders::capitalize;
use crate::domain::email::EmailAnalysis;

pub fn category_color(category: &str) -> Color {
    match category.to_ascii_lowercase().as_str() {
        "important" => Color::Green,
        "promotional" => Color::Yellow,
        "social" => Color::Cyan,
        _ => Color::Gray,
    }
}

pub fn sentiment_color(sentiment: &str) -> Color {
    match sentiment.to_ascii_lowercase().as_str() {
        "positive" => Color::Green,
        "negative" => Color::Red,
        _ => Color::Reset,
    }
}

pub fn priority_color(priority: &str) -> Color {
    match priority.to_ascii_lowercase().as_str() {
        "high" => Color::Red,
        "medium" => Color::Yellow,
        _ => Color::Green,
    }
}

fn field(label: &str, value: &str, color: Color) -> Line<'static> {
    let value = if value.is_empty() {
        "-".to_string()
    } else {
        capitalize(value)
    };
    Line::from(vec![
        Span::styled(format!("{label:<15}"), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn bullets(title: &str, items: &[String], out: &mut Vec<Line<'static>>) {
    out.push(Line::from(""));
    out.push(Line::styled(
        title.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if items.is_empty() {
        out.push(Line::styled("  (none)", Style::default().fg(Color::DarkGray)));
    }
    for item in items {
        out.push(Line::from(format!("  • {item}")));
    }
}

/// The analysis panel shared by the inbox preview and the detail screen.
pub fn analysis_lines(a: &EmailAnalysis) -> Vec<Line<'static>> {
    let mut out = vec![
        Line::from(vec![
            Span::styled("Email Analysis  ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" {} ", capitalize(if a.category.is_empty() { "other" } else { a.category.as_str() })),
                Style::default()
                    .fg(Color::Black)
                    .bg(category_color(&a.category)),
            ),
        ]),
        Line::from(""),
        field("Topic", &a.topic, Color::Reset),
        field("Sentiment", &a.sentiment, sentiment_color(&a.sentiment)),
        field("Priority", &a.priority, priority_color(&a.priority)),
    ];

    let (rec, color) = if a.should_trash {
        ("Move to Trash", Color::Red)
    } else {
        ("Keep in Inbox", Color::Green)
    };
    out.push(Line::from(vec![
        Span::styled(format!("{:<15}", "Recommendation"), Style::default().fg(Color::DarkGray)),
        Span::styled(rec, Style::default().fg(color)),
    ]));

    bullets("Key Points", &a.key_points, &mut out);
    bullets("Action Items", &a.action_items, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_every_field_capitalised() {
        let a = EmailAnalysis {
            category: "promotional".into(),
            topic: "sale".into(),
            sentiment: "positive".into(),
            priority: "low".into(),
            should_trash: true,
            key_points: vec!["50% off".into()],
            action_items: vec![],
        };
        let t = text(&analysis_lines(&a));
        assert!(t.contains("Promotional"));
        assert!(t.contains("Positive"));
        assert!(t.contains("Move to Trash"));
        assert!(t.contains("• 50% off"));
        assert!(t.contains("(none)"));
    }

    #[test]
    fn colour_rules() {
        assert_eq!(priority_color("High"), Color::Red);
        assert_eq!(priority_color("medium"), Color::Yellow);
        assert_eq!(priority_color("low"), Color::Green);
        assert_eq!(sentiment_color("negative"), Color::Red);
        assert_eq!(category_color("important"), Color::Green);
        assert_eq!(category_color("whatever"), Color::Gray);
    }
}
