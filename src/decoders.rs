use chrono::{DateTime, Local};

/// Decodes RFC 2047 encoded-words some senders leave in subjects and
/// display names.
pub fn decode_mime_words(raw: &str) -> String {
    if !raw.contains("=?") {
        return raw.to_string();
    }
    let mut line = b"X: ".to_vec();
    line.extend_from_slice(raw.as_bytes());
    line.extend_from_slice(b"\r\n");

    match mailparse::parse_header(&line) {
        Ok((h, _idx)) => h.get_value(),
        Err(_) => raw.to_string(),
    }
}

pub fn normalize_snippet(s: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
        if out.chars().count() >= max_chars {
            break;
        }
    }
    out.chars().take(max_chars).collect()
}

/// Local-time rendering of the backend's date header; unparseable dates are
/// shown as received.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        // Gmail sometimes appends a zone comment: "... +0000 (UTC)"
        .or_else(|_| {
            let cut = raw.rfind(" (").map(|i| &raw[..i]).unwrap_or(raw);
            DateTime::parse_from_rfc2822(cut)
        });
    match parsed {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%b %e, %Y %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// "high" -> "High"
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn looks_like_html(s: &str) -> bool {
    let head: String = s.chars().take(512).collect::<String>().to_ascii_lowercase();
    ["<html", "<body", "<div", "<p>", "<br", "<table", "<!doctype"]
        .iter()
        .any(|tag| head.contains(tag))
}

/// Message content ready for a text pane of `width` columns.
pub fn body_text(content: &str, width: usize) -> String {
    if !looks_like_html(content) {
        return content.to_string();
    }
    match html2text::from_read(content.as_bytes(), width.max(20)) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("html2text failed: {e}");
            content.to_string()
        }
    }
}
