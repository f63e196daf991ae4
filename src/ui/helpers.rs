use anyhow::Error;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::app::Entry;

/// Break `text` into rows of at most `width` characters, honouring existing
/// newlines. Words are not kept together; hymn titles are short enough.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            rows.push(chunk.iter().collect());
        }
    }
    rows
}

/// Render the transcript as styled rows fitting `width` columns.
pub(crate) fn transcript_lines(entries: &[Entry], width: usize) -> Vec<Line<'static>> {
    let user_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let image_style = Style::default().fg(Color::Magenta);

    let mut lines = Vec::new();
    for entry in entries {
        let (prefix, body, style) = match entry {
            Entry::User(text) => ("you> ", text.clone(), user_style),
            Entry::Bot(text) => ("bot> ", text.clone(), Style::default()),
            Entry::Image(path) => ("bot> ", format!("[page] {}", path.display()), image_style),
        };
        let body_width = width.saturating_sub(prefix.len());
        for (index, row) in wrap_text(&body, body_width).into_iter().enumerate() {
            let lead = if index == 0 {
                prefix.to_string()
            } else {
                " ".repeat(prefix.len())
            };
            lines.push(Line::from(vec![Span::styled(lead, style), Span::styled(row, style)]));
        }
    }
    lines
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
