//! Rendering of the session output and input line.
//!
//! The output pane shows the session snapshot as plain text (no escape
//! sequence interpretation), wrapped to the pane width and pinned to the
//! newest line unless the user scrolled back.

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::prelude::Buffer;
use ratatui::style::{Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

/// Drawn in front of the input line.
pub const INPUT_PROMPT: &str = "› ";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.session();
        let status = if session.is_running() { "running" } else { "stopped" };
        let title = Line::from(format!(" TerminalAI [{status}] ").bold());
        let hint = Line::from(format!(
            " Enter: run | {} <question>: ask AI | PgUp/PgDn: scroll | Ctrl+L: clear | Esc: quit ",
            session.config().router.marker
        ))
        .dim();

        let block = Block::new().borders(Borders::ALL).title(title).title_bottom(hint);
        let (output_area, input_area) = split(block.inner(area));
        block.render(area, buf);

        let lines = wrap_output(&session.snapshot(), output_area.width as usize);
        let height = output_area.height as usize;
        let max_scroll = lines.len().saturating_sub(height);
        self.max_scroll.set(max_scroll);

        let end = lines.len() - self.scroll_back.min(max_scroll);
        let start = end.saturating_sub(height);
        let visible: Vec<Line> = lines[start..end]
            .iter()
            .map(|l| Line::from(l.as_str()))
            .collect();
        Paragraph::new(visible).render(output_area, buf);

        Paragraph::new(Line::from(vec![
            INPUT_PROMPT.bold(),
            self.input.as_str().into(),
        ]))
        .style(Style::new().reversed())
        .render(input_area, buf);
    }
}

/// Where the terminal cursor belongs: the end of the input line.
pub fn cursor_position(app: &App, area: Rect) -> Position {
    let (_, input_area) = split(Block::new().borders(Borders::ALL).inner(area));
    let offset = u16::try_from(INPUT_PROMPT.width() + app.input.width()).unwrap_or(u16::MAX);
    let max_x = input_area.right().saturating_sub(1);
    Position::new(input_area.x.saturating_add(offset).min(max_x), input_area.y)
}

fn split(inner: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    (chunks[0], chunks[1])
}

/// Break output entries into display lines no wider than `width`.
///
/// Entries are raw chunks: each is split on newlines on its own, carriage
/// returns are dropped, and a trailing newline does not add an empty line.
pub fn wrap_output(entries: &[String], width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for entry in entries {
        for line in entry.lines() {
            let line = line.trim_end_matches('\r');
            for wrapped in textwrap::wrap(line, width) {
                lines.push(wrapped.into_owned());
            }
        }
    }
    lines
}
