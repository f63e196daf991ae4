use std::fs::File;
use std::mem;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use log::warn;
use open::that as open_path;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::bot::{Bot, Inbound, Keyboard, Transport, START_COMMAND};
use crate::models::UserId;

use super::helpers::{surface_error, transcript_lines};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the reply keyboard and of the input box, borders included.
const BAR_HEIGHT: u16 = 3;

/// One row of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    User(String),
    Bot(String),
    Image(PathBuf),
}

/// Which widget receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Keyboard,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// The console's side of the chat: collects what the bot sends.
#[derive(Debug, Default)]
pub struct ConsoleTransport {
    transcript: Vec<Entry>,
    keyboard: Vec<String>,
    reply_pages: Vec<PathBuf>,
    last_pages: Vec<PathBuf>,
}

impl ConsoleTransport {
    pub fn transcript(&self) -> &[Entry] {
        &self.transcript
    }

    /// Pages of the most recent hymn delivered.
    pub fn last_pages(&self) -> &[PathBuf] {
        &self.last_pages
    }

    fn begin_reply(&mut self) {
        self.reply_pages.clear();
    }

    fn finish_reply(&mut self) {
        if !self.reply_pages.is_empty() {
            self.last_pages = mem::take(&mut self.reply_pages);
        }
    }
}

impl Transport for ConsoleTransport {
    fn send_text(&mut self, _user_id: UserId, text: &str, keyboard: &Keyboard) -> Result<()> {
        self.transcript.push(Entry::Bot(text.to_string()));
        self.keyboard = keyboard.buttons.clone();
        Ok(())
    }

    /// The console cannot draw images, so it checks the page is readable and
    /// lists it; Ctrl+O hands the pages to the system viewer.
    fn send_image(&mut self, _user_id: UserId, path: &Path, keyboard: &Keyboard) -> Result<()> {
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        self.transcript.push(Entry::Image(path.to_path_buf()));
        self.reply_pages.push(path.to_path_buf());
        self.keyboard = keyboard.buttons.clone();
        Ok(())
    }
}

/// Console state: the bot, the conversation so far and the input line.
pub struct ConsoleApp {
    bot: Bot,
    user_id: UserId,
    outbox: ConsoleTransport,
    input: String,
    focus: Focus,
    keyboard_selected: usize,
    scroll_back: usize,
    status: Option<StatusMessage>,
}

impl ConsoleApp {
    /// Opens the conversation the way a chat client does, with `/start`.
    pub fn new(bot: Bot, user_id: UserId) -> Self {
        let mut app = Self {
            bot,
            user_id,
            outbox: ConsoleTransport::default(),
            input: String::new(),
            focus: Focus::Input,
            keyboard_selected: 0,
            scroll_back: 0,
            status: None,
        };
        app.submit(START_COMMAND.to_string());
        app
    }

    pub fn transport(&self) -> &ConsoleTransport {
        &self.outbox
    }

    /// Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        match (self.focus, code) {
            (Focus::Input, KeyCode::Esc) => return Ok(true),
            (Focus::Keyboard, KeyCode::Esc) | (_, KeyCode::Tab) => self.toggle_focus(),
            (_, KeyCode::Up) => self.scroll_back = self.scroll_back.saturating_add(1),
            (_, KeyCode::Down) => self.scroll_back = self.scroll_back.saturating_sub(1),
            (_, KeyCode::PageUp) => self.scroll_back = self.scroll_back.saturating_add(10),
            (_, KeyCode::PageDown) => self.scroll_back = self.scroll_back.saturating_sub(10),
            (Focus::Input, KeyCode::Char(c)) => self.input.push(c),
            (Focus::Input, KeyCode::Backspace) => {
                self.input.pop();
            }
            (Focus::Input, KeyCode::Enter) => {
                let text = mem::take(&mut self.input);
                if text.trim().is_empty() {
                    self.set_status("Type a hymn number or title first.", StatusKind::Error);
                } else {
                    self.submit(text);
                }
            }
            (Focus::Keyboard, KeyCode::Left) => self.move_keyboard(-1),
            (Focus::Keyboard, KeyCode::Right) => self.move_keyboard(1),
            (Focus::Keyboard, KeyCode::Enter) => self.press_keyboard(),
            _ => {}
        }
        Ok(false)
    }

    /// Open the pages of the last delivered hymn with the system viewer.
    pub(crate) fn handle_ctrl_o(&mut self) -> Result<()> {
        let pages = self.outbox.last_pages.clone();
        if pages.is_empty() {
            self.set_status("No hymn pages received yet.", StatusKind::Error);
            return Ok(());
        }

        for page in &pages {
            if let Err(err) = open_path(page)
                .with_context(|| format!("failed to open {}", page.display()))
            {
                warn!("{err:#}");
                self.set_status(
                    format!("Could not open page: {}", surface_error(&err)),
                    StatusKind::Error,
                );
                return Ok(());
            }
        }
        self.set_status(format!("Opened {} page(s).", pages.len()), StatusKind::Info);
        Ok(())
    }

    fn submit(&mut self, text: String) {
        self.clear_status();
        self.scroll_back = 0;
        self.outbox.transcript.push(Entry::User(text.clone()));
        self.outbox.begin_reply();
        self.bot
            .handle(&Inbound::new(self.user_id, text), &mut self.outbox);
        self.outbox.finish_reply();
        if self.keyboard_selected >= self.outbox.keyboard.len() {
            self.keyboard_selected = 0;
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if !self.outbox.keyboard.is_empty() => Focus::Keyboard,
            _ => Focus::Input,
        };
    }

    fn move_keyboard(&mut self, offset: isize) {
        let count = self.outbox.keyboard.len();
        if count == 0 {
            return;
        }
        let next = (self.keyboard_selected as isize + offset).rem_euclid(count as isize);
        self.keyboard_selected = next as usize;
    }

    fn press_keyboard(&mut self) {
        if let Some(label) = self.outbox.keyboard.get(self.keyboard_selected).cloned() {
            self.focus = Focus::Input;
            self.submit(label);
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(BAR_HEIGHT),
                Constraint::Length(BAR_HEIGHT),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_transcript(frame, chunks[0]);
        self.draw_keyboard(frame, chunks[1]);
        self.draw_input(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_transcript(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Hymnal");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = transcript_lines(&self.outbox.transcript, inner.width as usize);
        let visible = inner.height as usize;
        let bottom = lines.len().saturating_sub(self.scroll_back.min(lines.len()));
        let top = bottom.saturating_sub(visible);
        let shown: Vec<Line> = lines[top..bottom].to_vec();
        frame.render_widget(Paragraph::new(shown), inner);
    }

    fn draw_keyboard(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Keyboard;
        let mut spans = Vec::new();
        for (index, label) in self.outbox.keyboard.iter().enumerate() {
            let style = if focused && index == self.keyboard_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            spans.push(Span::styled(format!("[ {label} ]"), style));
            spans.push(Span::raw("  "));
        }

        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Keyboard");
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Message");
        let inner = block.inner(area);
        let paragraph = Paragraph::new(Span::raw(self.input.clone())).block(block);
        frame.render_widget(paragraph, area);

        if self.focus == Focus::Input {
            let cursor_x = inner.x + (self.input.chars().count() as u16).min(inner.width);
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match self.focus {
            Focus::Input => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Send   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Keyboard   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Scroll   "),
                Span::styled("[Ctrl+O]", key_style),
                Span::raw(" Open Pages   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Quit"),
            ]),
            Focus::Keyboard => Line::from(vec![
                Span::styled("[←→]", key_style),
                Span::raw(" Choose   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Press   "),
                Span::styled("[Tab/Esc]", key_style),
                Span::raw(" Back to Message"),
            ]),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::sync::Arc;

    use rusqlite::Connection;
    use tempfile::TempDir;

    use super::*;
    use crate::assets::AssetStore;
    use crate::audit::{ensure_schema, AuditLog};
    use crate::bot::messages;
    use crate::catalog::Catalog;

    fn console() -> (TempDir, ConsoleApp) {
        let dir = tempfile::tempdir().unwrap();
        let youth = dir.path().join("youth");
        fs::create_dir(&youth).unwrap();
        File::create(youth.join("3_1.png")).unwrap();
        File::create(youth.join("3_2.png")).unwrap();

        let catalog =
            Catalog::parse("collection;number;title\nyouth;3;Morning Light\n").unwrap();
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let bot = Bot::new(
            Arc::new(catalog),
            AssetStore::new(dir.path()),
            AuditLog::new(conn),
        );
        (dir, ConsoleApp::new(bot, 42))
    }

    fn type_text(app: &mut ConsoleApp, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c)).unwrap();
        }
        app.handle_key(KeyCode::Enter).unwrap();
    }

    #[test]
    fn opens_with_the_chooser() {
        let (_dir, app) = console();
        assert_eq!(
            app.transport().transcript(),
            [
                Entry::User("/start".into()),
                Entry::Bot(messages::CHOOSE_COLLECTION.into())
            ]
        );
    }

    #[test]
    fn keyboard_selects_collection_and_pages_arrive() {
        let (dir, mut app) = console();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Right).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        type_text(&mut app, "morning");

        let youth = dir.path().join("youth");
        assert_eq!(
            app.transport().last_pages(),
            [youth.join("3_1.png"), youth.join("3_2.png")]
        );
        assert!(app
            .transport()
            .transcript()
            .contains(&Entry::User("Youth hymnal".into())));
    }

    #[test]
    fn escape_quits_only_from_the_input() {
        let (_dir, mut app) = console();
        app.handle_key(KeyCode::Tab).unwrap();
        assert!(!app.handle_key(KeyCode::Esc).unwrap());
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }

    #[test]
    fn empty_message_is_not_sent() {
        let (_dir, mut app) = console();
        let before = app.transport().transcript().len();
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.transport().transcript().len(), before);
    }
}
