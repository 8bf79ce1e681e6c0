use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::TestBackend,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame, Terminal,
};

use super::theme::Theme;

/// Glyph drawn in front of the selected row
pub const INDICATOR: &str = "> ";
/// Prompt drawn in front of the filter input
pub const PROMPT: &str = "> ";

const DEFAULT_PLACEHOLDER: &str = "Type to filter...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Pending,
    Accepted(String),
    Cancelled,
}

pub struct PickerState {
    items: Vec<String>,
    pub filter: String,
    pub placeholder: String,
    /// Index into the filtered list
    pub cursor: usize,
    /// First filtered row shown
    pub scroll: usize,
}

impl PickerState {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            filter: String::new(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            cursor: 0,
            scroll: 0,
        }
    }

    /// Items containing the filter text (case-insensitive), in original order
    pub fn filtered(&self) -> Vec<&str> {
        let needle = self.filter.to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.to_lowercase().contains(&needle))
            .map(|s| s.as_str())
            .collect()
    }

    pub fn selected(&self) -> Option<&str> {
        self.filtered().get(self.cursor).copied()
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let len = self.filtered().len();
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.filter.push(c);
        self.reset_cursor();
    }

    pub fn backspace(&mut self) {
        if self.filter.pop().is_some() {
            self.reset_cursor();
        }
    }

    fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.scroll = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => PickerOutcome::Cancelled,
                KeyCode::Char('p') => {
                    self.move_up();
                    PickerOutcome::Pending
                }
                KeyCode::Char('n') => {
                    self.move_down();
                    PickerOutcome::Pending
                }
                _ => PickerOutcome::Pending,
            };
        }

        match key.code {
            KeyCode::Esc => PickerOutcome::Cancelled,
            KeyCode::Enter => match self.selected() {
                Some(item) => PickerOutcome::Accepted(item.to_string()),
                None => PickerOutcome::Pending,
            },
            KeyCode::Up => {
                self.move_up();
                PickerOutcome::Pending
            }
            KeyCode::Down => {
                self.move_down();
                PickerOutcome::Pending
            }
            KeyCode::Backspace => {
                self.backspace();
                PickerOutcome::Pending
            }
            KeyCode::Char(c) => {
                self.push_char(c);
                PickerOutcome::Pending
            }
            _ => PickerOutcome::Pending,
        }
    }

    /// Keeps the cursor row inside a window of `rows` lines
    fn ensure_visible(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + rows {
            self.scroll = self.cursor + 1 - rows;
        }
    }
}

/// Content area after the theme's margin and padding
pub fn content_area(area: Rect, theme: &Theme) -> Rect {
    let outer = area.inner(theme.box_style.margin);
    Block::default().padding(theme.box_style.padding).inner(outer)
}

pub fn draw(frame: &mut Frame, state: &mut PickerState, area: Rect, theme: &Theme) {
    let inner = content_area(area, theme);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    // Input line
    let mut input = vec![Span::styled(PROMPT, theme.prompt_style())];
    if state.filter.is_empty() {
        input.push(Span::styled(state.placeholder.clone(), theme.placeholder_style()));
    } else {
        input.push(Span::styled(state.filter.clone(), theme.input_text_style()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(input)),
        Rect::new(inner.x, inner.y, inner.width, 1),
    );

    // List below a blank separator row
    if inner.height <= 2 {
        return;
    }
    let list_area = Rect::new(inner.x, inner.y + 2, inner.width, inner.height - 2);
    state.ensure_visible(list_area.height as usize);

    let blank = " ".repeat(INDICATOR.len());
    let lines: Vec<Line> = state
        .filtered()
        .into_iter()
        .enumerate()
        .skip(state.scroll)
        .take(list_area.height as usize)
        .map(|(i, item)| {
            if i == state.cursor {
                Line::from(vec![
                    Span::styled(INDICATOR, theme.indicator_style()),
                    Span::styled(item.to_string(), theme.selected_style()),
                ])
            } else {
                Line::from(vec![
                    Span::raw(blank.clone()),
                    Span::styled(item.to_string(), theme.text_style()),
                ])
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), list_area);
}

/// Draws the picker off-screen and returns the trimmed text rows
pub fn render_to_lines(
    state: &mut PickerState,
    theme: &Theme,
    width: u16,
    height: u16,
) -> std::io::Result<Vec<String>> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|frame| {
        let area = frame.area();
        draw(frame, state, area, theme);
    })?;

    let buffer = terminal.backend().buffer();
    let mut rows = Vec::with_capacity(height as usize);
    for y in 0..buffer.area.height {
        let mut line = String::new();
        for x in 0..buffer.area.width {
            line.push_str(buffer[(x, y)].symbol());
        }
        rows.push(line.trim_end().to_string());
    }
    Ok(rows)
}
