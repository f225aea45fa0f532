// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The minimal substitutable editor component: full-text get/set, a cursor
/// position, and a content-change flag the host drains each tick. Anything
/// richer (syntax highlighting, folding, completion) is deliberately out of
/// scope.
#[derive(Debug, Clone)]
pub(crate) struct EditorBuffer {
    lines: Vec<String>,
    cursor_line: usize,
    /// Char (not byte) index within the cursor line.
    cursor_col: usize,
    scroll: usize,
    dirty: bool,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            scroll: 0,
            dirty: false,
        }
    }
}

impl EditorBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_owned).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.scroll = 0;
        self.dirty = false;
    }

    pub(crate) fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    /// (line, column), zero-based, in chars.
    pub(crate) fn cursor(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_col)
    }

    pub(crate) fn scroll(&self) -> usize {
        self.scroll
    }

    /// Content-change notification: true when the buffer changed since the
    /// last call.
    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |text| text.chars().count())
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(index, _)| index)
            .unwrap_or(line.len())
    }

    fn clamp_col(&mut self) {
        let len = self.line_len(self.cursor_line);
        if self.cursor_col > len {
            self.cursor_col = len;
        }
    }

    pub(crate) fn scroll_to_cursor(&mut self, viewport_height: usize) {
        let height = viewport_height.max(1);
        if self.cursor_line < self.scroll {
            self.scroll = self.cursor_line;
        } else if self.cursor_line >= self.scroll + height {
            self.scroll = self.cursor_line + 1 - height;
        }
    }

    fn insert_char(&mut self, ch: char) {
        let line = &mut self.lines[self.cursor_line];
        let at = Self::byte_index(line, self.cursor_col);
        line.insert(at, ch);
        self.cursor_col += 1;
        self.dirty = true;
    }

    fn insert_newline(&mut self) {
        let line = &mut self.lines[self.cursor_line];
        let at = Self::byte_index(line, self.cursor_col);
        let tail = line.split_off(at);
        self.lines.insert(self.cursor_line + 1, tail);
        self.cursor_line += 1;
        self.cursor_col = 0;
        self.dirty = true;
    }

    fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_line];
            let at = Self::byte_index(line, self.cursor_col - 1);
            line.remove(at);
            self.cursor_col -= 1;
            self.dirty = true;
        } else if self.cursor_line > 0 {
            let tail = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
            self.lines[self.cursor_line].push_str(&tail);
            self.dirty = true;
        }
    }

    fn delete_forward(&mut self) {
        let len = self.line_len(self.cursor_line);
        if self.cursor_col < len {
            let line = &mut self.lines[self.cursor_line];
            let at = Self::byte_index(line, self.cursor_col);
            line.remove(at);
            self.dirty = true;
        } else if self.cursor_line + 1 < self.lines.len() {
            let tail = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&tail);
            self.dirty = true;
        }
    }

    /// Handles one key event; returns false for keys this buffer does not
    /// consume (so the host can treat them as app-level bindings).
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Char(ch) => self.insert_char(ch),
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Tab => {
                self.insert_char(' ');
                self.insert_char(' ');
            }
            KeyCode::Left => {
                if self.cursor_col > 0 {
                    self.cursor_col -= 1;
                } else if self.cursor_line > 0 {
                    self.cursor_line -= 1;
                    self.cursor_col = self.line_len(self.cursor_line);
                }
            }
            KeyCode::Right => {
                if self.cursor_col < self.line_len(self.cursor_line) {
                    self.cursor_col += 1;
                } else if self.cursor_line + 1 < self.lines.len() {
                    self.cursor_line += 1;
                    self.cursor_col = 0;
                }
            }
            KeyCode::Up => {
                self.cursor_line = self.cursor_line.saturating_sub(1);
                self.clamp_col();
            }
            KeyCode::Down => {
                if self.cursor_line + 1 < self.lines.len() {
                    self.cursor_line += 1;
                }
                self.clamp_col();
            }
            KeyCode::Home => self.cursor_col = 0,
            KeyCode::End => self.cursor_col = self.line_len(self.cursor_line),
            KeyCode::PageUp => {
                self.cursor_line = self.cursor_line.saturating_sub(20);
                self.clamp_col();
            }
            KeyCode::PageDown => {
                self.cursor_line = (self.cursor_line + 20).min(self.lines.len() - 1);
                self.clamp_col();
            }
            _ => return false,
        }
        true
    }
}
