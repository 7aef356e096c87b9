use std::time::Instant;

use super::buffer::Buffer;
use super::motion::View;
use super::theme::Theme;
use super::vars::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
}

pub struct App {
    pub(crate) buffer: Buffer,
    pub(crate) view: View,
    pub(crate) settings: Settings,
    pub(crate) mode: Mode,
    pub(crate) command_buffer: String,
    pub(crate) status_message: String,
    pub(crate) status_error: bool,
    pub(crate) status_time: Option<Instant>,
    /// Output of a command that printed more than fits on the status line.
    pub(crate) message_lines: Vec<String>,
    pub(crate) pending_g: bool,
    pub(crate) pending_z: bool,
    pub(crate) theme: Theme,
}

impl App {
    pub fn new(buffer: Buffer, settings: Settings) -> Self {
        Self {
            buffer,
            view: View::new(80, 23),
            settings,
            mode: Mode::Normal,
            command_buffer: String::new(),
            status_message: String::new(),
            status_error: false,
            status_time: None,
            message_lines: Vec::new(),
            pending_g: false,
            pending_z: false,
            theme: Theme::default_theme(),
        }
    }

    pub fn clear_status_if_stale(&mut self) {
        if let Some(t) = self.status_time {
            if t.elapsed() > std::time::Duration::from_secs(5) {
                self.status_message.clear();
                self.status_error = false;
                self.status_time = None;
            }
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_error = false;
        self.status_time = Some(Instant::now());
    }

    pub(crate) fn set_error(&mut self, msg: impl Into<String>) {
        self.set_status(msg);
        self.status_error = true;
    }

    /// Routes the reports of one command: a single line goes to the status
    /// line, several open the message panel.
    pub(crate) fn show_reports(&mut self, mut reports: Vec<String>) {
        match reports.len() {
            0 => {}
            1 => self.set_status(reports.remove(0)),
            _ => self.message_lines = reports,
        }
    }

    pub(crate) fn tab_style(&self) -> TabStyle {
        TabStyle {
            stop: self.settings.tabstop,
            visible: self.settings.showtabs,
        }
    }

    /// Re-derives the cursor and viewport from the current buffer state.
    pub(crate) fn sync_view(&mut self) {
        let tabs = self.tab_style();
        let (y, x) = (self.view.y, self.view.x);
        self.view.move_to(&self.buffer, tabs, y, x);
    }
}

/// How tabs occupy the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStyle {
    pub stop: usize,
    /// Draw tabs as the two-column `^I` escape instead of expanding them.
    pub visible: bool,
}

impl Default for TabStyle {
    fn default() -> Self {
        Self { stop: 8, visible: false }
    }
}

/// Caret escape used to draw a control character, e.g. `^A` or `^?`.
pub fn caret_escape(ch: char) -> String {
    let code = ch as u32;
    let shown = if code == 0x7f { '?' } else { char::from_u32(code ^ 0x40).unwrap_or('?') };
    format!("^{}", shown)
}

pub fn line_screen_width(s: &str, tabs: TabStyle) -> usize {
    let mut col = 0usize;
    for ch in s.chars() {
        col += char_display_width(ch, col, tabs);
    }
    col
}

pub fn char_to_screen_col(s: &str, char_idx: usize, tabs: TabStyle) -> usize {
    let mut col = 0usize;
    for (i, ch) in s.chars().enumerate() {
        if i >= char_idx {
            break;
        }
        col += char_display_width(ch, col, tabs);
    }
    col
}

pub fn char_display_width(ch: char, col: usize, tabs: TabStyle) -> usize {
    if ch == '\t' {
        if tabs.visible {
            return 2;
        }
        let width = tabs.stop.max(1);
        return width - (col % width);
    }
    if ch.is_control() {
        return 2;
    }
    unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABS: TabStyle = TabStyle { stop: 4, visible: false };

    #[test]
    fn tabs_advance_to_next_stop() {
        assert_eq!(char_to_screen_col("\tx", 1, TABS), 4);
        assert_eq!(char_to_screen_col("ab\tx", 3, TABS), 4);
        assert_eq!(char_to_screen_col("abcd\tx", 5, TABS), 8);
        assert_eq!(line_screen_width("a\tb", TABS), 5);
    }

    #[test]
    fn visible_tabs_and_control_chars_take_two_columns() {
        let shown = TabStyle { stop: 4, visible: true };
        assert_eq!(char_to_screen_col("\t\tx", 2, shown), 4);
        assert_eq!(char_to_screen_col("\u{1}x", 1, TABS), 2);
        assert_eq!(caret_escape('\u{1}'), "^A");
        assert_eq!(caret_escape('\u{7f}'), "^?");
    }

    #[test]
    fn screen_column_never_decreases() {
        let line = "a\tb\u{2}c\t\tdé漢x";
        let mut prev = 0;
        for idx in 0..=line.chars().count() + 2 {
            let col = char_to_screen_col(line, idx, TABS);
            assert!(col >= prev);
            prev = col;
        }
    }
}
