use super::buffer::Buffer;
use super::types::{char_to_screen_col, TabStyle};

/// Lines kept between the cursor and the top or bottom edge of the view.
pub const SCROLL_OFF: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    SingleUp,
    SingleDown,
    PageUp,
    PageDown,
    HalfUp,
    HalfDown,
    /// Put the cursor line at the top of the view.
    CursorTop,
    CursorBottom,
    CursorMiddle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    FirstNonBlank,
    BufferTop,
    BufferBottom,
    ScreenTop,
    ScreenMiddle,
    ScreenBottom,
}

/// Cursor position in buffer coordinates plus the window over the buffer.
///
/// `y`/`x` are a line index and a character index; `top` is a line index and
/// `left` a screen column. `width`/`height` describe the text area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub y: usize,
    pub x: usize,
    pub top: usize,
    pub left: usize,
    pub width: usize,
    pub height: usize,
}

impl View {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            y: 0,
            x: 0,
            top: 0,
            left: 0,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    fn margin(&self) -> usize {
        SCROLL_OFF.min(self.height.saturating_sub(1) / 2)
    }

    /// Places the cursor at (`y`, `x`), clamped into the buffer, and scrolls
    /// so it stays visible.
    pub fn move_to(&mut self, buffer: &Buffer, tabs: TabStyle, y: usize, x: usize) {
        self.y = y.min(buffer.last_index());
        self.x = x;
        self.clip_x(buffer);
        self.keep_y_visible();
        let line = buffer.text(self.y);
        self.keep_x_visible(&line, tabs);
    }

    /// Re-clamps the column to the current line, which may be shorter than
    /// the one the cursor came from.
    pub fn clip_x(&mut self, buffer: &Buffer) {
        let len = buffer.text(self.y).chars().count();
        self.x = self.x.min(len.saturating_sub(1));
    }

    fn keep_y_visible(&mut self) {
        let margin = self.margin();
        if self.y < self.top + margin {
            self.top = self.y.saturating_sub(margin);
        } else if self.y + margin >= self.top + self.height {
            self.top = self.y + margin + 1 - self.height;
        }
    }

    fn keep_x_visible(&mut self, line: &str, tabs: TabStyle) {
        let col = char_to_screen_col(line, self.x, tabs);
        if col >= self.left + self.width {
            self.left = col + 1 - self.width;
        } else if col < self.left {
            self.left = col;
        }
    }

    /// Screen column of the cursor within its line, before horizontal scroll.
    pub fn visual_col(&self, buffer: &Buffer, tabs: TabStyle) -> usize {
        char_to_screen_col(&buffer.text(self.y), self.x, tabs)
    }

    /// Cursor position relative to the top-left corner of the view.
    pub fn screen_cursor(&self, buffer: &Buffer, tabs: TabStyle) -> (usize, usize) {
        (
            self.y.saturating_sub(self.top),
            self.visual_col(buffer, tabs).saturating_sub(self.left),
        )
    }

    /// Last buffer line inside the view.
    fn bottom(&self, buffer: &Buffer) -> usize {
        (self.top + self.height - 1).min(buffer.last_index())
    }

    pub fn apply(&mut self, motion: Motion, buffer: &Buffer, tabs: TabStyle) -> bool {
        let before = self.clone();
        let line = buffer.text(self.y);
        let len = line.chars().count();
        let (y, x) = match motion {
            Motion::Left => (self.y, self.x.saturating_sub(1)),
            Motion::Right => (self.y, (self.x + 1).min(len.saturating_sub(1))),
            Motion::Up => (self.y.saturating_sub(1), self.x),
            Motion::Down => (self.y + 1, self.x),
            Motion::LineStart => (self.y, 0),
            Motion::LineEnd => (self.y, len.saturating_sub(1)),
            Motion::FirstNonBlank => {
                let blank = line.chars().take_while(|c| c.is_whitespace()).count();
                (self.y, blank)
            }
            Motion::BufferTop => (0, self.x),
            Motion::BufferBottom => (buffer.last_index(), self.x),
            Motion::ScreenTop => {
                let skip = if self.top > 0 { self.margin() } else { 0 };
                ((self.top + skip).min(self.bottom(buffer)), self.x)
            }
            Motion::ScreenMiddle => {
                let bottom = self.bottom(buffer);
                (self.top + (bottom - self.top) / 2, self.x)
            }
            Motion::ScreenBottom => {
                let bottom = self.bottom(buffer);
                let skip = if bottom < buffer.last_index() { self.margin() } else { 0 };
                (bottom.saturating_sub(skip).max(self.top), self.x)
            }
        };
        self.move_to(buffer, tabs, y, x);
        *self != before
    }

    /// Scrolls the view, dragging the cursor along when it would fall out of
    /// the window. Returns whether anything on screen changed.
    pub fn scroll(&mut self, kind: Scroll, buffer: &Buffer, tabs: TabStyle) -> bool {
        let before = self.clone();
        let last = buffer.last_index();
        let height = self.height;
        let margin = self.margin();
        let mut drag_cursor = true;

        match kind {
            Scroll::SingleDown => {
                if self.top < last {
                    self.top += 1;
                }
            }
            Scroll::SingleUp => self.top = self.top.saturating_sub(1),
            Scroll::PageDown => self.top += height,
            Scroll::PageUp => self.top = self.top.saturating_sub(height),
            Scroll::HalfDown => self.top += (height / 2).max(1),
            Scroll::HalfUp => self.top = self.top.saturating_sub((height / 2).max(1)),
            Scroll::CursorTop => {
                self.top = self.y.saturating_sub(margin);
                drag_cursor = false;
            }
            Scroll::CursorBottom => {
                self.top = (self.y + margin + 1).saturating_sub(height);
                drag_cursor = false;
            }
            Scroll::CursorMiddle => {
                self.top = self.y.saturating_sub(height / 2);
                drag_cursor = false;
            }
        }
        self.top = self.top.min(last);

        if drag_cursor {
            let low = (self.top + if self.top > 0 { margin } else { 0 }).min(last);
            let high = (self.top + height - 1)
                .saturating_sub(margin)
                .max(low)
                .min(last);
            self.y = self.y.max(low).min(high);
        }

        let (y, x) = (self.y, self.x);
        self.move_to(buffer, tabs, y, x);
        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABS: TabStyle = TabStyle { stop: 8, visible: false };

    fn numbered(count: usize) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.insert_before(0, (0..count).map(|i| format!("line {}", i).into_bytes()).collect());
        buffer
    }

    #[test]
    fn move_to_clamps_into_buffer() {
        let mut buffer = Buffer::new();
        buffer.insert_before(0, vec!["abc".into(), Vec::new()]);
        let mut view = View::new(10, 5);

        view.move_to(&buffer, TABS, 0, 99);
        assert_eq!((view.y, view.x), (0, 2));

        view.move_to(&buffer, TABS, 99, 2);
        assert_eq!((view.y, view.x), (1, 0));
    }

    #[test]
    fn moving_down_keeps_scroll_margin() {
        let buffer = numbered(50);
        let mut view = View::new(20, 10);
        view.move_to(&buffer, TABS, 6, 0);
        assert_eq!(view.top, 0);
        view.move_to(&buffer, TABS, 7, 0);
        assert_eq!(view.top, 1);
        view.move_to(&buffer, TABS, 30, 0);
        assert_eq!(view.top, 24);
        view.move_to(&buffer, TABS, 25, 0);
        assert_eq!(view.top, 22);
    }

    #[test]
    fn horizontal_scroll_follows_screen_column() {
        let mut buffer = Buffer::new();
        buffer.insert_before(0, vec!["\t\tabcdef".into(), "xy".into()]);
        let mut view = View::new(10, 5);

        view.move_to(&buffer, TABS, 0, 2);
        assert_eq!(view.visual_col(&buffer, TABS), 16);
        assert_eq!(view.left, 7);
        assert_eq!(view.screen_cursor(&buffer, TABS), (0, 9));

        view.move_to(&buffer, TABS, 1, 2);
        assert_eq!(view.x, 1);
        assert_eq!(view.left, 1);
    }

    #[test]
    fn vertical_motion_reclips_column() {
        let mut buffer = Buffer::new();
        buffer.insert_before(0, vec!["long line".into(), "ab".into()]);
        let mut view = View::new(20, 5);
        view.move_to(&buffer, TABS, 0, 8);
        assert!(view.apply(Motion::Down, &buffer, TABS));
        assert_eq!((view.y, view.x), (1, 1));
        assert!(!view.apply(Motion::Down, &buffer, TABS));
    }

    #[test]
    fn line_motions() {
        let mut buffer = Buffer::new();
        buffer.insert_before(0, vec!["   word".into()]);
        let mut view = View::new(20, 5);
        view.apply(Motion::FirstNonBlank, &buffer, TABS);
        assert_eq!(view.x, 3);
        view.apply(Motion::LineEnd, &buffer, TABS);
        assert_eq!(view.x, 6);
        view.apply(Motion::LineStart, &buffer, TABS);
        assert_eq!(view.x, 0);
    }

    #[test]
    fn screen_motions_stay_inside_view() {
        let buffer = numbered(100);
        let mut view = View::new(20, 10);
        view.move_to(&buffer, TABS, 40, 0);
        let top = view.top;
        view.apply(Motion::ScreenTop, &buffer, TABS);
        assert_eq!(view.y, top + SCROLL_OFF);
        assert_eq!(view.top, top);
        view.apply(Motion::ScreenBottom, &buffer, TABS);
        assert_eq!(view.y, top + 9 - SCROLL_OFF);
        view.apply(Motion::ScreenMiddle, &buffer, TABS);
        assert_eq!(view.y, top + 4);
        view.apply(Motion::BufferBottom, &buffer, TABS);
        assert_eq!(view.y, 99);
        view.apply(Motion::BufferTop, &buffer, TABS);
        assert_eq!((view.y, view.top), (0, 0));
    }

    #[test]
    fn single_line_scroll_drags_cursor() {
        let buffer = numbered(50);
        let mut view = View::new(20, 10);
        assert!(!view.scroll(Scroll::SingleUp, &buffer, TABS));
        assert!(view.scroll(Scroll::SingleDown, &buffer, TABS));
        assert_eq!(view.top, 1);
        assert_eq!(view.y, 1 + SCROLL_OFF);
    }

    #[test]
    fn page_and_half_page_scrolls() {
        let buffer = numbered(100);
        let mut view = View::new(20, 10);
        assert!(view.scroll(Scroll::PageDown, &buffer, TABS));
        assert_eq!(view.top, 10);
        assert_eq!(view.y, 13);
        assert!(view.scroll(Scroll::HalfDown, &buffer, TABS));
        assert_eq!(view.top, 15);
        assert!(view.scroll(Scroll::PageUp, &buffer, TABS));
        assert_eq!(view.top, 5);
        assert_eq!(view.y, 5 + 9 - SCROLL_OFF);
        assert!(view.scroll(Scroll::HalfUp, &buffer, TABS));
        assert_eq!(view.top, 0);
        assert_eq!(view.y, 9 - SCROLL_OFF);
    }

    #[test]
    fn page_down_stops_at_last_line() {
        let buffer = numbered(12);
        let mut view = View::new(20, 10);
        view.scroll(Scroll::PageDown, &buffer, TABS);
        view.scroll(Scroll::PageDown, &buffer, TABS);
        assert_eq!(view.y, 11);
        assert!(view.top <= 11);
        assert!(!view.scroll(Scroll::PageDown, &buffer, TABS));
    }

    #[test]
    fn cursor_relative_scrolls() {
        let buffer = numbered(100);
        let mut view = View::new(20, 10);
        view.move_to(&buffer, TABS, 50, 0);

        view.scroll(Scroll::CursorTop, &buffer, TABS);
        assert_eq!(view.top, 50 - SCROLL_OFF);
        view.scroll(Scroll::CursorBottom, &buffer, TABS);
        assert_eq!(view.top, 50 + SCROLL_OFF + 1 - 10);
        view.scroll(Scroll::CursorMiddle, &buffer, TABS);
        assert_eq!(view.top, 45);
        assert_eq!(view.y, 50);
    }

    #[test]
    fn tiny_window_shrinks_margin() {
        let buffer = numbered(20);
        let mut view = View::new(20, 2);
        view.move_to(&buffer, TABS, 5, 0);
        assert_eq!(view.top, 4);
        view.move_to(&buffer, TABS, 4, 0);
        assert_eq!(view.top, 4);
    }
}
