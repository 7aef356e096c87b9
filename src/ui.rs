use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{caret_escape, char_display_width, line_screen_width, App, Mode, TabStyle, Theme};

/// Lines of the insert panel shown at once, borders excluded.
const INSERT_PANEL_ROWS: usize = 6;

fn split_screen(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    (rows[0], rows[1], rows[2])
}

pub fn ui(f: &mut Frame<'_>, app: &mut App) {
    let (main_area, status_area, message_area) = split_screen(f.area());

    app.view.resize(main_area.width as usize, main_area.height as usize);
    app.sync_view();

    f.render_widget(Paragraph::new(text_rows(app)), main_area);
    f.render_widget(
        Paragraph::new(status_text(app)).style(
            Style::default()
                .fg(app.theme.status_fg)
                .bg(app.theme.status_bg),
        ),
        status_area,
    );

    let message = if app.mode == Mode::Command {
        Paragraph::new(format!(":{}", app.command_buffer))
    } else if app.status_error {
        Paragraph::new(app.status_message.clone()).style(Style::default().fg(app.theme.error_fg))
    } else {
        Paragraph::new(app.status_message.clone())
    };
    f.render_widget(message, message_area);

    if !app.message_lines.is_empty() {
        render_message_panel(f, app, main_area);
        return;
    }

    if app.mode == Mode::Command {
        let typed: usize = app.command_buffer.chars().map(|c| if c.is_control() { 2 } else { 1 }).sum();
        let cursor_x = message_area.x + 1 + typed as u16;
        if cursor_x < message_area.right() {
            f.set_cursor_position(Position::new(cursor_x, message_area.y));
        }
    } else {
        let (row, col) = app.view.screen_cursor(&app.buffer, app.tab_style());
        let cursor_x = main_area.x + col as u16;
        let cursor_y = main_area.y + row as u16;
        if cursor_x < main_area.right() && cursor_y < main_area.bottom() {
            f.set_cursor_position(Position::new(cursor_x, cursor_y));
        }
    }
}

/// Visible buffer rows, with `~` filling the space past the last line.
pub fn text_rows(app: &App) -> Vec<Line<'static>> {
    let view = &app.view;
    let tabs = app.tab_style();
    let mut rows: Vec<Line<'static>> = app
        .buffer
        .lines()
        .iter()
        .skip(view.top)
        .take(view.height)
        .map(|line| {
            let text = String::from_utf8_lossy(line);
            render_line(&text, view.left, view.width, tabs, app.settings.list, &app.theme)
        })
        .collect();
    while rows.len() < view.height {
        rows.push(Line::from(Span::styled("~", Style::default().fg(app.theme.tilde_fg))));
    }
    rows
}

fn status_text(app: &App) -> String {
    let name = app
        .buffer
        .filename()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "[No Name]".to_string());
    let modified = if app.buffer.is_modified() { " [+]" } else { "" };
    let read_only = if app.buffer.is_read_only() { " [RO]" } else { "" };
    let line_count = if app.buffer.is_blank() { 0 } else { app.buffer.line_count() };
    format!(
        "{}{}{} | {}/{} | col {}",
        name,
        modified,
        read_only,
        app.view.y + 1,
        line_count,
        app.view.visual_col(&app.buffer, app.tab_style()) + 1
    )
}

/// Renders the screen columns `[left, left + width)` of `line`. Tabs expand
/// or show as `^I`, control characters as caret escapes and, in list mode,
/// spaces as `.`. A glyph cut by the left or right edge is padded with
/// blanks.
pub fn render_line(
    line: &str,
    left: usize,
    width: usize,
    tabs: TabStyle,
    list: bool,
    theme: &Theme,
) -> Line<'static> {
    let plain = Style::default().fg(theme.text_fg);
    let special = Style::default().fg(theme.nonprint_fg);
    let right = left + width;
    let mut runs = Runs::default();
    let mut col = 0usize;

    for ch in line.chars() {
        if col >= right {
            break;
        }
        let w = char_display_width(ch, col, tabs);
        let (glyph, style) = match ch {
            '\t' if tabs.visible => ("^I".to_string(), special),
            '\t' => (" ".repeat(w), plain),
            ' ' if list => (".".to_string(), special),
            c if c.is_control() => (caret_escape(c), special),
            c => (c.to_string(), plain),
        };
        if col >= left && col + w <= right {
            runs.push(&glyph, style);
        } else if col + w > left {
            let visible = (col + w).min(right) - col.max(left);
            runs.push(&" ".repeat(visible), style);
        }
        col += w;
    }
    Line::from(runs.finish())
}

/// Accumulates text into spans, starting a new span only when the style
/// changes.
#[derive(Default)]
struct Runs {
    spans: Vec<Span<'static>>,
    text: String,
    style: Style,
}

impl Runs {
    fn push(&mut self, text: &str, style: Style) {
        if style != self.style && !self.text.is_empty() {
            self.flush();
        }
        self.style = style;
        self.text.push_str(text);
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.text);
        self.spans.push(Span::styled(text, self.style));
    }

    fn finish(mut self) -> Vec<Span<'static>> {
        if !self.text.is_empty() {
            self.flush();
        }
        self.spans
    }
}

fn render_message_panel(f: &mut Frame<'_>, app: &App, main_area: Rect) {
    let rows = app.message_lines.len().min(main_area.height.saturating_sub(3) as usize);
    let height = (rows + 3) as u16;
    let area = Rect::new(
        main_area.x,
        main_area.bottom().saturating_sub(height),
        main_area.width,
        height.min(main_area.height),
    );
    let skip = app.message_lines.len() - rows;
    let mut lines: Vec<Line> = app.message_lines[skip..]
        .iter()
        .map(|l| render_line(l, 0, main_area.width as usize, app.tab_style(), false, &app.theme))
        .collect();
    lines.push(Line::from(Span::styled(
        "-- press any key --",
        Style::default().fg(app.theme.tilde_fg),
    )));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(app.theme.panel_border)),
        ),
        area,
    );
}

/// Frame shown while lines are being collected for `a`, `i` or `c`.
pub struct InsertPanel<'a> {
    pub backdrop: &'a [Line<'static>],
    pub theme: &'a Theme,
    pub tabs: TabStyle,
    pub typed: &'a [String],
    pub current: &'a str,
}

pub fn draw_insert_panel(f: &mut Frame<'_>, panel: &InsertPanel<'_>) {
    let (main_area, status_area, message_area) = split_screen(f.area());
    f.render_widget(Paragraph::new(panel.backdrop.to_vec()), main_area);

    let shown = panel.typed.len().min(INSERT_PANEL_ROWS - 1);
    let height = ((shown + 1 + 2) as u16).min(main_area.height);
    let area = Rect::new(
        main_area.x,
        main_area.bottom().saturating_sub(height),
        main_area.width,
        height,
    );
    let inner_width = area.width.saturating_sub(2) as usize;
    let tabs = panel.tabs;
    let mut lines: Vec<Line> = panel.typed[panel.typed.len() - shown..]
        .iter()
        .map(|l| render_line(l, 0, inner_width, tabs, false, panel.theme))
        .collect();

    // Keep the tail of a long input line in view.
    let current_width: usize = line_screen_width(panel.current, tabs);
    let left = current_width.saturating_sub(inner_width.saturating_sub(1));
    lines.push(render_line(panel.current, left, inner_width, tabs, false, panel.theme));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(panel.theme.panel_border))
                .title(" insert: Esc or . to finish "),
        ),
        area,
    );
    f.render_widget(
        Paragraph::new("-- INSERT --").style(
            Style::default()
                .fg(panel.theme.status_fg)
                .bg(panel.theme.status_bg),
        ),
        status_area,
    );
    f.render_widget(Paragraph::new(""), message_area);

    let cursor_x = area.x + 1 + (current_width - left) as u16;
    let cursor_y = area.y + 1 + shown as u16;
    if cursor_x < area.right().saturating_sub(1) && cursor_y < area.bottom() {
        f.set_cursor_position(Position::new(cursor_x, cursor_y));
    }
}
