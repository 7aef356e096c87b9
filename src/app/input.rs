use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::command::Host;
use super::motion::{Motion, Scroll};
use super::types::Mode;
use super::App;

/// Handles one key in visual mode. Returns `Ok(true)` when the session
/// should end.
pub fn handle_key(app: &mut App, key: KeyEvent, host: &mut dyn Host) -> Result<bool> {
    if !app.message_lines.is_empty() {
        app.message_lines.clear();
        return Ok(false);
    }

    match app.mode {
        Mode::Normal => {
            handle_normal(app, key);
            Ok(false)
        }
        Mode::Command => handle_command(app, key, host),
    }
}

fn handle_normal(app: &mut App, key: KeyEvent) {
    if app.pending_g {
        app.pending_g = false;
        if key.code == KeyCode::Char('g') {
            app.apply_motion(Motion::BufferTop);
        }
        return;
    }
    if app.pending_z {
        app.pending_z = false;
        let kind = match key.code {
            KeyCode::Char('t') | KeyCode::Enter => Scroll::CursorTop,
            KeyCode::Char('b') | KeyCode::Char('-') => Scroll::CursorBottom,
            KeyCode::Char('z') | KeyCode::Char('.') => Scroll::CursorMiddle,
            _ => return,
        };
        app.apply_scroll(kind);
        return;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) => {
            app.apply_motion(Motion::Left);
        }
        (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) => {
            app.apply_motion(Motion::Right);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            app.apply_motion(Motion::Up);
        }
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            app.apply_motion(Motion::Down);
        }
        (KeyCode::Char('0'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
            app.apply_motion(Motion::LineStart);
        }
        (KeyCode::Char('$'), _) | (KeyCode::End, _) => app.apply_motion(Motion::LineEnd),
        (KeyCode::Char('^'), _) => app.apply_motion(Motion::FirstNonBlank),
        (KeyCode::Char('G'), _) => app.apply_motion(Motion::BufferBottom),
        (KeyCode::Char('H'), _) => app.apply_motion(Motion::ScreenTop),
        (KeyCode::Char('M'), _) => app.apply_motion(Motion::ScreenMiddle),
        (KeyCode::Char('L'), _) => app.apply_motion(Motion::ScreenBottom),
        (KeyCode::Char('g'), KeyModifiers::NONE) => app.pending_g = true,
        (KeyCode::Char('z'), KeyModifiers::NONE) => app.pending_z = true,
        (KeyCode::Char('e'), KeyModifiers::CONTROL) => app.apply_scroll(Scroll::SingleDown),
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => app.apply_scroll(Scroll::SingleUp),
        (KeyCode::Char('f'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
            app.apply_scroll(Scroll::PageDown);
        }
        (KeyCode::Char('b'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
            app.apply_scroll(Scroll::PageUp);
        }
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => app.apply_scroll(Scroll::HalfDown),
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => app.apply_scroll(Scroll::HalfUp),
        (KeyCode::Char(':'), _) => {
            app.mode = Mode::Command;
            app.command_buffer.clear();
        }
        _ => {}
    }
}

fn handle_command(app: &mut App, key: KeyEvent, host: &mut dyn Host) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            app.command_buffer.clear();
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_buffer);
            app.mode = Mode::Normal;
            if app.run_command(&input, host)? {
                return Ok(true);
            }
        }
        KeyCode::Backspace => {
            if app.command_buffer.pop().is_none() {
                app.mode = Mode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers == KeyModifiers::CONTROL => {
            app.command_buffer.clear();
        }
        KeyCode::Char(ch) => app.command_buffer.push(ch),
        KeyCode::Tab => app.command_buffer.push('\t'),
        _ => {}
    }
    Ok(false)
}

impl App {
    fn apply_motion(&mut self, motion: Motion) {
        let tabs = self.tab_style();
        self.view.apply(motion, &self.buffer, tabs);
    }

    fn apply_scroll(&mut self, kind: Scroll) {
        let tabs = self.tab_style();
        if !self.view.scroll(kind, &self.buffer, tabs) {
            self.set_error("Can't scroll further");
        }
    }
}
