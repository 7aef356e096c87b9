mod app;
mod logging;
mod ui;

use std::io::{self, BufRead, Stdout, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use app::{
    handle_key, line_screen_width, load, load_config, App, CollectError, Config, Fill, Host,
    LineSource, Mode, Pending, ReaderSource, TabStyle, Theme,
};
use logging::debug_log;
use ui::{draw_insert_panel, text_rows, ui, InsertPanel};

const USAGE: &str = "usage: uvi [-R] [-e] [file]";

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    read_only: bool,
    ex: bool,
    file: Option<PathBuf>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options> {
    let mut opts = Options::default();
    for arg in args {
        match arg.as_str() {
            "-R" => opts.read_only = true,
            "-e" => opts.ex = true,
            flag if flag.len() > 1 && flag.starts_with('-') => {
                bail!("unknown option {}\n{}", flag, USAGE)
            }
            _ if opts.file.is_some() => bail!("too many files\n{}", USAGE),
            _ => opts.file = Some(PathBuf::from(&arg)),
        }
    }
    Ok(opts)
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn main() -> Result<()> {
    let opts = parse_args(std::env::args().skip(1))?;
    let config = load_config().unwrap_or_else(|err| {
        debug_log(&format!("config: ignored: {:#}", err));
        Config::default()
    });

    let (buffer, report) = load(opts.file.as_deref(), opts.read_only);
    let mut app = App::new(buffer, config.settings.clone());
    app.theme = config.build_theme();

    if opts.ex {
        let stdout = io::stdout();
        let mut host = ExHost::new(io::stdin().lock(), stdout.lock());
        host.report(&report);
        run_ex(&mut app, &mut host)
    } else {
        run_visual(app, report)
    }
}

fn run_visual(mut app: App, report: String) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let mut host = TuiHost::new(terminal);
    app.set_status(report);

    loop {
        app.clear_status_if_stale();
        host.terminal.draw(|f| ui(f, &mut app))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if app.mode == Mode::Command {
            host.prepare(&app);
        }
        let quit = handle_key(&mut app, key, &mut host)?;
        host.deliver(&mut app);
        if quit {
            break;
        }
    }

    Ok(())
}

fn run_ex<R: BufRead, W: Write>(app: &mut App, host: &mut ExHost<R, W>) -> Result<()> {
    while let Some(line) = host.input.read_command()? {
        if app.run_command(&line, host)? {
            break;
        }
    }
    Ok(())
}

fn run_shell(command: Option<&str>) -> io::Result<ExitStatus> {
    match command {
        Some(cmd) => Command::new("sh").arg("-c").arg(cmd).status(),
        None => {
            let shell = std::env::var("SHELL").unwrap_or_else(|_| "sh".to_string());
            Command::new(shell).status()
        }
    }
}

/// Line-oriented host: commands and inserted text come from `input`,
/// reports go to `out` one per line.
struct ExHost<R, W> {
    input: ReaderSource<R>,
    out: W,
}

impl<R: BufRead, W: Write> ExHost<R, W> {
    fn new(input: R, out: W) -> Self {
        Self { input: ReaderSource::new(input), out }
    }
}

impl<R: BufRead, W: Write> Host for ExHost<R, W> {
    fn report(&mut self, message: &str) {
        let _ = writeln!(self.out, "{}", message);
    }

    fn print_line(&mut self, line: &[u8]) {
        let _ = self.out.write_all(line);
        let _ = self.out.write_all(b"\n");
    }

    fn invalid_command(&mut self) {
        let _ = writeln!(self.out, "?");
    }

    fn shell(&mut self, command: Option<&str>) {
        let _ = self.out.flush();
        match run_shell(command) {
            Ok(_) => {
                let _ = writeln!(self.out, "!");
            }
            Err(err) => {
                let _ = writeln!(self.out, "shell: {}", err);
            }
        }
    }

    fn line_source(&mut self) -> &mut dyn LineSource {
        &mut self.input
    }
}

/// Full-screen host. Reports are queued and handed to the app once the
/// command returns; inserted lines are typed into an on-screen panel.
struct TuiHost {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
    tabs: TabStyle,
    backdrop: Vec<Line<'static>>,
    autoindent: bool,
    textwidth: usize,
    indent_hint: String,
    reports: Vec<String>,
    invalid: bool,
    pending: Pending,
    typed: Vec<String>,
    carry: String,
    finishing: bool,
}

impl TuiHost {
    fn new(terminal: Terminal<CrosstermBackend<Stdout>>) -> Self {
        Self {
            terminal,
            theme: Theme::default_theme(),
            tabs: TabStyle::default(),
            backdrop: Vec::new(),
            autoindent: false,
            textwidth: 0,
            indent_hint: String::new(),
            reports: Vec::new(),
            invalid: false,
            pending: Pending::default(),
            typed: Vec::new(),
            carry: String::new(),
            finishing: false,
        }
    }

    /// Snapshots what the insert panel needs, since the app is borrowed
    /// while a command runs.
    fn prepare(&mut self, app: &App) {
        self.theme = app.theme.clone();
        self.tabs = app.tab_style();
        self.backdrop = text_rows(app);
        self.autoindent = app.settings.autoindent;
        self.textwidth = app.settings.textwidth;
        self.indent_hint = leading_whitespace(&app.buffer.text(app.view.y));
    }

    fn deliver(&mut self, app: &mut App) {
        if std::mem::take(&mut self.invalid) {
            app.set_error("Invalid command");
        }
        app.show_reports(std::mem::take(&mut self.reports));
    }

    /// Reads one line from the insert panel; `None` ends the insertion.
    fn prompt_line(&mut self) -> io::Result<Option<String>> {
        if self.finishing {
            return Ok(None);
        }
        let mut current = if self.autoindent {
            match self.typed.last() {
                Some(prev) => leading_whitespace(prev),
                None => self.indent_hint.clone(),
            }
        } else {
            String::new()
        };
        current.push_str(&std::mem::take(&mut self.carry));

        loop {
            let panel = InsertPanel {
                backdrop: &self.backdrop,
                theme: &self.theme,
                tabs: self.tabs,
                typed: &self.typed,
                current: &current,
            };
            self.terminal.draw(|f| draw_insert_panel(f, &panel))?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match (key.code, key.modifiers) {
                (KeyCode::Esc, _)
                | (KeyCode::Char('c'), KeyModifiers::CONTROL)
                | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                    if current.trim().is_empty() {
                        return Ok(None);
                    }
                    self.finishing = true;
                    return Ok(Some(current));
                }
                (KeyCode::Enter, _) => {
                    if current == "." {
                        return Ok(None);
                    }
                    return Ok(Some(current));
                }
                (KeyCode::Backspace, _) => {
                    current.pop();
                }
                (KeyCode::Tab, _) => current.push('\t'),
                (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
                    current.push(ch);
                    if let Some(rest) = break_at_width(&mut current, self.textwidth, self.tabs) {
                        self.carry = rest;
                        return Ok(Some(current));
                    }
                }
                _ => {}
            }
        }
    }

    fn suspend_for_shell(&mut self, command: Option<&str>) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        let status = run_shell(command);
        if command.is_some() {
            print!("[Press ENTER to continue]");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
        }
        execute!(io::stdout(), EnterAlternateScreen)?;
        enable_raw_mode()?;
        self.terminal.clear()?;

        let status = status?;
        if !status.success() {
            self.reports.push(format!("shell returned {}", status));
        }
        Ok(())
    }
}

impl Host for TuiHost {
    fn report(&mut self, message: &str) {
        self.reports.push(message.to_string());
    }

    fn invalid_command(&mut self) {
        self.invalid = true;
    }

    fn shell(&mut self, command: Option<&str>) {
        if let Err(err) = self.suspend_for_shell(command) {
            debug_log(&format!("shell: {}", err));
            self.reports.push(format!("shell: {}", err));
        }
    }

    fn line_source(&mut self) -> &mut dyn LineSource {
        self
    }
}

impl LineSource for TuiHost {
    fn fill(&mut self, window: &mut [u8]) -> Result<(Fill, usize), CollectError> {
        if self.pending.is_drained() {
            match self.prompt_line()? {
                Some(line) => {
                    let mut bytes = line.clone().into_bytes();
                    bytes.push(b'\n');
                    self.typed.push(line);
                    self.pending.load(bytes);
                }
                None => {
                    self.typed.clear();
                    self.carry.clear();
                    self.finishing = false;
                    return Ok((Fill::Eof, 0));
                }
            }
        }
        Ok(self.pending.serve(window, false))
    }
}

fn leading_whitespace(line: &str) -> String {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').collect()
}

/// Ends `line` at its last space once it grows past `width` columns,
/// returning the word that moves to the next line. A `width` of 0 never
/// breaks.
fn break_at_width(line: &mut String, width: usize, tabs: TabStyle) -> Option<String> {
    if width == 0 || line_screen_width(line, tabs) <= width {
        return None;
    }
    let cut = line.rfind(' ')?;
    if line[..cut].trim().is_empty() {
        return None;
    }
    let rest = line[cut + 1..].to_string();
    line.truncate(cut);
    let kept = line.trim_end().len();
    line.truncate(kept);
    Some(rest)
}
