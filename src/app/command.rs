use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use thiserror::Error;

use super::buffer::load;
use super::collect::{collect_lines, Collected, CollectError, LineSource};
use super::range::{parse_range, AddressError, Range};
use super::vars::{parse_setget, VarError};
use super::App;
use crate::logging::debug_log;

/// What the interpreter needs from whoever is driving it.
pub trait Host {
    /// Shows a status line or error.
    fn report(&mut self, message: &str);
    /// Shows a buffer line for `p`. Hosts that can pass raw bytes through
    /// should; the rest see it decoded.
    fn print_line(&mut self, line: &[u8]) {
        self.report(&String::from_utf8_lossy(line));
    }
    /// Signals a rejected command so the host can style it (bell, `?`).
    fn invalid_command(&mut self);
    /// Runs `command` through the shell; `None` starts an interactive one.
    fn shell(&mut self, command: Option<&str>);
    /// Where `a`, `i` and `c` read their lines from.
    fn line_source(&mut self) -> &mut dyn LineSource;
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid command")]
    Invalid,
    #[error("Invalid range")]
    Address,
    #[error("read-only buffer")]
    ReadOnly,
    #[error("unsaved")]
    Unsaved,
    #[error("buffer has no filename (w[q] fname)")]
    NoFilename,
    #[error("Couldn't save \"{}\": {}", .path.display(), .source)]
    Write { path: PathBuf, source: io::Error },
    #[error("Invalid current line ('{0}')!")]
    CurrentLine(char),
    #[error("unknown variable")]
    UnknownVariable,
    #[error("\"{0}\" needs an integer value")]
    NeedsInteger(String),
    #[error("\"{0}\" must be a number > 0")]
    NotANumber(String),
    #[error(transparent)]
    Input(#[from] CollectError),
}

impl From<AddressError> for CommandError {
    fn from(_: AddressError) -> Self {
        CommandError::Address
    }
}

impl From<VarError> for CommandError {
    fn from(err: VarError) -> Self {
        match err {
            VarError::Malformed => CommandError::Invalid,
            VarError::Unknown => CommandError::UnknownVariable,
            VarError::NeedsInteger(name) => CommandError::NeedsInteger(name),
            VarError::NotANumber(text) => CommandError::NotANumber(text),
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    Before,
    After,
}

impl App {
    /// Runs one command line against the buffer.
    ///
    /// Returns `Ok(true)` when the session should end. Every failure except
    /// running out of memory while collecting input is reported through
    /// `host` and leaves the buffer untouched; that one comes back as `Err`.
    pub fn run_command(&mut self, input: &str, host: &mut dyn Host) -> Result<bool> {
        let outcome = self.dispatch(input, host);
        self.sync_view();
        match outcome {
            Ok(Flow::Continue) => Ok(false),
            Ok(Flow::Quit) => Ok(true),
            Err(CommandError::Input(CollectError::Alloc(err))) => {
                debug_log(&format!("command: {:?} aborted: {}", input, err));
                Err(anyhow!(err).context("out of memory while collecting input"))
            }
            Err(CommandError::Invalid) => {
                debug_log(&format!("command: invalid {:?}", input));
                host.invalid_command();
                Ok(false)
            }
            Err(err) => {
                debug_log(&format!("command: {:?} failed: {}", input, err));
                host.report(&err.to_string());
                Ok(false)
            }
        }
    }

    fn dispatch(&mut self, input: &str, host: &mut dyn Host) -> Result<Flow, CommandError> {
        let resolved = parse_range(input, self.view.y, self.buffer.line_count())?;
        let (range, explicit, rest) = (resolved.range, resolved.explicit, resolved.rest);

        if rest.is_empty() {
            if !explicit {
                return Err(CommandError::Invalid);
            }
            self.view.y = range.end - 1;
            return Ok(Flow::Continue);
        }

        if let Some(args) = rest.strip_prefix("set") {
            return self.setget(true, args, explicit, host);
        }
        if let Some(args) = rest.strip_prefix("get") {
            return self.setget(false, args, explicit, host);
        }

        let mut chars = rest.chars();
        let Some(cmd) = chars.next() else {
            return Err(CommandError::Invalid);
        };
        let args = chars.as_str();
        let bare = args.is_empty();

        match cmd {
            'a' | 'i' if bare && !explicit => {
                self.check_writable()?;
                let place = if cmd == 'a' { Place::After } else { Place::Before };
                let collected = collect_lines(host.line_source())?;
                self.splice(collected, self.view.y, place);
                Ok(Flow::Continue)
            }
            'c' if bare => {
                self.check_writable()?;
                self.check_current_line(cmd)?;
                self.change(range, host)?;
                Ok(Flow::Continue)
            }
            'd' if bare => {
                self.check_writable()?;
                self.check_current_line(cmd)?;
                self.delete(range);
                Ok(Flow::Continue)
            }
            'p' if bare => {
                self.check_current_line(cmd)?;
                self.print(range, host);
                Ok(Flow::Continue)
            }
            'g' if bare && !explicit => {
                host.report(&(self.view.y + 1).to_string());
                Ok(Flow::Continue)
            }
            'w' if !explicit => self.write_command(args, host),
            'q' if !explicit => match args {
                "" => self.quit(false),
                "!" => self.quit(true),
                _ => Err(CommandError::Invalid),
            },
            'e' if !explicit => self.edit(args, host),
            '!' if !explicit => {
                let command = args.trim();
                debug_log(&format!("command: shell {:?}", command));
                host.shell((!command.is_empty()).then_some(command));
                Ok(Flow::Continue)
            }
            _ => Err(CommandError::Invalid),
        }
    }

    fn check_writable(&self) -> Result<(), CommandError> {
        if self.buffer.is_read_only() {
            return Err(CommandError::ReadOnly);
        }
        Ok(())
    }

    fn check_current_line(&self, cmd: char) -> Result<(), CommandError> {
        if self.view.y > self.buffer.last_index() {
            return Err(CommandError::CurrentLine(cmd));
        }
        Ok(())
    }

    /// Splices a collected block next to `anchor`; the last new line
    /// becomes current.
    fn splice(&mut self, collected: Collected, anchor: usize, place: Place) {
        if collected.is_empty() {
            return;
        }
        let count = collected.lines().len();
        let lines = collected.into_lines();
        let first = match place {
            Place::Before => self.buffer.insert_before(anchor, lines),
            Place::After => self.buffer.insert_after(anchor, lines),
        };
        self.view.y = first + count - 1;
        self.buffer.set_modified(true);
        self.buffer.recount();
    }

    /// Removes `range`. The placeholder line of an empty buffer stays put.
    fn delete(&mut self, range: Range) {
        if self.buffer.is_blank() {
            self.view.y = 0;
            return;
        }
        if range.start == range.end {
            self.buffer.remove(range.start - 1);
        } else {
            self.buffer.remove_range(range);
        }
        self.buffer.set_modified(true);
        self.buffer.recount();
        self.view.y = (range.start - 1).min(self.buffer.last_index());
    }

    /// Replaces `range` with freshly collected lines. Input is gathered
    /// before anything is deleted so a failed read leaves the buffer alone.
    fn change(&mut self, range: Range, host: &mut dyn Host) -> Result<(), CommandError> {
        let collected = collect_lines(host.line_source())?;
        self.delete(range);
        let start = range.start - 1;
        if start > self.buffer.last_index() {
            self.splice(collected, self.buffer.last_index(), Place::After);
        } else {
            self.splice(collected, start, Place::Before);
        }
        Ok(())
    }

    fn print(&mut self, range: Range, host: &mut dyn Host) {
        for index in range.start - 1..range.end {
            if let Some(line) = self.buffer.get(index) {
                host.print_line(line);
            }
        }
        self.view.y = range.end - 1;
    }

    /// Handles everything after `w`: an optional `q` or `e` suffix and an
    /// optional filename.
    fn write_command(&mut self, args: &str, host: &mut dyn Host) -> Result<Flow, CommandError> {
        if let Some(edit_args) = args.strip_prefix('e') {
            self.write(None, host)?;
            return self.edit(edit_args, host);
        }
        let (quit, name) = match args.strip_prefix('q') {
            Some(rest) => (true, rest),
            None => (false, args),
        };
        let name = if name.is_empty() {
            None
        } else {
            let Some(name) = name.strip_prefix(' ') else {
                return Err(CommandError::Invalid);
            };
            let name = name.trim();
            (!name.is_empty()).then_some(name)
        };

        self.write(name, host)?;
        if quit {
            return self.quit(false);
        }
        Ok(Flow::Continue)
    }

    fn write(&mut self, name: Option<&str>, host: &mut dyn Host) -> Result<(), CommandError> {
        self.check_writable()?;
        if let Some(name) = name {
            self.buffer.set_filename(name);
        }
        let Some(path) = self.buffer.filename().map(Path::to_path_buf) else {
            return Err(CommandError::NoFilename);
        };
        let bytes = self
            .buffer
            .write_to(&path)
            .map_err(|source| CommandError::Write { path: path.clone(), source })?;
        self.buffer.set_modified(false);
        host.report(&format!(
            "\"{}\" {}L, {}C written",
            path.display(),
            self.buffer.written_line_count(),
            bytes
        ));
        Ok(())
    }

    fn quit(&self, force: bool) -> Result<Flow, CommandError> {
        if !force && self.buffer.is_modified() {
            return Err(CommandError::Unsaved);
        }
        Ok(Flow::Quit)
    }

    /// Handles everything after `e`: ` name`, `! name`, or a bare `!` that
    /// reloads the current file.
    fn edit(&mut self, args: &str, host: &mut dyn Host) -> Result<Flow, CommandError> {
        let (force, rest) = match args.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, args),
        };
        let path = if rest.is_empty() && force {
            self.buffer
                .filename()
                .map(Path::to_path_buf)
                .ok_or(CommandError::Invalid)?
        } else {
            let name = rest.strip_prefix(' ').map(str::trim).unwrap_or("");
            if name.is_empty() {
                return Err(CommandError::Invalid);
            }
            PathBuf::from(name)
        };

        if !force && self.buffer.is_modified() {
            return Err(CommandError::Unsaved);
        }

        let (buffer, report) = load(Some(path.as_path()), false);
        self.buffer = buffer;
        host.report(&report);
        Ok(Flow::Continue)
    }

    fn setget(
        &mut self,
        is_set: bool,
        args: &str,
        explicit: bool,
        host: &mut dyn Host,
    ) -> Result<Flow, CommandError> {
        if explicit {
            return Err(CommandError::Invalid);
        }
        let reports = parse_setget(is_set, args, &mut self.settings, &mut self.buffer)?;
        for line in reports {
            host.report(&line);
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;

    use super::*;
    use crate::app::buffer::Buffer;
    use crate::app::collect::{Fill, ReaderSource};
    use crate::app::vars::Settings;

    struct MockHost {
        input: ReaderSource<Cursor<Vec<u8>>>,
        reports: Vec<String>,
        invalid: usize,
        shells: Vec<Option<String>>,
    }

    impl MockHost {
        fn new(input: &str) -> Self {
            Self {
                input: ReaderSource::new(Cursor::new(input.as_bytes().to_vec())),
                reports: Vec::new(),
                invalid: 0,
                shells: Vec::new(),
            }
        }
    }

    impl Host for MockHost {
        fn report(&mut self, message: &str) {
            self.reports.push(message.to_string());
        }

        fn invalid_command(&mut self) {
            self.invalid += 1;
        }

        fn shell(&mut self, command: Option<&str>) {
            self.shells.push(command.map(str::to_string));
        }

        fn line_source(&mut self) -> &mut dyn LineSource {
            &mut self.input
        }
    }

    struct OutOfMemory;

    impl LineSource for OutOfMemory {
        fn fill(&mut self, _window: &mut [u8]) -> Result<(Fill, usize), CollectError> {
            let err = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
            Err(CollectError::Alloc(err))
        }
    }

    struct StarvedHost(OutOfMemory);

    impl Host for StarvedHost {
        fn report(&mut self, _message: &str) {}
        fn invalid_command(&mut self) {}
        fn shell(&mut self, _command: Option<&str>) {}
        fn line_source(&mut self) -> &mut dyn LineSource {
            &mut self.0
        }
    }

    fn app_with(lines: &[&str]) -> App {
        let mut buffer = Buffer::new();
        buffer.insert_before(0, lines.iter().map(|s| s.as_bytes().to_vec()).collect());
        App::new(buffer, Settings::default())
    }

    #[test]
    fn insert_into_new_buffer() {
        let mut app = App::new(Buffer::new(), Settings::default());
        let mut host = MockHost::new("hello\nworld\n.\n");
        assert!(!app.run_command("i", &mut host).unwrap());
        assert_eq!(app.buffer.text_lines(), &["hello", "world"]);
        assert!(app.buffer.is_modified());
        assert_eq!(app.view.y, 1);
    }

    #[test]
    fn append_and_insert_around_current_line() {
        let mut app = app_with(&["a", "d"]);
        let mut host = MockHost::new("b\nc\n.\nstart\n.\n");
        app.run_command("a", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["a", "b", "c", "d"]);
        assert_eq!(app.view.y, 2);

        app.run_command("1", &mut host).unwrap();
        app.run_command("i", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["start", "a", "b", "c", "d"]);
    }

    #[test]
    fn empty_insertion_changes_nothing() {
        let mut app = app_with(&["a"]);
        let mut host = MockHost::new(".\n");
        app.run_command("a", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["a"]);
        assert!(!app.buffer.is_modified());
    }

    #[test]
    fn insert_rejects_range_and_trailing_text() {
        let mut app = app_with(&["a", "b"]);
        let mut host = MockHost::new("x\n.\n");
        app.run_command("1a", &mut host).unwrap();
        app.run_command("ix", &mut host).unwrap();
        assert_eq!(host.invalid, 2);
        assert_eq!(app.buffer.line_count(), 2);
    }

    #[test]
    fn delete_addressed_line() {
        let mut app = app_with(&["a", "b", "c"]);
        app.view.y = 0;
        let mut host = MockHost::new("");
        app.run_command("2d", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["a", "c"]);
        assert_eq!(app.view.y, 1);
        assert!(app.buffer.is_modified());
    }

    #[test]
    fn delete_through_end_moves_to_tail() {
        let mut app = app_with(&["a", "b", "c", "d"]);
        let mut host = MockHost::new("");
        app.run_command("2,$d", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["a"]);
        assert_eq!(app.view.y, 0);

        app.run_command("d", &mut host).unwrap();
        assert!(app.buffer.is_blank());
        app.run_command("d", &mut host).unwrap();
        assert!(app.buffer.is_blank());
        assert!(host.reports.is_empty());
    }

    #[test]
    fn empty_buffer_line_can_be_printed_and_changed() {
        let mut app = App::new(Buffer::new(), Settings::default());
        let mut host = MockHost::new("hello\n.\n");
        app.run_command("d", &mut host).unwrap();
        assert!(!app.buffer.is_modified());

        app.run_command("p", &mut host).unwrap();
        assert_eq!(host.reports, vec![String::new()]);

        app.run_command("c", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["hello"]);
        assert!(!app.buffer.is_blank());
        assert_eq!(app.view.y, 0);
        assert_eq!(host.reports.len(), 1);
    }

    #[test]
    fn non_utf8_file_is_written_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        let raw = b"caf\xe9\nna\xefve\n";
        fs::write(&path, raw).unwrap();
        let (buffer, _) = load(Some(path.as_path()), false);
        let mut app = App::new(buffer, Settings::default());
        let mut host = MockHost::new("");

        app.run_command("w", &mut host).unwrap();
        assert_eq!(fs::read(&path).unwrap(), raw);
        assert_eq!(host.reports, vec![format!("\"{}\" 2L, 11C written", path.display())]);
    }

    #[test]
    fn read_only_buffer_rejects_delete() {
        let mut app = app_with(&["a", "b"]);
        app.buffer.set_read_only(true);
        let mut host = MockHost::new("");
        app.run_command("d", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["a", "b"]);
        assert!(!app.buffer.is_modified());
        assert_eq!(host.reports, vec!["read-only buffer".to_string()]);
    }

    #[test]
    fn bad_address_is_reported() {
        let mut app = app_with(&["a", "b"]);
        let mut host = MockHost::new("");
        app.run_command("5d", &mut host).unwrap();
        app.run_command("2,1p", &mut host).unwrap();
        assert_eq!(host.reports, vec!["Invalid range", "Invalid range"]);
        assert_eq!(app.buffer.line_count(), 2);
    }

    #[test]
    fn bare_address_moves_current_line() {
        let mut app = app_with(&["a", "b", "c"]);
        let mut host = MockHost::new("");
        app.run_command("2", &mut host).unwrap();
        assert_eq!(app.view.y, 1);
        app.run_command("$", &mut host).unwrap();
        assert_eq!(app.view.y, 2);
        app.run_command("g", &mut host).unwrap();
        assert_eq!(host.reports, vec!["3".to_string()]);
    }

    #[test]
    fn empty_and_unknown_commands_are_invalid() {
        let mut app = app_with(&["a"]);
        let mut host = MockHost::new("");
        app.run_command("", &mut host).unwrap();
        app.run_command("z", &mut host).unwrap();
        app.run_command("1g", &mut host).unwrap();
        app.run_command("pp", &mut host).unwrap();
        assert_eq!(host.invalid, 4);
    }

    #[test]
    fn print_reports_each_line() {
        let mut app = app_with(&["one", "two", "three"]);
        let mut host = MockHost::new("");
        app.run_command("%p", &mut host).unwrap();
        assert_eq!(host.reports, vec!["one", "two", "three"]);
        assert_eq!(app.view.y, 2);
    }

    #[test]
    fn change_replaces_range() {
        let mut app = app_with(&["a", "b", "c", "d"]);
        let mut host = MockHost::new("X\nY\n.\nZ\n.\n");
        app.run_command("2,3c", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["a", "X", "Y", "d"]);
        assert_eq!(app.view.y, 2);

        app.run_command("$c", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["a", "X", "Y", "Z"]);
    }

    #[test]
    fn allocation_failure_is_fatal_and_mutates_nothing() {
        let mut app = app_with(&["a", "b"]);
        let mut host = StarvedHost(OutOfMemory);
        assert!(app.run_command("1,2c", &mut host).is_err());
        assert_eq!(app.buffer.text_lines(), &["a", "b"]);
        assert!(!app.buffer.is_modified());
    }

    #[test]
    fn write_without_filename() {
        let mut app = app_with(&["a"]);
        let mut host = MockHost::new("");
        app.run_command("w", &mut host).unwrap();
        assert_eq!(host.reports, vec!["buffer has no filename (w[q] fname)".to_string()]);
    }

    #[test]
    fn write_names_buffer_and_reports_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut app = app_with(&["ab", "c"]);
        app.buffer.set_modified(true);
        let mut host = MockHost::new("");

        let cmd = format!("w {}", path.display());
        assert!(!app.run_command(&cmd, &mut host).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "ab\nc\n");
        assert!(!app.buffer.is_modified());
        assert_eq!(app.buffer.filename(), Some(path.as_path()));
        assert_eq!(host.reports, vec![format!("\"{}\" 2L, 5C written", path.display())]);
    }

    #[test]
    fn write_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut app = app_with(&["x"]);
        app.buffer.set_filename(&path);
        app.buffer.set_modified(true);
        let mut host = MockHost::new("");
        assert!(app.run_command("wq", &mut host).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "x\n");
    }

    #[test]
    fn failed_write_aborts_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(&["x"]);
        app.buffer.set_filename(dir.path());
        app.buffer.set_modified(true);
        let mut host = MockHost::new("");
        assert!(!app.run_command("wq", &mut host).unwrap());
        assert!(app.buffer.is_modified());
        assert!(host.reports[0].starts_with("Couldn't save"));
    }

    #[test]
    fn failed_write_aborts_chained_edit() {
        let dir = tempfile::tempdir().unwrap();
        let there = dir.path().join("there.txt");
        fs::write(&there, "elsewhere\n").unwrap();
        let mut app = app_with(&["mine"]);
        app.buffer.set_filename(dir.path());
        app.buffer.set_modified(true);
        let mut host = MockHost::new("");

        app.run_command(&format!("we {}", there.display()), &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["mine"]);
        assert!(app.buffer.is_modified());
        assert_eq!(app.buffer.filename(), Some(dir.path()));
        assert_eq!(host.reports.len(), 1);
        assert!(host.reports[0].starts_with("Couldn't save"));
    }

    #[test]
    fn read_only_buffer_refuses_write() {
        let mut app = app_with(&["x"]);
        app.buffer.set_read_only(true);
        app.buffer.set_filename("never-written.txt");
        let mut host = MockHost::new("");
        app.run_command("w", &mut host).unwrap();
        assert_eq!(host.reports, vec!["read-only buffer".to_string()]);
    }

    #[test]
    fn quit_respects_unsaved_changes() {
        let mut app = app_with(&["a"]);
        app.buffer.set_modified(true);
        let mut host = MockHost::new("");
        assert!(!app.run_command("q", &mut host).unwrap());
        assert_eq!(host.reports, vec!["unsaved".to_string()]);
        assert_eq!(app.buffer.text_lines(), &["a"]);
        assert!(app.run_command("q!", &mut host).unwrap());

        app.run_command("qx", &mut host).unwrap();
        app.run_command("1q", &mut host).unwrap();
        assert_eq!(host.invalid, 2);
    }

    #[test]
    fn edit_loads_file_and_clamps_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.txt");
        fs::write(&path, "first\nsecond\n").unwrap();
        let mut app = app_with(&["a", "b", "c", "d"]);
        app.view.y = 3;
        let mut host = MockHost::new("");

        app.run_command(&format!("e {}", path.display()), &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["first", "second"]);
        assert_eq!(app.view.y, 1);
        assert_eq!(host.reports, vec![format!("{}: 13C, 2L", path.display())]);
    }

    #[test]
    fn edit_needs_force_when_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.txt");
        fs::write(&path, "new\n").unwrap();
        let mut app = app_with(&["old"]);
        app.buffer.set_modified(true);
        let mut host = MockHost::new("");

        app.run_command(&format!("e {}", path.display()), &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["old"]);
        assert_eq!(host.reports, vec!["unsaved".to_string()]);

        app.run_command(&format!("e! {}", path.display()), &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["new"]);
        assert!(!app.buffer.is_modified());
    }

    #[test]
    fn bare_forced_edit_reverts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "disk\n").unwrap();
        let (buffer, _) = load(Some(path.as_path()), false);
        let mut app = App::new(buffer, Settings::default());
        let mut host = MockHost::new("scratch\n.\n");
        app.run_command("a", &mut host).unwrap();
        assert_eq!(app.buffer.line_count(), 2);

        app.run_command("e!", &mut host).unwrap();
        assert_eq!(app.buffer.text_lines(), &["disk"]);
        app.run_command("e", &mut host).unwrap();
        assert_eq!(host.invalid, 1);
    }

    #[test]
    fn write_then_edit() {
        let dir = tempfile::tempdir().unwrap();
        let here = dir.path().join("here.txt");
        let there = dir.path().join("there.txt");
        fs::write(&there, "elsewhere\n").unwrap();
        let mut app = app_with(&["mine"]);
        app.buffer.set_filename(&here);
        app.buffer.set_modified(true);
        let mut host = MockHost::new("");

        app.run_command(&format!("we {}", there.display()), &mut host).unwrap();
        assert_eq!(fs::read_to_string(&here).unwrap(), "mine\n");
        assert_eq!(app.buffer.text_lines(), &["elsewhere"]);
    }

    #[test]
    fn shell_escape_forwards_arguments() {
        let mut app = app_with(&["a"]);
        let mut host = MockHost::new("");
        app.run_command("!ls -l", &mut host).unwrap();
        app.run_command("!", &mut host).unwrap();
        app.run_command("1!ls", &mut host).unwrap();
        assert_eq!(host.shells, vec![Some("ls -l".to_string()), None]);
        assert_eq!(host.invalid, 1);
    }

    #[test]
    fn set_and_get_variables() {
        let mut app = app_with(&["a"]);
        let mut host = MockHost::new("");
        app.run_command("set ts=4", &mut host).unwrap();
        app.run_command("set list", &mut host).unwrap();
        app.run_command("get ts", &mut host).unwrap();
        assert_eq!(app.settings.tabstop, 4);
        assert!(app.settings.list);
        assert_eq!(host.reports, vec!["tabstop: 4".to_string()]);

        app.run_command("set bogus", &mut host).unwrap();
        app.run_command("set ts x", &mut host).unwrap();
        assert_eq!(host.reports[1], "unknown variable");
        assert_eq!(host.reports[2], "\"x\" must be a number > 0");

        app.run_command("set ro", &mut host).unwrap();
        app.run_command("d", &mut host).unwrap();
        assert_eq!(host.reports[3], "read-only buffer");
    }
}
