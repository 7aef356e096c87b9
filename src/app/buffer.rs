use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::range::Range;
use crate::logging::debug_log;

/// Ordered, owning store of the lines being edited plus the metadata that
/// travels with them.
///
/// Lines are raw bytes and may hold anything but `\n`; they are decoded only
/// for display.
///
/// The store never holds zero lines. An empty buffer is a single empty
/// placeholder line; the first insertion replaces it and writing it yields
/// an empty file.
#[derive(Debug, Clone)]
pub struct Buffer {
    lines: Vec<Vec<u8>>,
    placeholder: bool,
    modified: bool,
    read_only: bool,
    eol: bool,
    filename: Option<PathBuf>,
    char_count: usize,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
            placeholder: true,
            modified: false,
            read_only: false,
            eol: true,
            filename: None,
            char_count: 0,
        }
    }

    /// Splits raw file contents on `\n`. A missing final terminator is
    /// remembered in the eol flag.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buffer = Self::new();
        if bytes.is_empty() {
            return buffer;
        }
        let (body, eol) = match bytes.strip_suffix(b"\n") {
            Some(body) => (body, true),
            None => (bytes, false),
        };
        buffer.lines = body.split(|&b| b == b'\n').map(<[u8]>::to_vec).collect();
        buffer.placeholder = false;
        buffer.eol = eol;
        buffer.recount();
        buffer
    }

    pub fn read(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let mut buffer = Self::from_bytes(&bytes);
        buffer.filename = Some(path.to_path_buf());
        debug_log(&format!(
            "buffer: read {} ({} bytes, {} lines)",
            path.display(),
            bytes.len(),
            buffer.line_count()
        ));
        Ok(buffer)
    }

    pub fn contents(&self) -> Vec<u8> {
        if self.placeholder {
            return Vec::new();
        }
        let mut out = self.lines.join(&b'\n');
        if self.eol {
            out.push(b'\n');
        }
        out
    }

    /// Writes the buffer to `path`, returning the number of bytes written.
    pub fn write_to(&self, path: &Path) -> io::Result<usize> {
        let content = self.contents();
        fs::write(path, &content)?;
        debug_log(&format!("buffer: wrote {} ({} bytes)", path.display(), content.len()));
        Ok(content.len())
    }

    /// Line count as it appears on disk: an unterminated last line is not
    /// counted, and a placeholder buffer has none.
    pub fn written_line_count(&self) -> usize {
        if self.placeholder {
            0
        } else {
            self.lines.len() - usize::from(!self.eol)
        }
    }

    pub fn recount(&mut self) {
        if self.placeholder {
            self.char_count = 0;
            return;
        }
        let text: usize = self.lines.iter().map(Vec::len).sum();
        let separators = self.lines.len() - 1 + usize::from(self.eol);
        self.char_count = text + separators;
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    /// Line `index` decoded for display; bytes that are not UTF-8 show as
    /// U+FFFD. Out of range gives an empty line.
    pub fn text(&self, index: usize) -> Cow<'_, str> {
        self.get(index).map_or(Cow::Borrowed(""), String::from_utf8_lossy)
    }

    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }

    #[cfg(test)]
    pub fn text_lines(&self) -> Vec<String> {
        (0..self.lines.len()).map(|i| self.text(i).into_owned()).collect()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn last_index(&self) -> usize {
        self.lines.len() - 1
    }

    /// True when the only line is the placeholder of an empty buffer.
    pub fn is_blank(&self) -> bool {
        self.placeholder
    }

    /// Splices `lines` in front of `anchor`, keeping their order. An anchor
    /// at or past the end appends. Returns the index of the first new line.
    pub fn insert_before(&mut self, anchor: usize, lines: Vec<Vec<u8>>) -> usize {
        if lines.is_empty() {
            return anchor.min(self.lines.len());
        }
        if self.placeholder {
            self.lines = lines;
            self.placeholder = false;
            return 0;
        }
        let at = anchor.min(self.lines.len());
        self.lines.splice(at..at, lines);
        at
    }

    pub fn insert_after(&mut self, anchor: usize, lines: Vec<Vec<u8>>) -> usize {
        self.insert_before(anchor.saturating_add(1), lines)
    }

    pub fn remove(&mut self, index: usize) -> Option<Vec<u8>> {
        if index >= self.lines.len() {
            return None;
        }
        let line = self.lines.remove(index);
        self.ensure_line();
        Some(line)
    }

    /// Removes the 1-based inclusive `range`, returning how many lines went.
    pub fn remove_range(&mut self, range: Range) -> usize {
        let start = range.start.saturating_sub(1).min(self.lines.len());
        let end = range.end.min(self.lines.len()).max(start);
        let removed = self.lines.drain(start..end).count();
        self.ensure_line();
        removed
    }

    fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
            self.placeholder = true;
        }
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, name: impl Into<PathBuf>) {
        self.filename = Some(name.into());
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn has_eol(&self) -> bool {
        self.eol
    }

    /// Changing the final terminator changes the byte count with it.
    pub fn set_eol(&mut self, eol: bool) {
        self.eol = eol;
        self.recount();
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }
}

/// Opens `path` as a new buffer, producing the status report to show.
///
/// A missing file gives an empty buffer carrying the name. Any other read
/// error gives an empty read-only buffer and reports the OS error.
pub fn load(path: Option<&Path>, force_read_only: bool) -> (Buffer, String) {
    let Some(path) = path else {
        return (Buffer::new(), "(new file)".to_string());
    };
    match Buffer::read(path) {
        Ok(mut buffer) => {
            if force_read_only {
                buffer.read_only = true;
            }
            let ro = if buffer.read_only { " [read only]" } else { "" };
            let report = if buffer.is_blank() {
                format!("(empty file){}", ro)
            } else {
                format!(
                    "{}{}: {}C, {}L{}",
                    path.display(),
                    ro,
                    buffer.char_count(),
                    buffer.line_count(),
                    if buffer.eol { "" } else { " [noeol]" }
                )
            };
            (buffer, report)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut buffer = Buffer::new();
            buffer.set_filename(path);
            (buffer, "(new file)".to_string())
        }
        Err(err) => {
            debug_log(&format!("buffer: failed to read {}: {}", path.display(), err));
            let mut buffer = Buffer::new();
            buffer.set_filename(path);
            buffer.read_only = true;
            (buffer, format!("\"{}\" [{}]", path.display(), err))
        }
    }
}
