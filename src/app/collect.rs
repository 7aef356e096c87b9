use std::collections::TryReserveError;
use std::io::{self, BufRead};

use thiserror::Error;

/// Size of the window handed to a [`LineSource`] on every read.
pub const WINDOW_SIZE: usize = 128;

/// What a single [`LineSource::fill`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Nothing more to read; the bytes returned alongside are ignored.
    Eof,
    /// A complete line (terminator included); more may follow.
    Continue,
    /// A complete line, and the last one.
    Last,
    /// The window filled up before a terminator was seen.
    Partial,
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("out of memory while reading input")]
    Alloc(#[from] TryReserveError),
    #[error("input error: {0}")]
    Io(#[from] io::Error),
}

/// Supplies raw input lines a window at a time.
pub trait LineSource {
    fn fill(&mut self, window: &mut [u8]) -> Result<(Fill, usize), CollectError>;
}

/// Lines gathered for an insertion. Never holds zero lines; input that ended
/// straight away yields one empty line and reports [`Collected::is_empty`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    lines: Vec<Vec<u8>>,
    ended_immediately: bool,
}

impl Collected {
    pub fn is_empty(&self) -> bool {
        self.ended_immediately
    }

    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Vec<u8>> {
        self.lines
    }
}

/// Reads lines from `source` until it reports end of input or a last line.
pub fn collect_lines(source: &mut dyn LineSource) -> Result<Collected, CollectError> {
    let mut lines = Vec::new();
    let mut window = [0u8; WINDOW_SIZE];
    loop {
        match read_line(source, &mut window)? {
            Some((line, Fill::Last)) => {
                lines.push(line);
                break;
            }
            Some((line, _)) => lines.push(line),
            None => break,
        }
    }
    let ended_immediately = lines.is_empty();
    if ended_immediately {
        lines.push(Vec::new());
    }
    Ok(Collected { lines, ended_immediately })
}

fn read_line(
    source: &mut dyn LineSource,
    window: &mut [u8],
) -> Result<Option<(Vec<u8>, Fill)>, CollectError> {
    let (status, len) = source.fill(window)?;
    match status {
        Fill::Eof => Ok(None),
        Fill::Continue | Fill::Last => Ok(Some((finish_line(&window[..len]), status))),
        Fill::Partial => {
            let mut acc = Accumulator::new();
            acc.push(&window[..len])?;
            loop {
                let (status, len) = source.fill(window)?;
                match status {
                    Fill::Partial => acc.push(&window[..len])?,
                    Fill::Continue | Fill::Last => {
                        acc.push(&window[..len])?;
                        return Ok(Some((finish_line(&acc.bytes), status)));
                    }
                    // Input ran out mid-line; keep what was read.
                    Fill::Eof => return Ok(Some((finish_line(&acc.bytes), Fill::Last))),
                }
            }
        }
    }
}

fn finish_line(bytes: &[u8]) -> Vec<u8> {
    let end = bytes.iter().position(|&b| b == b'\n').unwrap_or(bytes.len());
    bytes[..end].to_vec()
}

/// Holding area for a line longer than one window. Capacity doubles each
/// time it runs out; a failed reservation leaves nothing half-done.
struct Accumulator {
    bytes: Vec<u8>,
}

impl Accumulator {
    fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    fn push(&mut self, chunk: &[u8]) -> Result<(), TryReserveError> {
        let needed = self.bytes.len() + chunk.len();
        if needed > self.bytes.capacity() {
            let mut size = self.bytes.capacity().max(WINDOW_SIZE);
            while size < needed {
                size = size.saturating_mul(2);
            }
            self.bytes.try_reserve_exact(size - self.bytes.len())?;
        }
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.bytes.capacity()
    }
}

/// Bytes of one already-read line waiting to be handed out in windows.
#[derive(Debug, Default)]
pub struct Pending {
    bytes: Vec<u8>,
    pos: usize,
}

impl Pending {
    pub fn is_drained(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn load(&mut self, bytes: Vec<u8>) {
        self.bytes = bytes;
        self.pos = 0;
    }

    /// Copies the next chunk into `window`. `last` marks a final line that
    /// carries no terminator.
    pub fn serve(&mut self, window: &mut [u8], last: bool) -> (Fill, usize) {
        let rest = &self.bytes[self.pos..];
        let len = match rest.iter().position(|&b| b == b'\n') {
            Some(nl) if nl < window.len() => nl + 1,
            _ => rest.len().min(window.len()),
        };
        window[..len].copy_from_slice(&rest[..len]);
        self.pos += len;
        let status = if window[..len].ends_with(b"\n") {
            Fill::Continue
        } else if !self.is_drained() {
            Fill::Partial
        } else if last {
            Fill::Last
        } else {
            Fill::Continue
        };
        (status, len)
    }
}

/// Adapts any buffered reader, handing out at most one window per read
/// straight from its internal buffer. A line holding only `.` ends the input.
pub struct ReaderSource<R> {
    reader: R,
    mid_line: bool,
    at_eof: bool,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, mid_line: false, at_eof: false }
    }

    /// Reads one command line. Unlike insertion, `.` is an ordinary line here.
    pub fn read_command(&mut self) -> Result<Option<String>, CollectError> {
        let mut window = [0u8; WINDOW_SIZE];
        let mut acc = Accumulator::new();
        loop {
            let (status, len) = self.serve(&mut window)?;
            acc.push(&window[..len])?;
            match status {
                Fill::Partial => {}
                Fill::Eof if acc.bytes.is_empty() => return Ok(None),
                Fill::Eof | Fill::Continue | Fill::Last => break,
            }
        }
        Ok(Some(String::from_utf8_lossy(&finish_line(&acc.bytes)).into_owned()))
    }

    /// Copies the next chunk of the current line into `window`, stopping
    /// after a terminator or when the window is full.
    fn serve(&mut self, window: &mut [u8]) -> Result<(Fill, usize), CollectError> {
        if self.at_eof {
            return Ok((Fill::Eof, 0));
        }
        let available = self.reader.fill_buf()?;
        if available.is_empty() {
            self.at_eof = true;
            self.mid_line = false;
            return Ok((Fill::Eof, 0));
        }
        let len = match available.iter().position(|&b| b == b'\n') {
            Some(nl) if nl < window.len() => nl + 1,
            _ => available.len().min(window.len()),
        };
        window[..len].copy_from_slice(&available[..len]);
        self.reader.consume(len);

        if window[..len].ends_with(b"\n") {
            self.mid_line = false;
            return Ok((Fill::Continue, len));
        }
        if self.reader.fill_buf()?.is_empty() {
            self.at_eof = true;
            self.mid_line = false;
            return Ok((Fill::Last, len));
        }
        self.mid_line = true;
        Ok((Fill::Partial, len))
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn fill(&mut self, window: &mut [u8]) -> Result<(Fill, usize), CollectError> {
        let line_start = !self.mid_line;
        let (status, len) = self.serve(window)?;
        if !line_start {
            return Ok((status, len));
        }
        match (&window[..len], status) {
            (b".\n", _) | (b".", Fill::Last) => Ok((Fill::Eof, 0)),
            // The terminator may arrive with the reader's next refill.
            (b".", Fill::Partial) if self.reader.fill_buf()?.first() == Some(&b'\n') => {
                self.reader.consume(1);
                self.mid_line = false;
                Ok((Fill::Eof, 0))
            }
            _ => Ok((status, len)),
        }
    }
}
