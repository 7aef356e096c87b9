/// 1-based inclusive line interval, `1 <= start <= end <= line_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn single(line: usize) -> Self {
        Self { start: line, end: line }
    }
}

/// Result of stripping the address prefix off a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub range: Range,
    /// Whether any address text was present.
    pub explicit: bool,
    pub rest: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressError;

/// Resolves the address prefix of `input` against a buffer of `line_count`
/// lines whose current line is the 0-based `current`.
///
/// With no address the range is the current line and `explicit` is false.
pub fn parse_range(
    input: &str,
    current: usize,
    line_count: usize,
) -> Result<Resolved<'_>, AddressError> {
    let current = current + 1;
    let mut parser = Parser { s: input, pos: 0, current, last: line_count };

    if parser.eat('%') {
        return parser.finish(Range { start: 1, end: line_count }, true);
    }

    let first = parser.address()?;
    if parser.eat(',') {
        let second = parser.address()?;
        let start = first.unwrap_or(1);
        let end = second.unwrap_or(line_count);
        return parser.finish(Range { start, end }, true);
    }

    match first {
        Some(line) => parser.finish(Range::single(line), true),
        None => parser.finish(Range::single(current), false),
    }
}

struct Parser<'a> {
    s: &'a str,
    pos: usize,
    current: usize,
    last: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch as u8) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Option<i64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        // Absurdly long digit strings saturate and fail the bounds check.
        Some(self.s[start..self.pos].parse().unwrap_or(i64::MAX))
    }

    /// `base? offset*`; `None` when nothing was consumed.
    fn address(&mut self) -> Result<Option<usize>, AddressError> {
        let base = match self.peek() {
            Some(b'.') => {
                self.pos += 1;
                Some(self.current as i64)
            }
            Some(b'$') => {
                self.pos += 1;
                Some(self.last as i64)
            }
            Some(b'0'..=b'9') => self.number(),
            _ => None,
        };

        let mut value = base;
        loop {
            let sign = match self.peek() {
                Some(b'+') => 1,
                Some(b'-') => -1,
                _ => break,
            };
            self.pos += 1;
            let step = self.number().unwrap_or(1);
            let from = value.unwrap_or(self.current as i64);
            value = Some(from.saturating_add(sign * step));
        }

        match value {
            None => Ok(None),
            Some(line) if line >= 1 && line <= self.last as i64 => Ok(Some(line as usize)),
            Some(_) => Err(AddressError),
        }
    }

    fn finish(self, range: Range, explicit: bool) -> Result<Resolved<'a>, AddressError> {
        if range.start < 1 || range.end > self.last || range.end < range.start {
            return Err(AddressError);
        }
        Ok(Resolved { range, explicit, rest: &self.s[self.pos..] })
    }
}
