//! Two-level state machine: classify each input line by `(border, prefix)`
//! using the configured [`Starter`] set, then accrete continuation lines
//! (quoted string continuations or comment continuations) into one block.

use std::io::BufRead;

use crate::error::{Error, Result};
use crate::starter::Starter;

/// Produces a stream of `(border, prefix, text)` blocks from a reader.
///
/// A single `Scanner` is not shared across threads; parallel work uses one
/// instance per file.
pub struct Scanner<R> {
    /// Permitted starters, tried in order; first match wins.
    pub starters: Vec<Box<dyn Starter>>,
    /// Border of the most recently read block.
    pub border: String,
    /// Prefix of the most recently read block.
    pub prefix: String,
    /// Decoded text of the most recently read block.
    pub buffer: String,
    /// Current line number (1-based).
    pub line: usize,

    current: Option<String>,
    lines: std::io::Lines<R>,
}

impl<R: BufRead> Scanner<R> {
    /// Creates a scanner reading from `r`. Starters must be assigned before
    /// the first call to [`Scanner::scan`].
    pub fn new(r: R) -> Self {
        Scanner {
            starters: Vec::new(),
            border: String::new(),
            prefix: String::new(),
            buffer: String::new(),
            line: 0,
            // Mirrors a not-yet-scanned `bufio.Scanner`, whose `Text()` reads
            // as "" before the first `Scan()` call.
            current: Some(String::new()),
            lines: r.lines(),
        }
    }

    /// True if the lookahead line (the one that will start the next block)
    /// is blank. This is how entry boundaries are detected.
    pub fn is_blank_line(&self) -> bool {
        matches!(self.current.as_deref(), Some(""))
    }

    fn advance(&mut self) -> Result<bool> {
        match self.lines.next() {
            Some(Ok(text)) => {
                self.current = Some(text);
                Ok(true)
            }
            Some(Err(e)) => Err(Error::Io(e)),
            None => {
                self.current = None;
                Ok(false)
            }
        }
    }

    /// Advances one block. On success, `border`/`prefix`/`buffer` hold the
    /// tag and decoded text of the block. Returns an EOF-flagged error
    /// ([`Error::is_eof`]) when the underlying reader drains. This is a
    /// signal, not a failure; `border`/`prefix`/`buffer` are still valid for
    /// the final block in that case. On unexpected grammar, fails with a
    /// [`Error::Lexical`] bearing the current line number.
    pub fn scan(&mut self) -> Result<()> {
        self.border.clear();
        self.prefix.clear();
        self.buffer.clear();

        self.skip_blank_lines()?;
        self.start()?;

        let skip = self.border.len() + self.prefix.len();
        self.read_line_into_buffer(skip)?;

        loop {
            if !self.advance()? {
                return Err(Error::eof());
            }
            self.line += 1;

            let text = self.current.as_deref().unwrap_or("");
            let continues = if self.prefix.is_empty() {
                !text.is_empty() && text.starts_with(self.border.as_str())
            } else {
                text.starts_with(&format!("{}\"", self.border))
            };
            if !continues {
                return Ok(());
            }
            self.read_line_into_buffer(self.border.len())?;
        }
    }

    fn skip_blank_lines(&mut self) -> Result<()> {
        loop {
            match self.current.as_deref() {
                Some("") => {
                    self.line += 1;
                    if !self.advance()? {
                        return Err(Error::eof());
                    }
                }
                Some(_) => return Ok(()),
                None => return Err(Error::eof()),
            }
        }
    }

    fn start(&mut self) -> Result<()> {
        let text = self.current.clone().unwrap_or_default();
        for starter in &self.starters {
            if let Some((border, prefix)) = starter.extract(&text) {
                self.border = border;
                self.prefix = prefix;
                return Ok(());
            }
        }
        Err(Error::lexical(
            self.line,
            format!("no starter is matched line {}", self.line),
        ))
    }

    fn read_line_into_buffer(&mut self, skip: usize) -> Result<()> {
        let text = self.current.clone().unwrap_or_default();
        let payload = &text[skip..];
        if self.prefix.is_empty() {
            if !self.buffer.is_empty() {
                self.buffer.push('\n');
            }
            self.buffer.push_str(payload);
        } else {
            let decoded = decode_quoted(payload.trim(), self.line)?;
            self.buffer.push_str(&decoded);
        }
        Ok(())
    }
}

/// Decodes a double-quoted PO string, supporting `\\`, `\n`, `\r`, `\t`, `\"`.
fn decode_quoted(text: &str, line: usize) -> Result<String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| Error::lexical(line, format!("invalid quoted string {text:?}")))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}
