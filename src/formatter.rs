//! Inverse of [`crate::scanner::Scanner`]: re-emits text with a configurable
//! per-call border, prefix, and word-wrapped width, preserving round-trip
//! semantics through escaping and quoting.

use std::io::Write;

use crate::error::Result;

/// Writes text with border/prefix/wrap handling, escaping, and one-line collapse.
pub struct Formatter<W> {
    /// Prefix written at the start of every physical line.
    pub border: String,
    /// Extra prefix written once, between border and text, on the first line.
    pub prefix: String,
    /// Column width to wrap at; `<= 0` means no wrap.
    pub width: i64,

    buffer: String,
    output: W,
}

impl<W: Write> Formatter<W> {
    pub fn new(output: W) -> Self {
        Formatter {
            border: String::new(),
            prefix: String::new(),
            width: 0,
            buffer: String::new(),
            output,
        }
    }

    /// Emits `text` prefixed by `border`/`prefix`, honoring `width`.
    pub fn format(&mut self, text: &str) -> Result<()> {
        let lines = self.split_lines(text);
        if !self.prefix.is_empty() {
            self.output.write_all(self.border.as_bytes())?;
            self.output.write_all(self.prefix.as_bytes())?;
            if self.is_one_quoted_line(&lines) {
                self.output.write_all(b"\"")?;
                self.output.write_all(lines[0].as_bytes())?;
                self.output.write_all(b"\"\n")?;
                return Ok(());
            }
            self.output.write_all(b"\"\"\n")?;
        }
        for line in &lines {
            self.write_line(line)?;
        }
        Ok(())
    }

    /// Emits a bare newline (used to separate entries).
    pub fn break_line(&mut self) -> Result<()> {
        self.output.write_all(b"\n")?;
        Ok(())
    }

    fn split_lines(&self, text: &str) -> Vec<String> {
        if self.prefix.is_empty() {
            text.split('\n').map(str::to_string).collect()
        } else {
            split_after(&escape(text), "\\n")
        }
    }

    fn is_one_quoted_line(&self, lines: &[String]) -> bool {
        if lines.len() != 1 {
            return false;
        }
        if self.width < 1 {
            return true;
        }
        let needed = self.border.len() + self.prefix.len() + 2 + lines[0].len();
        needed as i64 <= self.width
    }

    fn line_len(&self) -> i64 {
        let mut n = self.buffer.len() as i64 + self.border.len() as i64;
        if !self.prefix.is_empty() {
            n += 2;
        }
        n
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        if self.width > 0 {
            for word in split_after(line, " ") {
                if self.line_len() + word.len() as i64 > self.width {
                    self.flush()?;
                }
                self.buffer.push_str(&word);
            }
        } else {
            self.buffer.push_str(line);
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() && self.width > 0 {
            return Ok(());
        }
        if self.buffer.is_empty() && self.prefix.is_empty() {
            self.output
                .write_all(self.border.trim_end_matches(' ').as_bytes())?;
            self.output.write_all(b"\n")?;
            return Ok(());
        }
        self.output.write_all(self.border.as_bytes())?;
        if !self.prefix.is_empty() {
            self.output.write_all(b"\"")?;
        }
        self.output.write_all(self.buffer.as_bytes())?;
        if !self.prefix.is_empty() {
            self.output.write_all(b"\"")?;
        }
        self.output.write_all(b"\n")?;
        self.buffer.clear();
        Ok(())
    }
}

/// Escapes `\`, `"`, `\n`, `\r`, `\t` for embedding inside a quoted PO string.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Splits `s` after each occurrence of `sep`, keeping `sep` attached to the
/// preceding piece (mirrors Go's `strings.SplitAfter`: a trailing occurrence
/// of `sep` produces a final empty piece).
fn split_after(s: &str, sep: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut start = 0;
    while let Some(idx) = s[start..].find(sep) {
        let end = start + idx + sep.len();
        result.push(s[start..end].to_string());
        start = end;
    }
    result.push(s[start..].to_string());
    result
}
