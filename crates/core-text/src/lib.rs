//! Buffer-side collaborators: positions, line metadata, and the rope-backed
//! reference implementation of the `TextBuffer` editing surface.

use std::fmt;

use anyhow::Result;
use ropey::Rope;

/// A location in a buffer, expressed as a character offset from the start.
///
/// Positions are plain handles: they stay meaningful only as long as the
/// buffer they were taken from has not shrunk past them. Callers that hold a
/// position across edits re-validate with [`Position::clamp_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position(usize);

impl Position {
    pub fn new(offset: usize) -> Self {
        Self(offset)
    }

    pub fn offset(self) -> usize {
        self.0
    }

    /// Advance by `n` characters.
    pub fn forward(self, n: usize) -> Self {
        Self(self.0 + n)
    }

    /// Retreat by `n` characters, stopping at the buffer start.
    pub fn backward(self, n: usize) -> Self {
        Self(self.0.saturating_sub(n))
    }

    /// Pull the position back inside a buffer of `len` characters.
    pub fn clamp_to(self, len: usize) -> Self {
        Self(self.0.min(len))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for one buffer line. `start` is the offset of the line's first
/// character; `end` is the offset just past its last content character, the
/// line break excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    pub number: usize,
    pub start: usize,
    pub end: usize,
}

impl LineInfo {
    /// Content length in characters, line break excluded.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The editing surface the interpreter works through. Implementations clamp
/// out-of-range offsets instead of failing; a position that drifted past the
/// end after an external edit is recoverable, not a programming error.
pub trait TextBuffer {
    /// Total length in characters.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read `len` characters starting at `start`, clamped to the buffer end.
    fn text(&self, start: usize, len: usize) -> String;

    /// Replace `len` characters starting at `start` with `replacement`.
    /// A zero `len` is a plain insertion, an empty `replacement` a deletion.
    fn replace(&mut self, start: usize, len: usize, replacement: &str);

    /// Number of lines; an empty buffer still has one.
    fn line_count(&self) -> usize;

    /// Metadata for the line containing `offset`. An offset past the buffer
    /// end reports the last line.
    fn line_info_of(&self, offset: usize) -> LineInfo;

    /// Metadata for a line by index.
    fn line_info(&self, line: usize) -> Option<LineInfo>;

    /// Insert `text` at `offset`, continuing the current line's indentation
    /// when the text ends in a line break. Returns the number of characters
    /// actually inserted, indentation included.
    fn smart_insert(&mut self, offset: usize, text: &str) -> usize;

    /// Single character at `offset`, if any.
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text(offset, 1).chars().next()
    }
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct RopeBuffer {
    rope: Rope,
    pub name: String,
}

impl RopeBuffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// The whole buffer as an owned `String`.
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    fn clamp_span(&self, start: usize, len: usize) -> (usize, usize) {
        let total = self.rope.len_chars();
        let s = start.min(total);
        let e = s.saturating_add(len).min(total);
        (s, e)
    }

    /// Offset just past the last content character of a line, excluding the
    /// trailing `"\n"` or `"\r\n"`.
    fn line_content_end(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        self.rope.line_to_char(line) + len
    }
}

impl TextBuffer for RopeBuffer {
    fn len(&self) -> usize {
        self.rope.len_chars()
    }

    fn text(&self, start: usize, len: usize) -> String {
        let (s, e) = self.clamp_span(start, len);
        if s >= e {
            return String::new();
        }
        self.rope.slice(s..e).to_string()
    }

    fn replace(&mut self, start: usize, len: usize, replacement: &str) {
        let (s, e) = self.clamp_span(start, len);
        if s < e {
            self.rope.remove(s..e);
        }
        if !replacement.is_empty() {
            self.rope.insert(s, replacement);
        }
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_info_of(&self, offset: usize) -> LineInfo {
        let offset = offset.min(self.rope.len_chars());
        let number = self.rope.char_to_line(offset);
        LineInfo {
            number,
            start: self.rope.line_to_char(number),
            end: self.line_content_end(number),
        }
    }

    fn line_info(&self, line: usize) -> Option<LineInfo> {
        if line >= self.rope.len_lines() {
            return None;
        }
        Some(LineInfo {
            number: line,
            start: self.rope.line_to_char(line),
            end: self.line_content_end(line),
        })
    }

    fn smart_insert(&mut self, offset: usize, text: &str) -> usize {
        let offset = offset.min(self.rope.len_chars());
        let mut inserted = text.chars().count();
        // Indentation is copied from the current line, but only the
        // whitespace that sits before the insertion point.
        let indent: String = if text.ends_with('\n') {
            let info = self.line_info_of(offset);
            let stop = offset.min(info.end);
            self.rope
                .slice(info.start..stop)
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect()
        } else {
            String::new()
        };
        self.rope.insert(offset, text);
        if !indent.is_empty() {
            self.rope.insert(offset + inserted, &indent);
            inserted += indent.chars().count();
        }
        inserted
    }
}
