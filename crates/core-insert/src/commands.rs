//! Stock commands reachable from insert mode.
//!
//! These are the operations behind the default control chords plus the
//! building blocks of the replay command assembled when a session ends. All
//! of them go through the [`Editor`] seams only, so they run identically
//! against a real host and the in-process editor used by the tests.

use core_editor::{Command, CommandError, Editor, RegisterName};
use core_text::TextBuffer;

/// Make the named register the active paste source.
pub struct SwitchRegister(pub RegisterName);

impl Command for SwitchRegister {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        editor.registers_mut().set_active(self.0);
        Ok(())
    }
}

/// Paste the active register in front of the cursor, leaving the cursor at
/// the end of the pasted text. The active register resets to the unnamed
/// one afterwards. An empty register pastes nothing and is not an error.
///
/// Pasting is a verbatim splice, not a smart insert; replayed text must come
/// out exactly as it was captured.
pub struct PasteBeforeCursor;

impl Command for PasteBeforeCursor {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        let name = editor.registers().active();
        let text = editor.registers().content(name);
        editor.registers_mut().set_active(RegisterName::Unnamed);
        let Some(text) = text else {
            return Ok(());
        };
        insert_verbatim(editor, &text);
        Ok(())
    }
}

/// Insert the text of the most recent insertion session at the cursor.
pub struct PasteLastInsert;

impl Command for PasteLastInsert {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        let Some(text) = editor.registers().content(RegisterName::LastEdit) else {
            return Err(CommandError::NothingToRepeat);
        };
        insert_verbatim(editor, &text);
        Ok(())
    }
}

/// Delete from the start of the word left of the cursor up to the cursor.
///
/// Whitespace between the cursor and the word is removed too, and the scan
/// crosses line breaks. Word characters and punctuation form separate runs,
/// so deleting behind `foo();` takes the `();` and leaves `foo`.
pub struct DeleteWordBefore;

impl Command for DeleteWordBefore {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        let len = editor.buffer().len();
        let pos = editor.cursor().position().clamp_to(len).offset();
        let start = word_start_before(editor.buffer(), pos);
        if start == pos {
            return Ok(());
        }
        editor.buffer_mut().replace(start, pos - start, "");
        let target = editor.cursor().position_at(start);
        editor.cursor_mut().set_position(target);
        Ok(())
    }
}

/// Copy the character in the same column of an adjacent line to the cursor.
pub struct InsertAdjacentChar {
    below: bool,
}

impl InsertAdjacentChar {
    pub fn line_below() -> Self {
        Self { below: true }
    }

    pub fn line_above() -> Self {
        Self { below: false }
    }
}

impl Command for InsertAdjacentChar {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        let len = editor.buffer().len();
        let pos = editor.cursor().position().clamp_to(len).offset();
        let line = editor.buffer().line_info_of(pos);
        let column = pos - line.start;
        let direction = if self.below { "below" } else { "above" };
        let neighbor = if self.below {
            editor.buffer().line_info(line.number + 1)
        } else {
            line.number
                .checked_sub(1)
                .and_then(|n| editor.buffer().line_info(n))
        };
        let Some(neighbor) = neighbor else {
            return Err(CommandError::Failed(format!(
                "no line {direction} to copy from"
            )));
        };
        let source = neighbor.start + column;
        let copied = if source < neighbor.end {
            editor.buffer().char_at(source)
        } else {
            None
        };
        let Some(copied) = copied else {
            return Err(CommandError::Failed(format!(
                "no character {direction} the cursor"
            )));
        };
        let mut buf = [0u8; 4];
        editor
            .buffer_mut()
            .replace(pos, 0, copied.encode_utf8(&mut buf));
        let target = editor.cursor().position_at(pos + 1);
        editor.cursor_mut().set_position(target);
        Ok(())
    }
}

/// Advance the cursor by a fixed character count, crossing line breaks,
/// clamped to the end of the buffer. Used by hosts to build append-style
/// entries into insert mode; a surrounding count multiplies the session,
/// not this motion.
pub struct MoveRightOverLineBreak(pub usize);

impl Command for MoveRightOverLineBreak {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        let len = editor.buffer().len();
        let target = editor.cursor().position().forward(self.0).clamp_to(len);
        editor.cursor_mut().set_position(target);
        Ok(())
    }

    fn count_ignoring(&self) -> bool {
        true
    }
}

fn insert_verbatim(editor: &mut dyn Editor, text: &str) {
    if text.is_empty() {
        return;
    }
    let len = editor.buffer().len();
    let offset = editor.cursor().position().clamp_to(len).offset();
    editor.buffer_mut().replace(offset, 0, text);
    let target = editor.cursor().position_at(offset + text.chars().count());
    editor.cursor_mut().set_position(target);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Punct,
}

fn class_of(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// Offset where a backward word motion from `offset` lands: skip whitespace,
/// then one run of same-class characters.
fn word_start_before(buffer: &dyn TextBuffer, offset: usize) -> usize {
    let mut i = offset.min(buffer.len());
    while i > 0 {
        match buffer.char_at(i - 1) {
            Some(c) if c.is_whitespace() => i -= 1,
            _ => break,
        }
    }
    if i == 0 {
        return 0;
    }
    let class = match buffer.char_at(i - 1) {
        Some(c) => class_of(c),
        None => return i,
    };
    while i > 0 {
        match buffer.char_at(i - 1) {
            Some(c) if !c.is_whitespace() && class_of(c) == class => i -= 1,
            _ => break,
        }
    }
    i
}
