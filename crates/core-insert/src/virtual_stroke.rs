//! Literal application of strokes the interpreter owes the buffer itself.
//!
//! Most plain typing is performed by the host widget after the interpreter
//! declines the stroke. A stroke carrying the synthetic bit has no widget
//! behind it, so the edit happens here: backspace, return and printable
//! characters get the same treatment the widget would give them, except
//! inserts go through [`core_text::TextBuffer::smart_insert`] so replayed
//! line breaks pick up indentation.

use core_editor::Editor;
use core_keys::{KeyStroke, SpecialKey};
use tracing::trace;

/// Apply one stroke directly to the buffer.
///
/// Strokes with no literal meaning (modifier chords, navigation keys) are
/// dropped; dropping is the correct host-side behavior for a stroke that was
/// already reported as consumed.
pub fn apply(editor: &mut dyn Editor, stroke: KeyStroke) {
    if let Some(c) = stroke.printable() {
        let mut buf = [0u8; 4];
        insert(editor, c.encode_utf8(&mut buf));
    } else if stroke.is_special(SpecialKey::Backspace) {
        backspace(editor);
    } else if stroke.is_special(SpecialKey::Return) {
        let ending = editor.options().line_ending;
        insert(editor, ending.as_str());
    } else if stroke.is_special(SpecialKey::Tab) {
        insert(editor, "\t");
    } else {
        trace!(target: "insert.virtual", stroke = %stroke, "stroke_dropped");
    }
}

fn insert(editor: &mut dyn Editor, text: &str) {
    let len = editor.buffer().len();
    let offset = editor.cursor().position().clamp_to(len).offset();
    let inserted = editor.buffer_mut().smart_insert(offset, text);
    let target = editor.cursor().position_at(offset + inserted);
    editor.cursor_mut().set_position(target);
    trace!(target: "insert.virtual", offset, inserted, "virtual_insert");
}

/// Single-character delete behind the cursor. At a line start the deleted
/// span is the whole line break, which joins the line onto its predecessor
/// even when the break is two characters wide.
fn backspace(editor: &mut dyn Editor) {
    let len = editor.buffer().len();
    let pos = editor.cursor().position().clamp_to(len).offset();
    if pos == 0 {
        trace!(target: "insert.virtual", "backspace_at_buffer_start");
        return;
    }
    let line = editor.buffer().line_info_of(pos);
    let target = if pos > line.start {
        pos - 1
    } else {
        editor.buffer().line_info_of(line.start - 1).end
    };
    editor.buffer_mut().replace(target, pos - target, "");
    let new_pos = editor.cursor().position_at(target);
    editor.cursor_mut().set_position(new_pos);
    trace!(target: "insert.virtual", from = pos, to = target, "virtual_backspace");
}
