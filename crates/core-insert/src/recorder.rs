//! Capture of a finished insertion for registers and repetition.
//!
//! When a session ends, the span between where insertion started and where
//! the cursor stands now is the typed text. It goes into the last-edit
//! register, and a replay command is assembled that reproduces the whole
//! session: first the repetition of the command that opened it (if it has
//! one), then a paste of the captured span. The replay itself is excluded
//! from dot-repeat recording so that running it never re-records itself.

use std::sync::Arc;

use core_editor::{Command, Editor, RegisterName, dont_repeat, seq, with_count};
use core_text::Position;
use tracing::trace;

use crate::commands::{PasteBeforeCursor, SwitchRegister};

/// Record the span from `start` to the current cursor.
///
/// Both bounds are clamped to the buffer; if the cursor ended up left of
/// `start` the span is read in buffer order. Returns the captured text and
/// the single-shot replay command. The stored last insertion is the same
/// replay multiplied by `count` when the session was counted.
pub fn capture_since(
    editor: &mut dyn Editor,
    initiating: Option<&Arc<dyn Command>>,
    start: Position,
    count: u32,
) -> (String, Arc<dyn Command>) {
    let len = editor.buffer().len();
    let start = start.clamp_to(len).offset();
    let end = editor.cursor().position().clamp_to(len).offset();
    let (lo, hi) = if end < start { (end, start) } else { (start, end) };
    let text = editor.buffer().text(lo, hi - lo);
    trace!(
        target: "insert.session",
        start = lo,
        end = hi,
        chars = text.chars().count(),
        "typed_text_captured"
    );
    editor
        .registers_mut()
        .set_content(RegisterName::LastEdit, text.clone());

    let mut steps: Vec<Arc<dyn Command>> = Vec::new();
    if let Some(initiating) = initiating
        && let Some(repetition) = initiating.repetition()
    {
        steps.push(repetition);
    }
    steps.push(Arc::new(SwitchRegister(RegisterName::LastEdit)));
    steps.push(Arc::new(PasteBeforeCursor));
    let replay = dont_repeat(seq(steps));
    editor
        .registers_mut()
        .set_last_insertion(with_count(replay.clone(), count));
    (text, replay)
}
