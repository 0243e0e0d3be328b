//! Soft-tab aware backspace.
//!
//! With `soft_tab_stop` above one, a backspace at the end of a run of spaces
//! removes a whole stop worth of them, the way the spaces were put there by
//! a tab key expanding to spaces. Only plain spaces count; tabs and other
//! whitespace never participate.

use core_editor::Editor;
use tracing::{debug, trace};

/// Delete one soft-tab step ending at `cursor_offset`.
///
/// Examines the run of spaces immediately left of the cursor on the current
/// line. A run shorter than `stop_width` is left alone and `false` is
/// returned so the caller can fall back to a plain single-character
/// backspace. Otherwise the deletion is performed here, the cursor is moved
/// to the start of the removed span, and `true` is returned.
///
/// When the run is an exact multiple of `stop_width` a full stop is removed;
/// otherwise only the remainder, which realigns the cursor to a stop
/// boundary.
pub fn delete_one(editor: &mut dyn Editor, cursor_offset: usize, stop_width: u32) -> bool {
    let stop = stop_width as usize;
    let pos = cursor_offset.min(editor.buffer().len());
    let line = editor.buffer().line_info_of(pos);
    let before = editor.buffer().text(line.start, pos - line.start);
    let run = before.chars().rev().take_while(|c| *c == ' ').count();
    if run < stop {
        trace!(target: "insert.softtab", run, stop, "plain_backspace_fallback");
        return false;
    }
    let to_delete = if run % stop == 0 { stop } else { run % stop };
    editor.buffer_mut().replace(pos - to_delete, to_delete, "");
    let target = editor.cursor().position_at(pos - to_delete);
    editor.cursor_mut().set_position(target);
    debug!(target: "insert.softtab", run, deleted = to_delete, "soft_tab_deleted");
    true
}
