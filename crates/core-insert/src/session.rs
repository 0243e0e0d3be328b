//! The insert-mode session and its key-stroke dispatch.
//!
//! [`InsertInterpreter`] owns the compiled binding table and the state of the
//! current session: where insertion started, the command that opened the
//! session, the remaining repeat count, whether the undo history is locked,
//! and any strokes buffered while a multi-stroke binding is still ambiguous.
//!
//! Dispatch order for a raw stroke:
//! 1. binding lookup (skipped for synthetic strokes),
//! 2. exit keys,
//! 3. the paste-register detour,
//! 4. disallowed special keys, which interrupt the typed run,
//! 5. soft-tab backspace,
//! 6. literal application of synthetic strokes.
//! Anything left over is declined so the host widget performs the edit.

use std::sync::Arc;

use core_editor::{
    CaretStyle, Command, CommandError, Editor, LAST_INSERT_MARK, ModeKind, SwitchHints,
};
use core_keymap::{Binding, KeyStrokeTrie, Lookup};
use core_keys::{KeyCode, KeyStroke, SpecialKey};
use core_text::Position;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{bindings, recorder, soft_tab, virtual_stroke};

/// How an insert session is opened.
#[derive(Clone)]
pub struct EnterSpec {
    /// Command executed as part of entering, such as an open-line or an
    /// append motion. Its repetition becomes part of the session replay.
    pub initiating: Option<Arc<dyn Command>>,
    /// Session multiplier; the typed text is inserted this many times in
    /// total when the session ends.
    pub count: u32,
    /// False when returning from a detour: the suspended session resumes
    /// instead of a fresh one starting.
    pub preserve_state: bool,
    /// False suppresses the undo transaction even when atomic insert is
    /// configured on.
    pub lock_history: bool,
}

impl Default for EnterSpec {
    fn default() -> Self {
        Self {
            initiating: None,
            count: 1,
            preserve_state: true,
            lock_history: true,
        }
    }
}

/// How an insert session is closed.
#[derive(Debug, Clone, Copy)]
pub struct LeaveSpec {
    /// Step the cursor one character left afterwards, the convention when
    /// returning to normal mode.
    pub move_cursor_left: bool,
    /// False when leaving for a detour: no capture, no repeat, no
    /// transaction close; the session stays suspended.
    pub finalize: bool,
}

impl Default for LeaveSpec {
    fn default() -> Self {
        Self {
            move_cursor_left: true,
            finalize: true,
        }
    }
}

/// Live state of one insertion session.
pub struct InsertSession {
    start_position: Position,
    pending_command: Option<Arc<dyn Command>>,
    repeat_count: u32,
    history_locked: bool,
    pending_strokes: SmallVec<[KeyStroke; 4]>,
}

impl Default for InsertSession {
    fn default() -> Self {
        Self {
            start_position: Position::new(0),
            pending_command: None,
            repeat_count: 1,
            history_locked: false,
            pending_strokes: SmallVec::new(),
        }
    }
}

impl InsertSession {
    /// Offset where the current typed run began.
    pub fn start_position(&self) -> Position {
        self.start_position
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// True while this session holds the undo history locked.
    pub fn history_locked(&self) -> bool {
        self.history_locked
    }

    /// Strokes buffered towards a multi-stroke binding.
    pub fn pending_strokes(&self) -> &[KeyStroke] {
        &self.pending_strokes
    }
}

enum TrieStep {
    Hold,
    Fire(Arc<dyn Command>),
    FireAndFlush(Arc<dyn Command>, usize),
    Dead,
    FallThrough,
}

enum StrokeOutcome {
    Consumed,
    NotConsumed,
    Exited,
}

/// Key-stroke interpreter for insert mode.
pub struct InsertInterpreter {
    bindings: KeyStrokeTrie<Arc<dyn Command>>,
    session: InsertSession,
}

impl Default for InsertInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertInterpreter {
    /// Interpreter with the stock chords only.
    pub fn new() -> Self {
        Self::with_bindings(Vec::new())
    }

    /// Interpreter with host bindings layered over the stock chords. Host
    /// entries win on conflict.
    pub fn with_bindings(host: Vec<Binding<Arc<dyn Command>>>) -> Self {
        Self {
            bindings: bindings::build_trie(host),
            session: InsertSession::default(),
        }
    }

    pub fn session(&self) -> &InsertSession {
        &self.session
    }

    /// Open an insert session.
    ///
    /// With `preserve_state` set, the undo transaction is opened (when
    /// configured and `lock_history` allows) and the session bookkeeping is
    /// reset before the initiating command runs; the capture start is taken
    /// from wherever that command left the cursor. Repainting is suspended
    /// around the command. On failure the transaction this call opened is
    /// closed again and the error propagates.
    pub fn enter(&mut self, editor: &mut dyn Editor, spec: EnterSpec) -> Result<(), CommandError> {
        debug!(
            target: "insert.session",
            count = spec.count,
            preserve_state = spec.preserve_state,
            lock_history = spec.lock_history,
            initiating = spec.initiating.is_some(),
            "session_begin"
        );
        let mut opened = false;
        if spec.preserve_state {
            if spec.lock_history && editor.options().atomic_insert {
                editor.history().begin_compound();
                editor.history().lock();
                self.session.history_locked = true;
                opened = true;
            }
            self.session.repeat_count = spec.count.max(1);
            self.session.pending_command = None;
            self.session.pending_strokes.clear();
        }
        editor.ui().set_repaint(false);
        let outcome = match &spec.initiating {
            Some(command) => command.execute(editor),
            None => Ok(()),
        };
        editor.ui().set_repaint(true);
        if let Err(error) = outcome {
            if opened {
                editor.history().unlock();
                editor.history().end_compound();
                self.session.history_locked = false;
            }
            return Err(error);
        }
        if spec.preserve_state {
            self.session.pending_command = spec.initiating;
            let len = editor.buffer().len();
            self.session.start_position = editor.cursor().position().clamp_to(len);
        }
        editor.cursor_mut().set_caret_style(CaretStyle::Bar);
        Ok(())
    }

    /// Dispatch one stroke. Returns whether the stroke was consumed; a
    /// declined stroke is the host widget's to apply.
    pub fn handle_key(&mut self, editor: &mut dyn Editor, stroke: KeyStroke) -> bool {
        trace!(
            target: "insert.session",
            stroke = %stroke,
            synthetic = stroke.synthetic,
            "stroke_received"
        );
        if !stroke.synthetic
            && let Some(consumed) = self.try_bindings(editor, stroke)
        {
            return consumed;
        }
        !matches!(
            self.dispatch_fallback(editor, stroke),
            StrokeOutcome::NotConsumed
        )
    }

    /// Close the current session.
    ///
    /// Captures the typed span, runs the replay for any remaining count,
    /// retreats the cursor, closes the undo transaction this session opened
    /// and records the last-insert mark. With `finalize` off none of that
    /// happens; the session stays suspended for a detour return.
    pub fn leave(&mut self, editor: &mut dyn Editor, spec: LeaveSpec) {
        if !spec.finalize {
            debug!(target: "insert.session", "session_suspended");
            return;
        }
        let count = self.session.repeat_count;
        debug!(
            target: "insert.session",
            count,
            move_cursor_left = spec.move_cursor_left,
            "session_end"
        );
        let (_, replay) = recorder::capture_since(
            editor,
            self.session.pending_command.as_ref(),
            self.session.start_position,
            count,
        );
        for _ in 1..count {
            if let Err(error) = replay.execute(editor) {
                editor.ui().report_error(&error.to_string());
                break;
            }
        }
        if spec.move_cursor_left
            && let Err(error) = retreat_one(editor)
        {
            editor.ui().report_error(&error.to_string());
        }
        if self.session.history_locked {
            editor.history().unlock();
            editor.history().end_compound();
        }
        let end = editor.cursor().position();
        editor.cursor_mut().set_mark(LAST_INSERT_MARK, end);
        self.session = InsertSession::default();
    }

    /// Feed the stroke into the binding table. `None` means the table has no
    /// use for it and ordinary dispatch should see it instead.
    fn try_bindings(&mut self, editor: &mut dyn Editor, stroke: KeyStroke) -> Option<bool> {
        if self.bindings.is_empty() {
            return None;
        }
        self.session.pending_strokes.push(stroke);
        let step = match self.bindings.resolve(&self.session.pending_strokes) {
            Lookup::Partial => TrieStep::Hold,
            Lookup::Bound {
                consumed,
                value,
                extensible,
            } => {
                if consumed == self.session.pending_strokes.len() {
                    if extensible {
                        // A longer binding is still reachable; keep waiting.
                        TrieStep::Hold
                    } else {
                        TrieStep::Fire(Arc::clone(value))
                    }
                } else {
                    TrieStep::FireAndFlush(Arc::clone(value), consumed)
                }
            }
            Lookup::NoMatch => {
                if self.session.pending_strokes.len() == 1 {
                    TrieStep::FallThrough
                } else {
                    TrieStep::Dead
                }
            }
        };
        match step {
            TrieStep::Hold => {
                trace!(
                    target: "insert.session",
                    pending = self.session.pending_strokes.len(),
                    "binding_pending"
                );
                Some(true)
            }
            TrieStep::Fire(command) => {
                self.session.pending_strokes.clear();
                run_command(editor, &command);
                Some(true)
            }
            TrieStep::FireAndFlush(command, consumed) => {
                let leftover: SmallVec<[KeyStroke; 4]> =
                    self.session.pending_strokes.drain(consumed..).collect();
                self.session.pending_strokes.clear();
                run_command(editor, &command);
                Some(self.replay_leftover(editor, leftover))
            }
            TrieStep::Dead => {
                let leftover: SmallVec<[KeyStroke; 4]> =
                    self.session.pending_strokes.drain(..).collect();
                Some(self.replay_leftover(editor, leftover))
            }
            TrieStep::FallThrough => {
                self.session.pending_strokes.clear();
                None
            }
        }
    }

    /// Re-dispatch strokes that were buffered towards a binding that cannot
    /// complete anymore. All but the last were already reported consumed, so
    /// an unclaimed one is applied literally here; the last stroke is the
    /// current arrival and its verdict is returned to the host. A replayed
    /// exit aborts whatever follows.
    fn replay_leftover(
        &mut self,
        editor: &mut dyn Editor,
        strokes: SmallVec<[KeyStroke; 4]>,
    ) -> bool {
        trace!(
            target: "insert.session",
            count = strokes.len(),
            "buffered_strokes_replayed"
        );
        let mut last_consumed = true;
        let total = strokes.len();
        for (i, stroke) in strokes.into_iter().enumerate() {
            if i + 1 == total {
                last_consumed = self.handle_key(editor, stroke);
            } else {
                match self.dispatch_fallback(editor, stroke) {
                    StrokeOutcome::Exited => {
                        debug!(
                            target: "insert.session",
                            dropped = total - i - 1,
                            "replay_aborted_on_mode_exit"
                        );
                        return true;
                    }
                    StrokeOutcome::NotConsumed => {
                        virtual_stroke::apply(editor, stroke.into_synthetic());
                    }
                    StrokeOutcome::Consumed => {}
                }
            }
        }
        last_consumed
    }

    /// Dispatch steps two through six; the binding table has already passed.
    fn dispatch_fallback(&mut self, editor: &mut dyn Editor, stroke: KeyStroke) -> StrokeOutcome {
        if is_exit(stroke) {
            self.leave(editor, LeaveSpec::default());
            editor.modes().switch_mode(
                ModeKind::Normal,
                SwitchHints {
                    preserve_state: true,
                    finalize: false,
                },
            );
            if editor.options().disable_input_method {
                editor.ui().disable_input_method();
            }
            return StrokeOutcome::Exited;
        }
        if stroke.is_ctrl('r') {
            debug!(target: "insert.session", "register_detour_requested");
            editor.modes().switch_mode(
                ModeKind::PasteRegister,
                SwitchHints {
                    preserve_state: false,
                    finalize: false,
                },
            );
            return StrokeOutcome::NotConsumed;
        }
        if !allowed(stroke) {
            self.interrupt(editor, stroke);
            return StrokeOutcome::NotConsumed;
        }
        if stroke.is_special(SpecialKey::Backspace)
            && let Some(stop) = editor.options().soft_tab_effective()
        {
            let cursor = editor.cursor().position().offset();
            if soft_tab::delete_one(editor, cursor, stop) {
                return StrokeOutcome::Consumed;
            }
        }
        if stroke.synthetic {
            virtual_stroke::apply(editor, stroke);
            return StrokeOutcome::Consumed;
        }
        StrokeOutcome::NotConsumed
    }

    /// A disallowed key breaks the typed run: the capture restarts at the
    /// cursor, the count is forfeited, and when a transaction is open it is
    /// closed and a fresh one opened so the two runs undo separately.
    fn interrupt(&mut self, editor: &mut dyn Editor, stroke: KeyStroke) {
        debug!(target: "insert.session", stroke = %stroke, "typed_run_interrupted");
        let len = editor.buffer().len();
        self.session.start_position = editor.cursor().position().clamp_to(len);
        self.session.repeat_count = 1;
        if self.session.history_locked {
            let history = editor.history();
            history.unlock();
            history.end_compound();
            history.begin_compound();
            history.lock();
        }
    }
}

fn run_command(editor: &mut dyn Editor, command: &Arc<dyn Command>) {
    debug!(target: "insert.session", "binding_fired");
    if let Err(error) = command.execute(editor) {
        editor.ui().report_error(&error.to_string());
    }
}

/// One character left, bounded by the current line.
fn retreat_one(editor: &mut dyn Editor) -> Result<(), CommandError> {
    let len = editor.buffer().len();
    let pos = editor.cursor().position().clamp_to(len);
    let line = editor.buffer().line_info_of(pos.offset());
    if pos.offset() <= line.start {
        return Err(CommandError::AtBoundary);
    }
    let target = editor.cursor().position_at(pos.offset() - 1);
    editor.cursor_mut().set_position(target);
    Ok(())
}

fn is_exit(stroke: KeyStroke) -> bool {
    stroke.is_special(SpecialKey::Esc) || stroke.is_ctrl('c')
}

/// Special keys that may pass through to the widget without breaking the
/// typed run.
fn allowed(stroke: KeyStroke) -> bool {
    match stroke.code {
        KeyCode::Named(key) => matches!(
            key,
            SpecialKey::Backspace | SpecialKey::Delete | SpecialKey::Return | SpecialKey::Tab
        ),
        KeyCode::Char(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_editor::{HistoryEvent, LocalEditor, RegisterName};
    use pretty_assertions::assert_eq;

    struct FailsToOpen;

    impl Command for FailsToOpen {
        fn execute(&self, _editor: &mut dyn Editor) -> Result<(), CommandError> {
            Err(CommandError::Failed("open failed".into()))
        }
    }

    fn fresh(content: &str, cursor: usize) -> (LocalEditor, InsertInterpreter) {
        let mut editor = LocalEditor::new(content).unwrap();
        let target = editor.cursor().position_at(cursor);
        editor.cursor_mut().set_position(target);
        (editor, InsertInterpreter::new())
    }

    #[test]
    fn enter_opens_a_transaction_and_captures_the_start() {
        let (mut ed, mut interp) = fresh("abc", 2);
        interp.enter(&mut ed, EnterSpec::default()).unwrap();
        assert!(interp.session().history_locked());
        assert_eq!(interp.session().start_position().offset(), 2);
        assert_eq!(ed.cursor().caret_style(), CaretStyle::Bar);
        assert_eq!(
            ed.history_log().events(),
            &[HistoryEvent::Begin, HistoryEvent::Lock]
        );
        // Repaint was suspended and restored around the (absent) command.
        assert_eq!(ed.ui_log().repaint_toggles(), &[false, true]);
    }

    #[test]
    fn failed_initiating_command_rolls_the_transaction_back() {
        let (mut ed, mut interp) = fresh("", 0);
        let spec = EnterSpec {
            initiating: Some(Arc::new(FailsToOpen)),
            ..EnterSpec::default()
        };
        let err = interp.enter(&mut ed, spec).unwrap_err();
        assert!(err.to_string().contains("open failed"));
        assert!(!interp.session().history_locked());
        assert_eq!(ed.history_log().depth(), 0);
        assert!(!ed.history_log().is_locked());
        // Repaint must be back on even on the failure path.
        assert!(ed.ui_log().repaint_enabled());
    }

    #[test]
    fn detour_reentry_executes_but_preserves_the_session() {
        let (mut ed, mut interp) = fresh("", 0);
        interp
            .enter(
                &mut ed,
                EnterSpec {
                    count: 3,
                    ..EnterSpec::default()
                },
            )
            .unwrap();
        let events_after_entry = ed.history_log().events().len();

        let reentry = EnterSpec {
            initiating: None,
            count: 1,
            preserve_state: false,
            lock_history: false,
        };
        interp.enter(&mut ed, reentry).unwrap();
        assert_eq!(interp.session().repeat_count(), 3);
        assert!(interp.session().history_locked());
        assert_eq!(ed.history_log().events().len(), events_after_entry);
    }

    #[test]
    fn leave_without_finalize_keeps_everything_open() {
        let (mut ed, mut interp) = fresh("", 0);
        interp.enter(&mut ed, EnterSpec::default()).unwrap();
        interp.leave(
            &mut ed,
            LeaveSpec {
                move_cursor_left: false,
                finalize: false,
            },
        );
        assert!(interp.session().history_locked());
        assert!(ed.history_log().is_locked());
        assert_eq!(ed.registers().content(RegisterName::LastEdit), None);
    }

    #[test]
    fn disallowed_key_interrupts_the_run() {
        let (mut ed, mut interp) = fresh("xy", 0);
        interp
            .enter(
                &mut ed,
                EnterSpec {
                    count: 5,
                    ..EnterSpec::default()
                },
            )
            .unwrap();
        let consumed = interp.handle_key(&mut ed, KeyStroke::special(SpecialKey::Up));
        assert!(!consumed);
        assert_eq!(interp.session().repeat_count(), 1);
        // The open transaction was closed and a fresh one begun.
        assert_eq!(ed.history_log().completed(), 1);
        assert_eq!(ed.history_log().depth(), 1);
        assert!(ed.history_log().is_locked());
    }

    #[test]
    fn retreat_stops_at_the_line_start() {
        let (mut ed, _) = fresh("ab\ncd", 3);
        assert!(matches!(
            retreat_one(&mut ed),
            Err(CommandError::AtBoundary)
        ));
        let target = ed.cursor().position_at(4);
        ed.cursor_mut().set_position(target);
        retreat_one(&mut ed).unwrap();
        assert_eq!(ed.cursor().position().offset(), 3);
    }

    #[test]
    fn exit_key_is_recognized() {
        assert!(is_exit(KeyStroke::special(SpecialKey::Esc)));
        assert!(is_exit(KeyStroke::ctrl('c')));
        assert!(!is_exit(KeyStroke::chr('c')));
        assert!(!is_exit(KeyStroke::special(SpecialKey::Backspace)));
    }

    #[test]
    fn allowed_covers_plain_insertion_keys_only() {
        assert!(allowed(KeyStroke::chr('x')));
        assert!(allowed(KeyStroke::special(SpecialKey::Backspace)));
        assert!(allowed(KeyStroke::special(SpecialKey::Return)));
        assert!(allowed(KeyStroke::special(SpecialKey::Tab)));
        assert!(allowed(KeyStroke::special(SpecialKey::Delete)));
        assert!(!allowed(KeyStroke::special(SpecialKey::Up)));
        assert!(!allowed(KeyStroke::special(SpecialKey::Home)));
        assert!(!allowed(KeyStroke::special(SpecialKey::F(5))));
    }
}
