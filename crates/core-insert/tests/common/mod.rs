#![allow(dead_code)] // Shared across the integration suite; each test binary uses a subset.

use std::sync::Arc;

use core_config::Options;
use core_editor::{Command, CommandError, Editor, LocalEditor, ModeKind, SwitchHints};
use core_insert::{EnterSpec, InsertInterpreter};
use core_keys::{KeyStroke, SpecialKey};
use core_text::TextBuffer;

pub fn kc(c: char) -> KeyStroke {
    KeyStroke::chr(c)
}

pub fn ctrl(c: char) -> KeyStroke {
    KeyStroke::ctrl(c)
}

pub fn esc() -> KeyStroke {
    KeyStroke::special(SpecialKey::Esc)
}

pub fn bs() -> KeyStroke {
    KeyStroke::special(SpecialKey::Backspace)
}

pub fn ret() -> KeyStroke {
    KeyStroke::special(SpecialKey::Return)
}

/// Inserts a fixed string at the cursor. Stands in for the entry commands a
/// host would supply (open-line, append and friends); repeating it types the
/// text again.
pub struct TypeText(pub &'static str);

impl Command for TypeText {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        let pos = editor.cursor().position().offset();
        editor.buffer_mut().replace(pos, 0, self.0);
        let target = editor.cursor().position_at(pos + self.0.chars().count());
        editor.cursor_mut().set_position(target);
        Ok(())
    }

    fn repetition(&self) -> Option<Arc<dyn Command>> {
        Some(Arc::new(TypeText(self.0)))
    }
}

/// Always fails with the given message.
pub struct FailingCommand(pub &'static str);

impl Command for FailingCommand {
    fn execute(&self, _editor: &mut dyn Editor) -> Result<(), CommandError> {
        Err(CommandError::Failed(self.0.into()))
    }
}

/// A minimal host around [`LocalEditor`]: routes strokes through the
/// interpreter first and plays the text widget for whatever comes back
/// declined.
pub struct Host {
    pub editor: LocalEditor,
    pub interpreter: InsertInterpreter,
}

impl Host {
    pub fn new(content: &str) -> Self {
        Self::with_options(content, Options::default())
    }

    pub fn with_options(content: &str, options: Options) -> Self {
        Self {
            editor: LocalEditor::with_options(content, options).expect("fixture buffer"),
            interpreter: InsertInterpreter::new(),
        }
    }

    pub fn with_interpreter(content: &str, interpreter: InsertInterpreter) -> Self {
        Self {
            editor: LocalEditor::new(content).expect("fixture buffer"),
            interpreter,
        }
    }

    pub fn set_cursor(&mut self, offset: usize) {
        let target = self.editor.cursor().position_at(offset);
        self.editor.cursor_mut().set_position(target);
    }

    pub fn cursor(&self) -> usize {
        self.editor.cursor().position().offset()
    }

    pub fn contents(&self) -> String {
        self.editor.contents()
    }

    /// Flip the host into insert mode and open a session.
    pub fn begin_insert_at(&mut self, offset: usize, spec: EnterSpec) {
        self.set_cursor(offset);
        self.editor
            .modes()
            .switch_mode(ModeKind::Insert, SwitchHints::default());
        self.interpreter
            .enter(&mut self.editor, spec)
            .expect("session entry");
    }

    /// One stroke through the interpreter. A declined stroke goes to the
    /// widget, unless handling it requested a mode switch; then the raw
    /// stroke is not forwarded.
    pub fn feed(&mut self, stroke: KeyStroke) -> bool {
        if self.editor.switch_log().current() != ModeKind::Insert {
            return false;
        }
        let requests_before = self.editor.switch_log().requests().len();
        let consumed = self.interpreter.handle_key(&mut self.editor, stroke);
        if consumed {
            return true;
        }
        if self.editor.switch_log().requests().len() > requests_before {
            return false;
        }
        self.widget_apply(stroke);
        false
    }

    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.feed(kc(c));
        }
    }

    /// Escape out of the session; the host must land in normal mode.
    pub fn press_escape(&mut self) {
        assert!(self.feed(esc()));
        assert_eq!(self.editor.switch_log().current(), ModeKind::Normal);
    }

    /// The widget half of the host: literal edits only, no indentation or
    /// tab smarts.
    fn widget_apply(&mut self, stroke: KeyStroke) {
        if let Some(c) = stroke.printable() {
            let text = c.to_string();
            self.widget_insert(&text);
        } else if stroke.is_special(SpecialKey::Backspace) {
            let pos = self.cursor();
            if pos > 0 {
                self.editor.buffer_mut().replace(pos - 1, 1, "");
                self.set_cursor(pos - 1);
            }
        } else if stroke.is_special(SpecialKey::Delete) {
            let pos = self.cursor();
            if pos < self.editor.buffer().len() {
                self.editor.buffer_mut().replace(pos, 1, "");
            }
        } else if stroke.is_special(SpecialKey::Return) {
            let ending = self.editor.options().line_ending;
            self.widget_insert(ending.as_str());
        } else if stroke.is_special(SpecialKey::Tab) {
            self.widget_insert("\t");
        } else if stroke.is_special(SpecialKey::Left) {
            let pos = self.cursor().saturating_sub(1);
            self.set_cursor(pos);
        } else if stroke.is_special(SpecialKey::Right) {
            let pos = (self.cursor() + 1).min(self.editor.buffer().len());
            self.set_cursor(pos);
        }
    }

    fn widget_insert(&mut self, text: &str) {
        let pos = self.cursor();
        self.editor.buffer_mut().replace(pos, 0, text);
        self.set_cursor(pos + text.chars().count());
    }
}
