//! In-process reference implementation of every collaborator trait.
//!
//! `LocalEditor` wires a rope buffer to recording fakes for the host-side
//! services: the transaction log keeps the full begin/end/lock/unlock event
//! history, the switch log records every requested mode transition, and the
//! UI log captures reported errors and presentation toggles. The test suites
//! drive the interpreter against this editor; it also serves as a minimal
//! single-process backend for embedders without a host of their own.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::trace;

use core_config::Options;
use core_text::{Position, RopeBuffer, TextBuffer};

use crate::command::Command;
use crate::{
    CaretStyle, CursorService, Editor, HistoryService, ModeKind, ModeSwitcher, RegisterName,
    RegisterStore, SwitchHints, UserInterface,
};

/// One observed history transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Begin,
    End,
    Lock,
    Unlock,
}

/// Compound-transaction bookkeeping with a full event trail.
#[derive(Default)]
pub struct TransactionLog {
    depth: u32,
    locked: bool,
    completed: u32,
    events: Vec<HistoryEvent>,
}

impl TransactionLog {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of compounds that have fully closed (depth returned to zero).
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }
}

impl HistoryService for TransactionLog {
    fn begin_compound(&mut self) {
        self.depth += 1;
        self.events.push(HistoryEvent::Begin);
        trace!(target: "editor.history", depth = self.depth, "compound_begin");
    }

    fn end_compound(&mut self) {
        if self.depth == 0 {
            trace!(target: "editor.history", "compound_end_without_begin");
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.completed += 1;
        }
        self.events.push(HistoryEvent::End);
        trace!(
            target: "editor.history",
            depth = self.depth,
            completed = self.completed,
            "compound_end"
        );
    }

    fn lock(&mut self) {
        self.locked = true;
        self.events.push(HistoryEvent::Lock);
        trace!(target: "editor.history", "history_locked");
    }

    fn unlock(&mut self) {
        self.locked = false;
        self.events.push(HistoryEvent::Unlock);
        trace!(target: "editor.history", "history_unlocked");
    }
}

/// Cursor, marks, and caret presentation.
pub struct LocalCursor {
    position: Position,
    marks: HashMap<char, Position>,
    caret: CaretStyle,
}

impl Default for LocalCursor {
    fn default() -> Self {
        Self {
            position: Position::new(0),
            marks: HashMap::new(),
            caret: CaretStyle::default(),
        }
    }
}

impl CursorService for LocalCursor {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, pos: Position) {
        self.position = pos;
    }

    fn position_at(&self, offset: usize) -> Position {
        Position::new(offset)
    }

    fn set_mark(&mut self, name: char, pos: Position) {
        self.marks.insert(name, pos);
    }

    fn mark(&self, name: char) -> Option<Position> {
        self.marks.get(&name).copied()
    }

    fn set_caret_style(&mut self, style: CaretStyle) {
        self.caret = style;
    }

    fn caret_style(&self) -> CaretStyle {
        self.caret
    }
}

/// Register slots: unnamed, last-edit, and the named family.
pub struct RegisterFile {
    active: RegisterName,
    unnamed: String,
    last_edit: String,
    named: HashMap<char, String>,
    last_insertion: Option<Arc<dyn Command>>,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            active: RegisterName::Unnamed,
            unnamed: String::new(),
            last_edit: String::new(),
            named: HashMap::new(),
            last_insertion: None,
        }
    }
}

impl RegisterStore for RegisterFile {
    fn active(&self) -> RegisterName {
        self.active
    }

    fn set_active(&mut self, name: RegisterName) {
        self.active = name;
        trace!(target: "editor.registers", register = ?name, "active_register_set");
    }

    fn content(&self, name: RegisterName) -> Option<String> {
        let slot = match name {
            RegisterName::Unnamed => &self.unnamed,
            RegisterName::LastEdit => &self.last_edit,
            RegisterName::Named(c) => return self.named.get(&c).cloned(),
        };
        if slot.is_empty() {
            None
        } else {
            Some(slot.clone())
        }
    }

    fn set_content(&mut self, name: RegisterName, text: String) {
        trace!(
            target: "editor.registers",
            register = ?name,
            chars = text.chars().count(),
            "register_write"
        );
        match name {
            RegisterName::Unnamed => self.unnamed = text,
            RegisterName::LastEdit => self.last_edit = text,
            RegisterName::Named(c) => {
                self.named.insert(c, text);
            }
        }
    }

    fn last_insertion(&self) -> Option<Arc<dyn Command>> {
        self.last_insertion.clone()
    }

    fn set_last_insertion(&mut self, command: Arc<dyn Command>) {
        trace!(target: "editor.registers", "last_insertion_stored");
        self.last_insertion = Some(command);
    }
}

/// Every mode transition the interpreter has requested, newest last.
pub struct SwitchLog {
    current: ModeKind,
    requests: Vec<(ModeKind, SwitchHints)>,
}

impl Default for SwitchLog {
    fn default() -> Self {
        Self {
            current: ModeKind::Normal,
            requests: Vec::new(),
        }
    }
}

impl SwitchLog {
    pub fn current(&self) -> ModeKind {
        self.current
    }

    pub fn requests(&self) -> &[(ModeKind, SwitchHints)] {
        &self.requests
    }
}

impl ModeSwitcher for SwitchLog {
    fn switch_mode(&mut self, mode: ModeKind, hints: SwitchHints) {
        self.current = mode;
        self.requests.push((mode, hints));
    }
}

/// Captured user-interface side effects.
pub struct UiLog {
    errors: Vec<String>,
    repaint_enabled: bool,
    repaint_toggles: Vec<bool>,
    input_method_disabled: u32,
}

impl Default for UiLog {
    fn default() -> Self {
        Self {
            errors: Vec::new(),
            repaint_enabled: true,
            repaint_toggles: Vec::new(),
            input_method_disabled: 0,
        }
    }
}

impl UiLog {
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn repaint_enabled(&self) -> bool {
        self.repaint_enabled
    }

    pub fn repaint_toggles(&self) -> &[bool] {
        &self.repaint_toggles
    }

    pub fn input_method_disabled(&self) -> u32 {
        self.input_method_disabled
    }
}

impl UserInterface for UiLog {
    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn set_repaint(&mut self, enabled: bool) {
        self.repaint_enabled = enabled;
        self.repaint_toggles.push(enabled);
    }

    fn disable_input_method(&mut self) {
        self.input_method_disabled += 1;
    }
}

/// The assembled reference editor.
pub struct LocalEditor {
    buffer: RopeBuffer,
    cursor: LocalCursor,
    history: TransactionLog,
    registers: RegisterFile,
    switches: SwitchLog,
    ui: UiLog,
    options: Options,
}

impl LocalEditor {
    pub fn new(content: &str) -> Result<Self> {
        Self::with_options(content, Options::default())
    }

    pub fn with_options(content: &str, options: Options) -> Result<Self> {
        Ok(Self {
            buffer: RopeBuffer::from_str("scratch", content)?,
            cursor: LocalCursor::default(),
            history: TransactionLog::default(),
            registers: RegisterFile::default(),
            switches: SwitchLog::default(),
            ui: UiLog::default(),
            options,
        })
    }

    /// The whole buffer as an owned `String`.
    pub fn contents(&self) -> String {
        self.buffer.contents()
    }

    pub fn history_log(&self) -> &TransactionLog {
        &self.history
    }

    pub fn switch_log(&self) -> &SwitchLog {
        &self.switches
    }

    pub fn ui_log(&self) -> &UiLog {
        &self.ui
    }
}

impl Editor for LocalEditor {
    fn buffer(&self) -> &dyn TextBuffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut dyn TextBuffer {
        &mut self.buffer
    }

    fn cursor(&self) -> &dyn CursorService {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut dyn CursorService {
        &mut self.cursor
    }

    fn history(&mut self) -> &mut dyn HistoryService {
        &mut self.history
    }

    fn registers(&self) -> &dyn RegisterStore {
        &self.registers
    }

    fn registers_mut(&mut self) -> &mut dyn RegisterStore {
        &mut self.registers
    }

    fn modes(&mut self) -> &mut dyn ModeSwitcher {
        &mut self.switches
    }

    fn ui(&mut self) -> &mut dyn UserInterface {
        &mut self.ui
    }

    fn options(&self) -> &Options {
        &self.options
    }
}
