//! Collaborator seams of the host editor and the command abstraction built on
//! top of them.
//!
//! The insertion layer never talks to a concrete editor. It sees:
//! - the editing surface (`core_text::TextBuffer`),
//! - the services defined here (cursor, history, registers, mode switching,
//!   user interface), and
//! - the [`Editor`] facade bundling all of them together with the loaded
//!   options.
//!
//! [`LocalEditor`] is the in-process reference implementation backing the
//! test suites; embedders with a real host implement the same traits against
//! their own widgets.

pub mod command;
pub mod local;

pub use command::{Command, CommandError, dont_repeat, seq, with_count};
pub use local::{HistoryEvent, LocalEditor};

use std::sync::Arc;

use core_config::Options;
use core_text::{Position, TextBuffer};

/// Name of the mark recording where the last insertion ended.
pub const LAST_INSERT_MARK: char = '^';

/// Register addressing. `LastEdit` holds the text of the most recent
/// insertion session; `Unnamed` is the default paste source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterName {
    Unnamed,
    LastEdit,
    Named(char),
}

/// Modes the interpreter can ask the host to switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Normal,
    Insert,
    PasteRegister,
}

/// Hint flags accompanying a mode-switch request.
///
/// `preserve_state` tells the target mode to begin a fresh session;
/// `finalize` tells the mode being left to run its exit side effects. A
/// detour (such as the paste-register sub-mode) clears both so the
/// surrounding session survives the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchHints {
    pub preserve_state: bool,
    pub finalize: bool,
}

impl Default for SwitchHints {
    fn default() -> Self {
        Self {
            preserve_state: true,
            finalize: true,
        }
    }
}

/// Caret shapes a host can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaretStyle {
    #[default]
    Block,
    Bar,
    Underline,
}

/// Cursor state owned by the host: the current position, named marks, and
/// the caret presentation.
pub trait CursorService {
    fn position(&self) -> Position;
    fn set_position(&mut self, pos: Position);
    /// Construct a [`Position`] from a raw character offset.
    fn position_at(&self, offset: usize) -> Position;
    fn set_mark(&mut self, name: char, pos: Position);
    fn mark(&self, name: char) -> Option<Position>;
    fn set_caret_style(&mut self, style: CaretStyle);
    fn caret_style(&self) -> CaretStyle;
}

/// Undo-history boundaries. A compound groups all edits between
/// `begin_compound` and `end_compound` into one undoable unit; the lock
/// prevents intervening operations from splitting the open compound.
pub trait HistoryService {
    fn begin_compound(&mut self);
    fn end_compound(&mut self);
    fn lock(&mut self);
    fn unlock(&mut self);
}

/// Plain-text register slots plus the stored replay command for the last
/// insertion.
pub trait RegisterStore {
    fn active(&self) -> RegisterName;
    fn set_active(&mut self, name: RegisterName);
    /// Content of a register; `None` when the slot is empty.
    fn content(&self, name: RegisterName) -> Option<String>;
    fn set_content(&mut self, name: RegisterName, text: String);
    fn last_insertion(&self) -> Option<Arc<dyn Command>>;
    fn set_last_insertion(&mut self, command: Arc<dyn Command>);
}

/// The host's mode machinery. The interpreter only requests switches; the
/// host decides when the new mode actually takes over the key stream.
pub trait ModeSwitcher {
    fn switch_mode(&mut self, mode: ModeKind, hints: SwitchHints);
}

/// Non-fatal user feedback and presentation toggles.
pub trait UserInterface {
    fn report_error(&mut self, message: &str);
    fn set_repaint(&mut self, enabled: bool);
    fn disable_input_method(&mut self);
}

/// Facade over all collaborators, passed into every command execution and
/// interpreter call by the host.
pub trait Editor {
    fn buffer(&self) -> &dyn TextBuffer;
    fn buffer_mut(&mut self) -> &mut dyn TextBuffer;
    fn cursor(&self) -> &dyn CursorService;
    fn cursor_mut(&mut self) -> &mut dyn CursorService;
    fn history(&mut self) -> &mut dyn HistoryService;
    fn registers(&self) -> &dyn RegisterStore;
    fn registers_mut(&mut self) -> &mut dyn RegisterStore;
    fn modes(&mut self) -> &mut dyn ModeSwitcher;
    fn ui(&mut self) -> &mut dyn UserInterface;
    fn options(&self) -> &Options;
}
