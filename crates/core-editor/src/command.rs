//! Deferred editing actions and the combinators used to compose them.
//!
//! A [`Command`] is the unit the keymap binds to and the repeat machinery
//! stores: execution mutates the editor through the facade, `repetition`
//! yields the command to run when the action is repeated later, and
//! `count_ignoring` lets a command opt out of count multiplication.

use std::sync::Arc;

use thiserror::Error;

use crate::Editor;

/// Failure of a single command execution. Non-fatal for the session; the
/// caller decides whether to surface or propagate it.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Failed(String),
    #[error("cursor is already at a boundary")]
    AtBoundary,
    #[error("no previously inserted text")]
    NothingToRepeat,
}

pub trait Command: Send + Sync {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError>;

    /// The command to run when this action is repeated. `None` means the
    /// action cannot be meaningfully repeated on its own.
    fn repetition(&self) -> Option<Arc<dyn Command>> {
        None
    }

    /// True when a surrounding count must not multiply this command.
    fn count_ignoring(&self) -> bool {
        false
    }
}

/// Run `commands` in order, stopping at the first failure.
pub fn seq(commands: Vec<Arc<dyn Command>>) -> Arc<dyn Command> {
    Arc::new(CommandSequence { commands })
}

/// Shield `command` from repeat resolution: the wrapper executes it but
/// reports no repetition of its own. Used for commands that already *are*
/// the concrete replay of something else.
pub fn dont_repeat(command: Arc<dyn Command>) -> Arc<dyn Command> {
    Arc::new(NonRepeatable { command })
}

/// Multiply `command` by `count` unless it opts out via `count_ignoring`.
pub fn with_count(command: Arc<dyn Command>, count: u32) -> Arc<dyn Command> {
    if count <= 1 || command.count_ignoring() {
        command
    } else {
        Arc::new(Counted { command, count })
    }
}

struct CommandSequence {
    commands: Vec<Arc<dyn Command>>,
}

impl Command for CommandSequence {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        for command in &self.commands {
            command.execute(editor)?;
        }
        Ok(())
    }

    fn repetition(&self) -> Option<Arc<dyn Command>> {
        // A sequence repeats by repeating its repeatable members, in order.
        let repetitions: Vec<_> = self
            .commands
            .iter()
            .filter_map(|command| command.repetition())
            .collect();
        if repetitions.is_empty() {
            None
        } else {
            Some(seq(repetitions))
        }
    }
}

struct NonRepeatable {
    command: Arc<dyn Command>,
}

impl Command for NonRepeatable {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        self.command.execute(editor)
    }

    fn count_ignoring(&self) -> bool {
        self.command.count_ignoring()
    }
}

struct Counted {
    command: Arc<dyn Command>,
    count: u32,
}

impl Command for Counted {
    fn execute(&self, editor: &mut dyn Editor) -> Result<(), CommandError> {
        for _ in 0..self.count {
            self.command.execute(editor)?;
        }
        Ok(())
    }

    fn repetition(&self) -> Option<Arc<dyn Command>> {
        self.command
            .repetition()
            .map(|repetition| with_count(repetition, self.count))
    }
}
