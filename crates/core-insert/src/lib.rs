//! core-insert: insert-mode key-stroke interpretation.
//!
//! Design principles:
//! - The host widget performs ordinary typing. The interpreter inspects each
//!   stroke first and claims only what carries modal meaning: bound chords,
//!   exit keys, the register detour, soft-tab backspace, and strokes it
//!   manufactured itself. Everything else is declined untouched.
//! - One insertion session is one undo transaction (configurable) and one
//!   repeatable unit: the typed span is captured on exit, multiplied by the
//!   entry count, and stored for dot-repeat.
//! - A detour (paste-register sub-mode) suspends the session instead of
//!   ending it; re-entry with `preserve_state` off resumes where it left
//!   off, so counts and capture bounds survive the round trip.
//! - All effects go through the `core-editor` seams, never a concrete host.
//!
//! [`InsertInterpreter`] is the entry point; see [`session`] for the exact
//! dispatch order.

pub mod bindings;
pub mod commands;
pub mod recorder;
pub mod session;
pub mod soft_tab;
pub mod virtual_stroke;

pub use session::{EnterSpec, InsertInterpreter, InsertSession, LeaveSpec};
