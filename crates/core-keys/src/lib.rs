//! Key-stroke value model for Veneer.
//!
//! A [`KeyStroke`] is one discrete input event as the host editor reports it:
//! a printable character, a named special key, or either of those carrying a
//! modifier mask. Strokes are plain values, compared structurally, with one
//! extra bit of provenance: `synthetic` marks strokes the interpreter
//! manufactured itself (replayed literals, programmatic edits) as opposed to
//! raw user input. Synthetic strokes skip mapping lookup and host fallback;
//! see `core-insert` for the dispatch rules.
//!
//! The model deliberately carries no timestamps or repeat flags. Veneer sits
//! behind a host widget that has already collapsed auto-repeat into discrete
//! events, and mapping resolution here is count-based, not timeout-based.

use std::fmt;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

/// Named non-printable keys surfaced by host widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    Esc,
    Backspace,
    Return,
    Tab,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

/// Logical key identity: either a printable character or a named key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Named(SpecialKey),
}

/// One input event. Construct through the helpers ([`KeyStroke::chr`],
/// [`KeyStroke::special`], [`KeyStroke::ctrl`]) rather than struct literals so
/// control chords stay normalized (lowercase base character).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub code: KeyCode,
    pub mods: KeyModifiers,
    pub synthetic: bool,
}

impl KeyStroke {
    /// Plain printable character, no modifiers.
    pub fn chr(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            mods: KeyModifiers::empty(),
            synthetic: false,
        }
    }

    /// Named special key, no modifiers.
    pub fn special(key: SpecialKey) -> Self {
        Self {
            code: KeyCode::Named(key),
            mods: KeyModifiers::empty(),
            synthetic: false,
        }
    }

    /// Control chord over a printable character. The base character is
    /// lowercased so `<C-W>` and `<C-w>` are one stroke.
    pub fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c.to_ascii_lowercase()),
            mods: KeyModifiers::CTRL,
            synthetic: false,
        }
    }

    /// Copy of this stroke with the synthetic provenance bit set.
    pub fn into_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn is_special(&self, key: SpecialKey) -> bool {
        matches!(self.code, KeyCode::Named(k) if k == key) && self.mods.is_empty()
    }

    pub fn is_ctrl(&self, c: char) -> bool {
        self.mods == KeyModifiers::CTRL
            && matches!(self.code, KeyCode::Char(k) if k == c.to_ascii_lowercase())
    }

    /// The printable character carried by this stroke, if it is one (any
    /// modifier disqualifies it; a modified character is a chord, not text).
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if self.mods.is_empty() => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for SpecialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecialKey::Esc => write!(f, "Esc"),
            SpecialKey::Backspace => write!(f, "BS"),
            SpecialKey::Return => write!(f, "CR"),
            SpecialKey::Tab => write!(f, "Tab"),
            SpecialKey::Delete => write!(f, "Del"),
            SpecialKey::Insert => write!(f, "Ins"),
            SpecialKey::Up => write!(f, "Up"),
            SpecialKey::Down => write!(f, "Down"),
            SpecialKey::Left => write!(f, "Left"),
            SpecialKey::Right => write!(f, "Right"),
            SpecialKey::Home => write!(f, "Home"),
            SpecialKey::End => write!(f, "End"),
            SpecialKey::PageUp => write!(f, "PageUp"),
            SpecialKey::PageDown => write!(f, "PageDown"),
            SpecialKey::F(n) => write!(f, "F{}", n),
        }
    }
}

/// Vim-flavored notation, used in logs and diagnostics: `a`, `<Esc>`,
/// `<C-w>`, `<C-A-x>`. Synthetic provenance is not rendered; it is an
/// interpreter-internal bit, not part of the key identity.
impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bare = self.mods.is_empty();
        match self.code {
            KeyCode::Char(c) if bare => write!(f, "{}", c),
            _ => {
                write!(f, "<")?;
                if self.mods.contains(KeyModifiers::CTRL) {
                    write!(f, "C-")?;
                }
                if self.mods.contains(KeyModifiers::ALT) {
                    write!(f, "A-")?;
                }
                if self.mods.contains(KeyModifiers::SHIFT) {
                    write!(f, "S-")?;
                }
                match self.code {
                    KeyCode::Char(c) => write!(f, "{}", c)?,
                    KeyCode::Named(k) => write!(f, "{}", k)?,
                }
                write!(f, ">")
            }
        }
    }
}
