//! Default insert-mode chords and the binding table they compile into.
//!
//! Hosts contribute their own bindings on top; on a conflict the host wins,
//! which is why host entries are appended after the stock ones (the trie
//! build lets later bindings override earlier ones).

use std::sync::Arc;

use core_editor::Command;
use core_keymap::{Binding, KeyStrokeTrie};
use core_keys::KeyStroke;

use crate::commands::{DeleteWordBefore, InsertAdjacentChar, PasteLastInsert};

/// The stock chords every insert session understands.
pub fn default_bindings() -> Vec<Binding<Arc<dyn Command>>> {
    vec![
        Binding::single(KeyStroke::ctrl('w'), Arc::new(DeleteWordBefore) as _),
        Binding::single(KeyStroke::ctrl('a'), Arc::new(PasteLastInsert) as _),
        Binding::single(
            KeyStroke::ctrl('e'),
            Arc::new(InsertAdjacentChar::line_below()) as _,
        ),
        Binding::single(
            KeyStroke::ctrl('y'),
            Arc::new(InsertAdjacentChar::line_above()) as _,
        ),
    ]
}

/// Compile the stock bindings together with host-supplied ones.
pub fn build_trie(host: Vec<Binding<Arc<dyn Command>>>) -> KeyStrokeTrie<Arc<dyn Command>> {
    let mut all = default_bindings();
    all.extend(host);
    KeyStrokeTrie::build(all)
}
