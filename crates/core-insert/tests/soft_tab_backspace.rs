mod common;

use common::{Host, bs};
use core_config::Options;
use core_insert::EnterSpec;
use pretty_assertions::assert_eq;

fn soft_tab_host(content: &str, stop: u32) -> Host {
    Host::with_options(
        content,
        Options {
            soft_tab_stop: stop,
            ..Options::default()
        },
    )
}

#[test]
fn aligned_run_loses_a_whole_stop() {
    let mut host = soft_tab_host("    ", 4);
    host.begin_insert_at(4, EnterSpec::default());
    assert!(host.feed(bs()));
    assert_eq!(host.contents(), "");
    assert_eq!(host.cursor(), 0);
}

#[test]
fn misaligned_run_realigns_first() {
    let mut host = soft_tab_host("      ", 4);
    host.begin_insert_at(6, EnterSpec::default());
    assert!(host.feed(bs()));
    assert_eq!(host.contents(), "    ");
    assert!(host.feed(bs()));
    assert_eq!(host.contents(), "");
}

#[test]
fn short_run_falls_back_to_the_widget() {
    let mut host = soft_tab_host("   ", 4);
    host.begin_insert_at(3, EnterSpec::default());
    assert!(!host.feed(bs()));
    // The widget performed a plain single-character delete.
    assert_eq!(host.contents(), "  ");
    assert_eq!(host.cursor(), 2);
}

#[test]
fn run_behind_text_falls_back() {
    let mut host = soft_tab_host("word", 4);
    host.begin_insert_at(4, EnterSpec::default());
    assert!(!host.feed(bs()));
    assert_eq!(host.contents(), "wor");
}

#[test]
fn synthetic_backspace_falls_through_to_the_literal_delete() {
    let mut host = soft_tab_host("ab", 4);
    host.begin_insert_at(2, EnterSpec::default());
    // No space run, but a synthetic stroke may not be declined to the
    // widget; the interpreter applies it itself.
    let consumed = host
        .interpreter
        .handle_key(&mut host.editor, bs().into_synthetic());
    assert!(consumed);
    assert_eq!(host.contents(), "a");
    assert_eq!(host.cursor(), 1);
}

#[test]
fn synthetic_backspace_still_honors_the_soft_stop() {
    let mut host = soft_tab_host("    ", 4);
    host.begin_insert_at(4, EnterSpec::default());
    let consumed = host
        .interpreter
        .handle_key(&mut host.editor, bs().into_synthetic());
    assert!(consumed);
    assert_eq!(host.contents(), "");
}

#[test]
fn feature_off_leaves_backspace_to_the_widget() {
    for stop in [0, 1] {
        let mut host = soft_tab_host("    ", stop);
        host.begin_insert_at(4, EnterSpec::default());
        assert!(!host.feed(bs()));
        assert_eq!(host.contents(), "   ");
    }
}

#[test]
fn only_the_current_line_counts() {
    let mut host = soft_tab_host("    \nx", 4);
    // Cursor right after 'x' on the second line; the first line's spaces
    // are out of reach.
    host.begin_insert_at(6, EnterSpec::default());
    assert!(!host.feed(bs()));
    assert_eq!(host.contents(), "    \n");
}
