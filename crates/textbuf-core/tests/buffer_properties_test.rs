//! End-to-end behaviour of `TextBuffer` through its public API only.

use pretty_assertions::assert_eq;
use rstest::rstest;
use textbuf_core::{Gravity, Position, TextBuffer};

fn buffer_with(text: &str) -> TextBuffer {
    let mut buffer = TextBuffer::new();
    buffer.insert("1.0", text).unwrap();
    buffer.edit_separator();
    buffer
}

#[test]
fn test_multiline_insert_scenario() {
    let mut buffer = TextBuffer::new();
    buffer.insert("1.0", "hello\nworld").unwrap();

    assert_eq!(buffer.get("1.0", "end").unwrap(), "hello\nworld");
    assert_eq!(buffer.line_count(), 2);
    assert_eq!(buffer.index("1.9").unwrap(), Position::new(1, 5));
}

#[rstest]
#[case("1.0", "abc")]
#[case("1.3", "xyz")]
#[case("2.end", "!")]
#[case("end", "tail")]
#[case("2.2", "ünï")]
fn test_insert_then_delete_restores_content(#[case] at: &str, #[case] text: &str) {
    let mut buffer = buffer_with("hello\nworld");
    let before = buffer.to_string();
    let start = buffer.index(at).unwrap().to_string();

    buffer.insert(&start, text).unwrap();
    buffer
        .delete(&start, &format!("{start} +{}c", text.chars().count()))
        .unwrap();

    assert_eq!(buffer.to_string(), before);
}

#[rstest]
#[case("1.0")]
#[case("1.4")]
#[case("end")]
fn test_replace_empty_with_empty_is_noop(#[case] at: &str) {
    let mut buffer = buffer_with("hello\nworld");
    let undo_len = buffer.history().undo_stack.len();

    buffer.replace(at, at, "").unwrap();

    assert_eq!(buffer.to_string(), "hello\nworld");
    assert_eq!(buffer.history().undo_stack.len(), undo_len);
}

#[rstest]
#[case("1.0", "xx", Position::new(1, 4))]
#[case("1.1", "\n", Position::new(2, 1))]
#[case("1.0", "a\nbc\n", Position::new(3, 2))]
#[case("1.2", "ab", Position::new(1, 4))]
#[case("1.3", "zz", Position::new(1, 2))]
#[case("2.0", "\n\n", Position::new(1, 2))]
fn test_mark_follows_insertions(
    #[case] at: &str,
    #[case] text: &str,
    #[case] expected: Position,
) {
    let mut buffer = buffer_with("hello\nworld");
    buffer.mark_set("m", "1.2").unwrap();

    buffer.insert(at, text).unwrap();

    assert_eq!(buffer.index("m").unwrap(), expected);
}

#[test]
fn test_left_gravity_mark_stays_at_insertion_point() {
    let mut buffer = buffer_with("hello\nworld");
    buffer.mark_set("m", "1.2").unwrap();
    buffer.set_mark_gravity("m", Gravity::Left).unwrap();

    buffer.insert("1.2", "xx\nyy").unwrap();

    assert_eq!(buffer.index("m").unwrap(), Position::new(1, 2));
    assert_eq!(buffer.mark_gravity("m").unwrap(), Gravity::Left);
}

#[rstest]
#[case("1.2")]
#[case("1.5")]
#[case("2.0")]
#[case("2.3")]
fn test_marks_inside_deleted_range_collapse(#[case] mark_at: &str) {
    let mut buffer = buffer_with("hello\nworld");
    buffer.mark_set("m", mark_at).unwrap();

    buffer.delete("1.2", "2.3").unwrap();

    assert_eq!(buffer.index("m").unwrap(), Position::new(1, 2));
    assert_eq!(buffer.to_string(), "held");
}

#[test]
fn test_insert_undo_redo_reproduces_content_and_marks() {
    let mut buffer = buffer_with("hello\nworld");
    buffer.mark_set("a", "1.1").unwrap();
    buffer.mark_set("b", "2.3").unwrap();

    buffer.insert("1.3", "p\nq").unwrap();
    let after = (
        buffer.to_string(),
        buffer.index("a").unwrap(),
        buffer.index("b").unwrap(),
    );

    assert!(buffer.edit_undo());
    assert_eq!(buffer.to_string(), "hello\nworld");
    assert_eq!(buffer.index("b").unwrap(), Position::new(2, 3));

    assert!(buffer.edit_redo());
    assert_eq!(
        (
            buffer.to_string(),
            buffer.index("a").unwrap(),
            buffer.index("b").unwrap(),
        ),
        after
    );
}

#[test]
fn test_adjoining_single_char_inserts_undo_together() {
    let mut buffer = buffer_with("");

    buffer.insert("1.0", "a").unwrap();
    buffer.insert("1.1", "b").unwrap();
    assert!(buffer.insert("insert", "c").is_err(), "No such mark");

    assert!(buffer.edit_undo());
    assert_eq!(buffer.to_string(), "");
}

#[test]
fn test_backspacing_undoes_together() {
    let mut buffer = buffer_with("hello");

    for _ in 0..3 {
        buffer.delete("end -1c", "end").unwrap();
    }
    assert_eq!(buffer.to_string(), "he");

    assert!(buffer.edit_undo());
    assert_eq!(buffer.to_string(), "hello");
    assert!(buffer.edit_redo());
    assert_eq!(buffer.to_string(), "he");
}

#[test]
fn test_empty_range_delete_is_noop() {
    let mut buffer = buffer_with("hello");

    buffer.delete("1.2", "1.2").unwrap();

    assert_eq!(buffer.to_string(), "hello");
    assert!(buffer.edit_undo(), "Only the initial insert is on the stack");
    assert_eq!(buffer.to_string(), "");
}

#[test]
fn test_typing_session_with_insert_mark() {
    let mut buffer = TextBuffer::new();
    buffer.mark_set("insert", "1.0").unwrap();

    for ch in ["h", "i", "\n", "y", "o"] {
        buffer.insert("insert", ch).unwrap();
    }

    assert_eq!(buffer.to_string(), "hi\nyo");
    assert_eq!(buffer.index("insert").unwrap(), Position::new(2, 2));
    assert_eq!(buffer.history().undo_stack.len(), 1);

    buffer.edit_separator();
    buffer.delete("insert linestart", "insert").unwrap();
    assert_eq!(buffer.to_string(), "hi\n");

    assert!(buffer.edit_undo());
    assert_eq!(buffer.to_string(), "hi\nyo");
}
