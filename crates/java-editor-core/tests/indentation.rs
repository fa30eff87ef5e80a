use java_editor_core::{IndentConfig, IndentError, IndentProgress, IndentReason, JavaDocument};
use pretty_assertions::assert_eq;
use std::ops::ControlFlow;

fn keep_going(_: IndentProgress) -> ControlFlow<()> {
    ControlFlow::Continue(())
}

#[test]
fn test_cancelled_range_keeps_completed_lines() {
    let text = "    foo();\n".repeat(1_000);
    let mut doc = JavaDocument::from_text(&text);
    let len = doc.len_chars();

    let mut polls = Vec::new();
    let result = doc.indent_lines(0, len, IndentReason::Other, |progress| {
        polls.push(progress.completed);
        if progress.completed == 500 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    assert_eq!(result, Err(IndentError::Cancelled { completed: 500 }));
    assert_eq!(polls, (1..=500).collect::<Vec<_>>());
    let result_text = doc.text();
    let lines: Vec<&str> = result_text.lines().collect();
    assert_eq!(lines.len(), 1_000);
    assert!(lines[..500].iter().all(|line| *line == "foo();"));
    assert!(lines[500..].iter().all(|line| *line == "    foo();"));
    assert_eq!(doc.verify_reduced_model(), Ok(()));
}

#[test]
fn test_zero_length_selection_indents_one_line() {
    let mut doc = JavaDocument::from_text("void f() {\nint a;\nint b;\n}");
    // Cursor between "in" and "t a;" on the second line.
    doc.indent_lines(13, 13, IndentReason::Other, keep_going)
        .unwrap();
    assert_eq!(doc.text(), "void f() {\n  int a;\nint b;\n}");
    assert_eq!(doc.current_location(), 15);
}

#[test]
fn test_range_restores_cursor_to_the_same_text() {
    let mut doc = JavaDocument::from_text("void f() {\nint a;\nint b;\n}");
    doc.set_current_location(22).unwrap(); // before "b"
    let len = doc.len_chars();
    doc.indent_lines(0, len, IndentReason::Other, keep_going)
        .unwrap();
    assert_eq!(doc.text(), "void f() {\n  int a;\n  int b;\n}");
    assert_eq!(doc.char_at(doc.current_location()), Some('b'));
}

#[test]
fn test_range_covers_lines_touched_by_the_selection() {
    let mut doc = JavaDocument::from_text("{\na;\nb;\nc;\n}");
    // From the middle of "a;" to the end of "b;".
    doc.indent_lines(3, 7, IndentReason::Other, keep_going)
        .unwrap();
    assert_eq!(doc.text(), "{\n  a;\n  b;\nc;\n}");
}

#[test]
fn test_changing_width_rebuilds_the_rules() {
    let mut doc = JavaDocument::from_text("class A {\nint x;\n}");
    doc.set_indent_config(IndentConfig::default().with_indent_width(4));
    assert_eq!(doc.indent_config().indent_width, 4);
    let len = doc.len_chars();
    doc.indent_lines(0, len, IndentReason::Other, keep_going)
        .unwrap();
    assert_eq!(doc.text(), "class A {\n    int x;\n}");
}

#[test]
fn test_reindenting_is_stable() {
    let source = "class A {\nvoid f(int a,\nint b) {\nif (a > b) {\nreturn;\n}\nelse {\ng(a,\nb);\n}\n}\n}\n";
    let mut doc = JavaDocument::from_text(source);
    let len = doc.len_chars();
    doc.indent_lines(0, len, IndentReason::Other, keep_going)
        .unwrap();
    let once = doc.text();
    assert_eq!(
        once,
        "class A {\n  void f(int a,\n         int b) {\n    if (a > b) {\n      return;\n    }\n    else {\n      g(a,\n        b);\n    }\n  }\n}\n"
    );

    let len = doc.len_chars();
    doc.indent_lines(0, len, IndentReason::Other, keep_going)
        .unwrap();
    assert_eq!(doc.text(), once);
}

#[test]
fn test_enter_inside_javadoc() {
    let mut doc = JavaDocument::from_text("class A {\n  /**\n}")
        .with_indent_config(IndentConfig::default().with_auto_close_comments(true));
    doc.insert_string(15, "\n").unwrap();
    doc.indent_line(IndentReason::EnterKey).unwrap();
    assert_eq!(doc.text(), "class A {\n  /**\n   * \n   */\n}");
    assert_eq!(doc.current_location(), 21);
}

#[test]
fn test_invalid_range_is_rejected() {
    let mut doc = JavaDocument::from_text("abc");
    assert!(matches!(
        doc.indent_lines(2, 1, IndentReason::Other, keep_going),
        Err(IndentError::Document(_))
    ));
    assert!(doc.indent_lines(0, 9, IndentReason::Other, keep_going).is_err());
}

#[test]
fn test_switch_block_layout() {
    let source = "void f() {\nswitch (x) {\ncase 1:\ncase 2:\nif (a) {\ng();\n}\nbreak;\ndefault:\nh(a,\nb);\n}\n}\n";
    let mut doc = JavaDocument::from_text(source);
    let len = doc.len_chars();
    doc.indent_lines(0, len, IndentReason::Other, keep_going)
        .unwrap();
    let once = doc.text();
    assert_eq!(
        once,
        "void f() {\n  switch (x) {\n    case 1:\n    case 2:\n      if (a) {\n        g();\n      }\n      break;\n    default:\n      h(a,\n        b);\n  }\n}\n"
    );

    let len = doc.len_chars();
    doc.indent_lines(0, len, IndentReason::Other, keep_going)
        .unwrap();
    assert_eq!(doc.text(), once);
}

#[test]
fn test_nested_initializer_rows_line_up() {
    let mut doc = JavaDocument::from_text("int[][] m = {\n{1, 2},\n{3, 4}\n};");
    let len = doc.len_chars();
    doc.indent_lines(0, len, IndentReason::Other, keep_going)
        .unwrap();
    assert_eq!(doc.text(), "int[][] m = {\n  {1, 2},\n  {3, 4}\n};");
}
