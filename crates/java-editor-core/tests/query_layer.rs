use java_editor_core::lang::{STATEMENT_DELIMITERS, WHITESPACE};
use java_editor_core::{DocumentError, JavaDocument, ReducedModelState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_two_slashes_start_a_line_comment() {
    let mut doc = JavaDocument::new();
    doc.insert_string(0, "/").unwrap();
    assert_eq!(doc.state_at(0).unwrap(), ReducedModelState::Free);
    doc.insert_string(1, "/").unwrap();
    assert_eq!(doc.state_at(0).unwrap(), ReducedModelState::InsideLineComment);
    assert_eq!(doc.current_location(), 2);
}

#[test]
fn test_find_char_on_line_ignores_quoted_text() {
    let doc = JavaDocument::from_text("\"// not a comment\"");
    assert_eq!(doc.find_char_on_line(0, '/').unwrap(), None);
    assert!(doc.is_shadowed(1).unwrap());

    let doc = JavaDocument::from_text("a / b; \"/\"\nc / d");
    assert_eq!(doc.find_char_on_line(4, '/').unwrap(), Some(2));
    assert_eq!(doc.find_char_on_line(12, '/').unwrap(), Some(13));
}

#[test]
fn test_pos_in_paren_phrase() {
    let doc = JavaDocument::from_text("for (int i = 0; i < n; i++) { x; }");
    let text = doc.text();
    let first_semi = text.find(';').unwrap();
    let body_semi = text.rfind(';').unwrap();
    assert!(doc.pos_in_paren_phrase(first_semi).unwrap());
    assert!(!doc.pos_in_paren_phrase(body_semi).unwrap());
    assert!(!doc.pos_in_paren_phrase(0).unwrap());
}

#[test]
fn test_find_next_delimiter() {
    let doc = JavaDocument::from_text("for (a; b; c) /* ; */ d; e");
    let text = doc.text();
    assert_eq!(doc.find_next_delimiter(0, &[';'], false).unwrap(), Some(6));
    assert_eq!(
        doc.find_next_delimiter(0, &[';'], true).unwrap(),
        text.rfind(';')
    );
    assert_eq!(doc.find_next_delimiter(text.len(), &[';'], false).unwrap(), None);
}

#[test]
fn test_block_comment_positions() {
    let doc = JavaDocument::from_text("a /* b\n c */ d");
    assert!(!doc.pos_in_block_comment(0).unwrap());
    assert!(doc.pos_in_block_comment(2).unwrap());
    assert!(doc.pos_in_block_comment(6).unwrap());
    assert!(doc.pos_in_block_comment(11).unwrap());
    assert!(!doc.pos_in_block_comment(13).unwrap());
}

#[test]
fn test_line_first_char_pos_for_smart_home() {
    let doc = JavaDocument::from_text("class A {\n    int x;\n}");
    assert_eq!(doc.line_first_char_pos(17).unwrap(), 14);
    assert_eq!(doc.line_first_char_pos(0).unwrap(), 0);
}

#[test]
fn test_indent_of_curr_stmt_skips_for_header() {
    let text = "class A {\n  void f() {\n    for (int i = 0;\n         i < 3; i++)\n      g();\n  }\n}";
    let doc = JavaDocument::from_text(text);
    let pos = text.find("g()").unwrap();
    assert_eq!(
        doc.indent_of_curr_stmt(pos, STATEMENT_DELIMITERS, WHITESPACE).unwrap(),
        "    "
    );
}

#[test]
fn test_queries_reject_positions_past_the_end() {
    let doc = JavaDocument::from_text("abc");
    assert_eq!(
        doc.line_start_pos(4),
        Err(DocumentError::Location {
            offset: 4,
            length: 0,
            len: 3
        })
    );
    assert!(doc.find_prev_delimiter(9, &[';'], false).is_err());
    assert_eq!(doc.line_end_pos(3).unwrap(), 3);
}

/// Reference answer for `find_prev_delimiter` computed from per-position states.
fn brute_force_prev_delimiter(
    doc: &JavaDocument,
    pos: usize,
    delims: &[char],
    skip_paren_phrases: bool,
) -> Option<usize> {
    let chars: Vec<char> = doc.text().chars().collect();
    (0..pos).rev().find(|&i| {
        delims.contains(&chars[i])
            && doc.state_at(i).unwrap() == ReducedModelState::Free
            && !(skip_paren_phrases && doc.pos_in_paren_phrase(i).unwrap())
    })
}

#[test]
fn test_find_prev_delimiter_agrees_with_brute_force() {
    const PIECES: &[&str] = &[
        "a;", "(b;", ")", "{", "}", "\"c;\"", "/* ; */", "// ;\n", "\n", " ",
    ];
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..30 {
        let text: String = (0..25)
            .map(|_| PIECES[rng.gen_range(0..PIECES.len())])
            .collect();
        let doc = JavaDocument::from_text(&text);
        for pos in 0..=doc.len_chars() {
            for skip in [false, true] {
                let found = doc.find_prev_delimiter(pos, &[';', '{'], skip).unwrap();
                assert_eq!(
                    found,
                    brute_force_prev_delimiter(&doc, pos, &[';', '{'], skip),
                    "{text:?} at {pos} (skip {skip})"
                );
                if let Some(found) = found {
                    assert!(!doc.is_shadowed(found).unwrap());
                }
            }
        }
    }
}
