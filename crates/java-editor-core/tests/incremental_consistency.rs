//! Incremental/full-scan equivalence.
//!
//! Random edits are applied character by character to an incrementally maintained model and the
//! resulting token sequence, lexical states and highlight spans are compared with a fresh scan of
//! the same text after every step.

use java_editor_core::{JavaDocument, ReducedModel, ReducedModelState};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Characters weighted towards the ones that change lexical state.
const ALPHABET: &[char] = &[
    'a', 'b', ' ', '/', '/', '*', '*', '"', '"', '\'', '\\', '\n', '{', '}', '(', ')', '[', ']',
    ';',
];

fn random_char(rng: &mut StdRng) -> char {
    ALPHABET[rng.gen_range(0..ALPHABET.len())]
}

fn states(model: &mut ReducedModel) -> Vec<ReducedModelState> {
    let back = model.position() as isize;
    model.move_walker(-back).unwrap();
    let mut out = Vec::with_capacity(model.len());
    for _ in 0..model.len() {
        out.push(model.state_at_current());
        model.move_walker(1).unwrap();
    }
    let end = model.position() as isize;
    model.move_walker(back - end).unwrap();
    out
}

#[test]
fn test_typing_matches_full_scan() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut model = ReducedModel::new();
    let mut text = String::new();

    for _ in 0..400 {
        let ch = random_char(&mut rng);
        let at = rng.gen_range(0..=model.len());
        let here = model.position() as isize;
        model.move_walker(at as isize - here).unwrap();
        model.insert_char(ch);

        let byte = text.char_indices().nth(at).map_or(text.len(), |(i, _)| i);
        text.insert(byte, ch);

        assert_eq!(model.position(), at + 1);
        assert_eq!(model.tokens(), ReducedModel::from_text(&text).tokens(), "{text:?}");
    }
    assert_eq!(model.verify_against(&text), Ok(()));
}

#[test]
fn test_random_edits_match_full_scan() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..20 {
        let mut model = ReducedModel::new();
        let mut chars: Vec<char> = Vec::new();

        for _ in 0..150 {
            let here = model.position() as isize;
            if chars.is_empty() || rng.gen_bool(0.65) {
                let at = rng.gen_range(0..=chars.len());
                let run: String = (0..rng.gen_range(1..4))
                    .map(|_| random_char(&mut rng))
                    .collect();
                model.move_walker(at as isize - here).unwrap();
                model.insert_str(&run);
                chars.splice(at..at, run.chars());
            } else {
                let at = rng.gen_range(0..chars.len());
                let count = rng.gen_range(1..=(chars.len() - at).min(3));
                model.move_walker(at as isize - here).unwrap();
                model.delete(count).unwrap();
                assert_eq!(model.position(), at);
                chars.drain(at..at + count);
            }

            let text: String = chars.iter().collect();
            let mut fresh = ReducedModel::from_text(&text);
            assert_eq!(model.len(), chars.len());
            assert_eq!(model.tokens(), fresh.tokens(), "round {round}: {text:?}");
            assert_eq!(states(&mut model), states(&mut fresh), "round {round}: {text:?}");
        }
    }
}

#[test]
fn test_document_highlight_matches_fresh_document() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut doc = JavaDocument::new();

    for _ in 0..200 {
        let at = rng.gen_range(0..=doc.len_chars());
        let piece = match rng.gen_range(0..6) {
            0 => "int ",
            1 => "/*",
            2 => "*/",
            3 => "\"s\"",
            4 => "// c\n",
            _ => "x = 10;\n",
        };
        doc.insert_string(at, piece).unwrap();
        if rng.gen_bool(0.2) && doc.len_chars() > 2 {
            let at = rng.gen_range(0..doc.len_chars() - 1);
            doc.remove(at, 2).unwrap();
        }

        let fresh = JavaDocument::from_text(&doc.text());
        let len = doc.len_chars();
        assert_eq!(
            doc.highlight_status(0, len).unwrap(),
            fresh.highlight_status(0, len).unwrap()
        );
    }
    assert_eq!(doc.verify_reduced_model(), Ok(()));
}

#[test]
fn test_edit_cost_stays_local() {
    // A long document where an edit far from any delimiter must not disturb the tail.
    let line = "int value = compute(a, b); // note\n";
    let text = line.repeat(2_000);
    let mut model = ReducedModel::from_text(&text);
    let tokens_before = model.tokens();

    model.move_walker(10).unwrap();
    model.insert_char('x');
    model.move_walker(-1).unwrap();
    model.delete(1).unwrap();

    assert_eq!(model.tokens(), tokens_before);
    assert_eq!(model.position(), 10);
}
