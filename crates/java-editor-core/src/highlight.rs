//! Highlight spans for syntax coloring.
//!
//! The reduced model classifies text as normal code, comment or string. Normal runs are then
//! split into keyword, type and number spans by tokenizing them on non-identifier characters and
//! checking each word against the injected [`WordSets`] or the numeric-literal grammar.

use crate::token::ReducedModelState;
use java_editor_core_lang::WordSets;
use regex::Regex;
use std::sync::LazyLock;

/// Classification of a highlight span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    /// Ordinary code.
    Normal,
    /// Comment text, delimiters included.
    Comment,
    /// String or character literal, quotes included.
    String,
    /// Reserved word.
    Keyword,
    /// Primitive type name.
    Type,
    /// Numeric literal.
    Number,
}

impl HighlightKind {
    /// The coarse classification of a lexical state.
    pub fn from_state(state: ReducedModelState) -> Self {
        match state {
            ReducedModelState::Free => Self::Normal,
            ReducedModelState::InsideLineComment | ReducedModelState::InsideBlockComment => {
                Self::Comment
            }
            ReducedModelState::InsideString | ReducedModelState::InsideChar => Self::String,
        }
    }
}

/// A classified run of characters: `[start, start + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightStatus {
    /// Start offset (characters).
    pub start: usize,
    /// Length (characters).
    pub length: usize,
    /// Classification.
    pub kind: HighlightKind,
}

impl HighlightStatus {
    /// Create a span.
    pub fn new(start: usize, length: usize, kind: HighlightKind) -> Self {
        Self {
            start,
            length,
            kind,
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Append a span, extending the last one when it is adjacent and of the same kind.
pub(crate) fn push_span(
    spans: &mut Vec<HighlightStatus>,
    start: usize,
    length: usize,
    kind: HighlightKind,
) {
    if length == 0 {
        return;
    }
    if let Some(last) = spans.last_mut()
        && last.kind == kind
        && last.end() == start
    {
        last.length += length;
        return;
    }
    spans.push(HighlightStatus::new(start, length, kind));
}

/// Merge adjacent spans of identical kind.
pub fn coalesce(spans: impl IntoIterator<Item = HighlightStatus>) -> Vec<HighlightStatus> {
    let mut out = Vec::new();
    for span in spans {
        push_span(&mut out, span.start, span.length, span.kind);
    }
    out
}

static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_$]+").expect("valid word regex")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:0[xX][0-9a-fA-F_]+[lL]?|0[bB][01_]+[lL]?|[0-9][0-9_]*(?:[eE][0-9]+)?[lLfFdD]?)$",
    )
    .expect("valid number regex")
});

/// Returns `true` if `word` parses as a Java numeric literal (digits, hex, binary, an exponent
/// without sign, and a type suffix).
pub fn is_number(word: &str) -> bool {
    NUMBER.is_match(word)
}

/// Split one normal span whose text is `text` into keyword/type/number/normal pieces.
pub(crate) fn split_normal(
    out: &mut Vec<HighlightStatus>,
    span_start: usize,
    text: &str,
    words: &WordSets,
) {
    let mut col = 0;
    let mut byte = 0;
    for m in WORD.find_iter(text) {
        col += text[byte..m.start()].chars().count();
        let len = m.as_str().chars().count();
        let kind = if words.is_keyword(m.as_str()) {
            HighlightKind::Keyword
        } else if words.is_type(m.as_str()) {
            HighlightKind::Type
        } else if is_number(m.as_str()) {
            HighlightKind::Number
        } else {
            HighlightKind::Normal
        };
        let gap_start = out.last().map_or(span_start, HighlightStatus::end);
        push_span(
            out,
            gap_start,
            span_start + col - gap_start,
            HighlightKind::Normal,
        );
        push_span(out, span_start + col, len, kind);
        col += len;
        byte = m.end();
    }
    col += text[byte..].chars().count();
    let tail_start = out.last().map_or(span_start, HighlightStatus::end);
    push_span(
        out,
        tail_start,
        span_start + col - tail_start,
        HighlightKind::Normal,
    );
}
