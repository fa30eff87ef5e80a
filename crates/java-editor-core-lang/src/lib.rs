#![warn(missing_docs)]
//! `java-editor-core-lang` - Java language data for `java-editor-core`.
//!
//! This crate intentionally stays dependency-free. It provides the immutable word sets used by
//! the highlighter, the comment tokens used by the indenter, and the default character sets the
//! query layer is called with. Everything here is built once and shared; nothing is mutable.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Comment tokens/config for a given language.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
    /// Leading token of a block comment continuation line (e.g. `*`).
    pub block_continuation: Option<String>,
}

impl CommentConfig {
    /// The comment tokens of Java (and every other C-family language).
    pub fn java() -> Self {
        Self {
            block_start: Some("/*".to_string()),
            block_end: Some("*/".to_string()),
            block_continuation: Some("*".to_string()),
        }
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if `line` (already stripped of leading whitespace) opens a block comment.
    pub fn starts_block(&self, line: &str) -> bool {
        self.block_start
            .as_deref()
            .is_some_and(|start| !start.is_empty() && line.starts_with(start))
    }
}

/// Reserved words and primitive type names consulted when splitting normal text into
/// keyword/type spans.
#[derive(Debug, Clone)]
pub struct WordSets {
    keywords: HashSet<&'static str>,
    types: HashSet<&'static str>,
}

impl WordSets {
    /// Build a word set from explicit lists.
    pub fn new(
        keywords: impl IntoIterator<Item = &'static str>,
        types: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            keywords: keywords.into_iter().collect(),
            types: types.into_iter().collect(),
        }
    }

    /// The shared Java word sets, built on first use.
    pub fn java() -> &'static WordSets {
        &JAVA_WORDS
    }

    /// Returns `true` if `word` is a reserved word (or literal keyword such as `null`).
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    /// Returns `true` if `word` is a primitive type name.
    pub fn is_type(&self, word: &str) -> bool {
        self.types.contains(word)
    }
}

/// Java reserved words, including the literal keywords `true`, `false` and `null`.
pub const JAVA_KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "interface",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "volatile",
    "while",
];

/// Java primitive type names (plus `void`).
pub const JAVA_PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

static JAVA_WORDS: LazyLock<WordSets> = LazyLock::new(|| {
    WordSets::new(
        JAVA_KEYWORDS.iter().copied(),
        JAVA_PRIMITIVE_TYPES.iter().copied(),
    )
});

/// Characters that end a statement (or open/close a block) in Java.
pub const STATEMENT_DELIMITERS: &[char] = &[';', '{', '}'];

/// Whitespace characters skipped by the indenter and the statement-start search.
pub const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r'];

/// Words that continue the statement closed by the preceding `}`.
pub const BRACE_CONTINUATION_WORDS: &[&str] = &["else", "catch", "finally", "while"];

/// Words that open a `switch` label line.
pub const CASE_LABEL_WORDS: &[&str] = &["case", "default"];
