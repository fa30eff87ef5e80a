//! Lexical states and reduced tokens.
//!
//! The reduced model does not keep the document's characters. It keeps a sequence of
//! [`ReducedToken`]s: one token for every character (or two-character delimiter) that can change
//! the lexical state or the brace nesting, and [`TokenKind::Gap`] runs for everything else. Gap
//! characters never influence lexing, so the model can re-lex any region from its own tokens.

/// Lexical classification of a document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReducedModelState {
    /// Ordinary code.
    #[default]
    Free,
    /// Inside a `//` comment (up to, not including, the newline).
    InsideLineComment,
    /// Inside a `/* ... */` comment, delimiters included.
    InsideBlockComment,
    /// Inside a string literal, quotes included.
    InsideString,
    /// Inside a character literal, quotes included.
    InsideChar,
}

impl ReducedModelState {
    /// Returns `true` for ordinary code.
    pub fn is_free(self) -> bool {
        self == Self::Free
    }

    /// Returns `true` inside either kind of comment.
    pub fn is_comment(self) -> bool {
        matches!(self, Self::InsideLineComment | Self::InsideBlockComment)
    }

    /// Returns `true` inside a string or character literal.
    pub fn is_quoted(self) -> bool {
        matches!(self, Self::InsideString | Self::InsideChar)
    }
}

/// The three bracket pairs tracked for nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BraceKind {
    /// `(` `)`
    Paren,
    /// `{` `}`
    Curly,
    /// `[` `]`
    Square,
}

impl BraceKind {
    /// The opening character of this pair.
    pub fn open_char(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Curly => '{',
            Self::Square => '[',
        }
    }

    /// The closing character of this pair.
    pub fn close_char(self) -> char {
        match self {
            Self::Paren => ')',
            Self::Curly => '}',
            Self::Square => ']',
        }
    }

    /// Returns the pair `ch` opens, if any.
    pub fn from_open(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Self::Paren),
            '{' => Some(Self::Curly),
            '[' => Some(Self::Square),
            _ => None,
        }
    }

    /// Returns the pair `ch` closes, if any.
    pub fn from_close(ch: char) -> Option<Self> {
        match ch {
            ')' => Some(Self::Paren),
            '}' => Some(Self::Curly),
            ']' => Some(Self::Square),
            _ => None,
        }
    }
}

/// Shape of a reduced token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A run of characters that never affect lexing.
    Gap(usize),
    /// An opening bracket.
    Open(BraceKind),
    /// A closing bracket.
    Close(BraceKind),
    /// `\n`
    Newline,
    /// `"`
    DoubleQuote,
    /// `'`
    SingleQuote,
    /// `//` opening a line comment.
    LineCommentStart,
    /// `/*` opening a block comment.
    BlockCommentStart,
    /// `*/` closing a block comment.
    BlockCommentEnd,
    /// A backslash escaping `\`, `"` or `'` inside a literal; holds the escaped character.
    Escape(char),
    /// A `/` that is not part of a comment delimiter.
    Slash,
    /// A `*` that is not part of a comment delimiter.
    Star,
    /// A `\` that escapes nothing significant.
    Backslash,
}

/// Stand-in for gap characters when a region is re-lexed from tokens.
pub(crate) const GAP_CHAR: char = '_';

impl TokenKind {
    /// Number of characters covered.
    pub fn len(self) -> usize {
        match self {
            Self::Gap(len) => len,
            Self::LineCommentStart | Self::BlockCommentStart | Self::BlockCommentEnd => 2,
            Self::Escape(_) => 2,
            _ => 1,
        }
    }

    /// Returns `true` for an empty gap (never stored).
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Characters this token stands for. Gaps yield placeholders.
    pub(crate) fn chars(self) -> Vec<char> {
        match self {
            Self::Gap(len) => vec![GAP_CHAR; len],
            Self::Open(kind) => vec![kind.open_char()],
            Self::Close(kind) => vec![kind.close_char()],
            Self::Newline => vec!['\n'],
            Self::DoubleQuote => vec!['"'],
            Self::SingleQuote => vec!['\''],
            Self::LineCommentStart => vec!['/', '/'],
            Self::BlockCommentStart => vec!['/', '*'],
            Self::BlockCommentEnd => vec!['*', '/'],
            Self::Escape(ch) => vec!['\\', ch],
            Self::Slash => vec!['/'],
            Self::Star => vec!['*'],
            Self::Backslash => vec!['\\'],
        }
    }

    /// First character, used as one character of lookahead.
    pub(crate) fn first_char(self) -> char {
        match self {
            Self::Gap(_) => GAP_CHAR,
            Self::Open(kind) => kind.open_char(),
            Self::Close(kind) => kind.close_char(),
            Self::Newline => '\n',
            Self::DoubleQuote => '"',
            Self::SingleQuote => '\'',
            Self::LineCommentStart | Self::BlockCommentStart | Self::Slash => '/',
            Self::BlockCommentEnd | Self::Star => '*',
            Self::Escape(_) | Self::Backslash => '\\',
        }
    }
}

/// A token together with the lexical state in force at its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReducedToken {
    /// Token shape.
    pub kind: TokenKind,
    /// State in force when the token starts.
    pub entry: ReducedModelState,
}

impl ReducedToken {
    /// Create a token.
    pub fn new(kind: TokenKind, entry: ReducedModelState) -> Self {
        Self { kind, entry }
    }

    pub(crate) fn gap(len: usize, entry: ReducedModelState) -> Self {
        Self::new(TokenKind::Gap(len), entry)
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.kind.len()
    }

    /// Returns `true` for an empty gap.
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    /// The state reported for the characters of this token.
    ///
    /// Opening delimiters belong to the region they open, and a newline that ends a line
    /// comment or an unterminated literal belongs to ordinary code.
    pub fn shadow_state(&self) -> ReducedModelState {
        use ReducedModelState::*;
        match (self.kind, self.entry) {
            (TokenKind::LineCommentStart, Free) => InsideLineComment,
            (TokenKind::BlockCommentStart, Free) => InsideBlockComment,
            (TokenKind::DoubleQuote, Free) => InsideString,
            (TokenKind::SingleQuote, Free) => InsideChar,
            (TokenKind::Newline, InsideLineComment | InsideString | InsideChar) => Free,
            (_, state) => state,
        }
    }

    /// The state in force right after this token.
    pub fn exit_state(&self) -> ReducedModelState {
        use ReducedModelState::*;
        match (self.kind, self.entry) {
            (TokenKind::LineCommentStart, Free) => InsideLineComment,
            (TokenKind::BlockCommentStart, Free) => InsideBlockComment,
            (TokenKind::BlockCommentEnd, InsideBlockComment) => Free,
            (TokenKind::DoubleQuote, Free) => InsideString,
            (TokenKind::DoubleQuote, InsideString) => Free,
            (TokenKind::SingleQuote, Free) => InsideChar,
            (TokenKind::SingleQuote, InsideChar) => Free,
            (TokenKind::Newline, InsideLineComment | InsideString | InsideChar) => Free,
            (_, state) => state,
        }
    }

    /// The bracket this token opens in ordinary code.
    pub fn free_open(&self) -> Option<BraceKind> {
        match self.kind {
            TokenKind::Open(kind) if self.entry.is_free() => Some(kind),
            _ => None,
        }
    }

    /// The bracket this token closes in ordinary code.
    pub fn free_close(&self) -> Option<BraceKind> {
        match self.kind {
            TokenKind::Close(kind) if self.entry.is_free() => Some(kind),
            _ => None,
        }
    }

    /// Returns `true` for a newline token (in any state).
    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Newline
    }
}

/// Returns `true` if `ch` can start a non-gap token.
pub(crate) fn is_special(ch: char) -> bool {
    matches!(
        ch,
        '{' | '}' | '(' | ')' | '[' | ']' | '\n' | '"' | '\'' | '/' | '*' | '\\'
    )
}

/// Classify the token starting with `first` in `state`, given one character of lookahead.
///
/// Returns `None` when `first` is a gap character.
pub(crate) fn classify(
    state: ReducedModelState,
    first: char,
    second: Option<char>,
) -> Option<TokenKind> {
    use ReducedModelState::*;
    let kind = match first {
        '\n' => TokenKind::Newline,
        '"' => TokenKind::DoubleQuote,
        '\'' => TokenKind::SingleQuote,
        '/' => match (state, second) {
            (Free, Some('/')) => TokenKind::LineCommentStart,
            (Free, Some('*')) => TokenKind::BlockCommentStart,
            _ => TokenKind::Slash,
        },
        '*' => match (state, second) {
            (InsideBlockComment, Some('/')) => TokenKind::BlockCommentEnd,
            _ => TokenKind::Star,
        },
        '\\' => match (state, second) {
            (InsideString | InsideChar, Some(escaped @ ('\\' | '"' | '\''))) => {
                TokenKind::Escape(escaped)
            }
            _ => TokenKind::Backslash,
        },
        other => {
            if let Some(kind) = BraceKind::from_open(other) {
                TokenKind::Open(kind)
            } else if let Some(kind) = BraceKind::from_close(other) {
                TokenKind::Close(kind)
            } else {
                return None;
            }
        }
    };
    Some(kind)
}
