//! Indent decision engine.
//!
//! Indentation is decided by an ordered table of [`IndentRule`]s. Each rule lists the answers it
//! expects to a handful of yes/no [`Question`]s about the line and names the [`Action`] that
//! computes the line's leading whitespace. Rules are tried top to bottom and the first one whose
//! answers all match fires. The table is built from an [`IndentConfig`] and rebuilt whenever the
//! configuration changes.
//!
//! Questions and actions are answered through the document's query layer, so every lookup is
//! memoized until the next edit.

use crate::config::IndentConfig;
use crate::document::JavaDocument;
use crate::error::{DocumentError, IndentError};
use crate::token::{BraceKind, ReducedModelState};
use java_editor_core_lang::{
    BRACE_CONTINUATION_WORDS, CASE_LABEL_WORDS, CommentConfig, STATEMENT_DELIMITERS, WHITESPACE,
};
use std::ops::ControlFlow;

/// Why a line is being indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndentReason {
    /// An explicit request (menu command, Tab key).
    #[default]
    Other,
    /// A newline was just typed; the cursor is on the fresh line.
    EnterKey,
    /// Text was pasted.
    Paste,
}

/// Progress of a ranged indent, passed to the progress callback between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentProgress {
    /// Lines indented so far.
    pub completed: usize,
    /// Lines in the range.
    pub total: usize,
}

/// A yes/no question about the line being indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    /// The line starts inside a block comment opened on an earlier line.
    InsideBlockComment,
    /// The previous line, ignoring leading blanks, opens a block comment.
    PrevLineStartsComment,
    /// The line's first non-blank character is this one.
    StartsWith(char),
    /// The line's first word is one of these.
    StartsWithWord(&'static [&'static str]),
    /// The innermost bracket enclosing the line start is `(` or `[`.
    InsideBracketPhrase,
    /// The nearest code character before the line is this one.
    PrevCharIs(char),
    /// There is no code before the line, or the nearest code character ends a statement.
    PrevStatementEnded,
    /// The line starts a statement under a `case`/`default` label of the enclosing `switch`
    /// block: the nearest code character before it ends a statement or a label.
    CaseBodyStatement,
    /// The innermost bracket enclosing the line start is a `{` opening an array initializer or
    /// an enum constant list.
    InsideBraceList,
}

/// How to compute a line's leading whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The previous line's indentation plus `extra` spaces. On Enter, a `* ` continuation is
    /// added, and with `auto_close` an unterminated comment gets a closing line.
    CommentLine {
        /// Spaces added to the previous line's indentation.
        extra: usize,
        /// Close an unterminated comment on Enter.
        auto_close: bool,
    },
    /// The indentation of the statement owning the enclosing `{`, plus `extra` spaces. Top-level
    /// lines get no indentation.
    BraceStatement {
        /// Spaces added.
        extra: usize,
    },
    /// One column past the enclosing `(` or `[`.
    AlignWithBracket,
    /// The indentation of the statement the line belongs to, plus `extra` spaces.
    CurrentStatement {
        /// Spaces added.
        extra: usize,
    },
    /// The indentation of the line holding the nearest code character before the line.
    LineOfPrevChar,
    /// The indentation of the nearest label of the enclosing `switch` block, plus `extra`
    /// spaces.
    CaseBody {
        /// Spaces added.
        extra: usize,
    },
}

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentRule {
    /// Rule name, for logging.
    pub name: &'static str,
    /// Expected answers; all must match for the rule to fire.
    pub when: Vec<(Question, bool)>,
    /// Whitespace computation.
    pub action: Action,
}

impl IndentRule {
    fn new(
        name: &'static str,
        when: impl IntoIterator<Item = (Question, bool)>,
        action: Action,
    ) -> Self {
        Self {
            name,
            when: when.into_iter().collect(),
            action,
        }
    }
}

/// Line geometry before re-indenting.
#[derive(Debug, Clone, Copy)]
struct LineFacts {
    start: usize,
    first: usize,
    end: usize,
}

/// Line geometry before and after re-indenting.
#[derive(Debug, Clone, Copy)]
struct LineEdit {
    first: usize,
    end: usize,
    new_first: usize,
    new_end: usize,
}

impl LineEdit {
    /// Where a location on the line ends up: text positions keep their distance from the line
    /// end, and positions inside the old indentation move to the first character.
    fn relocate(&self, location: usize) -> usize {
        if location < self.first {
            self.new_first
        } else {
            self.new_end - (self.end - location)
        }
    }
}

/// The rule table plus the settings it was built from.
#[derive(Debug, Clone)]
pub struct Indenter {
    config: IndentConfig,
    comments: CommentConfig,
    rules: Vec<IndentRule>,
}

impl Indenter {
    /// Build the rule table for `config`.
    pub fn new(config: IndentConfig) -> Self {
        use Question::*;
        let width = config.indent_width;
        let comments = CommentConfig::java();
        let rules = vec![
            IndentRule::new(
                "comment-after-opener",
                [(InsideBlockComment, true), (PrevLineStartsComment, true)],
                Action::CommentLine {
                    extra: 1,
                    auto_close: config.auto_close_comments && comments.has_block(),
                },
            ),
            IndentRule::new(
                "comment-body",
                [(InsideBlockComment, true)],
                Action::CommentLine {
                    extra: 0,
                    auto_close: false,
                },
            ),
            IndentRule::new(
                "close-brace",
                [(StartsWith('}'), true)],
                Action::BraceStatement { extra: 0 },
            ),
            IndentRule::new(
                "bracket-phrase",
                [(InsideBracketPhrase, true)],
                Action::AlignWithBracket,
            ),
            IndentRule::new(
                "open-brace",
                [(StartsWith('{'), true), (PrevStatementEnded, false)],
                Action::CurrentStatement { extra: 0 },
            ),
            IndentRule::new(
                "brace-continuation",
                [
                    (StartsWithWord(BRACE_CONTINUATION_WORDS), true),
                    (PrevCharIs('}'), true),
                ],
                Action::LineOfPrevChar,
            ),
            IndentRule::new(
                "case-label",
                [(StartsWithWord(CASE_LABEL_WORDS), true)],
                Action::BraceStatement { extra: width },
            ),
            IndentRule::new(
                "case-body",
                [(CaseBodyStatement, true)],
                Action::CaseBody { extra: width },
            ),
            IndentRule::new(
                "list-element",
                [(PrevCharIs(','), true), (InsideBraceList, true)],
                Action::BraceStatement { extra: width },
            ),
            IndentRule::new(
                "new-statement",
                [(PrevStatementEnded, true)],
                Action::BraceStatement { extra: width },
            ),
            IndentRule::new(
                "continuation",
                [],
                Action::CurrentStatement { extra: width },
            ),
        ];
        Self {
            config,
            comments,
            rules,
        }
    }

    /// The settings the table was built from.
    pub fn config(&self) -> IndentConfig {
        self.config
    }

    /// The rule table, in evaluation order.
    pub fn rules(&self) -> &[IndentRule] {
        &self.rules
    }

    /// Indent the line holding the document's current location and keep the location on the
    /// same text. Returns `true` if the location's column changed.
    pub fn indent_line(
        &self,
        doc: &mut JavaDocument,
        reason: IndentReason,
    ) -> Result<bool, IndentError> {
        let location = doc.current_location();
        let line_start = doc.line_start_pos(location)?;
        let edit = self.reindent(doc, location, reason, true)?;
        let moved = edit.relocate(location);
        doc.set_current_location(moved)?;
        Ok(moved - line_start != location - line_start)
    }

    /// Indent every line touched by `[start, end)`.
    ///
    /// Lines are walked by position, so the whitespace changes made on one line never disturb
    /// the walk. `progress` is polled before every line after the first; a
    /// [`ControlFlow::Break`] stops the walk with [`IndentError::Cancelled`]. The current
    /// location is restored to the same text it pointed at before the call.
    pub fn indent_lines(
        &self,
        doc: &mut JavaDocument,
        start: usize,
        end: usize,
        reason: IndentReason,
        mut progress: impl FnMut(IndentProgress) -> ControlFlow<()>,
    ) -> Result<(), IndentError> {
        let len = doc.len_chars();
        if start > end || end > len {
            return Err(DocumentError::Location {
                offset: start,
                length: end.saturating_sub(start),
                len,
            }
            .into());
        }
        if start == end {
            doc.set_current_location(start)?;
            self.indent_line(doc, reason)?;
            return Ok(());
        }

        let origin = doc.current_location();
        let first_line = doc.line_start_pos(start)?;
        let last_line = doc.line_start_pos(end - 1)?;
        let total = 1 + count_newlines(doc, first_line, last_line)?;
        let origin_line = if origin >= first_line {
            Some(count_newlines(doc, first_line, origin)?).filter(|line| *line < total)
        } else {
            None
        };
        let origin_from_end = doc.line_end_pos(origin)? - origin;
        let len_before = len;

        let mut restored = None;
        let mut line_start = first_line;
        let mut outcome = Ok(());
        for index in 0..total {
            if index > 0
                && progress(IndentProgress {
                    completed: index,
                    total,
                })
                .is_break()
            {
                log::warn!("indentation cancelled after {index} of {total} lines");
                outcome = Err(IndentError::Cancelled { completed: index });
                break;
            }
            let edit = self.reindent(doc, line_start, reason, false)?;
            if origin_line == Some(index) {
                restored = Some(edit.relocate(edit.end - origin_from_end));
            }
            line_start = edit.new_end + 1;
        }

        let location = match restored {
            Some(location) => location,
            None if origin < first_line => origin,
            None => {
                let delta = doc.len_chars() as isize - len_before as isize;
                origin.saturating_add_signed(delta).min(doc.len_chars())
            }
        };
        doc.set_current_location(location)?;
        outcome
    }

    /// Replace the leading whitespace of the line holding `location`.
    fn reindent(
        &self,
        doc: &mut JavaDocument,
        location: usize,
        reason: IndentReason,
        allow_auto_close: bool,
    ) -> Result<LineEdit, DocumentError> {
        let facts = LineFacts {
            start: doc.line_start_pos(location)?,
            first: doc.line_first_char_pos(location)?,
            end: doc.line_end_pos(location)?,
        };
        let unchanged = LineEdit {
            first: facts.first,
            end: facts.end,
            new_first: facts.first,
            new_end: facts.end,
        };
        let Some(rule) = self.select(doc, &facts)? else {
            return Ok(unchanged);
        };
        log::debug!("indenting line at {} by rule {}", facts.start, rule.name);

        let base = self.leading_whitespace(rule.action, doc, &facts)?;
        let mut prefix = base.clone();
        let mut closing = None;
        if let Action::CommentLine { auto_close, .. } = rule.action
            && reason == IndentReason::EnterKey
        {
            let content = doc.get_text(facts.first, facts.end - facts.first)?;
            let continuation = self.comments.block_continuation.as_deref().unwrap_or_default();
            if !continuation.is_empty() && !content.starts_with(continuation) {
                prefix.push_str(continuation);
                prefix.push(' ');
            }
            if auto_close
                && allow_auto_close
                && let Some(end) = self.comments.block_end.as_deref()
                && self.comment_unterminated(doc, facts.start)?
            {
                closing = Some(format!("\n{base}{end}"));
            }
        }

        let current = doc.get_text(facts.start, facts.first - facts.start)?;
        if current != prefix {
            doc.remove(facts.start, facts.first - facts.start)?;
            doc.insert_string(facts.start, &prefix)?;
        }
        let new_first = facts.start + prefix.chars().count();
        let new_end = new_first + (facts.end - facts.first);
        if let Some(closing) = closing {
            doc.insert_string(new_end, &closing)?;
        }
        Ok(LineEdit {
            new_first,
            new_end,
            ..unchanged
        })
    }

    fn select(
        &self,
        doc: &JavaDocument,
        facts: &LineFacts,
    ) -> Result<Option<&IndentRule>, DocumentError> {
        'rules: for rule in &self.rules {
            for (question, expected) in &rule.when {
                if self.ask(*question, doc, facts)? != *expected {
                    continue 'rules;
                }
            }
            return Ok(Some(rule));
        }
        Ok(None)
    }

    fn ask(
        &self,
        question: Question,
        doc: &JavaDocument,
        facts: &LineFacts,
    ) -> Result<bool, DocumentError> {
        let answer = match question {
            Question::InsideBlockComment => {
                facts.start > 0
                    && doc.state_at(facts.start - 1)? == ReducedModelState::InsideBlockComment
            }
            Question::PrevLineStartsComment => {
                facts.start > 0 && {
                    let prev_end = facts.start - 1;
                    let prev_first = doc.line_first_char_pos(prev_end)?;
                    let line = doc.get_text(prev_first, prev_end - prev_first)?;
                    self.comments.starts_block(&line)
                }
            }
            Question::StartsWith(ch) => {
                facts.first < facts.end && doc.char_at(facts.first) == Some(ch)
            }
            Question::StartsWithWord(words) => {
                let content = doc.get_text(facts.first, facts.end - facts.first)?;
                let word = first_word(&content);
                words.iter().any(|candidate| *candidate == word)
            }
            Question::InsideBracketPhrase => matches!(
                doc.indent_information_at(facts.start)?.enclosing_kind(),
                Some(BraceKind::Paren | BraceKind::Square)
            ),
            Question::PrevCharIs(ch) => prev_code_char(doc, facts.start)? == Some(ch),
            Question::PrevStatementEnded => match prev_code_char(doc, facts.start)? {
                None => true,
                Some(ch) => STATEMENT_DELIMITERS.contains(&ch),
            },
            Question::CaseBodyStatement => {
                let ended = match doc.find_prev_char_pos(facts.start, WHITESPACE)? {
                    None => false,
                    Some(pos) => match doc.char_at(pos) {
                        Some(':') => is_label_line(doc, pos)?,
                        Some(ch) => STATEMENT_DELIMITERS.contains(&ch),
                        None => false,
                    },
                };
                ended && case_label(doc, facts.start)?.is_some()
            }
            Question::InsideBraceList => match innermost_curly(doc, facts.start)? {
                None => false,
                Some(brace) => {
                    let opens_list = doc
                        .find_prev_char_pos(brace, WHITESPACE)?
                        .and_then(|pos| doc.char_at(pos))
                        .is_some_and(|ch| matches!(ch, '=' | ',' | '{' | '(' | ']'));
                    opens_list || has_word(&brace_owner(doc, brace)?, "enum")
                }
            },
        };
        Ok(answer)
    }

    fn leading_whitespace(
        &self,
        action: Action,
        doc: &JavaDocument,
        facts: &LineFacts,
    ) -> Result<String, DocumentError> {
        let indent = match action {
            Action::CommentLine { extra, .. } => {
                let prev_end = facts.start.saturating_sub(1);
                line_indent(doc, prev_end)? + &" ".repeat(extra)
            }
            Action::BraceStatement { extra } => {
                match doc.find_prev_enclosing_brace(facts.start, '{', '}')? {
                    Some(brace) => statement_indent(doc, brace)? + &" ".repeat(extra),
                    None => String::new(),
                }
            }
            Action::AlignWithBracket => doc
                .indent_information_at(facts.start)?
                .enclosing
                .map_or_else(String::new, |brace| {
                    " ".repeat(brace.dist_to_line_start + 1)
                }),
            Action::CurrentStatement { extra } => {
                statement_indent(doc, facts.start)? + &" ".repeat(extra)
            }
            Action::LineOfPrevChar => match doc.find_prev_char_pos(facts.start, WHITESPACE)? {
                Some(pos) => line_indent(doc, pos)?,
                None => String::new(),
            },
            Action::CaseBody { extra } => match case_label(doc, facts.start)? {
                Some(label) => line_indent(doc, label)? + &" ".repeat(extra),
                None => String::new(),
            },
        };
        Ok(indent)
    }

    /// Returns `true` if no comment terminator follows `from` before the next comment opener.
    fn comment_unterminated(&self, doc: &JavaDocument, from: usize) -> Result<bool, DocumentError> {
        let (Some(open), Some(close)) = (
            self.comments.block_start.as_deref(),
            self.comments.block_end.as_deref(),
        ) else {
            return Ok(false);
        };
        let rest = doc.get_text(from, doc.len_chars() - from)?;
        Ok(match rest.find(close) {
            None => true,
            Some(closed) => rest.find(open).is_some_and(|opened| opened < closed),
        })
    }
}

/// Leading whitespace of the line holding `pos`.
fn line_indent(doc: &JavaDocument, pos: usize) -> Result<String, DocumentError> {
    let start = doc.line_start_pos(pos)?;
    let first = doc.line_first_char_pos(pos)?;
    doc.get_text(start, first - start)
}

/// Leading whitespace of the first line of the statement holding `pos`.
///
/// Like [`JavaDocument::indent_of_curr_stmt`] with the Java delimiters, except that label lines
/// (`case 1:`, `default:`) above `pos` head the statement without belonging to it.
fn statement_indent(doc: &JavaDocument, pos: usize) -> Result<String, DocumentError> {
    let line_start = doc.line_start_pos(pos)?;
    let after_delim = doc
        .find_prev_delimiter(line_start, STATEMENT_DELIMITERS, true)?
        .map_or(0, |delim| delim + 1);
    let Some(mut start) = doc
        .first_non_ws_char_pos(after_delim, WHITESPACE, false)?
        .filter(|start| *start <= pos)
    else {
        return line_indent(doc, line_start);
    };
    while is_label_line(doc, start)? {
        let label_end = doc.line_end_pos(start)?;
        if label_end >= line_start {
            break;
        }
        match doc
            .first_non_ws_char_pos(label_end, WHITESPACE, false)?
            .filter(|next| *next <= pos)
        {
            Some(next) => start = next,
            None => break,
        }
    }
    line_indent(doc, start)
}

/// Returns `true` if the line holding `pos` is a `case`/`default` label ending in `:`.
fn is_label_line(doc: &JavaDocument, pos: usize) -> Result<bool, DocumentError> {
    let first = doc.line_first_char_pos(pos)?;
    let end = doc.line_end_pos(pos)?;
    let word = first_word(&doc.get_text(first, end - first)?).to_string();
    if !CASE_LABEL_WORDS.iter().any(|label| *label == word) {
        return Ok(false);
    }
    Ok(doc
        .find_prev_char_pos(end, WHITESPACE)?
        .and_then(|last| doc.char_at(last))
        == Some(':'))
}

/// Start of the nearest label line above `line_start` that belongs to the `switch` block
/// enclosing it.
fn case_label(doc: &JavaDocument, line_start: usize) -> Result<Option<usize>, DocumentError> {
    let Some(brace) = innermost_curly(doc, line_start)? else {
        return Ok(None);
    };
    if !has_word(&brace_owner(doc, brace)?, "switch") {
        return Ok(None);
    }
    let mut line = line_start;
    while line > 0 {
        let prev = doc.line_start_pos(line - 1)?;
        if prev <= brace {
            break;
        }
        let first = doc.line_first_char_pos(prev)?;
        let end = doc.line_end_pos(prev)?;
        let word = first_word(&doc.get_text(first, end - first)?).to_string();
        if CASE_LABEL_WORDS.iter().any(|label| *label == word)
            && !doc.is_shadowed(first)?
            && innermost_curly(doc, first)? == Some(brace)
        {
            return Ok(Some(prev));
        }
        line = prev;
    }
    Ok(None)
}

/// Offset of the `{` enclosing `pos` when it is the innermost bracket there.
fn innermost_curly(doc: &JavaDocument, pos: usize) -> Result<Option<usize>, DocumentError> {
    if doc.indent_information_at(pos)?.enclosing_kind() != Some(BraceKind::Curly) {
        return Ok(None);
    }
    doc.find_prev_enclosing_brace(pos, '{', '}')
}

/// The code from the start of the statement owning `brace` up to the brace.
fn brace_owner(doc: &JavaDocument, brace: usize) -> Result<String, DocumentError> {
    let after_delim = doc
        .find_prev_delimiter(brace, STATEMENT_DELIMITERS, true)?
        .map_or(0, |delim| delim + 1);
    let start = doc
        .first_non_ws_char_pos(after_delim, WHITESPACE, false)?
        .filter(|start| *start <= brace)
        .unwrap_or(brace);
    doc.get_text(start, brace - start)
}

fn first_word(text: &str) -> &str {
    text.split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .next()
        .unwrap_or_default()
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .any(|candidate| candidate == word)
}

/// The nearest non-blank, non-comment character before `pos`.
fn prev_code_char(doc: &JavaDocument, pos: usize) -> Result<Option<char>, DocumentError> {
    Ok(doc
        .find_prev_char_pos(pos, WHITESPACE)?
        .and_then(|found| doc.char_at(found)))
}

fn count_newlines(doc: &JavaDocument, from: usize, to: usize) -> Result<usize, DocumentError> {
    Ok(doc.get_text(from, to - from)?.matches('\n').count())
}
