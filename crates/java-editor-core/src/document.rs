//! Document façade and query layer.
//!
//! [`JavaDocument`] owns the character store, the current location, the reduced model and the
//! query cache. It is the only place where the three are kept in step:
//!
//! - Every insertion or removal clears the cache, then feeds the changed characters to the
//!   reduced model at the edit offset, then updates the current location.
//! - Every query locks the reduced-model domain, relocates the walker to the offset it needs,
//!   reads, and moves the walker back to the current location before releasing the lock.
//!
//! Mutations take `&mut self`; queries take `&self` and may run from several threads at once.
//! They serialize on the reduced-model lock. A host that needs a consistent view across several
//! queries wraps the document in its own `RwLock`.
//!
//! All offsets are character offsets. Query results that may be absent are `Option<usize>`;
//! `Err` is reserved for malformed arguments and invalid state.

use crate::cache::{CacheStats, QueryCache};
use crate::config::IndentConfig;
use crate::error::{DocumentError, IndentError, ModelError};
use crate::highlight::{HighlightKind, HighlightStatus, push_span, split_normal};
use crate::indent::{IndentProgress, IndentReason, Indenter};
use crate::reduced::{IndentInfo, ReducedModel};
use crate::token::{BraceKind, ReducedModelState};
use java_editor_core_lang::WordSets;
use parking_lot::Mutex;
use ropey::Rope;
use std::ops::ControlFlow;
use std::sync::Arc;

/// The reduced model together with the location its walker rests at between operations.
#[derive(Debug)]
struct ReducedDomain {
    model: ReducedModel,
    location: usize,
}

/// A Java source document with incremental lexical tracking.
#[derive(Debug)]
pub struct JavaDocument {
    text: Rope,
    reduced: Mutex<ReducedDomain>,
    cache: QueryCache,
    words: &'static WordSets,
    indenter: Arc<Indenter>,
}

impl Default for JavaDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Move the walker to an absolute offset and report the state there.
fn walk_to(model: &mut ReducedModel, offset: usize) -> Result<ReducedModelState, ModelError> {
    let here = model.position() as isize;
    model.move_walker_get_state(offset as isize - here)
}

impl JavaDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a document holding `text`, scanned once. The current location is 0.
    pub fn from_text(text: &str) -> Self {
        Self {
            text: Rope::from_str(text),
            reduced: Mutex::new(ReducedDomain {
                model: ReducedModel::from_text(text),
                location: 0,
            }),
            cache: QueryCache::default(),
            words: WordSets::java(),
            indenter: Arc::new(Indenter::new(IndentConfig::default())),
        }
    }

    /// Use `words` for keyword/type highlighting.
    pub fn with_word_sets(mut self, words: &'static WordSets) -> Self {
        self.words = words;
        self.cache.clear();
        self
    }

    /// Use a query cache bounded to `capacity` entries.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = QueryCache::with_capacity(capacity);
        self
    }

    /// Use `config` for indentation.
    pub fn with_indent_config(mut self, config: IndentConfig) -> Self {
        self.set_indent_config(config);
        self
    }

    // ------------------------------------------------------------------
    // Text access
    // ------------------------------------------------------------------

    /// Number of characters.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Returns `true` if the document holds no characters.
    pub fn is_empty(&self) -> bool {
        self.text.len_chars() == 0
    }

    /// The full text.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// The character at `offset`, if any.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get_char(offset)
    }

    /// `length` characters starting at `offset`.
    pub fn get_text(&self, offset: usize, length: usize) -> Result<String, DocumentError> {
        self.check_range(offset, length)?;
        Ok(self.text.slice(offset..offset + length).to_string())
    }

    fn check_range(&self, offset: usize, length: usize) -> Result<(), DocumentError> {
        let len = self.len_chars();
        match offset.checked_add(length) {
            Some(end) if end <= len => Ok(()),
            _ => Err(DocumentError::Location {
                offset,
                length,
                len,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Insert `text` at `offset`. The current location moves to the end of the insertion.
    pub fn insert_string(&mut self, offset: usize, text: &str) -> Result<(), DocumentError> {
        self.check_range(offset, 0)?;
        if text.is_empty() {
            return Ok(());
        }
        self.cache.clear();

        let domain = self.reduced.get_mut();
        let here = domain.model.position() as isize;
        domain.model.move_walker(offset as isize - here)?;
        self.text.insert(offset, text);
        domain.model.insert_str(text);
        domain.location = domain.model.position();
        log::trace!(
            "inserted {} characters at {offset}",
            domain.location - offset
        );
        Ok(())
    }

    /// Remove `length` characters at `offset`. The current location moves to `offset`.
    pub fn remove(&mut self, offset: usize, length: usize) -> Result<(), DocumentError> {
        self.check_range(offset, length)?;
        if length == 0 {
            return Ok(());
        }
        self.cache.clear();

        let domain = self.reduced.get_mut();
        let here = domain.model.position() as isize;
        domain.model.move_walker(offset as isize - here)?;
        domain.model.delete(length)?;
        self.text.remove(offset..offset + length);
        domain.location = offset;
        log::trace!("removed {length} characters at {offset}");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Current location
    // ------------------------------------------------------------------

    /// The current location (the offset the reduced-model walker rests at).
    pub fn current_location(&self) -> usize {
        self.reduced.lock().location
    }

    /// Set the current location.
    pub fn set_current_location(&self, location: usize) -> Result<(), DocumentError> {
        self.check_range(location, 0)?;
        let mut domain = self.reduced.lock();
        walk_to(&mut domain.model, location)?;
        domain.location = location;
        Ok(())
    }

    /// Move the current location by a signed distance and return the new location.
    pub fn move_location(&self, distance: isize) -> Result<usize, DocumentError> {
        let mut domain = self.reduced.lock();
        domain.model.move_walker(distance)?;
        domain.location = domain.model.position();
        Ok(domain.location)
    }

    /// Run `f` with the walker at `pos`, then restore the walker to the current location.
    fn probe<T>(
        &self,
        pos: usize,
        f: impl FnOnce(&mut ReducedModel, &Rope) -> Result<T, ModelError>,
    ) -> Result<T, DocumentError> {
        self.check_range(pos, 0)?;
        let mut guard = self.reduced.lock();
        let domain = &mut *guard;
        walk_to(&mut domain.model, pos)?;
        let result = f(&mut domain.model, &self.text);
        walk_to(&mut domain.model, domain.location)?;
        Ok(result?)
    }

    // ------------------------------------------------------------------
    // Lexical queries
    // ------------------------------------------------------------------

    /// Lexical state of the character at `pos`.
    pub fn state_at(&self, pos: usize) -> Result<ReducedModelState, DocumentError> {
        self.cache.memoize(
            || format!("state_at:{pos}"),
            || self.probe(pos, |model, _| Ok(model.state_at_current())),
        )
    }

    /// Returns `true` if `pos` is inside a comment, string or character literal.
    pub fn is_shadowed(&self, pos: usize) -> Result<bool, DocumentError> {
        Ok(!self.state_at(pos)?.is_free())
    }

    /// Returns `true` if `pos` is inside a block comment.
    pub fn pos_in_block_comment(&self, pos: usize) -> Result<bool, DocumentError> {
        Ok(self.state_at(pos)? == ReducedModelState::InsideBlockComment)
    }

    /// Returns `true` if the innermost bracket enclosing `pos` is a parenthesis.
    pub fn pos_in_paren_phrase(&self, pos: usize) -> Result<bool, DocumentError> {
        self.cache.memoize(
            || format!("pos_in_paren_phrase:{pos}"),
            || {
                self.probe(pos, |model, _| {
                    Ok(model
                        .enclosing_brace()
                        .is_some_and(|(kind, _)| kind == BraceKind::Paren))
                })
            },
        )
    }

    // ------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------

    /// Offset just after the nearest newline before `pos`, or 0.
    pub fn line_start_pos(&self, pos: usize) -> Result<usize, DocumentError> {
        self.cache.memoize(
            || format!("line_start_pos:{pos}"),
            || {
                self.probe(pos, |model, _| {
                    Ok(model
                        .dist_to_previous_newline(0)
                        .map_or(0, |dist| pos - dist + 1))
                })
            },
        )
    }

    /// Offset of the next newline at or after `pos`, or the document length.
    pub fn line_end_pos(&self, pos: usize) -> Result<usize, DocumentError> {
        self.cache.memoize(
            || format!("line_end_pos:{pos}"),
            || self.probe(pos, |model, _| Ok(pos + model.dist_to_next_newline())),
        )
    }

    /// Offset of the first character on `pos`'s line that is not a space or tab (the line end
    /// for a blank line).
    pub fn line_first_char_pos(&self, pos: usize) -> Result<usize, DocumentError> {
        self.cache.memoize(
            || format!("line_first_char_pos:{pos}"),
            || {
                let start = self.line_start_pos(pos)?;
                let end = self.line_end_pos(pos)?;
                let indent = self
                    .text
                    .slice(start..end)
                    .chars()
                    .take_while(|ch| matches!(ch, ' ' | '\t'))
                    .count();
                Ok(start + indent)
            },
        )
    }

    // ------------------------------------------------------------------
    // Searching
    // ------------------------------------------------------------------

    /// Nearest offset before `pos` holding a character of `delims` in ordinary code.
    ///
    /// With `skip_paren_phrases`, delimiters whose innermost enclosing bracket is a parenthesis
    /// are passed over (the `;` of a `for (...)` header, for instance).
    pub fn find_prev_delimiter(
        &self,
        pos: usize,
        delims: &[char],
        skip_paren_phrases: bool,
    ) -> Result<Option<usize>, DocumentError> {
        self.cache.memoize(
            || format!("find_prev_delimiter:{pos}:{delims:?}:{skip_paren_phrases}"),
            || {
                self.probe(pos, |model, text| {
                    let mut chars = text.chars_at(pos);
                    let mut offset = pos;
                    while let Some(ch) = chars.prev() {
                        offset -= 1;
                        if delims.contains(&ch)
                            && walk_to(model, offset)?.is_free()
                            && !(skip_paren_phrases && in_paren(model))
                        {
                            return Ok(Some(offset));
                        }
                    }
                    Ok(None)
                })
            },
        )
    }

    /// First offset at or after `pos` holding a character of `delims` in ordinary code.
    pub fn find_next_delimiter(
        &self,
        pos: usize,
        delims: &[char],
        skip_paren_phrases: bool,
    ) -> Result<Option<usize>, DocumentError> {
        self.cache.memoize(
            || format!("find_next_delimiter:{pos}:{delims:?}:{skip_paren_phrases}"),
            || {
                self.probe(pos, |model, text| {
                    for (offset, ch) in (pos..).zip(text.chars_at(pos)) {
                        if delims.contains(&ch)
                            && walk_to(model, offset)?.is_free()
                            && !(skip_paren_phrases && in_paren(model))
                        {
                            return Ok(Some(offset));
                        }
                    }
                    Ok(None)
                })
            },
        )
    }

    /// Nearest offset before `pos` that is neither whitespace nor part of a comment.
    pub fn find_prev_char_pos(
        &self,
        pos: usize,
        whitespace: &[char],
    ) -> Result<Option<usize>, DocumentError> {
        self.cache.memoize(
            || format!("find_prev_char_pos:{pos}:{whitespace:?}"),
            || {
                self.probe(pos, |model, text| {
                    let mut chars = text.chars_at(pos);
                    let mut offset = pos;
                    while let Some(ch) = chars.prev() {
                        offset -= 1;
                        if !whitespace.contains(&ch) && !walk_to(model, offset)?.is_comment() {
                            return Ok(Some(offset));
                        }
                    }
                    Ok(None)
                })
            },
        )
    }

    /// First offset at or after `pos` that is not whitespace and, unless `accept_comments`,
    /// not part of a comment.
    pub fn first_non_ws_char_pos(
        &self,
        pos: usize,
        whitespace: &[char],
        accept_comments: bool,
    ) -> Result<Option<usize>, DocumentError> {
        self.cache.memoize(
            || format!("first_non_ws_char_pos:{pos}:{whitespace:?}:{accept_comments}"),
            || {
                self.probe(pos, |model, text| {
                    for (offset, ch) in (pos..).zip(text.chars_at(pos)) {
                        if whitespace.contains(&ch) {
                            continue;
                        }
                        if accept_comments || !walk_to(model, offset)?.is_comment() {
                            return Ok(Some(offset));
                        }
                    }
                    Ok(None)
                })
            },
        )
    }

    /// First offset on `pos`'s line holding `ch` in ordinary code.
    ///
    /// `/` and `*` cannot be found reliably: where they form comment delimiters they are part of
    /// the comment.
    pub fn find_char_on_line(&self, pos: usize, ch: char) -> Result<Option<usize>, DocumentError> {
        self.cache.memoize(
            || format!("find_char_on_line:{pos}:{ch:?}"),
            || {
                let start = self.line_start_pos(pos)?;
                let end = self.line_end_pos(pos)?;
                self.probe(start, |model, text| {
                    for (offset, found) in (start..end).zip(text.chars_at(start)) {
                        if found == ch && walk_to(model, offset)?.is_free() {
                            return Ok(Some(offset));
                        }
                    }
                    Ok(None)
                })
            },
        )
    }

    /// Leading whitespace of the first line of the statement containing `pos`.
    ///
    /// The statement starts at the first non-whitespace, non-comment character after the
    /// previous `delims` character that is not nested in a paren phrase.
    pub fn indent_of_curr_stmt(
        &self,
        pos: usize,
        delims: &[char],
        whitespace: &[char],
    ) -> Result<String, DocumentError> {
        self.cache.memoize(
            || format!("indent_of_curr_stmt:{pos}:{delims:?}:{whitespace:?}"),
            || {
                let line_start = self.line_start_pos(pos)?;
                let after_delim = self
                    .find_prev_delimiter(line_start, delims, true)?
                    .map_or(0, |delim| delim + 1);
                let stmt_start = self
                    .first_non_ws_char_pos(after_delim, whitespace, false)?
                    .filter(|start| *start <= pos)
                    .unwrap_or(line_start);
                let stmt_line = self.line_start_pos(stmt_start)?;
                let first = self.line_first_char_pos(stmt_start)?;
                self.get_text(stmt_line, first - stmt_line)
            },
        )
    }

    // ------------------------------------------------------------------
    // Braces
    // ------------------------------------------------------------------

    /// Nearest unmatched free `open` before `pos`, skipping balanced `open`/`close` pairs.
    pub fn find_prev_enclosing_brace(
        &self,
        pos: usize,
        open: char,
        close: char,
    ) -> Result<Option<usize>, DocumentError> {
        self.cache.memoize(
            || format!("find_prev_enclosing_brace:{pos}:{open:?}:{close:?}"),
            || {
                self.probe(pos, |model, text| {
                    let mut depth = 0usize;
                    let mut chars = text.chars_at(pos);
                    let mut offset = pos;
                    while let Some(ch) = chars.prev() {
                        offset -= 1;
                        if (ch != open && ch != close) || !walk_to(model, offset)?.is_free() {
                            continue;
                        }
                        if ch == close {
                            depth += 1;
                        } else if depth == 0 {
                            return Ok(Some(offset));
                        } else {
                            depth -= 1;
                        }
                    }
                    Ok(None)
                })
            },
        )
    }

    /// First unmatched free `close` at or after `pos`, skipping balanced pairs.
    pub fn find_next_enclosing_brace(
        &self,
        pos: usize,
        open: char,
        close: char,
    ) -> Result<Option<usize>, DocumentError> {
        self.cache.memoize(
            || format!("find_next_enclosing_brace:{pos}:{open:?}:{close:?}"),
            || {
                self.probe(pos, |model, text| {
                    let mut depth = 0usize;
                    for (offset, ch) in (pos..).zip(text.chars_at(pos)) {
                        if (ch != open && ch != close) || !walk_to(model, offset)?.is_free() {
                            continue;
                        }
                        if ch == open {
                            depth += 1;
                        } else if depth == 0 {
                            return Ok(Some(offset));
                        } else {
                            depth -= 1;
                        }
                    }
                    Ok(None)
                })
            },
        )
    }

    /// Offset of the bracket matching the one at `pos`.
    pub fn matching_brace(&self, pos: usize) -> Result<Option<usize>, DocumentError> {
        let Some(ch) = self.char_at(pos) else {
            return Ok(None);
        };
        self.cache.memoize(
            || format!("matching_brace:{pos}"),
            || {
                if BraceKind::from_open(ch).is_some() {
                    self.probe(pos, |model, _| {
                        Ok(model.balance_forward().map(|dist| pos + dist - 1))
                    })
                } else if BraceKind::from_close(ch).is_some() {
                    self.probe(pos + 1, |model, _| {
                        Ok(model.balance_backward().map(|dist| pos + 1 - dist))
                    })
                } else {
                    Ok(None)
                }
            },
        )
    }

    /// With a free opening bracket right of the current location, the distance to just past
    /// its match.
    pub fn balance_forward(&self) -> Result<Option<usize>, DocumentError> {
        let location = self.current_location();
        self.cache.memoize(
            || format!("balance_forward:{location}"),
            || self.probe(location, |model, _| Ok(model.balance_forward())),
        )
    }

    /// With a free closing bracket left of the current location, the distance back to its
    /// match.
    pub fn balance_backward(&self) -> Result<Option<usize>, DocumentError> {
        let location = self.current_location();
        self.cache.memoize(
            || format!("balance_backward:{location}"),
            || self.probe(location, |model, _| Ok(model.balance_backward())),
        )
    }

    /// Brace nesting facts for the current location.
    pub fn indent_information(&self) -> Result<IndentInfo, DocumentError> {
        self.indent_information_at(self.current_location())
    }

    /// Brace nesting facts for `pos`.
    pub fn indent_information_at(&self, pos: usize) -> Result<IndentInfo, DocumentError> {
        self.cache.memoize(
            || format!("indent_information:{pos}"),
            || self.probe(pos, |model, _| Ok(model.indent_info())),
        )
    }

    // ------------------------------------------------------------------
    // Highlighting
    // ------------------------------------------------------------------

    /// Highlight spans covering `[start, end)`: contiguous, ordered, and summing to
    /// `end - start`.
    pub fn highlight_status(
        &self,
        start: usize,
        end: usize,
    ) -> Result<Vec<HighlightStatus>, DocumentError> {
        let length = end.checked_sub(start).ok_or(DocumentError::Location {
            offset: start,
            length: 0,
            len: self.len_chars(),
        })?;
        self.check_range(start, length)?;
        self.cache.memoize(
            || format!("highlight_status:{start}:{end}"),
            || {
                let coarse = self.probe(start, |model, _| Ok(model.highlight_spans(length)))?;
                let mut spans = Vec::with_capacity(coarse.len());
                for span in coarse {
                    if span.kind == HighlightKind::Normal {
                        let text = self.text.slice(span.start..span.end()).to_string();
                        split_normal(&mut spans, span.start, &text, self.words);
                    } else {
                        push_span(&mut spans, span.start, span.length, span.kind);
                    }
                }
                Ok(spans)
            },
        )
    }

    // ------------------------------------------------------------------
    // Indentation
    // ------------------------------------------------------------------

    /// Current indentation settings.
    pub fn indent_config(&self) -> IndentConfig {
        self.indenter.config()
    }

    /// Replace the indentation settings, rebuilding the indent rule table if they changed.
    pub fn set_indent_config(&mut self, config: IndentConfig) {
        if self.indenter.config() == config {
            return;
        }
        log::debug!("rebuilding indent rules for {config:?}");
        self.indenter = Arc::new(Indenter::new(config));
    }

    /// Indent the line holding the current location. Returns `true` if the location's column
    /// changed.
    pub fn indent_line(&mut self, reason: IndentReason) -> Result<bool, IndentError> {
        let indenter = Arc::clone(&self.indenter);
        indenter.indent_line(self, reason)
    }

    /// Indent every line touched by `[start, end)`, polling `progress` between lines.
    ///
    /// A zero-length range indents the line holding `start`. Returning
    /// [`ControlFlow::Break`] from `progress` stops the walk with [`IndentError::Cancelled`];
    /// lines already indented stay indented.
    pub fn indent_lines(
        &mut self,
        start: usize,
        end: usize,
        reason: IndentReason,
        progress: impl FnMut(IndentProgress) -> ControlFlow<()>,
    ) -> Result<(), IndentError> {
        let indenter = Arc::clone(&self.indenter);
        indenter.indent_lines(self, start, end, reason, progress)
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Compare the reduced model with a full rescan of the text.
    pub fn verify_reduced_model(&self) -> Result<(), DocumentError> {
        let text = self.text();
        let domain = self.reduced.lock();
        if let Err(err) = domain.model.verify_against(&text) {
            log::error!("{err}");
            return Err(err.into());
        }
        Ok(())
    }

    /// Rebuild the reduced model from a full rescan of the text.
    pub fn rebuild_reduced_model(&mut self) {
        self.cache.clear();
        let text = self.text.to_string();
        let domain = self.reduced.get_mut();
        domain.model.rebuild(&text);
        domain.location = domain.model.position();
    }

    /// Verify the reduced model and rebuild it if it diverged. Returns `true` if it was rebuilt.
    pub fn repair_reduced_model(&mut self) -> bool {
        match self.verify_reduced_model() {
            Ok(()) => false,
            Err(err) => {
                log::warn!("rebuilding reduced model after failed check: {err}");
                self.rebuild_reduced_model();
                true
            }
        }
    }

    /// Query cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of memoized results currently held.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Turn query memoization on or off.
    pub fn set_cache_enabled(&self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }

    #[cfg(test)]
    fn corrupt_reduced_model(&mut self, text: &str) {
        let domain = self.reduced.get_mut();
        domain.model = ReducedModel::from_text(text);
        let target = domain.location.min(domain.model.len());
        walk_to(&mut domain.model, target).ok();
    }
}

/// Returns `true` if the innermost bracket enclosing the walker is a parenthesis.
fn in_paren(model: &ReducedModel) -> bool {
    model
        .enclosing_brace()
        .is_some_and(|(kind, _)| kind == BraceKind::Paren)
}

#[cfg(test)]
mod tests {
    use super::*;
    use java_editor_core_lang::{STATEMENT_DELIMITERS, WHITESPACE};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_edits_keep_walker_at_current_location() {
        let mut doc = JavaDocument::new();
        doc.insert_string(0, "int x;\n").unwrap();
        assert_eq!(doc.current_location(), 7);
        doc.insert_string(4, "yy").unwrap();
        assert_eq!(doc.current_location(), 6);
        doc.remove(0, 4).unwrap();
        assert_eq!(doc.current_location(), 0);
        assert_eq!(doc.text(), "yyx;\n");
        assert_eq!(doc.verify_reduced_model(), Ok(()));
        assert_eq!(doc.reduced.lock().model.position(), 0);
    }

    #[test]
    fn test_location_errors() {
        let mut doc = JavaDocument::from_text("abc");
        assert_eq!(
            doc.get_text(2, 5),
            Err(DocumentError::Location {
                offset: 2,
                length: 5,
                len: 3
            })
        );
        assert!(doc.insert_string(4, "x").is_err());
        assert!(doc.remove(1, 3).is_err());
        assert!(doc.set_current_location(4).is_err());
        assert!(matches!(
            doc.move_location(-1),
            Err(DocumentError::Model(ModelError::MoveOutOfBounds { .. }))
        ));
        assert_eq!(doc.current_location(), 0);
    }

    #[test]
    fn test_queries_restore_the_walker() {
        let doc = JavaDocument::from_text("a;\nb /* c */ d;\n");
        doc.set_current_location(2).unwrap();
        assert_eq!(doc.state_at(7).unwrap(), ReducedModelState::InsideBlockComment);
        assert_eq!(doc.find_prev_delimiter(14, &[';'], false).unwrap(), Some(1));
        assert_eq!(doc.reduced.lock().model.position(), 2);
    }

    #[test]
    fn test_line_positions() {
        let doc = JavaDocument::from_text("a\n    bc\n\nd");
        assert_eq!(doc.line_start_pos(7).unwrap(), 2);
        assert_eq!(doc.line_end_pos(7).unwrap(), 8);
        assert_eq!(doc.line_first_char_pos(3).unwrap(), 6);
        assert_eq!(doc.line_start_pos(2).unwrap(), 2);
        assert_eq!(doc.line_start_pos(1).unwrap(), 0);
        assert_eq!(doc.line_first_char_pos(9).unwrap(), 9);
        assert_eq!(doc.line_end_pos(10).unwrap(), 11);
    }

    #[test]
    fn test_find_prev_delimiter_skips_shadowed_and_paren_phrases() {
        let doc = JavaDocument::from_text("a; for (i; j; k) { \"x;\" // y;\n z");
        let end = doc.len_chars();
        assert_eq!(
            doc.find_prev_delimiter(end, &[';', '{'], true).unwrap(),
            Some(17)
        );
        assert_eq!(doc.find_prev_delimiter(17, &[';'], true).unwrap(), Some(1));
        assert_eq!(doc.find_prev_delimiter(17, &[';'], false).unwrap(), Some(12));
        assert_eq!(doc.find_prev_delimiter(1, &[';'], false).unwrap(), None);
    }

    #[test]
    fn test_first_non_ws_and_prev_char_skip_comments() {
        let doc = JavaDocument::from_text("x /* a */\n  // b\n  y");
        assert_eq!(doc.first_non_ws_char_pos(1, WHITESPACE, false).unwrap(), Some(19));
        assert_eq!(doc.first_non_ws_char_pos(1, WHITESPACE, true).unwrap(), Some(2));
        assert_eq!(doc.find_prev_char_pos(19, WHITESPACE).unwrap(), Some(0));
        assert_eq!(doc.find_prev_char_pos(0, WHITESPACE).unwrap(), None);
    }

    #[test]
    fn test_indent_of_curr_stmt() {
        let doc = JavaDocument::from_text("{\n    int x =\n        1 +\n        2;\n}");
        let pos = doc.text().find('2').unwrap();
        assert_eq!(
            doc.indent_of_curr_stmt(pos, STATEMENT_DELIMITERS, WHITESPACE).unwrap(),
            "    "
        );
    }

    #[test]
    fn test_enclosing_braces_and_matching() {
        let doc = JavaDocument::from_text("f(a, (b), \")\") + g[1]");
        assert_eq!(doc.find_prev_enclosing_brace(9, '(', ')').unwrap(), Some(1));
        assert_eq!(doc.find_next_enclosing_brace(2, '(', ')').unwrap(), Some(13));
        assert_eq!(doc.matching_brace(1).unwrap(), Some(13));
        assert_eq!(doc.matching_brace(13).unwrap(), Some(1));
        assert_eq!(doc.matching_brace(18).unwrap(), Some(20));
        assert_eq!(doc.matching_brace(0).unwrap(), None);
        assert_eq!(doc.matching_brace(99).unwrap(), None);
    }

    #[test]
    fn test_highlight_status_splits_normal_text() {
        let doc = JavaDocument::from_text("int a = 5; // x");
        let spans = doc.highlight_status(0, doc.len_chars()).unwrap();
        let kinds: Vec<_> = spans.iter().map(|s| (s.start, s.length, s.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, 3, HighlightKind::Type),
                (3, 5, HighlightKind::Normal),
                (8, 1, HighlightKind::Number),
                (9, 2, HighlightKind::Normal),
                (11, 4, HighlightKind::Comment),
            ]
        );
        assert!(doc.highlight_status(5, 4).is_err());
    }

    #[test]
    fn test_repair_rebuilds_a_diverged_model() {
        let mut doc = JavaDocument::from_text("a /* b */ c");
        assert!(!doc.repair_reduced_model());
        doc.corrupt_reduced_model("a // b */ c");
        assert!(doc.verify_reduced_model().is_err());
        assert!(doc.repair_reduced_model());
        assert_eq!(doc.verify_reduced_model(), Ok(()));
        assert_eq!(doc.state_at(10).unwrap(), ReducedModelState::Free);
    }

    #[test]
    fn test_document_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JavaDocument>();
    }
}
