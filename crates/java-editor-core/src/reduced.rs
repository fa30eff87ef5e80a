//! Reduced Model: incremental lexical and brace tracking.
//!
//! The model mirrors the document as a sequence of [`ReducedToken`]s held in a gap buffer of
//! tokens: `before` holds the tokens left of the walker in document order, `after` holds the
//! tokens right of it in reverse order, and `offset` points into `after.last()` when the walker
//! sits inside a multi-character token.
//!
//! # Incremental edits
//!
//! An edit re-lexes from the start of the token holding the character before the edit point and
//! stops as soon as the lexer reaches an untouched old token boundary with the same entry state.
//! The rest of the old tokens are reused as they are. The work done is proportional to the edit
//! plus the region whose lexical state actually changed.
//!
//! # Example
//!
//! ```rust
//! use java_editor_core::{ReducedModel, ReducedModelState};
//!
//! let mut model = ReducedModel::new();
//! model.insert_char('/');
//! model.move_walker(-1).unwrap();
//! assert_eq!(model.state_at_current(), ReducedModelState::Free);
//!
//! model.move_walker(1).unwrap();
//! model.insert_char('/');
//! model.move_walker(-2).unwrap();
//! assert_eq!(model.state_at_current(), ReducedModelState::InsideLineComment);
//! ```

use crate::error::ModelError;
use crate::highlight::{HighlightKind, HighlightStatus, push_span};
use crate::token::{BraceKind, ReducedModelState, ReducedToken, TokenKind, classify, is_special};
use std::collections::VecDeque;

/// An unmatched opening bracket enclosing a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceInfo {
    /// Bracket pair.
    pub kind: BraceKind,
    /// Distance from the queried position back to the bracket.
    pub distance: usize,
    /// Distance from the start of the bracket's line to the bracket (its column).
    pub dist_to_line_start: usize,
}

/// Nesting facts for a position, as consumed by the indenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndentInfo {
    /// Innermost unmatched opening bracket before the position.
    pub enclosing: Option<BraceInfo>,
    /// Second-innermost unmatched opening bracket before the position.
    pub outer: Option<BraceInfo>,
    /// Distance from the start of the position's line to the position.
    pub dist_to_line_start: usize,
}

impl IndentInfo {
    /// Kind of the innermost enclosing bracket.
    pub fn enclosing_kind(&self) -> Option<BraceKind> {
        self.enclosing.map(|brace| brace.kind)
    }
}

/// Incremental lexical model of one document.
#[derive(Debug, Clone, Default)]
pub struct ReducedModel {
    before: Vec<ReducedToken>,
    after: Vec<ReducedToken>,
    offset: usize,
    position: usize,
    len: usize,
}

impl ReducedModel {
    /// Create a model for an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model by scanning `text` from scratch. The walker is left at 0.
    pub fn from_text(text: &str) -> Self {
        let mut tokens = scan(text);
        let len = tokens.iter().map(ReducedToken::len).sum();
        tokens.reverse();
        Self {
            before: Vec::new(),
            after: tokens,
            offset: 0,
            position: 0,
            len,
        }
    }

    /// Replace the whole token sequence with a fresh scan of `text`, keeping the walker at the
    /// same absolute position (clamped to the new length).
    pub fn rebuild(&mut self, text: &str) {
        let position = self.position;
        *self = Self::from_text(text);
        self.advance(position.min(self.len));
        log::debug!("reduced model rebuilt: {} characters", self.len);
    }

    /// Absolute position of the walker.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of characters modelled.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the model covers no characters.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> Vec<ReducedToken> {
        self.before
            .iter()
            .chain(self.after.iter().rev())
            .copied()
            .collect()
    }

    /// Compare the incremental token sequence with a full scan of `text`.
    pub fn verify_against(&self, text: &str) -> Result<(), ModelError> {
        let text_len = text.chars().count();
        if text_len != self.len {
            return Err(ModelError::LengthMismatch {
                model: self.len,
                text: text_len,
            });
        }
        let fresh = scan(text);
        let current = self.tokens();
        if let Some(index) = current
            .iter()
            .zip(fresh.iter())
            .position(|(a, b)| a != b)
            .or_else(|| (current.len() != fresh.len()).then(|| current.len().min(fresh.len())))
        {
            return Err(ModelError::Inconsistent { index });
        }
        Ok(())
    }

    /// Move the walker by a signed distance.
    pub fn move_walker(&mut self, distance: isize) -> Result<(), ModelError> {
        let target = self.position as isize + distance;
        if target < 0 || target as usize > self.len {
            log::error!(
                "reduced model walker moved out of bounds: {} by {} (len {})",
                self.position,
                distance,
                self.len
            );
            return Err(ModelError::MoveOutOfBounds {
                position: self.position,
                distance,
                len: self.len,
            });
        }
        if distance >= 0 {
            self.advance(distance as usize);
        } else {
            self.retreat(distance.unsigned_abs());
        }
        Ok(())
    }

    /// Move the walker and report the state there. The caller restores the walker.
    pub fn move_walker_get_state(
        &mut self,
        distance: isize,
    ) -> Result<ReducedModelState, ModelError> {
        self.move_walker(distance)?;
        Ok(self.state_at_current())
    }

    /// Lexical state of the character at the walker (or, at the end of the document, the state
    /// in force after the last character).
    pub fn state_at_current(&self) -> ReducedModelState {
        match self.after.last() {
            Some(token) => token.shadow_state(),
            None => self
                .before
                .last()
                .map_or(ReducedModelState::Free, ReducedToken::exit_state),
        }
    }

    /// Insert one character at the walker and advance past it.
    pub fn insert_char(&mut self, ch: char) {
        self.splice(0, &[ch]);
    }

    /// Insert a run of characters at the walker and advance past them.
    pub fn insert_str(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        if !chars.is_empty() {
            self.splice(0, &chars);
        }
    }

    /// Remove `count` characters starting at the walker. The walker stays in place.
    pub fn delete(&mut self, count: usize) -> Result<(), ModelError> {
        if self.position + count > self.len {
            return Err(ModelError::DeleteOutOfBounds {
                position: self.position,
                count,
                len: self.len,
            });
        }
        if count > 0 {
            self.splice(count, &[]);
        }
        Ok(())
    }

    /// Distance from the walker to the nearest newline at least `skip + 1` characters before it.
    ///
    /// Newlines count regardless of lexical state. Returns `None` when there is no such newline.
    pub fn dist_to_previous_newline(&self, skip: usize) -> Option<usize> {
        self.backward()
            .find(|(dist, token)| token.is_newline() && *dist > skip)
            .map(|(dist, _)| dist)
    }

    /// Distance from the walker to the next newline at or after it, or to the end of the
    /// document when there is none.
    pub fn dist_to_next_newline(&self) -> usize {
        self.forward()
            .find(|(_, token)| token.is_newline())
            .map_or(self.len - self.position, |(end, _)| end - 1)
    }

    /// With a free opening bracket right of the walker, the distance to just past its match.
    pub fn balance_forward(&self) -> Option<usize> {
        if self.offset != 0 {
            return None;
        }
        let mut tokens = self.forward();
        let (_, first) = tokens.next()?;
        let mut stack = vec![first.free_open()?];
        for (end, token) in tokens {
            if let Some(kind) = token.free_open() {
                stack.push(kind);
            } else if let Some(kind) = token.free_close() {
                if stack.pop()? != kind {
                    return None;
                }
                if stack.is_empty() {
                    return Some(end);
                }
            }
        }
        None
    }

    /// With a free closing bracket left of the walker, the distance back to its match.
    pub fn balance_backward(&self) -> Option<usize> {
        if self.offset != 0 {
            return None;
        }
        let mut tokens = self.backward();
        let (_, first) = tokens.next()?;
        let mut stack = vec![first.free_close()?];
        for (dist, token) in tokens {
            if let Some(kind) = token.free_close() {
                stack.push(kind);
            } else if let Some(kind) = token.free_open() {
                if stack.pop()? != kind {
                    return None;
                }
                if stack.is_empty() {
                    return Some(dist);
                }
            }
        }
        None
    }

    /// Innermost unmatched free opening bracket before the walker, with the distance back to it.
    pub fn enclosing_brace(&self) -> Option<(BraceKind, usize)> {
        let mut closers = 0usize;
        for (dist, token) in self.backward() {
            if token.free_close().is_some() {
                closers += 1;
            } else if let Some(kind) = token.free_open() {
                if closers == 0 {
                    return Some((kind, dist));
                }
                closers -= 1;
            }
        }
        None
    }

    /// Nesting facts for the walker position.
    pub fn indent_info(&self) -> IndentInfo {
        let mut closers: Vec<BraceKind> = Vec::new();
        let mut found: Vec<(BraceKind, usize, Option<usize>)> = Vec::with_capacity(2);
        let mut line_start: Option<usize> = None;

        for (dist, token) in self.backward() {
            if token.is_newline() {
                // The line begins right after this newline.
                let line_dist = dist - 1;
                line_start.get_or_insert(line_dist);
                for (_, brace_dist, column) in &mut found {
                    column.get_or_insert(line_dist - *brace_dist);
                }
                if found.len() == 2 {
                    break;
                }
                continue;
            }
            if let Some(kind) = token.free_close() {
                closers.push(kind);
            } else if let Some(kind) = token.free_open()
                && closers.pop().is_none()
            {
                found.push((kind, dist, None));
            }
        }

        let mut braces = found.into_iter().map(|(kind, distance, column)| BraceInfo {
            kind,
            distance,
            dist_to_line_start: column.unwrap_or(self.position - distance),
        });
        IndentInfo {
            enclosing: braces.next(),
            outer: braces.next(),
            dist_to_line_start: line_start.unwrap_or(self.position),
        }
    }

    /// Comment/string/normal spans covering `length` characters from the walker.
    pub fn highlight_spans(&self, length: usize) -> Vec<HighlightStatus> {
        let mut spans = Vec::new();
        let mut start = self.position;
        let end = (self.position + length).min(self.len);
        for (token_end, token) in self.forward() {
            if start >= end {
                break;
            }
            let stop = (self.position + token_end).min(end);
            let kind = HighlightKind::from_state(token.shadow_state());
            push_span(&mut spans, start, stop - start, kind);
            start = stop;
        }
        spans
    }

    /// Tokens before the walker, nearest first, with the distance back to each token's start.
    fn backward(&self) -> impl Iterator<Item = (usize, ReducedToken)> + '_ {
        let current = self
            .after
            .last()
            .filter(|_| self.offset > 0)
            .map(|token| (self.offset, *token));
        let mut dist = self.offset;
        current.into_iter().chain(self.before.iter().rev().map(move |token| {
            dist += token.len();
            (dist, *token)
        }))
    }

    /// Tokens from the walker on, with the distance forward to each token's end.
    fn forward(&self) -> impl Iterator<Item = (usize, ReducedToken)> + '_ {
        let mut dist = 0usize;
        let mut skip = self.offset;
        self.after.iter().rev().map(move |token| {
            dist += token.len() - skip;
            skip = 0;
            (dist, *token)
        })
    }

    fn advance(&mut self, mut count: usize) {
        while count > 0 {
            let Some(current) = self.after.last() else {
                break;
            };
            let remaining = current.len() - self.offset;
            if count < remaining {
                self.offset += count;
                self.position += count;
                return;
            }
            count -= remaining;
            self.position += remaining;
            self.offset = 0;
            if let Some(token) = self.after.pop() {
                self.before.push(token);
            }
        }
    }

    fn retreat(&mut self, mut count: usize) {
        while count > 0 {
            if self.offset > 0 {
                let step = count.min(self.offset);
                self.offset -= step;
                self.position -= step;
                count -= step;
                continue;
            }
            let Some(token) = self.before.pop() else {
                break;
            };
            self.offset = token.len();
            self.after.push(token);
        }
    }

    /// Replace `remove` characters at the walker with `insert`, re-lexing the affected region,
    /// and leave the walker just past the inserted characters.
    fn splice(&mut self, remove: usize, insert: &[char]) {
        let target = self.position + insert.len();
        let (state, mut pending, mut carry) = self.detach_restart();

        let mut remaining = remove;
        while remaining > 0 {
            if carry.pop_front().is_some() {
                remaining -= 1;
                continue;
            }
            let Some(token) = self.after.pop() else {
                break;
            };
            let len = token.len();
            if len <= remaining {
                remaining -= len;
                continue;
            }
            match token.kind {
                TokenKind::Gap(gap) => self.after.push(ReducedToken::gap(gap - remaining, token.entry)),
                kind => carry.extend(&kind.chars()[remaining..]),
            }
            remaining = 0;
        }

        pending.extend(insert.iter().copied());
        pending.extend(carry);
        self.len = self.len + insert.len() - remove;

        let rescanned = self.relex(state, pending);
        log::trace!(
            "relexed {rescanned} tokens, resynchronized at {} (edit at {target})",
            self.position
        );
        self.retreat(self.position - target);
    }

    /// Detach the token holding the character before the walker so it can be re-lexed.
    ///
    /// Returns the entry state to resume lexing in, the characters to re-lex before the edit
    /// point, and the characters of the detached token that follow the edit point. Afterwards
    /// the walker sits on a token boundary at the restart point.
    fn detach_restart(&mut self) -> (ReducedModelState, VecDeque<char>, VecDeque<char>) {
        let mut pending = VecDeque::new();
        let mut carry = VecDeque::new();

        let detached = if self.offset > 0 {
            self.after.pop().map(|token| (token, self.offset))
        } else {
            self.before.pop().map(|token| (token, token.len()))
        };
        self.offset = 0;
        let Some((token, split)) = detached else {
            return (ReducedModelState::Free, pending, carry);
        };
        self.position -= split;

        match token.kind {
            TokenKind::Gap(len) => {
                // One character of a gap is enough context; the rest stays settled.
                if split > 1 {
                    self.before.push(ReducedToken::gap(split - 1, token.entry));
                    self.position += split - 1;
                }
                pending.push_back(crate::token::GAP_CHAR);
                if len > split {
                    self.after.push(ReducedToken::gap(len - split, token.entry));
                }
            }
            kind => {
                let chars = kind.chars();
                pending.extend(&chars[..split]);
                carry.extend(&chars[split..]);
            }
        }
        (token.entry, pending, carry)
    }

    /// Lex `pending` (then old tokens, as needed) onto `before` until the lexer resynchronizes
    /// with an old token boundary. Returns the number of tokens emitted.
    fn relex(&mut self, mut state: ReducedModelState, mut pending: VecDeque<char>) -> usize {
        let mut emitted = 0;
        loop {
            let Some(&first) = pending.front() else {
                let Some(next) = self.after.last().copied() else {
                    break;
                };
                if next.entry == state {
                    self.merge_gap_at_walker();
                    break;
                }
                self.after.pop();
                match next.kind {
                    // Gaps keep their extent in every state.
                    TokenKind::Gap(len) => {
                        self.emit(ReducedToken::gap(len, state));
                        emitted += 1;
                    }
                    kind => pending.extend(kind.chars()),
                }
                continue;
            };

            let second = pending
                .get(1)
                .copied()
                .or_else(|| self.after.last().map(|token| token.kind.first_char()));
            let Some(kind) = classify(state, first, second) else {
                let run = pending.iter().take_while(|ch| !is_special(**ch)).count();
                pending.drain(..run);
                self.emit(ReducedToken::gap(run, state));
                emitted += 1;
                continue;
            };

            if kind.len() > pending.len()
                && let Some(next) = self.after.pop()
            {
                pending.extend(next.kind.chars());
            }
            let consumed = kind.len().min(pending.len());
            pending.drain(..consumed);
            let token = ReducedToken::new(kind, state);
            state = token.exit_state();
            self.emit(token);
            emitted += 1;
        }
        emitted
    }

    fn emit(&mut self, token: ReducedToken) {
        self.position += token.len();
        if let TokenKind::Gap(extra) = token.kind
            && let Some(last) = self.before.last_mut()
            && let TokenKind::Gap(len) = last.kind
            && last.entry == token.entry
        {
            last.kind = TokenKind::Gap(len + extra);
            return;
        }
        self.before.push(token);
    }

    /// Join a gap ending at the walker with a gap starting there.
    fn merge_gap_at_walker(&mut self) {
        if let Some(prev) = self.before.last().copied()
            && let TokenKind::Gap(head) = prev.kind
            && let Some(next) = self.after.last_mut()
            && let TokenKind::Gap(tail) = next.kind
            && prev.entry == next.entry
        {
            self.before.pop();
            next.kind = TokenKind::Gap(head + tail);
            self.offset = head;
        }
    }
}

/// Tokenize `text` from scratch.
pub(crate) fn scan(text: &str) -> Vec<ReducedToken> {
    let mut tokens: Vec<ReducedToken> = Vec::new();
    let mut state = ReducedModelState::Free;
    let mut chars = text.chars().peekable();
    while let Some(first) = chars.next() {
        match classify(state, first, chars.peek().copied()) {
            Some(kind) => {
                if kind.len() == 2 {
                    chars.next();
                }
                let token = ReducedToken::new(kind, state);
                state = token.exit_state();
                tokens.push(token);
            }
            None => {
                let mut len = 1;
                while chars.next_if(|ch| !is_special(*ch)).is_some() {
                    len += 1;
                }
                tokens.push(ReducedToken::gap(len, state));
            }
        }
    }
    tokens
}
