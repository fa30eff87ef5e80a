#![warn(missing_docs)]
//! Java Editor Core - incremental lexical engine for a Java-aware editor
//!
//! # Overview
//!
//! `java-editor-core` keeps a lightweight lexical model of a Java source document up to date as
//! it is edited one keystroke at a time, and answers the cursor-relative questions an editor
//! asks of it: is this position in a comment or a string, where is the matching brace, where
//! does this statement start, how far should this line be indented, how should this range be
//! colored.
//!
//! It does not render, load files, or parse Java. It is told about every insertion and removal
//! and keeps its own structure consistent with the characters it is shown.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Indent Decision Engine (rule table)        │  ← indent_line / indent_lines
//! ├─────────────────────────────────────────────┤
//! │  Query Layer (JavaDocument)                 │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  Reduced Model       │  Query Cache (FIFO)  │  ← two independent locks
//! ├──────────────────────┴──────────────────────┤
//! │  Character Store (Rope)                     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use java_editor_core::{HighlightKind, IndentReason, JavaDocument, ReducedModelState};
//!
//! let mut doc = JavaDocument::new();
//! doc.insert_string(0, "class A {\nint x; // count\n}").unwrap();
//!
//! assert_eq!(doc.state_at(17).unwrap(), ReducedModelState::InsideLineComment);
//! assert_eq!(doc.matching_brace(8).unwrap(), Some(26));
//!
//! doc.set_current_location(10).unwrap();
//! doc.indent_line(IndentReason::Other).unwrap();
//! assert_eq!(doc.text(), "class A {\n  int x; // count\n}");
//!
//! let spans = doc.highlight_status(10, 16).unwrap();
//! assert_eq!(spans[0].kind, HighlightKind::Normal);
//! assert_eq!(spans[1].kind, HighlightKind::Type);
//! ```
//!
//! # Module Description
//!
//! - [`reduced`] - token gap buffer, walker and incremental re-lexing
//! - [`highlight`] - highlight spans and keyword/type/number splitting
//! - [`cache`] - FIFO memo table for query results
//! - [`document`] - document façade and query layer
//! - [`indent`] - indent rule table and line/range indentation
//! - [`config`] - indentation settings
//! - [`error`] - error types
//!
//! # Concurrency
//!
//! [`JavaDocument`] is `Send + Sync`. Queries take `&self` and serialize on the reduced-model
//! lock; the query cache has a separate lock. Mutations take `&mut self`.

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod highlight;
pub mod indent;
pub mod reduced;
mod token;

pub use cache::{CacheStats, CachedValue, DEFAULT_CACHE_CAPACITY, Memo, QueryCache};
pub use config::IndentConfig;
pub use document::JavaDocument;
pub use error::{CacheError, DocumentError, IndentError, ModelError};
pub use highlight::{HighlightKind, HighlightStatus, coalesce, is_number};
pub use indent::{Action, IndentProgress, IndentReason, IndentRule, Indenter, Question};
pub use reduced::{BraceInfo, IndentInfo, ReducedModel};
pub use token::{BraceKind, ReducedModelState, ReducedToken, TokenKind};

pub use java_editor_core_lang as lang;
