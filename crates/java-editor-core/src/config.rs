//! Indentation settings supplied by the host editor.

/// Settings the indent rule table is built from.
///
/// Changing either field requires rebuilding the rule table; see
/// [`JavaDocument::set_indent_config`](crate::JavaDocument::set_indent_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndentConfig {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// If `true`, pressing Enter after an unterminated `/*` line inserts a closing ` */` line.
    pub auto_close_comments: bool,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            auto_close_comments: false,
        }
    }
}

impl IndentConfig {
    /// Returns a copy with the given indentation width.
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    /// Returns a copy with comment auto-closing switched on or off.
    pub fn with_auto_close_comments(mut self, auto_close_comments: bool) -> Self {
        self.auto_close_comments = auto_close_comments;
        self
    }
}
