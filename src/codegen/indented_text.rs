//! Indentation-tracked text builder
//!
//! Lines are stored with their absolute offset and only rendered at the end,
//! so blocks built separately can be spliced in at any depth.

use crate::error::CodegenError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentedText {
    lines: Vec<(String, usize)>,
    offset: usize,
    offset_history: Vec<usize>,
    /// Closing lines of the scopes currently open, innermost last
    scopes: Vec<(String, usize)>,
}

impl IndentedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: impl Into<String>) {
        self.add_line_with_offset(line, 0);
    }

    pub fn add_line_with_offset(&mut self, line: impl Into<String>, shift: usize) {
        self.lines.push((line.into(), self.offset + shift));
    }

    pub fn add_blank_line(&mut self) {
        self.lines.push((String::new(), 0));
    }

    /// Append every line of `block` at the current offset
    pub fn add_block(&mut self, block: &IndentedText) {
        self.add_block_with_offset(block, 0);
    }

    pub fn add_block_with_offset(&mut self, block: &IndentedText, shift: usize) {
        let base = self.offset + shift;
        for (line, offset) in &block.lines {
            if line.is_empty() {
                self.add_blank_line();
            } else {
                self.lines.push((line.clone(), base + offset));
            }
        }
    }

    /// Add `items` one per line at `shift`, joined by `separator`, with
    /// `terminator` after the last one
    pub fn add_list(&mut self, items: &[String], separator: &str, terminator: &str, shift: usize) {
        for (i, item) in items.iter().enumerate() {
            let tail = if i + 1 == items.len() { terminator } else { separator };
            self.add_line_with_offset(format!("{}{}", item, tail), shift);
        }
    }

    pub fn push_offset(&mut self, shift: usize) {
        self.offset_history.push(self.offset);
        self.offset += shift;
    }

    pub fn pop_offset(&mut self) {
        debug_assert!(!self.offset_history.is_empty(), "pop_offset without push_offset");
        if let Some(previous) = self.offset_history.pop() {
            self.offset = previous;
        }
    }

    /// Emit `opening` and remember `closing` for the matching [`close_scope`]
    ///
    /// [`close_scope`]: IndentedText::close_scope
    pub fn open_scope(&mut self, opening: impl Into<String>, closing: impl Into<String>) {
        self.add_line(opening);
        self.scopes.push((closing.into(), self.offset));
    }

    pub fn close_scope(&mut self) -> Result<(), CodegenError> {
        let (closing, offset) = self.scopes.pop().ok_or(CodegenError::ScopeUnderflow)?;
        self.lines.push((closing, offset));
        Ok(())
    }

    pub fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    /// Render the text; fails if any scope is still open
    pub fn finish(&self) -> Result<String, CodegenError> {
        if !self.scopes.is_empty() {
            return Err(CodegenError::UnbalancedScopes {
                open: self.scopes.len(),
            });
        }
        Ok(self.render())
    }

    fn render(&self) -> String {
        let mut output = String::new();
        for (line, offset) in &self.lines {
            if !line.is_empty() {
                output.push_str(&" ".repeat(*offset));
                output.push_str(line);
            }
            output.push('\n');
        }
        output
    }
}
