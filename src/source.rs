use crate::error::Pos;

/// Cursor over the lines of a document.
///
/// The input is split on `\n` up front; carriage returns stay attached to
/// their line and are handled by the matchers. A trailing newline therefore
/// produces a final empty line.
pub(crate) struct Source<'a> {
    lines: Vec<&'a str>,
    index: usize,
}

impl<'a> Source<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
            index: 0,
        }
    }

    /// The current line, without its `\n`.
    pub(crate) fn line(&self) -> &'a str {
        self.lines[self.index]
    }

    /// 1-based number of the current line.
    pub(crate) fn line_num(&self) -> u32 {
        self.index as u32 + 1
    }

    /// Moves to the next line. Returns `false` at the end of the document,
    /// leaving the cursor on the last line so error positions stay valid.
    pub(crate) fn advance(&mut self) -> bool {
        if self.index + 1 < self.lines.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Position of `offset` within the current line, both 1-based.
    pub(crate) fn pos(&self, offset: usize) -> Pos {
        Pos::new(self.line_num(), offset as u32 + 1)
    }
}

#[cfg(test)]
#[path = "./source_tests.rs"]
mod tests;
