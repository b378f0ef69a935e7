use std::sync::Arc;

use text_size::{TextRange, TextSize};

use super::{Position, Span};

/// Maps byte offsets to 0-based line/column positions and back.
///
/// Columns count Unicode scalar values within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    text: Arc<str>,
    /// Byte offset of the start of each line.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(TextSize::new(i as u32 + 1));
            }
        }
        Self {
            text: Arc::from(text),
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text of a line without its terminating newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let start = *self.line_starts.get(line as usize)?;
        let end = self
            .line_starts
            .get(line as usize + 1)
            .copied()
            .unwrap_or_else(|| TextSize::of(&*self.text));
        let slice = &self.text[TextRange::new(start, end)];
        Some(slice.strip_suffix('\n').unwrap_or(slice))
    }

    /// Convert a byte offset into a line/column position.
    pub fn position(&self, offset: TextSize) -> Position {
        let offset = offset.min(TextSize::of(&*self.text));
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let start = self.line_starts[line];
        let column = self.text[TextRange::new(start, offset)].chars().count();
        Position::new(line as u32, column as u32)
    }

    /// Convert a byte range into a line/column span.
    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.position(range.start()), self.position(range.end()))
    }

    /// Convert a line/column position into a byte offset.
    ///
    /// Columns past the end of a line clamp to the line end; lines past the
    /// end of the file clamp to the end of the text.
    pub fn offset(&self, position: Position) -> TextSize {
        let Some(line) = self.line_text(position.line) else {
            return TextSize::of(&*self.text);
        };
        let start = self.line_starts[position.line as usize];
        let within: usize = line
            .chars()
            .take(position.column as usize)
            .map(char::len_utf8)
            .sum();
        start + TextSize::new(within as u32)
    }
}
