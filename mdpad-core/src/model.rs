//! Editor model interface.
//!
//! The text widget is external; session bootstrap only needs to reset
//! it, normalize its line endings, replace its contents as one undoable
//! edit, and move the cursor. [`EditorModel`] is that surface, and
//! [`TextModel`] is an in-memory implementation with an undo stack.
//!
//! Positions are 1-based (line, column), columns counted in chars.

/// Line-ending convention of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfLine {
    #[default]
    Lf,
    CrLf,
}

impl EndOfLine {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndOfLine::Lf => "\n",
            EndOfLine::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Line 1, column 1.
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Empty range at `at`.
    pub fn caret(at: Position) -> Self {
        Self { start: at, end: at }
    }
}

/// Replace `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    pub range: Range,
    pub text: String,
}

impl EditOperation {
    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

/// The operations session bootstrap performs on the editor's model.
pub trait EditorModel {
    /// Full text, joined with the model's line ending.
    fn value(&self) -> String;

    /// Destructive reset. Clears undo history and moves the cursor to
    /// the start.
    fn set_value(&mut self, text: &str);

    fn eol(&self) -> EndOfLine;

    fn set_eol(&mut self, eol: EndOfLine);

    /// Range covering the whole document.
    fn full_range(&self) -> Range;

    /// Apply `edits` as a single undo step. Ranges must not overlap.
    fn push_edit_operations(&mut self, edits: &[EditOperation]);

    fn position(&self) -> Position;

    /// Move the cursor; out-of-range positions are clamped.
    fn set_position(&mut self, position: Position);

    /// Insert `text` at the end of the document as one undo step.
    fn append(&mut self, text: &str) {
        let end = self.full_range().end;
        self.push_edit_operations(&[EditOperation::replace(Range::caret(end), text)]);
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    text: String,
    position: Position,
}

/// In-memory editor model.
///
/// Text is stored with `\n` line breaks and joined with the configured
/// [`EndOfLine`] on read.
#[derive(Debug, Clone, Default)]
pub struct TextModel {
    text: String,
    eol: EndOfLine,
    position: Position,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

impl TextModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let mut model = Self::new();
        model.set_value(text);
        model
    }

    pub fn line_count(&self) -> u32 {
        self.text.split('\n').count() as u32
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Revert the most recent edit step. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.redo_stack.push(current);
        self.restore(previous);
        true
    }

    /// Re-apply the most recently undone step.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.undo_stack.push(current);
        self.restore(next);
        true
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            position: self.position,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.text = snapshot.text;
        self.position = self.clamp(snapshot.position);
    }

    fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    fn clamp(&self, position: Position) -> Position {
        let line = position.line.clamp(1, self.line_count());
        let len = self
            .lines()
            .nth(line as usize - 1)
            .map_or(0, |l| l.chars().count() as u32);
        let column = position.column.clamp(1, len + 1);
        Position { line, column }
    }

    /// Byte offset of a (clamped) position in the stored text.
    fn offset_of(&self, position: Position) -> usize {
        let position = self.clamp(position);
        let mut offset = 0;
        for (index, line) in self.lines().enumerate() {
            if index + 1 == position.line as usize {
                let column_bytes: usize = line
                    .chars()
                    .take(position.column as usize - 1)
                    .map(char::len_utf8)
                    .sum();
                return offset + column_bytes;
            }
            offset += line.len() + 1;
        }
        self.text.len()
    }
}

fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

impl EditorModel for TextModel {
    fn value(&self) -> String {
        match self.eol {
            EndOfLine::Lf => self.text.clone(),
            EndOfLine::CrLf => self.text.replace('\n', "\r\n"),
        }
    }

    fn set_value(&mut self, text: &str) {
        self.text = normalize_line_breaks(text);
        self.position = Position::START;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn eol(&self) -> EndOfLine {
        self.eol
    }

    fn set_eol(&mut self, eol: EndOfLine) {
        self.eol = eol;
    }

    fn full_range(&self) -> Range {
        let last_line = self.line_count();
        let last_len = self.lines().last().map_or(0, |l| l.chars().count() as u32);
        Range::new(Position::START, Position::new(last_line, last_len + 1))
    }

    fn push_edit_operations(&mut self, edits: &[EditOperation]) {
        if edits.is_empty() {
            return;
        }
        let before = self.snapshot();

        let mut resolved: Vec<(usize, usize, String)> = edits
            .iter()
            .map(|edit| {
                let start = self.offset_of(edit.range.start);
                let end = self.offset_of(edit.range.end);
                let (start, end) = if start <= end { (start, end) } else { (end, start) };
                (start, end, normalize_line_breaks(&edit.text))
            })
            .collect();
        // Apply back to front so earlier offsets stay valid.
        resolved.sort_by(|a, b| b.0.cmp(&a.0));
        for (start, end, text) in resolved {
            self.text.replace_range(start..end, &text);
        }

        self.undo_stack.push(before);
        self.redo_stack.clear();
        self.position = self.clamp(self.position);
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = self.clamp(position);
    }
}
