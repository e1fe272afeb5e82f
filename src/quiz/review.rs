//! Cursor over the post-quiz explanation slides.

/// Bounded position in `[0, len - 1]`. Moves are clamped, never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplanationCursor {
    index: usize,
    len: usize,
}

impl ExplanationCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.len == 0 || self.index == self.len - 1
    }

    pub fn prev(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }

    pub fn next(&mut self) {
        if self.index + 1 < self.len {
            self.index += 1;
        }
    }

    /// Jump to `index`; out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }
}
