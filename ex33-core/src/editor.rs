//! Text-editing commands exposed to the host toolbar.

use std::ops::Range;

/// Lines kept visible above a located match.
const SCROLL_CONTEXT_LINES: usize = 5;

/// Command interface of the text panel.
pub trait EditorCommands {
    /// Selects the first occurrence of `text` and scrolls it into view.
    /// Returns false (and changes nothing) if it does not occur.
    fn focus_and_select(&mut self, text: &str) -> bool;

    fn select_all(&mut self);
}

/// Selection state over a snapshot of the source text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorBuffer {
    text: String,
    selection: Option<Range<usize>>,
    scroll_line: usize,
    focused: bool,
}

impl EditorBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Replaces the snapshot. A selection that no longer fits is dropped.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let keep = self.selection.as_ref().is_some_and(|sel| {
            sel.end <= self.text.len()
                && self.text.is_char_boundary(sel.start)
                && self.text.is_char_boundary(sel.end)
        });
        if !keep {
            self.selection = None;
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte range of the current selection.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selection.as_ref().map(|sel| &self.text[sel.clone()])
    }

    /// First line (0-based) shown at the top of the panel.
    pub fn scroll_line(&self) -> usize {
        self.scroll_line
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

impl EditorCommands for EditorBuffer {
    fn focus_and_select(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(index) = self.text.find(text) else {
            return false;
        };
        self.focused = true;
        self.selection = Some(index..index + text.len());
        let lines_before = self.text[..index].split('\n').count();
        self.scroll_line = lines_before.saturating_sub(SCROLL_CONTEXT_LINES);
        true
    }

    fn select_all(&mut self) {
        self.focused = true;
        self.selection = Some(0..self.text.len());
    }
}
