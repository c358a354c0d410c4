//! Context window capture around a match.
//!
//! The window extends `window` characters to each side of the match and is
//! clamped to the page. Offsets stay byte offsets so they can slice the page
//! text directly; only the window size is counted in characters.

use crate::types::{ContextStatus, ContextualMatch, RawMatch};

/// Captures the text surrounding raw matches.
#[derive(Debug, Clone)]
pub struct ContextExtractor {
    window: usize,
    collapse_whitespace: bool,
}

impl ContextExtractor {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            collapse_whitespace: true,
        }
    }

    /// Keep whitespace in captured context exactly as extracted.
    pub fn preserve_whitespace(mut self) -> Self {
        self.collapse_whitespace = false;
        self
    }

    pub fn collapse_whitespace(mut self, collapse: bool) -> Self {
        self.collapse_whitespace = collapse;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Build the contextual match for `raw` found in `page_text`.
    ///
    /// Never fails: a match that cannot be located in `page_text` comes back
    /// with `ContextStatus::Unavailable` and its offsets untouched.
    pub fn extract_context(&self, raw: &RawMatch, page_text: &str) -> ContextualMatch {
        if !locates(raw, page_text) {
            return unavailable(raw);
        }

        let (context_start, before) = self.walk_back(page_text, raw.start_offset);
        let (context_end, after) = self.walk_forward(page_text, raw.end_offset);

        let status = if before == self.window && after == self.window {
            ContextStatus::Full
        } else if before + after > 0 {
            ContextStatus::Partial
        } else {
            ContextStatus::Unavailable
        };

        if status == ContextStatus::Unavailable {
            return unavailable(raw);
        }

        let slice = &page_text[context_start..context_end];
        let context_text = if self.collapse_whitespace {
            collapse(slice)
        } else {
            slice.to_string()
        };

        ContextualMatch {
            raw: raw.clone(),
            context_text: Some(context_text),
            context_status: status,
            context_start,
            context_end,
        }
    }

    /// Byte offset `window` characters before `start`, and how many were available.
    fn walk_back(&self, text: &str, start: usize) -> (usize, usize) {
        let mut offset = start;
        let mut taken = 0;
        for (index, _) in text[..start].char_indices().rev().take(self.window) {
            offset = index;
            taken += 1;
        }
        (offset, taken)
    }

    /// Byte offset `window` characters after `end`, and how many were available.
    fn walk_forward(&self, text: &str, end: usize) -> (usize, usize) {
        let tail = &text[end..];
        let mut chars = tail.char_indices();
        let mut taken = 0;
        while taken < self.window {
            if chars.next().is_none() {
                return (text.len(), taken);
            }
            taken += 1;
        }
        let offset = chars.next().map(|(index, _)| end + index).unwrap_or(text.len());
        (offset, taken)
    }
}

impl Default for ContextExtractor {
    fn default() -> Self {
        Self::new(crate::config::default_context_window())
    }
}

/// Whether the raw match can be found again in the page text.
fn locates(raw: &RawMatch, text: &str) -> bool {
    !text.is_empty()
        && raw.start_offset < raw.end_offset
        && raw.end_offset <= text.len()
        && text.is_char_boundary(raw.start_offset)
        && text.is_char_boundary(raw.end_offset)
        && text[raw.start_offset..raw.end_offset] == raw.match_text
}

fn unavailable(raw: &RawMatch) -> ContextualMatch {
    ContextualMatch {
        raw: raw.clone(),
        context_text: None,
        context_status: ContextStatus::Unavailable,
        context_start: raw.start_offset,
        context_end: raw.end_offset,
    }
}

/// Collapse whitespace runs to a single space and trim the ends.
pub fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
