//! Completion session state and the edit produced by accepting a suggestion

use std::sync::Arc;

use serde::Serialize;

use crate::completion::{clamp_cursor, Suggestion, SuggestionKind};

/// Where the list was computed: the cursor and the length of the token it replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Anchor {
    /// Byte offset of the cursor the context was classified at
    pub cursor: usize,
    /// Bytes before the cursor replaced on accept (an ASCII identifier)
    pub replace_length: usize,
}

/// Text replacement for the editing surface to apply
///
/// Offsets are byte offsets into the text the session was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditInstruction {
    pub start: usize,
    pub end: usize,
    pub insert_text: String,
    /// Cursor after the edit is applied
    pub cursor: usize,
}

impl EditInstruction {
    /// Replacement of the anchored token by `suggestion`
    ///
    /// Methods taking arguments insert through the opening parenthesis only,
    /// leaving the cursor inside the call.
    pub fn for_suggestion(anchor: Anchor, suggestion: &Suggestion) -> Self {
        let start = anchor.cursor.saturating_sub(anchor.replace_length);
        let insert_text = if suggestion.kind == SuggestionKind::Method
            && suggestion.parameter_count > 0
        {
            format!("{}(", suggestion.name)
        } else {
            suggestion.insert_text.clone()
        };
        let cursor = start + insert_text.len();

        Self {
            start,
            end: anchor.cursor,
            insert_text,
            cursor,
        }
    }

    /// Apply the edit to `text`
    pub fn apply(&self, text: &str) -> String {
        let end = clamp_cursor(text, self.end);
        let start = clamp_cursor(text, self.start).min(end);
        let mut edited = String::with_capacity(text.len() + self.insert_text.len());
        edited.push_str(&text[..start]);
        edited.push_str(&self.insert_text);
        edited.push_str(&text[end..]);
        edited
    }
}

/// Completion session owned by the controller
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CompletionSession {
    #[default]
    Closed,
    Open {
        suggestions: Arc<[Suggestion]>,
        selected_index: usize,
        anchor: Anchor,
    },
}

impl CompletionSession {
    pub fn is_open(&self) -> bool {
        matches!(self, CompletionSession::Open { .. })
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            CompletionSession::Open { suggestions, .. } => suggestions,
            CompletionSession::Closed => &[],
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self {
            CompletionSession::Open { selected_index, .. } => Some(*selected_index),
            CompletionSession::Closed => None,
        }
    }

    pub fn selected(&self) -> Option<&Suggestion> {
        self.selected_index()
            .and_then(|index| self.suggestions().get(index))
    }
}
