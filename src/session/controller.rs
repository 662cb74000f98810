//! Completion session state machine
//!
//! ```text
//!            edit / manual-trigger (non-empty list)
//!   Closed ─────────────────────────────────────────▶ Open{suggestions, selected_index: 0}
//!     ▲                                                  │  navigate-next / navigate-previous
//!     │   accept / cancel / focus lost / empty result    │  (clamped selection)
//!     └──────────────────────────────────────────────────┘
//! ```
//!
//! Edits are debounced: `edit` only arms a deadline and `poll` classifies the
//! last edit once the quiet period has elapsed. `manual_trigger` and
//! `process` classify immediately. The controller never reads a clock, every
//! time-dependent operation takes `now`.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::completion::{CompletionContext, CompletionEngine, clamp_cursor};
use crate::config::CompletionConfig;
use crate::metrics::{metrics, TimingGuard};
use crate::schema::ApiSchema;

use super::debounce::Debouncer;
use super::state::{Anchor, CompletionSession, EditInstruction};

/// Text and cursor (byte offset) of one edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent {
    pub text: String,
    pub cursor: usize,
}

impl EditEvent {
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }
}

#[derive(Debug)]
pub struct CompletionController {
    engine: CompletionEngine,
    min_identifier_len: usize,
    session: CompletionSession,
    pending_edit: Debouncer<EditEvent>,
    pending_blur: Debouncer<()>,
    computations: u64,
}

impl CompletionController {
    pub fn new(schema: Arc<ApiSchema>, config: &CompletionConfig) -> Self {
        Self {
            engine: CompletionEngine::new(schema, config),
            min_identifier_len: config.min_identifier_len,
            session: CompletionSession::Closed,
            pending_edit: Debouncer::new(config.debounce()),
            pending_blur: Debouncer::new(config.blur_grace()),
            computations: 0,
        }
    }

    pub fn session(&self) -> &CompletionSession {
        &self.session
    }

    pub fn engine(&self) -> &CompletionEngine {
        &self.engine
    }

    /// Number of classifications run so far (debounced edits coalesce)
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Swap the schema; the cache is cleared and the session closed
    pub fn reload_schema(&mut self, schema: Arc<ApiSchema>) {
        self.engine.reload(schema);
        self.close();
    }

    /// Classify `text` at `cursor` now and update the session
    pub fn process(&mut self, text: &str, cursor: usize) -> &CompletionSession {
        let _timing = TimingGuard::new("process");
        let cursor = clamp_cursor(text, cursor);
        self.computations += 1;

        self.session = match self.engine.classify(text, cursor) {
            None => {
                trace!("No completion context at {}", cursor);
                CompletionSession::Closed
            }
            Some(CompletionContext::Identifier { ref partial, .. })
                if partial.chars().count() < self.min_identifier_len =>
            {
                trace!("Identifier '{}' too short to complete", partial);
                CompletionSession::Closed
            }
            Some(context) => {
                let suggestions = self.engine.suggestions(&context);
                if suggestions.is_empty() {
                    CompletionSession::Closed
                } else {
                    if !self.session.is_open() {
                        metrics().record_session_opened();
                    }
                    CompletionSession::Open {
                        suggestions,
                        selected_index: 0,
                        anchor: Anchor {
                            cursor,
                            replace_length: context.replace_length(),
                        },
                    }
                }
            }
        };
        &self.session
    }

    /// Debounced edit: the last edit within the quiet period wins
    pub fn edit(&mut self, text: impl Into<String>, cursor: usize, now: Instant) {
        if self.pending_edit.schedule(EditEvent::new(text, cursor), now) {
            trace!("Pending edit superseded");
        }
    }

    /// Run whatever is due at `now`; returns true when the session may have changed
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if let Some(event) = self.pending_edit.poll(now) {
            self.process(&event.text, event.cursor);
            changed = true;
        }
        if self.pending_blur.poll(now).is_some() {
            debug!("Focus lost, closing completion session");
            self.cancel();
            changed = true;
        }
        changed
    }

    /// Earliest pending deadline (debounced edit or focus-loss grace)
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pending_edit.deadline(), self.pending_blur.deadline()) {
            (Some(edit), Some(blur)) => Some(edit.min(blur)),
            (edit, blur) => edit.or(blur),
        }
    }

    /// Classify immediately, dropping any pending debounced edit
    pub fn manual_trigger(&mut self, text: &str, cursor: usize) -> &CompletionSession {
        self.pending_edit.cancel();
        self.process(text, cursor)
    }

    pub fn navigate_next(&mut self) {
        if let CompletionSession::Open {
            suggestions,
            selected_index,
            ..
        } = &mut self.session
        {
            *selected_index = (*selected_index + 1).min(suggestions.len().saturating_sub(1));
        }
    }

    pub fn navigate_previous(&mut self) {
        if let CompletionSession::Open { selected_index, .. } = &mut self.session {
            *selected_index = selected_index.saturating_sub(1);
        }
    }

    /// Accept the suggestion at `index`
    ///
    /// Returns `None`, leaving the session untouched, when the session is
    /// closed, the index is out of range or the item is a parameter hint.
    pub fn accept(&mut self, index: usize) -> Option<EditInstruction> {
        let CompletionSession::Open {
            suggestions,
            anchor,
            ..
        } = &self.session
        else {
            return None;
        };
        let suggestion = suggestions.get(index).filter(|s| s.is_acceptable())?;

        let edit = EditInstruction::for_suggestion(*anchor, suggestion);
        debug!("Accepted '{}' ({:?})", suggestion.name, suggestion.kind);
        metrics().record_accept();
        self.close();
        Some(edit)
    }

    pub fn accept_selected(&mut self) -> Option<EditInstruction> {
        let index = self.session.selected_index()?;
        self.accept(index)
    }

    /// Close the session (escape or outside interaction)
    pub fn cancel(&mut self) {
        if self.session.is_open() {
            metrics().record_cancel();
        }
        self.close();
    }

    /// Start the grace period after which the session closes
    pub fn focus_lost(&mut self, now: Instant) {
        self.pending_blur.schedule((), now);
    }

    /// Focus came back before the grace period ran out
    pub fn focus_gained(&mut self) {
        if self.pending_blur.cancel().is_some() {
            trace!("Focus regained, pending close disarmed");
        }
    }

    fn close(&mut self) {
        self.session = CompletionSession::Closed;
        self.pending_blur.cancel();
    }
}
