//! Context-aware completion over the API schema
//!
//! This module provides:
//! - Context classification of the trailing expression before the cursor
//! - Path resolution with a collection fallback for untyped collections
//! - Candidate collection for members, globals, constants and keywords
//! - Deterministic ranking and per-context memoization

pub mod cache;
pub mod collector;
pub mod context;
pub mod engine;
pub mod ranking;
pub mod resolver;
pub mod suggestion;

pub use cache::{CacheKey, CacheStats, CompletionCache};
pub use collector::{collect_globals, collect_members, collect_parameter_hint, RESERVED_WORDS};
pub use context::{argument_index, classify, classify_before, clamp_cursor, CompletionContext};
pub use engine::{compute_suggestions, CompletionEngine};
pub use ranking::{rank_suggestions, RankingCriteria, RankingScope};
pub use resolver::{collection_element_type, PathResolver};
pub use suggestion::{Suggestion, SuggestionKind};
