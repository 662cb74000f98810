//! Memoized completion results
//!
//! The schema is immutable and small, so entries are never evicted: the
//! whole cache is dropped when a new schema is loaded. Stored lists are
//! shared (`Arc<[Suggestion]>`) and never mutated.
//!
//! # Key
//!
//! A canonical encoding of the context that ignores the replace length:
//!
//! - member access: normalized dotted path + indexed flag + partial
//! - call: callee name + raw argument text
//! - identifier: partial

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::context::CompletionContext;
use super::suggestion::Suggestion;

/// Canonical cache key for a completion context
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Members {
        path: String,
        indexed: bool,
        partial: String,
    },
    Call {
        callee_name: String,
        raw_args: String,
    },
    Global {
        partial: String,
    },
}

impl CacheKey {
    pub fn for_context(context: &CompletionContext) -> Self {
        match context {
            CompletionContext::PropertyAccess {
                path,
                partial,
                indexed,
                ..
            } => CacheKey::Members {
                path: path.join("."),
                indexed: *indexed,
                partial: partial.clone(),
            },
            CompletionContext::MethodCall {
                callee_name,
                raw_args,
            } => CacheKey::Call {
                callee_name: callee_name.clone(),
                raw_args: raw_args.clone(),
            },
            CompletionContext::Identifier { partial, .. } => CacheKey::Global {
                partial: partial.clone(),
            },
        }
    }
}

/// Hit/miss counters of a `CompletionCache`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct CompletionCache {
    entries: FxHashMap<CacheKey, Arc<[Suggestion]>>,
    hits: u64,
    misses: u64,
}

impl CompletionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list for `key`, computing and storing it on a miss
    ///
    /// Returns the list and whether it came from the cache.
    pub fn get_or_compute(
        &mut self,
        key: CacheKey,
        compute: impl FnOnce() -> Vec<Suggestion>,
    ) -> (Arc<[Suggestion]>, bool) {
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return (Arc::clone(cached), true);
        }

        self.misses += 1;
        let computed: Arc<[Suggestion]> = compute().into();
        self.entries.insert(key, Arc::clone(&computed));
        (computed, false)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<[Suggestion]>> {
        self.entries.get(key).cloned()
    }

    /// Drop every entry (schema reload)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
