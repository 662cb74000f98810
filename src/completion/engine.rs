//! Classifier → resolver → collector → ranker, memoized per context

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::config::CompletionConfig;
use crate::metrics::metrics;
use crate::schema::ApiSchema;

use super::cache::{CacheKey, CacheStats, CompletionCache};
use super::collector::{collect_globals, collect_members, collect_parameter_hint};
use super::context::{self, CompletionContext};
use super::ranking::{RankingCriteria, RankingScope, rank_suggestions};
use super::resolver::PathResolver;
use super::suggestion::Suggestion;

/// Completion engine over one schema
///
/// Owns the cache; the schema is shared and read-only.
#[derive(Debug)]
pub struct CompletionEngine {
    schema: Arc<ApiSchema>,
    cache: CompletionCache,
    criteria: RankingCriteria,
    window_chars: usize,
}

impl CompletionEngine {
    pub fn new(schema: Arc<ApiSchema>, config: &CompletionConfig) -> Self {
        Self {
            schema,
            cache: CompletionCache::new(),
            criteria: RankingCriteria {
                max_results: config.max_suggestions,
            },
            window_chars: config.window_chars,
        }
    }

    pub fn schema(&self) -> &Arc<ApiSchema> {
        &self.schema
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Replace the schema; every cached list is dropped
    pub fn reload(&mut self, schema: Arc<ApiSchema>) {
        self.schema = schema;
        self.cache.clear();
        debug!("Schema reloaded, completion cache cleared");
    }

    /// Chars scanned before the cursor when classifying
    pub fn window_chars(&self) -> usize {
        self.window_chars
    }

    /// Completion context at `cursor` (byte offset, clamped to the text)
    pub fn classify(&self, text: &str, cursor: usize) -> Option<CompletionContext> {
        let start = Instant::now();
        let context = context::classify(text, cursor, self.window_chars);
        metrics().record_timing("classify", start.elapsed());
        context
    }

    /// Ranked suggestions for `context`, from the cache when possible
    pub fn suggestions(&mut self, context: &CompletionContext) -> Arc<[Suggestion]> {
        let key = CacheKey::for_context(context);
        let schema = &self.schema;
        let criteria = &self.criteria;

        let (suggestions, hit) = self
            .cache
            .get_or_compute(key, || compute_suggestions(schema, context, criteria));
        metrics().record_completion(hit);
        debug!(
            "{} completion: {} suggestion(s) ({})",
            context.kind_name(),
            suggestions.len(),
            if hit { "cached" } else { "computed" }
        );
        suggestions
    }

    /// Classify and collect in one step
    pub fn complete(
        &mut self,
        text: &str,
        cursor: usize,
    ) -> Option<(CompletionContext, Arc<[Suggestion]>)> {
        let context = self.classify(text, cursor)?;
        let suggestions = self.suggestions(&context);
        Some((context, suggestions))
    }
}

/// Uncached resolve → collect → rank for one context
///
/// An empty schema answers nothing, keywords included.
pub fn compute_suggestions(
    schema: &ApiSchema,
    context: &CompletionContext,
    criteria: &RankingCriteria,
) -> Vec<Suggestion> {
    if schema.is_empty() {
        return Vec::new();
    }

    let start = Instant::now();
    let suggestions = match context {
        CompletionContext::PropertyAccess {
            path,
            partial,
            indexed,
            ..
        } => {
            let resolver = PathResolver::new(schema);
            let node = if *indexed {
                resolver.resolve_indexed(path)
            } else {
                resolver.resolve(path)
            };
            match node {
                Some(node) => rank_suggestions(
                    collect_members(node, partial),
                    partial,
                    RankingScope::Members,
                    criteria,
                ),
                None => {
                    debug!("Unresolvable path '{}'", path.join("."));
                    Vec::new()
                }
            }
        }
        CompletionContext::Identifier { partial, .. } => rank_suggestions(
            collect_globals(schema, partial),
            partial,
            RankingScope::Global,
            criteria,
        ),
        CompletionContext::MethodCall {
            callee_name,
            raw_args,
        } => collect_parameter_hint(schema, callee_name, raw_args),
    };
    metrics().record_timing("compute_suggestions", start.elapsed());
    suggestions
}
