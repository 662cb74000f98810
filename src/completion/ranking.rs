//! Ranking and sorting of completion results
//!
//! The order is a pure function of the candidate set and the partial token, so
//! cached lists never need re-sorting and tests can assert exact orders.
//!
//! Ranking algorithm (in order of priority):
//! 1. Exact, case-sensitive name match
//! 2. Member completions only: methods before properties
//! 3. Case-insensitive prefix match before non-prefix
//! 4. Case-sensitive lexicographic order of names
//! 5. Kind, then insertion text (total order for duplicate names)

use std::cmp::Ordering;

use super::collector::matches_prefix;
use super::suggestion::{Suggestion, SuggestionKind};

/// Default cap on the number of ranked suggestions
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Where the candidates came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingScope {
    /// Members of a resolved object (`obj.partial`)
    Members,
    /// Globals, constants and keywords (`partial`)
    Global,
}

/// Criteria for ranking completion results
#[derive(Debug, Clone)]
pub struct RankingCriteria {
    /// Maximum results to return (default: 10)
    pub max_results: usize,
}

impl Default for RankingCriteria {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

fn member_rank(kind: SuggestionKind) -> u8 {
    match kind {
        SuggestionKind::Method => 0,
        SuggestionKind::Property => 1,
        _ => 2,
    }
}

fn compare(a: &Suggestion, b: &Suggestion, partial: &str, scope: RankingScope) -> Ordering {
    let inexact = |s: &Suggestion| s.name != partial;
    let non_prefix = |s: &Suggestion| !matches_prefix(&s.name, partial);

    inexact(a)
        .cmp(&inexact(b))
        .then_with(|| match scope {
            RankingScope::Members => member_rank(a.kind).cmp(&member_rank(b.kind)),
            RankingScope::Global => Ordering::Equal,
        })
        .then_with(|| non_prefix(a).cmp(&non_prefix(b)))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.kind.cmp(&b.kind))
        .then_with(|| a.insert_text.cmp(&b.insert_text))
}

/// Rank suggestions for `partial`, best first, limited to `max_results`
pub fn rank_suggestions(
    mut suggestions: Vec<Suggestion>,
    partial: &str,
    scope: RankingScope,
    criteria: &RankingCriteria,
) -> Vec<Suggestion> {
    suggestions.sort_by(|a, b| compare(a, b, partial, scope));
    suggestions.truncate(criteria.max_results);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MethodDescriptor, Parameter, PropertyDescriptor};

    fn names(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.name.as_str()).collect()
    }

    fn member_candidates() -> Vec<Suggestion> {
        vec![
            Suggestion::property(&PropertyDescriptor::named("sequences", "SequenceCollection")),
            Suggestion::method(&MethodDescriptor::new(
                "saveAs",
                "Number",
                vec![Parameter::new("path")],
            )),
            Suggestion::property(&PropertyDescriptor::named("save", "Boolean")),
            Suggestion::method(&MethodDescriptor::new("save", "Number", vec![])),
            Suggestion::property(&PropertyDescriptor::named("Saved", "Boolean")),
        ]
    }

    #[test]
    fn test_exact_match_first_then_methods() {
        let ranked = rank_suggestions(
            member_candidates(),
            "save",
            RankingScope::Members,
            &RankingCriteria::default(),
        );

        assert_eq!(names(&ranked), vec!["save", "save", "saveAs", "Saved", "sequences"]);
        assert_eq!(ranked[0].kind, SuggestionKind::Method);
        assert_eq!(ranked[1].kind, SuggestionKind::Property);
    }

    #[test]
    fn test_global_scope_ignores_kind_until_tie_break() {
        let candidates = vec![
            Suggestion::keyword("while"),
            Suggestion::keyword("with"),
            Suggestion::keyword("void"),
        ];
        let ranked = rank_suggestions(candidates, "w", RankingScope::Global, &RankingCriteria::default());
        assert_eq!(names(&ranked), vec!["while", "with", "void"]);
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let criteria = RankingCriteria::default();
        let once = rank_suggestions(member_candidates(), "sa", RankingScope::Members, &criteria);
        let twice = rank_suggestions(once.clone(), "sa", RankingScope::Members, &criteria);
        assert_eq!(once, twice);

        let mut reversed = member_candidates();
        reversed.reverse();
        let from_reversed = rank_suggestions(reversed, "sa", RankingScope::Members, &criteria);
        assert_eq!(once, from_reversed);
    }

    #[test]
    fn test_max_results_limit() {
        let candidates: Vec<Suggestion> = (0..30)
            .map(|i| Suggestion::keyword(&format!("kw{:02}", i)))
            .collect();
        let criteria = RankingCriteria { max_results: 10 };
        let ranked = rank_suggestions(candidates, "kw", RankingScope::Global, &criteria);

        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].name, "kw00");
        assert_eq!(ranked[9].name, "kw09");
    }
}
