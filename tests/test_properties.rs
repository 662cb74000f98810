/// Property tests over generated console input
///
/// Properties:
/// - Any (text, cursor) pair is processed without panicking
/// - Processing the same input twice yields the same ordered suggestions
/// - Ranking an already ranked list is a no-op

use std::sync::Arc;

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use extendscript_console::completion::{
    collect_globals, rank_suggestions, CompletionEngine, RankingCriteria, RankingScope,
};
use extendscript_console::config::CompletionConfig;
use extendscript_console::schema::ApiSchema;
use extendscript_console::session::CompletionController;

const TOKENS: &[&str] = &[
    "app", "project", "activeSequence", "videoTracks", "clips", "rootItem", "children",
    "markers", "na", "sa", "get", "p", ".", ".", ".", "(", ")", "[", "]", "[0]", ",", " ",
    "\n", "\"", "'", "\\", ";", "var ", "x", "=", "1", "é", "日本", "$", "_",
];

/// Console text built from API names and punctuation, plus a cursor that may
/// point past the end
#[derive(Debug, Clone)]
struct ConsoleInput {
    text: String,
    cursor: usize,
}

impl Arbitrary for ConsoleInput {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 24;
        let text: String = (0..len)
            .map(|_| *g.choose(TOKENS).unwrap_or(&"app"))
            .collect();
        let cursor = usize::arbitrary(g) % (text.len() + 4);
        ConsoleInput { text, cursor }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let cursor = self.cursor;
        Box::new(
            self.text
                .shrink()
                .map(move |text| ConsoleInput { text, cursor }),
        )
    }
}

fn controller() -> CompletionController {
    CompletionController::new(Arc::new(ApiSchema::builtin()), &CompletionConfig::default())
}

#[test]
fn test_process_never_panics() {
    fn prop(input: ConsoleInput) -> TestResult {
        let mut controller = controller();
        let session = controller.process(&input.text, input.cursor).clone();
        if session.is_open() {
            assert!(!session.suggestions().is_empty());
            assert!(session.suggestions().len() <= 10);
        }
        // Whatever was offered can be accepted without panicking
        let _ = controller.accept_selected();
        TestResult::passed()
    }
    QuickCheck::new().tests(500).quickcheck(prop as fn(ConsoleInput) -> TestResult);
}

#[test]
fn test_processing_is_idempotent() {
    fn prop(input: ConsoleInput) -> TestResult {
        let mut engine =
            CompletionEngine::new(Arc::new(ApiSchema::builtin()), &CompletionConfig::default());
        let Some((_, first)) = engine.complete(&input.text, input.cursor) else {
            return TestResult::discard();
        };
        let (_, second) = engine
            .complete(&input.text, input.cursor)
            .expect("same input classifies the same way");
        assert_eq!(first, second);
        TestResult::passed()
    }
    QuickCheck::new()
        .tests(200)
        .max_tests(2000)
        .quickcheck(prop as fn(ConsoleInput) -> TestResult);
}

#[test]
fn test_ranking_is_a_fixed_point() {
    fn prop(partial: String) -> TestResult {
        let partial: String = partial
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(3)
            .collect();
        let schema = ApiSchema::builtin();
        let criteria = RankingCriteria { max_results: usize::MAX };

        let candidates = collect_globals(&schema, &partial);
        let ranked = rank_suggestions(candidates.clone(), &partial, RankingScope::Global, &criteria);
        let reranked = rank_suggestions(ranked.clone(), &partial, RankingScope::Global, &criteria);
        assert_eq!(ranked, reranked);

        let mut reversed = candidates;
        reversed.reverse();
        assert_eq!(
            rank_suggestions(reversed, &partial, RankingScope::Global, &criteria),
            ranked
        );
        TestResult::passed()
    }
    QuickCheck::new().tests(100).quickcheck(prop as fn(String) -> TestResult);
}
