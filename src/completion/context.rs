//! Context detection for code completion
//!
//! Only the trailing access/call expression before the cursor matters, and
//! that grammar is regular, so detection is an ordered table of rules applied
//! to a bounded window of text. The first rule that matches wins:
//!
//! 1. `ident(.ident)*[expr].partial`  → indexed property access
//! 2. `ident(.ident)*.partial`        → property access
//! 3. `ident(args` with unmatched `(` → method call (parameter hints)
//! 4. `ident`                          → bare identifier
//!
//! Anything else yields no context. Chains longer than the window are cut at
//! the window start.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

/// Default number of characters scanned before the cursor
pub const DEFAULT_WINDOW_CHARS: usize = 300;

/// Classified description of the completion requested at the cursor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionContext {
    /// `app.project.na` or `seq.videoTracks[0].na`
    PropertyAccess {
        path: Vec<String>,
        partial: String,
        replace_length: usize,
        /// The last path segment was indexed (`segment[expr]`)
        indexed: bool,
    },

    /// Inside the argument list of `callee_name(`
    MethodCall {
        callee_name: String,
        raw_args: String,
    },

    /// A bare identifier outside any member access
    Identifier {
        partial: String,
        replace_length: usize,
    },
}

impl CompletionContext {
    /// Characters before the cursor replaced when a suggestion is accepted
    pub fn replace_length(&self) -> usize {
        match self {
            CompletionContext::PropertyAccess { replace_length, .. }
            | CompletionContext::Identifier { replace_length, .. } => *replace_length,
            CompletionContext::MethodCall { .. } => 0,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            CompletionContext::PropertyAccess { .. } => "property_access",
            CompletionContext::MethodCall { .. } => "method_call",
            CompletionContext::Identifier { .. } => "identifier",
        }
    }
}

/// A named detector in the ordered rule table
struct ContextRule {
    name: &'static str,
    detect: fn(&str) -> Option<CompletionContext>,
}

static CONTEXT_RULES: &[ContextRule] = &[
    ContextRule {
        name: "indexed_access",
        detect: detect_indexed_access,
    },
    ContextRule {
        name: "property_access",
        detect: detect_property_access,
    },
    ContextRule {
        name: "method_call",
        detect: detect_method_call,
    },
    ContextRule {
        name: "identifier",
        detect: detect_identifier,
    },
];

static INDEXED_ACCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([A-Za-z$_][A-Za-z0-9$_]*(?:\.[A-Za-z$_][A-Za-z0-9$_]*)*)\[[^\[\]]*\]\.((?:[A-Za-z$_][A-Za-z0-9$_]*)?)$",
    )
    .expect("indexed access pattern is valid")
});

static PROPERTY_ACCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([A-Za-z$_][A-Za-z0-9$_]*(?:\.[A-Za-z$_][A-Za-z0-9$_]*)*)\.((?:[A-Za-z$_][A-Za-z0-9$_]*)?)$",
    )
    .expect("property access pattern is valid")
});

/// Classify the context at `cursor`
///
/// `cursor` is a byte offset, clamped to the text and floored to a char
/// boundary. Only the `window_chars` chars before it are scanned, so the cost
/// does not depend on the document size.
pub fn classify(text: &str, cursor: usize, window_chars: usize) -> Option<CompletionContext> {
    let cursor = clamp_cursor(text, cursor);
    classify_before(&text[..cursor], window_chars)
}

/// Classify the context at the end of `before`, the text preceding the cursor
pub fn classify_before(before: &str, window_chars: usize) -> Option<CompletionContext> {
    let window = trailing_window(before, window_chars);

    CONTEXT_RULES.iter().find_map(|rule| {
        let context = (rule.detect)(window)?;
        trace!("Context rule '{}' matched: {:?}", rule.name, context);
        Some(context)
    })
}

/// Clamp a byte offset to the text length and floor it to a char boundary
pub fn clamp_cursor(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// The last `window_chars` chars of `before`, found scanning backward
fn trailing_window(before: &str, window_chars: usize) -> &str {
    let start = before
        .char_indices()
        .rev()
        .take(window_chars)
        .last()
        .map(|(index, _)| index)
        .unwrap_or(before.len());
    &before[start..]
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '$' || c == '_'
}

/// A chain that continues something we cannot see (`foo().bar`, `a[0].b.c`)
/// is not resolvable from its visible tail.
fn continues_expression(window: &str, start: usize) -> bool {
    matches!(
        window[..start].chars().next_back(),
        Some('.') | Some(')') | Some(']')
    )
}

fn split_path(chain: &str) -> Vec<String> {
    chain.split('.').map(str::to_string).collect()
}

fn property_access(
    pattern: &Regex,
    window: &str,
    indexed: bool,
) -> Option<CompletionContext> {
    let captures = pattern.captures(window)?;
    let chain = captures.get(1)?;
    if continues_expression(window, chain.start()) {
        return None;
    }
    let partial = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

    Some(CompletionContext::PropertyAccess {
        path: split_path(chain.as_str()),
        partial: partial.to_string(),
        replace_length: partial.len(),
        indexed,
    })
}

fn detect_indexed_access(window: &str) -> Option<CompletionContext> {
    property_access(&INDEXED_ACCESS, window, true)
}

fn detect_property_access(window: &str) -> Option<CompletionContext> {
    property_access(&PROPERTY_ACCESS, window, false)
}

fn detect_method_call(window: &str) -> Option<CompletionContext> {
    let open = innermost_open_paren(window)?;
    let callee = trailing_identifier(window[..open].trim_end())?;

    Some(CompletionContext::MethodCall {
        callee_name: callee.to_string(),
        raw_args: window[open + 1..].trim_start().to_string(),
    })
}

fn detect_identifier(window: &str) -> Option<CompletionContext> {
    let word = trailing_identifier(window)?;
    if continues_expression(window, window.len() - word.len()) {
        return None;
    }

    Some(CompletionContext::Identifier {
        partial: word.to_string(),
        replace_length: word.len(),
    })
}

/// The identifier ending at the end of `text`, if any
fn trailing_identifier(text: &str) -> Option<&str> {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_identifier_char(*c))
        .last()
        .map(|(i, _)| i)?;
    let word = &text[start..];
    if word.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(word)
}

/// Bracket nesting of `text` scanned left to right, skipping string literals
///
/// Returns the byte offsets of the brackets still open at the end, innermost
/// last, each paired with its opening character.
fn open_brackets(text: &str) -> Vec<(usize, char)> {
    let mut stack: Vec<(usize, char)> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' => stack.push((index, c)),
            ')' | ']' | '}' => {
                let opener = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.last().map(|(_, open)| *open) == Some(opener) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    stack
}

fn innermost_open_paren(text: &str) -> Option<usize> {
    open_brackets(text)
        .into_iter()
        .rev()
        .find(|(_, open)| *open == '(')
        .map(|(index, _)| index)
}

/// Zero-based index of the argument being typed in `raw_args`
///
/// Counts commas at the top nesting level, ignoring those inside nested
/// brackets and string literals.
pub fn argument_index(raw_args: &str) -> usize {
    let mut depth = 0usize;
    let mut commas = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in raw_args.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => commas += 1,
            _ => {}
        }
    }

    commas
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn classify_all(text: &str) -> Option<CompletionContext> {
        classify(text, text.len(), DEFAULT_WINDOW_CHARS)
    }

    #[test]
    fn test_property_access_chain() {
        let context = classify_all("var seq = app.project.activeSequence.mar");
        assert_eq!(
            context,
            Some(CompletionContext::PropertyAccess {
                path: vec!["app".into(), "project".into(), "activeSequence".into()],
                partial: "mar".into(),
                replace_length: 3,
                indexed: false,
            })
        );
    }

    #[test]
    fn test_property_access_after_bare_dot() {
        let context = classify_all("app.");
        assert_eq!(
            context,
            Some(CompletionContext::PropertyAccess {
                path: vec!["app".into()],
                partial: String::new(),
                replace_length: 0,
                indexed: false,
            })
        );
    }

    #[test]
    fn test_indexed_access_takes_precedence() {
        let context = classify_all("app.project.activeSequence.videoTracks[i + 1].na");
        assert_eq!(
            context,
            Some(CompletionContext::PropertyAccess {
                path: vec!["app".into(), "project".into(), "activeSequence".into(), "videoTracks".into()],
                partial: "na".into(),
                replace_length: 2,
                indexed: true,
            })
        );
    }

    #[test]
    fn test_method_call_context() {
        let context = classify_all("app.project.importFiles( paths, true");
        assert_eq!(
            context,
            Some(CompletionContext::MethodCall {
                callee_name: "importFiles".into(),
                raw_args: "paths, true".into(),
            })
        );
    }

    #[test]
    fn test_method_call_skips_closed_nested_calls() {
        let context = classify_all("encodeFile(getPath(item), \"out(1).mp4\", ");
        match context {
            Some(CompletionContext::MethodCall { callee_name, raw_args }) => {
                assert_eq!(callee_name, "encodeFile");
                assert_eq!(argument_index(&raw_args), 2);
            }
            other => panic!("expected method call, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier_context() {
        assert_eq!(
            classify_all("var x = ap"),
            Some(CompletionContext::Identifier {
                partial: "ap".into(),
                replace_length: 2,
            })
        );
    }

    #[test]
    fn test_no_context() {
        assert_eq!(classify_all(""), None);
        assert_eq!(classify_all("x = 1 + "), None);
        assert_eq!(classify_all("42"), None);
        assert_eq!(classify_all("getMarkers().fir"), None);
        assert_eq!(classify_all("a[0].b.c"), None);
    }

    #[test]
    fn test_cursor_is_clamped_and_respected() {
        let text = "app.project.na; // 1 + 2";
        assert_eq!(
            classify(text, 14, DEFAULT_WINDOW_CHARS),
            Some(CompletionContext::PropertyAccess {
                path: vec!["app".into(), "project".into()],
                partial: "na".into(),
                replace_length: 2,
                indexed: false,
            })
        );
        assert_eq!(clamp_cursor(text, 1000), text.len());
        assert!(classify(text, 1000, DEFAULT_WINDOW_CHARS).is_none());
    }

    #[test]
    fn test_cursor_inside_multibyte_char_is_floored() {
        // 'é' occupies bytes 8..10
        let text = "app.pro é";
        assert_eq!(clamp_cursor(text, 9), 8);
        assert_eq!(clamp_cursor(text, 10), 10);
        assert_eq!(classify(text, 9, DEFAULT_WINDOW_CHARS), None);
        assert!(matches!(
            classify(text, 7, DEFAULT_WINDOW_CHARS),
            Some(CompletionContext::PropertyAccess { replace_length: 3, .. })
        ));
    }

    #[test]
    fn test_classify_cost_is_flat_in_document_size() {
        fn fastest(text: &str) -> Duration {
            (0..10)
                .map(|_| {
                    let start = Instant::now();
                    assert!(classify(text, text.len(), DEFAULT_WINDOW_CHARS).is_some());
                    start.elapsed()
                })
                .min()
                .unwrap_or_default()
        }

        let small = format!("{}app.project.na", "x ".repeat(1_000));
        let large = format!("{}app.project.na", "é ".repeat(4_000_000));
        let (small, large) = (fastest(&small), fastest(&large));
        assert!(
            large < small * 20 + Duration::from_millis(1),
            "classify took {:?} on 12 MB vs {:?} on 2 KB",
            large,
            small
        );
    }

    #[test]
    fn test_window_is_cut_from_the_end() {
        let before = format!("{}app.na", "日本".repeat(1_000));
        assert_eq!(trailing_window(&before, 6), "app.na");
        assert_eq!(trailing_window(&before, 7), "本app.na");
        assert_eq!(trailing_window("ab", 10), "ab");
        assert_eq!(trailing_window("ab", 0), "");
        assert_eq!(
            classify_before(&before, DEFAULT_WINDOW_CHARS),
            classify(&before, before.len(), DEFAULT_WINDOW_CHARS)
        );
    }

    #[test]
    fn test_window_bounds_the_scan() {
        let text = format!("app.{}", "x".repeat(20));
        let context = classify(&text, text.len(), 10);
        assert_eq!(
            context,
            Some(CompletionContext::Identifier {
                partial: "x".repeat(10),
                replace_length: 10,
            })
        );
    }

    #[test]
    fn test_multibyte_text_before_cursor() {
        let text = "// café\napp.pro";
        assert!(matches!(
            classify_all(text),
            Some(CompletionContext::PropertyAccess { .. })
        ));
    }

    #[test]
    fn test_argument_index() {
        assert_eq!(argument_index(""), 0);
        assert_eq!(argument_index("a, b"), 1);
        assert_eq!(argument_index("[1, 2], {x: 1, y: 2}, "), 2);
        assert_eq!(argument_index("'a,b', \"c,d\""), 1);
    }
}
