//! Reply text normalization.
//!
//! The reply service returns markdown-flavored text; the transcript stores
//! plain display text. Normalization is an ordered pipeline of regex rewrite
//! rules followed by a final trim. Rule order is load-bearing: bold markers
//! are a superset of the italic marker character and must collapse first,
//! and the inline-code rule must not consume fence delimiters before the
//! fenced-block rule runs (its inner text is required to be non-empty and
//! single-line for that reason).

use std::sync::LazyLock;

use regex::Regex;

/// One rewrite step: everything `pattern` matches is replaced by
/// `replacement` (which may reference capture groups).
struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

/// Markup-stripping rules, applied in order.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        // Bold **text**
        (r"\*\*(.*?)\*\*", "$1"),
        // Italic *text* or _text_
        (r"[_*](.*?)[_*]", "$1"),
        // Inline code `text` (single line, non-empty inner)
        (r"`([^`\n]+)`", "$1"),
        // Leading heading markers (# Header)
        (r"(?m)^#+\s+", ""),
        // Fenced code blocks, delimiters and content, across lines
        (r"(?s)```.*?```", ""),
        // Runs of three or more line breaks collapse to two
        (r"\n\s*\n\s*\n", "\n\n"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| Rule {
        pattern: Regex::new(pattern).unwrap(),
        replacement,
    })
    .collect()
});

/// Strip common markdown markup from `text`, returning plain display text.
///
/// Total over all inputs: malformed or unmatched markers are left as-is and
/// the function never fails. Empty input comes back empty.
pub fn normalize(text: &str) -> String {
    let mut cleaned = text.to_string();
    for rule in RULES.iter() {
        cleaned = rule
            .pattern
            .replace_all(&cleaned, rule.replacement)
            .into_owned();
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_only_trimmed() {
        assert_eq!(normalize("hello world"), "hello world");
        assert_eq!(normalize("  padded  "), "padded");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn bold_collapses_before_italic() {
        assert_eq!(normalize("**bold**"), "bold");
        assert_eq!(normalize("a **b** c"), "a b c");
    }

    #[test]
    fn italic_markers_stripped() {
        assert_eq!(normalize("*word*"), "word");
        assert_eq!(normalize("_word_"), "word");
    }

    #[test]
    fn inline_code_stripped() {
        assert_eq!(normalize("run `cargo test` now"), "run cargo test now");
    }

    #[test]
    fn headings_stripped_per_line() {
        assert_eq!(normalize("# Title\nbody"), "Title\nbody");
        assert_eq!(normalize("## A\n### B"), "A\nB");
    }

    #[test]
    fn fenced_blocks_removed_entirely() {
        assert_eq!(normalize("before\n```\ncode\n```\nafter"), "before\n\nafter");
        assert_eq!(normalize("```rust\nfn main() {}\n```"), "");
    }

    #[test]
    fn newline_runs_collapse_to_two() {
        assert_eq!(normalize("a\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n \n \n \nb"), "a\n\nb");
    }

    #[test]
    fn unmatched_markers_left_alone() {
        assert_eq!(normalize("*oops"), "*oops");
        assert_eq!(normalize("`dangling"), "`dangling");
    }

    #[test]
    fn idempotent_on_markup_samples() {
        let samples = [
            "**bold** and _italic_ and `code`",
            "# Title\n\nsome **body**\n\n```\nignored\n```\n",
            "plain",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
