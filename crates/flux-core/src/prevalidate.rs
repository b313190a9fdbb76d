//! Lexical pre-validation, no compiler invoked.
//!
//! Cheap character-level checks that catch obviously broken sources before
//! spending a compile. These are heuristics, not a lexer: brace counts are
//! raw (braces inside strings count too), and the per-line string check can
//! misfire on multi-line comments. Good enough to short-circuit garbage.

use crate::domain::{IssueCategory, Severity, ValidationIssue};
use regex::Regex;
use std::sync::OnceLock;

fn main_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(int|void)\s+main\s*\(").expect("valid main regex"))
}

/// Run all lexical pre-checks over a source string.
///
/// A balanced source with at least one include directive and a conventional
/// `main` declaration yields no issues.
pub fn prevalidate(source: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let open_braces = source.matches('{').count();
    let close_braces = source.matches('}').count();
    if open_braces != close_braces {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueCategory::Syntax,
            format!(
                "unbalanced braces: {} '{{' vs {} '}}'",
                open_braces, close_braces
            ),
        ));
    }

    let open_parens = source.matches('(').count();
    let close_parens = source.matches(')').count();
    if open_parens != close_parens {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueCategory::Syntax,
            format!(
                "unbalanced parentheses: {} '(' vs {} ')'",
                open_parens, close_parens
            ),
        ));
    }

    if !source.contains("#include") {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Other,
            "no #include directive found",
        ));
    }

    // Only flag main when the token exists but the declaration is unusual;
    // header-only fragments without main are legal input here.
    if source.contains("main") && !main_decl_re().is_match(source) {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Semantic,
            "main declaration does not match 'int main(...)' or 'void main(...)'",
        ));
    }

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
            continue;
        }
        if count_unescaped_quotes(line) % 2 != 0 {
            issues.push(
                ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Syntax,
                    format!("unterminated string literal on line {}", idx + 1),
                )
                .with_location(idx as u32 + 1, 1),
            );
        }
    }

    issues
}

fn count_unescaped_quotes(line: &str) -> usize {
    let mut count = 0;
    let mut prev_backslash = false;
    for ch in line.chars() {
        if ch == '"' && !prev_backslash {
            count += 1;
        }
        prev_backslash = ch == '\\' && !prev_backslash;
    }
    count
}
