//! Prompt construction for the code-generation service.

use flux_core::{categorize, IssueCategory};
use std::fmt::Write;

pub const SYSTEM_GENERATE: &str = "You are an expert C programmer specializing in embedded systems, hardware design, and high-performance computing. Generate production-ready, optimized C code.";

pub const SYSTEM_IMPROVE: &str = "You are an expert C programmer. Fix compilation errors systematically. Return only valid, compilable C code in markdown code blocks.";

/// Build the initial generation prompt from an idea and the characteristic
/// list.
pub fn generate_prompt(idea: &str, characteristics: &[String]) -> String {
    format!(
        "Generate production-ready C code that implements: \"{idea}\"\n\n\
         Requirements:\n\
         - Modular design with clear separation of concerns\n\
         - Fault-tolerant error handling\n\
         - Security best practices (input validation, bounds checking)\n\
         - Atomicity for critical operations\n\
         - Concurrent and parallel processing support\n\
         - Robust error recovery\n\
         - Producer-consumer patterns where applicable\n\
         - Synchronized access to shared resources\n\
         - Optimized for performance, lightweight and efficient\n\n\
         Characteristics to emphasize: {}\n\n\
         Include:\n\
         - Proper header files\n\
         - Function prototypes\n\
         - Error handling\n\
         - Memory management\n\
         - Thread safety where applicable\n\n\
         Return only valid, compilable C code wrapped in ```c code blocks.",
        characteristics.join(", ")
    )
}

/// Build a repair prompt with issues bucketed by category: syntax first,
/// then semantic/type, then the rest, then warnings truncated to five.
pub fn improve_prompt(source: &str, warnings: &[String], errors: &[String]) -> String {
    let mut syntax = Vec::new();
    let mut semantic = Vec::new();
    let mut other = Vec::new();
    for err in errors {
        match categorize(err) {
            IssueCategory::Syntax => syntax.push(err),
            IssueCategory::Undeclared | IssueCategory::Type | IssueCategory::Semantic => {
                semantic.push(err)
            }
            _ => other.push(err),
        }
    }

    let mut prompt =
        String::from("You are fixing C code compilation issues. Here's what needs to be fixed:\n\n");

    push_bucket(&mut prompt, "SYNTAX ERRORS (fix these first):", &syntax);
    push_bucket(&mut prompt, "SEMANTIC/TYPE ERRORS:", &semantic);
    push_bucket(&mut prompt, "OTHER ERRORS:", &other);

    if !warnings.is_empty() {
        let truncated: Vec<&String> = warnings.iter().take(5).collect();
        push_bucket(&mut prompt, "WARNINGS (fix if possible):", &truncated);
    }

    let context = issue_context(source, errors);
    if !context.is_empty() {
        let _ = writeln!(prompt, "{}", context);
    }

    let _ = write!(
        prompt,
        "Current code:\n```c\n{source}\n```\n\n\
         Instructions:\n\
         1. Fix all syntax errors first\n\
         2. Ensure all variables and functions are properly declared\n\
         3. Fix type mismatches and incompatibilities\n\
         4. Address warnings where reasonable\n\
         5. Preserve the original functionality and logic\n\
         6. Add necessary #include directives if missing\n\n\
         Provide ONLY the corrected C code wrapped in ```c code blocks. No explanations."
    );

    prompt
}

fn push_bucket(prompt: &mut String, heading: &str, entries: &[&String]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(prompt, "{}", heading);
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, entry);
    }
    prompt.push('\n');
}

/// Render code context around the first five located errors: the offending
/// line marked, one line either side.
fn issue_context(source: &str, errors: &[String]) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let mut out = String::new();

    let located: Vec<(usize, &String)> = errors
        .iter()
        .take(5)
        .filter_map(|err| {
            flux_core::classify_line(err)
                .line
                .map(|n| (n as usize, err))
        })
        .collect();
    if located.is_empty() {
        return out;
    }

    out.push_str("Issue context:\n");
    for (line_num, err) in located {
        let _ = writeln!(out, "\nError at line {}:\n  {}", line_num, err);
        if line_num >= 1 && line_num <= lines.len() {
            out.push_str("  Code context:\n");
            let start = line_num.saturating_sub(2);
            let end = (line_num + 1).min(lines.len());
            for i in start..end {
                let marker = if i + 1 == line_num { ">" } else { " " };
                let _ = writeln!(out, "  {} {}: {}", marker, i + 1, lines[i]);
            }
        }
    }
    out
}
