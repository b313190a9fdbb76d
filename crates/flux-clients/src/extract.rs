//! Code extraction from chat-completion responses.

use regex::Regex;
use std::sync::OnceLock;

fn fenced_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:[cC])?[ \t]*\n?(.*?)```").expect("valid fence regex")
    })
}

/// Pull the first fenced code block out of a completion response.
///
/// Falls back to a heuristic scan when no fence is found: collect from the
/// first line that looks like C (include, comment, or brace) onward. When
/// even that fails, the raw response is returned and the caller's minimum
/// length check decides whether to reject it.
pub fn extract_code(response: &str) -> String {
    if let Some(caps) = fenced_block_re().captures(response) {
        if let Some(block) = caps.get(1) {
            return block.as_str().trim().to_string();
        }
    }

    let mut in_code = false;
    let mut code = Vec::new();
    for line in response.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("#include")
            || trimmed.starts_with("//")
            || line.contains('{')
            || line.contains('}')
        {
            in_code = true;
        }
        if in_code {
            code.push(line);
        }
    }

    if code.is_empty() {
        response.to_string()
    } else {
        code.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fenced_c_block() {
        let response = "Here is the code:\n```c\nint main(void) { return 0; }\n```\nDone.";
        assert_eq!(extract_code(response), "int main(void) { return 0; }");
    }

    #[test]
    fn test_extracts_unlabelled_fence() {
        let response = "```\n#include <stdio.h>\n```";
        assert_eq!(extract_code(response), "#include <stdio.h>");
    }

    #[test]
    fn test_first_fence_wins() {
        let response = "```c\nfirst();\n```\ntext\n```c\nsecond();\n```";
        assert_eq!(extract_code(response), "first();");
    }

    #[test]
    fn test_heuristic_scan_without_fence() {
        let response = "Sure thing!\n#include <stdio.h>\nint main(void) {\n    return 0;\n}";
        let code = extract_code(response);
        assert!(code.starts_with("#include <stdio.h>"));
        assert!(code.contains("return 0;"));
        assert!(!code.contains("Sure thing"));
    }

    #[test]
    fn test_raw_response_when_nothing_code_like() {
        let response = "I cannot help with that.";
        assert_eq!(extract_code(response), response);
    }
}
