//! Shallow test oracle.
//!
//! Produces pass/fail verdicts from substring and regex presence checks on
//! the source text; nothing is executed. The one exception is the blackbox
//! category, whose second check asks the [`CompilerProbe`] whether the
//! source compiles at all. Verdict volume scales with source length:
//! `tests_per_line` verdicts per non-blank line, split across five fixed
//! categories.

use crate::domain::{TestKind, TestResult};
use crate::probe::CompilerProbe;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Per-category budget split, as fractions of the total. The defaults are
/// product choices, not invariants; both the split and the per-line
/// multiplier are configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryWeights {
    pub ux: f64,
    pub regression: f64,
    pub unit: f64,
    pub blackbox: f64,
    pub ab: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            ux: 0.2,
            regression: 0.2,
            unit: 0.3,
            blackbox: 0.2,
            ab: 0.1,
        }
    }
}

/// Configuration for the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    /// Verdicts generated per non-blank source line.
    pub tests_per_line: usize,

    /// Category split over the total budget.
    pub weights: CategoryWeights,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            tests_per_line: 20,
            weights: CategoryWeights::default(),
        }
    }
}

/// Outcome of the design-pattern battery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignCheck {
    pub passed: bool,
    pub issues: Vec<String>,
}

fn function_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:void|int|float|double|char|struct\s+\w+)\s+(\w+)\s*\(")
            .expect("valid function regex")
    })
}

fn free_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"free\s*\(([^)]+)\)").expect("valid free regex"))
}

fn header_include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+\.h").expect("valid header regex"))
}

fn param_list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("valid params regex"))
}

fn fn_pointer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\*.*\)\(").expect("valid fn pointer regex"))
}

fn factory_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)create\w+|factory").expect("valid factory regex"))
}

/// Detect an argument token passed to `free()` more than once.
///
/// Token-level heuristic: aliased pointers are missed, and a legitimate
/// re-free after reassignment is a false positive. Kept shallow on purpose.
pub fn has_double_free(source: &str) -> bool {
    let mut seen = Vec::new();
    for caps in free_call_re().captures_iter(source) {
        let arg = caps[1].trim().to_string();
        if seen.contains(&arg) {
            return true;
        }
        seen.push(arg);
    }
    false
}

/// Shallow test oracle over a finalized source.
pub struct TestOracle {
    config: OracleConfig,
}

impl TestOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    /// Generate and "run" the full battery for a source.
    ///
    /// Total verdicts = non-blank lines x tests_per_line, split per the
    /// configured weights with each category rounded up.
    pub async fn generate_and_run_tests(
        &self,
        source: &str,
        probe: &dyn CompilerProbe,
    ) -> Vec<TestResult> {
        let line_count = source.lines().filter(|l| !l.trim().is_empty()).count();
        let total = line_count * self.config.tests_per_line;
        let w = &self.config.weights;

        debug!(line_count, total, "generating shallow test battery");

        let compiles = probe.check_compiles(source).await;

        let mut results = Vec::with_capacity(total);
        results.extend(self.ux_tests(source, budget(total, w.ux)));
        results.extend(self.regression_tests(source, budget(total, w.regression)));
        results.extend(self.unit_tests(source, budget(total, w.unit)));
        results.extend(self.blackbox_tests(source, compiles, budget(total, w.blackbox)));
        results.extend(self.ab_tests(source, budget(total, w.ab)));
        results
    }

    fn ux_tests(&self, source: &str, count: usize) -> Vec<TestResult> {
        let has_error_handling =
            source.contains("error") || source.contains("Error") || source.contains("perror");
        let has_logging =
            source.contains("printf") || source.contains("fprintf") || source.contains("log");
        let has_input_validation = source.contains("if")
            && (source.contains("NULL") || source.contains("==") || source.contains("!="));

        cycle_checks(
            TestKind::Ux,
            "UX Test",
            count,
            &[
                (has_error_handling, "Error handling present", "Missing error handling"),
                (has_logging, "Logging mechanism present", "Missing logging"),
                (has_input_validation, "Input validation present", "Missing input validation"),
            ],
        )
    }

    fn regression_tests(&self, source: &str, count: usize) -> Vec<TestResult> {
        let has_memory_management = source.contains("malloc") && source.contains("free");
        let no_double_free = !has_double_free(source);
        let has_bounds_checking = source.contains('[')
            && (source.contains('<') || source.contains('>') || source.contains("sizeof"));

        cycle_checks(
            TestKind::Regression,
            "Regression Test",
            count,
            &[
                (has_memory_management, "Memory management present", "Missing memory management"),
                (no_double_free, "No double-free detected", "Potential double-free issue"),
                (has_bounds_checking, "Bounds checking present", "Missing bounds checking"),
            ],
        )
    }

    fn unit_tests(&self, source: &str, count: usize) -> Vec<TestResult> {
        let functions: Vec<String> = function_decl_re()
            .captures_iter(source)
            .map(|c| c[1].to_string())
            .collect();
        let has_return = source.contains("return");
        let has_parameters = param_list_re()
            .captures_iter(source)
            .any(|c| c[1].trim().len() > 1);

        let found = format!("Found {} functions", functions.len());
        cycle_checks(
            TestKind::Unit,
            "Unit Test",
            count,
            &[
                (!functions.is_empty(), found.as_str(), "No functions found"),
                (has_return, "Functions have return values", "Missing return statements"),
                (has_parameters, "Functions have parameters", "Functions lack parameters"),
            ],
        )
    }

    fn blackbox_tests(&self, source: &str, compiles: bool, count: usize) -> Vec<TestResult> {
        let has_main = source.contains("main");
        let has_io =
            source.contains("scanf") || source.contains("fread") || source.contains("read");

        cycle_checks(
            TestKind::Blackbox,
            "Blackbox Test",
            count,
            &[
                (has_main, "Entry point (main) present", "Missing entry point"),
                (compiles, "Code compiles successfully", "Code does not compile"),
                (has_io, "I/O operations present", "Missing I/O operations"),
            ],
        )
    }

    fn ab_tests(&self, source: &str, count: usize) -> Vec<TestResult> {
        let has_optimization = source.contains("inline")
            || source.contains("static")
            || source.contains("const");
        let has_alternative_paths = source.contains("if") && source.contains("else");
        let has_modularity =
            source.contains("#include") && header_include_re().is_match(source);

        cycle_checks(
            TestKind::Ab,
            "A-B Test",
            count,
            &[
                (has_optimization, "Optimization hints present", "Missing optimization"),
                (has_alternative_paths, "Alternative execution paths present", "Single execution path"),
                (has_modularity, "Modular design detected", "Lacks modularity"),
            ],
        )
    }

    /// Fixed design-pattern and engineering-fitness battery.
    ///
    /// Only missing modularity, missing error handling, and malloc without
    /// a matching free are reported as failures; the remaining patterns are
    /// probed but informational.
    pub fn check_design_patterns(&self, source: &str) -> DesignCheck {
        let modular = source.contains("#include") && header_include_re().is_match(source);
        let error_handling =
            source.contains("error") || source.contains("Error") || source.contains("NULL");
        let memory_safety = source.contains("malloc") && source.contains("free");

        // Probed for observability, not enforced.
        let _singleton = source.contains("static") && source.contains("getInstance");
        let _factory = factory_re().is_match(source);
        let _observer = source.contains("callback") || source.contains("notify");
        let _strategy = source.contains("function pointer") || fn_pointer_re().is_match(source);
        let _thread_safety = source.contains("mutex")
            || source.contains("pthread")
            || source.contains("atomic");
        let _encryption = source.contains("encrypt")
            || source.contains("crypto")
            || source.contains("AES");
        let _protocol = source.contains("protocol")
            || source.contains("packet")
            || source.contains("header");

        let mut issues = Vec::new();
        if !modular {
            issues.push("Missing modular design".to_string());
        }
        if !error_handling {
            issues.push("Missing error handling".to_string());
        }
        if !memory_safety && source.contains("malloc") {
            issues.push("Memory management incomplete".to_string());
        }

        DesignCheck {
            passed: issues.is_empty(),
            issues,
        }
    }
}

/// Category budget: fraction of the total, rounded up.
fn budget(total: usize, weight: f64) -> usize {
    (total as f64 * weight).ceil() as usize
}

/// Emit `count` verdicts cycling through a fixed list of
/// (passed, pass message, fail message) checks.
fn cycle_checks(
    kind: TestKind,
    label: &str,
    count: usize,
    checks: &[(bool, &str, &str)],
) -> Vec<TestResult> {
    (0..count)
        .map(|i| {
            let (passed, pass_msg, fail_msg) = checks[i % checks.len()];
            let message = if passed { pass_msg } else { fail_msg };
            TestResult::new(kind, passed, format!("{} {}: {}", label, i + 1, message))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeneratedCode;
    use async_trait::async_trait;

    struct FixedProbe {
        compiles: bool,
    }

    #[async_trait]
    impl CompilerProbe for FixedProbe {
        async fn compile(&self, source: &str) -> GeneratedCode {
            if self.compiles {
                GeneratedCode::clean(source.to_string())
            } else {
                GeneratedCode::new(
                    source.to_string(),
                    Vec::new(),
                    vec!["error: nope".to_string()],
                )
            }
        }
    }

    const SOURCE: &str = "#include <stdio.h>\n\
        #include <stdlib.h>\n\
        int main(void) {\n\
        \n\
            char *buf = malloc(16);\n\
            if (buf == NULL) { fprintf(stderr, \"error\\n\"); return 1; }\n\
            free(buf);\n\
            return 0;\n\
        }\n";

    fn oracle() -> TestOracle {
        TestOracle::new(OracleConfig::default())
    }

    #[tokio::test]
    async fn test_total_count_scales_with_lines() {
        let probe = FixedProbe { compiles: true };
        let results = oracle().generate_and_run_tests(SOURCE, &probe).await;

        // 8 non-blank lines x 20 tests/line = 160, each of the five
        // categories rounded up individually.
        let total = 160usize;
        let expected: usize = [0.2, 0.2, 0.3, 0.2, 0.1]
            .iter()
            .map(|w| (total as f64 * w).ceil() as usize)
            .sum();
        assert_eq!(results.len(), expected);
    }

    #[tokio::test]
    async fn test_category_split_rounds_up_per_category() {
        let probe = FixedProbe { compiles: true };
        // Single line: total 20, ceil splits 4/4/6/4/2.
        let results = oracle()
            .generate_and_run_tests("int main(void) { return 0; }", &probe)
            .await;

        let count_of = |kind: TestKind| results.iter().filter(|r| r.kind == kind).count();
        assert_eq!(count_of(TestKind::Ux), 4);
        assert_eq!(count_of(TestKind::Regression), 4);
        assert_eq!(count_of(TestKind::Unit), 6);
        assert_eq!(count_of(TestKind::Blackbox), 4);
        assert_eq!(count_of(TestKind::Ab), 2);
    }

    #[tokio::test]
    async fn test_blackbox_reflects_probe_verdict() {
        let probe = FixedProbe { compiles: false };
        let results = oracle().generate_and_run_tests(SOURCE, &probe).await;

        let compile_checks: Vec<_> = results
            .iter()
            .filter(|r| r.message.contains("compile"))
            .collect();
        assert!(!compile_checks.is_empty());
        assert!(compile_checks.iter().all(|r| !r.passed));
    }

    #[test]
    fn test_single_free_is_not_double_free() {
        let source = "char *p = malloc(8); free(p);";
        assert!(!has_double_free(source));
    }

    #[test]
    fn test_repeated_free_of_same_arg_detected() {
        let source = "free(p); do_stuff(); free(p);";
        assert!(has_double_free(source));
    }

    #[test]
    fn test_frees_of_different_args_allowed() {
        let source = "free(a); free(b); free(c);";
        assert!(!has_double_free(source));
    }

    #[test]
    fn test_design_check_passes_for_well_formed_source() {
        let check = oracle().check_design_patterns(SOURCE);
        assert!(check.passed, "issues: {:?}", check.issues);
    }

    #[test]
    fn test_design_check_flags_missing_modularity() {
        let check = oracle().check_design_patterns("int main(void) { return 0; }");
        assert!(!check.passed);
        assert!(check
            .issues
            .iter()
            .any(|i| i.contains("Missing modular design")));
    }

    #[test]
    fn test_design_check_flags_malloc_without_free() {
        let source = "#include <stdlib.h>\nint main(void) { char *p = malloc(8); return 0; }";
        let check = oracle().check_design_patterns(source);
        assert!(check
            .issues
            .iter()
            .any(|i| i.contains("Memory management incomplete")));
    }

    #[test]
    fn test_budget_rounds_up() {
        assert_eq!(budget(20, 0.1), 2);
        assert_eq!(budget(21, 0.1), 3);
        assert_eq!(budget(0, 0.3), 0);
    }
}
