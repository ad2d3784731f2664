//! Human and JSON rendering of a verification report.

use std::path::Path;

use canonical_errors_verify::{
    CategoryReport, Failure, FieldDiff, FieldDrift, Outcome, VerificationReport, Verdict,
};
use colored::Colorize;

/// Pretty JSON report for `verify --json`.
///
/// # Errors
/// Propagates the serializer error.
pub fn render_json(report: &VerificationReport) -> serde_json::Result<String> {
    let output = serde_json::json!({
        "ok": report.passed(),
        "categories_checked": report.categories.len(),
        "categories_failed": report.failed_categories(),
        "schema_identity": report.schema_identity,
        "categories": report.categories,
    });
    serde_json::to_string_pretty(&output)
}

fn pointer(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

/// One line per finding, indented under its category.
#[must_use]
pub fn category_lines(category: &CategoryReport) -> Vec<String> {
    let mut lines = Vec::new();
    if category.baseline_missing {
        lines.push("baseline missing (run `errors-contract approve`)".to_owned());
    }
    for diff in &category.diffs {
        lines.push(match diff {
            FieldDiff::Changed {
                path,
                expected,
                actual,
            } => format!("{}: expected {expected}, got {actual}", pointer(path)),
            FieldDiff::Missing { path, expected } => {
                format!("{}: missing (baseline has {expected})", pointer(path))
            }
            FieldDiff::Unexpected { path, actual } => {
                format!("{}: not in baseline (got {actual})", pointer(path))
            }
        });
    }
    for violation in &category.schema.violations {
        lines.push(format!(
            "[{}] {} ({})",
            violation.scope, violation.message, violation.schema_id
        ));
    }
    for drift in &category.schema.drift {
        lines.push(match drift {
            FieldDrift::Undeclared { scope, field } => {
                format!("[{scope}] field '{field}' is emitted but not declared by the schema")
            }
            FieldDrift::NotEmitted { scope, field } => {
                format!("[{scope}] required field '{field}' is not emitted")
            }
        });
    }
    lines
}

fn verdict_label(verdict: Verdict) -> String {
    match verdict {
        Verdict::Unverified => "UNVERIFIED".yellow().to_string(),
        Verdict::Checked(Outcome::Pass) => "PASS".green().to_string(),
        Verdict::Checked(Outcome::Fail(failure)) => {
            let reason = match failure {
                Failure::BaselineMismatch => "baseline",
                Failure::SchemaMismatch => "schema",
                Failure::Both => "baseline+schema",
            };
            format!("FAIL ({reason})").red().to_string()
        }
    }
}

pub fn print_human(report: &VerificationReport, baseline_dir: &Path) {
    println!();
    println!("{}", "=".repeat(80));
    println!("  {}", "CANONICAL ERRORS CONTRACT".bold());
    println!("{}", "=".repeat(80));
    println!();
    println!("  Baselines:          {}", baseline_dir.display());
    println!("  Categories checked: {}", report.categories.len());
    println!("  Categories failed:  {}", report.failed_categories());
    println!();

    for category in &report.categories {
        println!(
            "  {:<22} {}",
            category.category.name(),
            verdict_label(category.verdict)
        );
        for line in category_lines(category) {
            println!("      {}", line.dimmed());
        }
    }

    if !report.schema_identity.is_empty() {
        println!();
        println!("  {}", "SCHEMA IDENTITY".red().bold());
        for issue in &report.schema_identity {
            println!("      {}", issue.red());
        }
    }

    println!();
    println!("{}", "=".repeat(80));
    if report.passed() {
        println!(
            "{}",
            format!("\u{2713} All {} categories match", report.categories.len()).green()
        );
    } else {
        println!(
            "{}",
            format!(
                "\u{2717} {} categories failed verification",
                report.failed_categories()
            )
            .red()
        );
        println!();
        println!("  To fix:");
        println!(
            "    - If the change is intended, run `errors-contract approve` and commit baselines"
        );
        println!(
            "    - Schema findings mean a context type and the converter disagree; fix the code"
        );
    }
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use canonical_errors::ErrorCategory;
    use canonical_errors_verify::SchemaReport;
    use serde_json::json;

    fn failing_category() -> CategoryReport {
        CategoryReport {
            category: ErrorCategory::NotFound,
            verdict: Verdict::from_checks(false, false),
            baseline_missing: false,
            diffs: vec![FieldDiff::Changed {
                path: "/status".to_owned(),
                expected: json!(410),
                actual: json!(404),
            }],
            schema: SchemaReport {
                violations: Vec::new(),
                drift: vec![FieldDrift::Undeclared {
                    scope: "extensions",
                    field: "owner".to_owned(),
                }],
            },
        }
    }

    #[test]
    fn lines_name_each_finding() {
        let lines = category_lines(&failing_category());
        assert_eq!(
            lines,
            vec![
                "/status: expected 410, got 404".to_owned(),
                "[extensions] field 'owner' is emitted but not declared by the schema".to_owned(),
            ]
        );
    }

    #[test]
    fn json_report_shape() {
        let report = VerificationReport {
            categories: vec![failing_category()],
            schema_identity: Vec::new(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["categories_failed"], 1);
        assert_eq!(value["categories"][0]["category"], "not_found");
        assert_eq!(value["categories"][0]["verdict"]["outcome"]["failure"], "both");
        assert_eq!(value["categories"][0]["diffs"][0]["kind"], "changed");
    }
}
