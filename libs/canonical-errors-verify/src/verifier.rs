//! Per-category consistency verification and baseline approval.

use std::fs;
use std::path::{Path, PathBuf};

use canonical_errors::schema::{
    self, CANONICAL_ERROR_SCHEMA_ID, CONTEXT_SCHEMA_IDS, PROBLEM_SCHEMA_ID,
};
use canonical_errors::{CanonicalError, ErrorCategory, Problem};
use serde::Serialize;
use serde_json::Value;

use crate::baseline::{BaselineStore, to_canonical_json};
use crate::config::VerifyConfig;
use crate::diff::{FieldDiff, diff};
use crate::error::VerifyError;
use crate::fixtures;
use crate::schema_check::{SchemaChecker, SchemaReport};

/// Why a category failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Failure {
    BaselineMismatch,
    SchemaMismatch,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "failure", rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail(Failure),
}

/// Verification state of one category. Starts `Unverified`; both checks must
/// have run to reach `Checked`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    #[default]
    Unverified,
    Checked(Outcome),
}

impl Verdict {
    /// Terminal verdict from the results of both checks.
    #[must_use]
    pub const fn from_checks(baseline_ok: bool, schema_ok: bool) -> Self {
        Self::Checked(match (baseline_ok, schema_ok) {
            (true, true) => Outcome::Pass,
            (false, true) => Outcome::Fail(Failure::BaselineMismatch),
            (true, false) => Outcome::Fail(Failure::SchemaMismatch),
            (false, false) => Outcome::Fail(Failure::Both),
        })
    }

    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Checked(Outcome::Pass))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub category: ErrorCategory,
    pub verdict: Verdict,
    /// No approved baseline exists for this category.
    pub baseline_missing: bool,
    pub diffs: Vec<FieldDiff>,
    pub schema: SchemaReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub categories: Vec<CategoryReport>,
    /// Schema identity problems; empty when every id is known and stable.
    pub schema_identity: Vec<String>,
}

impl VerificationReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.schema_identity.is_empty() && self.categories.iter().all(|c| c.verdict.is_pass())
    }

    #[must_use]
    pub fn failed_categories(&self) -> usize {
        self.categories
            .iter()
            .filter(|c| !c.verdict.is_pass())
            .count()
    }
}

/// Checks converter output against approved baselines and generated schemas.
pub struct Verifier {
    store: BaselineStore,
    checker: SchemaChecker,
    include_debug: bool,
}

impl Verifier {
    /// # Errors
    /// Returns [`VerifyError`] if the schemas cannot be generated or compiled.
    pub fn new(store: BaselineStore) -> Result<Self, VerifyError> {
        Ok(Self {
            store,
            checker: SchemaChecker::new()?,
            include_debug: false,
        })
    }

    /// # Errors
    /// Returns [`VerifyError`] if the schemas cannot be generated or compiled.
    pub fn from_config(config: &VerifyConfig) -> Result<Self, VerifyError> {
        Ok(Self::new(BaselineStore::new(&config.baseline_dir))?.with_debug(config.include_debug))
    }

    /// Render problems with [`Problem::from_error_debug`] and check them
    /// against the debug-mode baselines.
    #[must_use]
    pub fn with_debug(mut self, include_debug: bool) -> Self {
        self.include_debug = include_debug;
        self.store = self.store.with_debug(include_debug);
        self
    }

    #[must_use]
    pub fn store(&self) -> &BaselineStore {
        &self.store
    }

    /// Converter output for `err` as a JSON value.
    ///
    /// # Errors
    /// Returns [`VerifyError::Serialize`] if the problem cannot be serialized.
    pub fn render(&self, err: CanonicalError) -> Result<Value, VerifyError> {
        let category = err.category();
        let problem = if self.include_debug {
            Problem::from_error_debug(err)
        } else {
            Problem::from_error(err)
        };
        serde_json::to_value(&problem).map_err(|source| VerifyError::Serialize { category, source })
    }

    /// Verifies `emitted` as the output for `category`.
    ///
    /// # Errors
    /// Returns [`VerifyError::Baseline`] if the baseline cannot be read.
    pub fn check_problem(
        &self,
        category: ErrorCategory,
        emitted: &Value,
    ) -> Result<CategoryReport, VerifyError> {
        let mut report = CategoryReport {
            category,
            verdict: Verdict::Unverified,
            baseline_missing: false,
            diffs: Vec::new(),
            schema: SchemaReport::default(),
        };

        match self.store.load_problem(category)? {
            Some(baseline) => report.diffs = diff(&baseline, emitted),
            None => report.baseline_missing = true,
        }
        report.schema = self.checker.check(category, emitted);

        let baseline_ok = !report.baseline_missing && report.diffs.is_empty();
        report.verdict = Verdict::from_checks(baseline_ok, report.schema.is_clean());

        if report.verdict.is_pass() {
            tracing::debug!(category = %category, "category verified");
        } else {
            tracing::warn!(
                category = %category,
                baseline_missing = report.baseline_missing,
                diffs = report.diffs.len(),
                schema_violations = report.schema.violations.len(),
                field_drift = report.schema.drift.len(),
                "category failed verification"
            );
        }
        Ok(report)
    }

    /// Verifies the representative error of `category`.
    ///
    /// # Errors
    /// Returns [`VerifyError`] if rendering or reading the baseline fails.
    pub fn verify_category(&self, category: ErrorCategory) -> Result<CategoryReport, VerifyError> {
        let emitted = self.render(fixtures::representative(category))?;
        self.check_problem(category, &emitted)
    }

    /// Verifies every category plus schema identity. Never writes baselines.
    ///
    /// # Errors
    /// Returns [`VerifyError`] for I/O or generation failures; a failed check
    /// is reported in the returned report, not as an error.
    pub fn verify(&self) -> Result<VerificationReport, VerifyError> {
        tracing::info!(root = %self.store.root().display(), "verifying canonical errors");
        let categories = ErrorCategory::ALL
            .into_iter()
            .map(|category| self.verify_category(category))
            .collect::<Result<Vec<_>, _>>()?;
        let report = VerificationReport {
            categories,
            schema_identity: check_schema_identity()?,
        };
        tracing::info!(
            passed = report.passed(),
            failed = report.failed_categories(),
            "verification finished"
        );
        Ok(report)
    }

    /// Writes current converter output as the approved baselines.
    ///
    /// # Errors
    /// Returns [`VerifyError`] if rendering or writing a baseline fails.
    pub fn approve(&self) -> Result<Vec<PathBuf>, VerifyError> {
        ErrorCategory::ALL
            .into_iter()
            .map(|category| {
                let emitted = self.render(fixtures::representative(category))?;
                Ok(self.store.write_problem(category, &emitted)?)
            })
            .collect()
    }
}

/// Checks that every category's context schema id is a known identifier, that
/// envelope ids stay out of the context id space and that regeneration is
/// byte-identical. Returns the problems found.
///
/// # Errors
/// Returns [`VerifyError::Schema`] if a schema cannot be generated.
pub fn check_schema_identity() -> Result<Vec<String>, VerifyError> {
    let mut issues = Vec::new();
    for category in ErrorCategory::ALL {
        let id = category.context_schema_id();
        if !CONTEXT_SCHEMA_IDS.contains(&id) {
            issues.push(format!("{category}: schema id '{id}' is not registered"));
        }
        let first = category.context_schema()?;
        let second = category.context_schema()?;
        if first.id() != id {
            issues.push(format!(
                "{category}: generated schema id '{}' differs from declared '{id}'",
                first.id()
            ));
        }
        if first != second {
            issues.push(format!("{category}: schema regeneration is not deterministic"));
        }
    }
    for reserved in [PROBLEM_SCHEMA_ID, CANONICAL_ERROR_SCHEMA_ID] {
        if CONTEXT_SCHEMA_IDS.contains(&reserved) {
            issues.push(format!("schema id '{reserved}' collides with a context id"));
        }
    }
    let union = schema::canonical_error_schema()?;
    if union != schema::canonical_error_schema()? {
        issues.push("canonical error schema regeneration is not deterministic".to_owned());
    }
    Ok(issues)
}

/// Writes `<schema id>.json` per context type, `problem.json` and
/// `canonical_error.json` into `dir`.
///
/// # Errors
/// Returns [`VerifyError::Io`] if a file cannot be written.
pub fn export_schemas(dir: &Path) -> Result<Vec<PathBuf>, VerifyError> {
    fs::create_dir_all(dir).map_err(|source| VerifyError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut docs: Vec<(String, Value)> = schema::context_schemas()?
        .iter()
        .map(|doc| (doc.file_name(), doc.to_document()))
        .collect();
    docs.push(("problem.json".to_owned(), schema::problem_schema()?.to_document()));
    docs.push((
        "canonical_error.json".to_owned(),
        schema::canonical_error_schema()?.to_document(),
    ));

    docs.into_iter()
        .map(|(name, doc)| {
            let path = dir.join(name);
            let content = to_canonical_json(&doc).map_err(|source| VerifyError::Io {
                path: path.clone(),
                source: source.into(),
            })?;
            fs::write(&path, content).map_err(|source| VerifyError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "schema exported");
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verdict_transitions() {
        assert_eq!(Verdict::default(), Verdict::Unverified);
        assert!(!Verdict::Unverified.is_pass());
        assert!(Verdict::from_checks(true, true).is_pass());
        assert_eq!(
            Verdict::from_checks(false, true),
            Verdict::Checked(Outcome::Fail(Failure::BaselineMismatch))
        );
        assert_eq!(
            Verdict::from_checks(true, false),
            Verdict::Checked(Outcome::Fail(Failure::SchemaMismatch))
        );
        assert_eq!(
            Verdict::from_checks(false, false),
            Verdict::Checked(Outcome::Fail(Failure::Both))
        );
    }

    #[test]
    fn verdict_serialization() {
        assert_eq!(
            serde_json::to_value(Verdict::from_checks(false, false)).unwrap(),
            serde_json::json!({
                "state": "checked",
                "outcome": {"result": "fail", "failure": "both"},
            })
        );
        assert_eq!(
            serde_json::to_value(Verdict::from_checks(true, true)).unwrap(),
            serde_json::json!({"state": "checked", "outcome": {"result": "pass"}})
        );
    }

    #[test]
    fn schema_identity_is_clean() {
        assert!(check_schema_identity().unwrap().is_empty());
    }

    #[test]
    fn missing_baseline_fails_only_baseline_check() {
        let dir = tempfile::tempdir().unwrap();
        let verifier = Verifier::new(BaselineStore::new(dir.path())).unwrap();
        let report = verifier.verify_category(ErrorCategory::NotFound).unwrap();
        assert!(report.baseline_missing);
        assert_eq!(
            report.verdict,
            Verdict::Checked(Outcome::Fail(Failure::BaselineMismatch))
        );
        assert!(report.schema.is_clean());
    }

    #[test]
    fn debug_mode_renders_debug_member() {
        let dir = tempfile::tempdir().unwrap();
        let verifier = Verifier::new(BaselineStore::new(dir.path()))
            .unwrap()
            .with_debug(true);
        let doc = verifier
            .render(fixtures::representative(ErrorCategory::Internal))
            .unwrap();
        assert_eq!(doc["debug"]["detail"], "pool size 16, all connections busy");
    }

    #[test]
    fn debug_approval_leaves_production_baselines_alone() {
        let dir = tempfile::tempdir().unwrap();
        let debug = Verifier::new(BaselineStore::new(dir.path()))
            .unwrap()
            .with_debug(true);
        let written = debug.approve().unwrap();
        assert!(written.iter().all(|p| p.starts_with(dir.path().join("problems-debug"))));
        assert!(!dir.path().join("problems").exists());
        assert!(debug.verify().unwrap().passed());

        let production = Verifier::new(BaselineStore::new(dir.path())).unwrap();
        let report = production.verify_category(ErrorCategory::Internal).unwrap();
        assert!(report.baseline_missing);
    }
}
