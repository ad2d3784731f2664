//! Committed baseline artifacts.
//!
//! Layout: `<root>/problems/<category wire name>.json` for production output
//! and `<root>/problems-debug/` for debug-mode output, pretty-printed with
//! sorted keys and a trailing newline, so diffs in review stay minimal.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use canonical_errors::ErrorCategory;
use serde_json::{Map, Value};

use crate::error::BaselineError;

const PROBLEMS_DIR: &str = "problems";
const DEBUG_PROBLEMS_DIR: &str = "problems-debug";

/// Baseline directory on disk. Read during verification, written only by
/// approval.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    root: PathBuf,
    problems_dir: &'static str,
}

impl BaselineStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            problems_dir: PROBLEMS_DIR,
        }
    }

    /// Selects the debug-mode baselines, kept apart from production ones.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.problems_dir = if debug { DEBUG_PROBLEMS_DIR } else { PROBLEMS_DIR };
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the problem baseline for `category`.
    #[must_use]
    pub fn problem_path(&self, category: ErrorCategory) -> PathBuf {
        self.root
            .join(self.problems_dir)
            .join(format!("{}.json", category.name()))
    }

    /// Loads the approved problem for `category`, `None` if never approved.
    ///
    /// # Errors
    /// Returns [`BaselineError::Io`] if the file exists but cannot be read and
    /// [`BaselineError::Malformed`] if it is not valid JSON.
    pub fn load_problem(&self, category: ErrorCategory) -> Result<Option<Value>, BaselineError> {
        let path = self.problem_path(category);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "baseline not found");
                return Ok(None);
            }
            Err(source) => return Err(BaselineError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| BaselineError::Malformed { path, source })
    }

    /// Writes `problem` as the approved baseline for `category`.
    ///
    /// # Errors
    /// Returns [`BaselineError::Io`] if the directory or file cannot be written.
    pub fn write_problem(
        &self,
        category: ErrorCategory,
        problem: &Value,
    ) -> Result<PathBuf, BaselineError> {
        let path = self.problem_path(category);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| BaselineError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = to_canonical_json(problem)
            .map_err(|source| BaselineError::Malformed {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, content).map_err(|source| BaselineError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(category = %category, path = %path.display(), "baseline written");
        Ok(path)
    }
}

/// Pretty JSON with object keys sorted at every level, plus trailing newline.
///
/// # Errors
/// Propagates the serializer error.
pub fn to_canonical_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(&sort_keys(value))?;
    out.push('\n');
    Ok(out)
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_baseline_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());
        assert!(store.load_problem(ErrorCategory::NotFound).unwrap().is_none());
    }

    #[test]
    fn write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());
        let problem = json!({"status": 404, "extensions": {"resourceName": "42"}});

        let path = store.write_problem(ErrorCategory::NotFound, &problem).unwrap();
        assert_eq!(path, dir.path().join("problems").join("not_found.json"));
        assert_eq!(
            store.load_problem(ErrorCategory::NotFound).unwrap(),
            Some(problem)
        );
    }

    #[test]
    fn debug_baselines_live_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());
        let debug = store.clone().with_debug(true);
        assert_eq!(
            debug.problem_path(ErrorCategory::Internal),
            dir.path().join("problems-debug").join("internal.json")
        );

        debug
            .write_problem(ErrorCategory::Internal, &json!({"debug": {}}))
            .unwrap();
        assert!(store.load_problem(ErrorCategory::Internal).unwrap().is_none());
        assert_eq!(
            debug.with_debug(false).problem_path(ErrorCategory::Internal),
            store.problem_path(ErrorCategory::Internal)
        );
    }

    #[test]
    fn canonical_json_sorts_keys_and_ends_with_newline() {
        let value = json!({"b": 1, "a": {"d": [ {"z": 1, "y": 2} ], "c": null}});
        assert_eq!(
            to_canonical_json(&value).unwrap(),
            concat!(
                "{\n  \"a\": {\n    \"c\": null,\n    \"d\": [\n",
                "      {\n        \"y\": 2,\n        \"z\": 1\n      }\n",
                "    ]\n  },\n  \"b\": 1\n}\n",
            )
        );
    }

    #[test]
    fn malformed_baseline_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());
        let path = store.problem_path(ErrorCategory::Aborted);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        match store.load_problem(ErrorCategory::Aborted) {
            Err(BaselineError::Malformed { path: reported, .. }) => assert_eq!(reported, path),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("malformed baseline was accepted"),
        }
    }
}
