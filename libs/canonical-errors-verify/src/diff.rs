//! Field-level structural diff between two JSON documents.

use serde::Serialize;
use serde_json::Value;

/// One difference, located by JSON pointer (RFC 6901); the root is `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDiff {
    /// Present on both sides with different values.
    Changed {
        path: String,
        expected: Value,
        actual: Value,
    },
    /// In the baseline, not emitted.
    Missing { path: String, expected: Value },
    /// Emitted, not in the baseline.
    Unexpected { path: String, actual: Value },
}

impl FieldDiff {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Changed { path, .. }
            | Self::Missing { path, .. }
            | Self::Unexpected { path, .. } => path,
        }
    }
}

/// Diffs `actual` against `expected`. Empty when structurally equal.
#[must_use]
pub fn diff(expected: &Value, actual: &Value) -> Vec<FieldDiff> {
    let mut out = Vec::new();
    diff_at(&mut String::new(), expected, actual, &mut out);
    out
}

fn diff_at(path: &mut String, expected: &Value, actual: &Value, out: &mut Vec<FieldDiff>) {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            for (key, exp_value) in exp {
                let len = path.len();
                push_token(path, key);
                match act.get(key) {
                    Some(act_value) => diff_at(path, exp_value, act_value, out),
                    None => out.push(FieldDiff::Missing {
                        path: path.clone(),
                        expected: exp_value.clone(),
                    }),
                }
                path.truncate(len);
            }
            for (key, act_value) in act {
                if !exp.contains_key(key) {
                    let len = path.len();
                    push_token(path, key);
                    out.push(FieldDiff::Unexpected {
                        path: path.clone(),
                        actual: act_value.clone(),
                    });
                    path.truncate(len);
                }
            }
        }
        (Value::Array(exp), Value::Array(act)) => {
            for idx in 0..exp.len().max(act.len()) {
                let len = path.len();
                push_token(path, &idx.to_string());
                match (exp.get(idx), act.get(idx)) {
                    (Some(e), Some(a)) => diff_at(path, e, a, out),
                    (Some(e), None) => out.push(FieldDiff::Missing {
                        path: path.clone(),
                        expected: e.clone(),
                    }),
                    (None, Some(a)) => out.push(FieldDiff::Unexpected {
                        path: path.clone(),
                        actual: a.clone(),
                    }),
                    (None, None) => {}
                }
                path.truncate(len);
            }
        }
        _ if expected == actual => {}
        _ => out.push(FieldDiff::Changed {
            path: path.clone(),
            expected: expected.clone(),
            actual: actual.clone(),
        }),
    }
}

fn push_token(path: &mut String, token: &str) {
    path.push('/');
    for c in token.chars() {
        match c {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            c => path.push(c),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_documents_have_no_diff() {
        let doc = json!({"a": [1, {"b": "c"}], "d": null});
        assert!(diff(&doc, &doc.clone()).is_empty());
    }

    #[test]
    fn changed_missing_and_unexpected_fields() {
        let expected = json!({
            "status": 404,
            "title": "Resource not found",
            "extensions": {"resourceName": "42"},
        });
        let actual = json!({"status": 410, "extensions": {"resourceName": "42", "extra": true}});
        let diffs = diff(&expected, &actual);

        assert!(diffs.contains(&FieldDiff::Changed {
            path: "/status".to_owned(),
            expected: json!(404),
            actual: json!(410),
        }));
        assert!(diffs.contains(&FieldDiff::Missing {
            path: "/title".to_owned(),
            expected: json!("Resource not found"),
        }));
        assert!(diffs.contains(&FieldDiff::Unexpected {
            path: "/extensions/extra".to_owned(),
            actual: json!(true),
        }));
        assert_eq!(diffs.len(), 3);
    }

    #[test]
    fn array_length_differences() {
        let diffs = diff(&json!({"v": [1, 2]}), &json!({"v": [1, 2, 3]}));
        assert_eq!(
            diffs,
            vec![FieldDiff::Unexpected {
                path: "/v/2".to_owned(),
                actual: json!(3),
            }]
        );
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        let diffs = diff(&json!({"a/b~c": 1}), &json!({"a/b~c": 2}));
        assert_eq!(diffs[0].path(), "/a~1b~0c");
    }

    #[test]
    fn root_type_change_uses_empty_pointer() {
        let diffs = diff(&json!({}), &json!([]));
        assert_eq!(diffs[0].path(), "");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let d = FieldDiff::Missing {
            path: "/title".to_owned(),
            expected: json!("x"),
        };
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            json!({"kind": "missing", "path": "/title", "expected": "x"})
        );
    }
}
