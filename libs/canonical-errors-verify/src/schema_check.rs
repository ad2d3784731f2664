//! Cross-validation of converter output against the generated schemas.
//!
//! Two independent checks run per document: JSON Schema validation (via
//! `jsonschema`) and a declared-vs-emitted field comparison that names
//! exactly which field drifted.

use std::collections::{BTreeMap, BTreeSet};

use canonical_errors::schema::{self, ContextSchema, SchemaDocument};
use canonical_errors::{DebugInfo, ErrorCategory};
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;

use crate::error::VerifyError;

/// Part of a problem document a finding refers to.
pub const SCOPE_PROBLEM: &str = "problem";
pub const SCOPE_EXTENSIONS: &str = "extensions";
pub const SCOPE_DEBUG: &str = "debug";
/// Category binding of `type`, `status` and `extensions`.
pub const SCOPE_BINDING: &str = "binding";

/// A validator message for one part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    pub scope: &'static str,
    pub schema_id: &'static str,
    pub message: String,
}

/// A field present on one side of the schema/output pair only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDrift {
    /// Emitted by the converter but not declared by the schema.
    Undeclared { scope: &'static str, field: String },
    /// Required by the schema but not emitted.
    NotEmitted { scope: &'static str, field: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub violations: Vec<SchemaViolation>,
    pub drift: Vec<FieldDrift>,
}

impl SchemaReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.drift.is_empty()
    }
}

struct CompiledSchema {
    doc: SchemaDocument,
    validator: Validator,
}

impl CompiledSchema {
    fn compile(doc: SchemaDocument) -> Result<Self, VerifyError> {
        let validator =
            jsonschema::validator_for(doc.body()).map_err(|e| VerifyError::InvalidSchema {
                id: doc.id(),
                message: e.to_string(),
            })?;
        Ok(Self { doc, validator })
    }

    fn validate(&self, scope: &'static str, instance: &Value, report: &mut SchemaReport) {
        report.violations.extend(self.validator.iter_errors(instance).map(|e| {
            SchemaViolation {
                scope,
                schema_id: self.doc.id(),
                message: e.to_string(),
            }
        }));
    }

    fn check(&self, scope: &'static str, instance: &Value, report: &mut SchemaReport) {
        self.validate(scope, instance, report);
        report.drift.extend(field_drift(scope, self.doc.body(), instance));
    }
}

/// Compiled problem, binding and context schemas, reused across categories.
pub struct SchemaChecker {
    problem: CompiledSchema,
    binding: CompiledSchema,
    contexts: BTreeMap<&'static str, CompiledSchema>,
}

impl SchemaChecker {
    /// Generates and compiles every schema.
    ///
    /// # Errors
    /// Returns [`VerifyError::Schema`] if generation fails and
    /// [`VerifyError::InvalidSchema`] if the validator rejects a schema.
    pub fn new() -> Result<Self, VerifyError> {
        let problem = CompiledSchema::compile(schema::problem_schema()?)?;
        let binding = CompiledSchema::compile(schema::canonical_error_schema()?)?;
        let contexts = schema::context_schemas()?
            .into_iter()
            .map(|doc| Ok((doc.id(), CompiledSchema::compile(doc)?)))
            .collect::<Result<_, VerifyError>>()?;
        Ok(Self {
            problem,
            binding,
            contexts,
        })
    }

    /// Checks a problem document emitted for `category`.
    ///
    /// The envelope is checked against the `Problem` schema and the binding
    /// schema, `extensions` against the category's context schema and
    /// `debug`, when present, against the `DebugInfo` schema.
    #[must_use]
    pub fn check(&self, category: ErrorCategory, problem: &Value) -> SchemaReport {
        let mut report = SchemaReport::default();
        self.problem.check(SCOPE_PROBLEM, problem, &mut report);
        self.binding.validate(SCOPE_BINDING, problem, &mut report);

        let extensions = problem.get("extensions").unwrap_or(&Value::Null);
        match self.contexts.get(category.context_schema_id()) {
            Some(context) => context.check(SCOPE_EXTENSIONS, extensions, &mut report),
            None => report.violations.push(SchemaViolation {
                scope: SCOPE_EXTENSIONS,
                schema_id: category.context_schema_id(),
                message: "no generated schema for this identifier".to_owned(),
            }),
        }

        if let Some(debug) = problem.get("debug")
            && let Some(schema) = self.contexts.get(DebugInfo::SCHEMA_ID)
        {
            schema.check(SCOPE_DEBUG, debug, &mut report);
        }
        report
    }
}

/// Property names and required names of one object shape.
struct FieldSet<'a> {
    properties: BTreeSet<&'a str>,
    required: BTreeSet<&'a str>,
}

/// Object shapes a schema accepts: its own properties, or one per
/// `anyOf`/`oneOf` branch.
fn field_sets<'a>(root: &'a Value, schema: &'a Value) -> Vec<FieldSet<'a>> {
    let schema = resolve_ref(root, schema);
    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        return vec![FieldSet {
            properties: props.keys().map(String::as_str).collect(),
            required,
        }];
    }
    ["anyOf", "oneOf"]
        .into_iter()
        .filter_map(|key| schema.get(key).and_then(Value::as_array))
        .flatten()
        .flat_map(|branch| field_sets(root, branch))
        .collect()
}

/// Follows a local `#/definitions/...` reference.
fn resolve_ref<'a>(root: &'a Value, schema: &'a Value) -> &'a Value {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer))
        .unwrap_or(schema)
}

/// Compares the fields of `instance` with those `schema` declares.
///
/// For composite schemas the closest branch is used, so a drift report names
/// the fields that differ from the shape the output was meant to have.
#[must_use]
pub fn field_drift(scope: &'static str, schema: &Value, instance: &Value) -> Vec<FieldDrift> {
    let Some(object) = instance.as_object() else {
        return Vec::new();
    };
    let emitted: BTreeSet<&str> = object.keys().map(String::as_str).collect();

    field_sets(schema, schema)
        .into_iter()
        .map(|set| {
            let undeclared = emitted.difference(&set.properties).map(|f| FieldDrift::Undeclared {
                scope,
                field: (*f).to_owned(),
            });
            let not_emitted = set.required.difference(&emitted).map(|f| FieldDrift::NotEmitted {
                scope,
                field: (*f).to_owned(),
            });
            undeclared.chain(not_emitted).collect::<Vec<_>>()
        })
        .min_by_key(Vec::len)
        .unwrap_or_default()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn not_found_doc() -> Value {
        json!({
            "type": "gts.cf.core.errors.err.v1~cf.core.errors.not_found.v1~",
            "title": "Resource not found",
            "status": 404,
            "extensions": {"resourceType": "User", "resourceName": "42"}
        })
    }

    #[test]
    fn converter_output_validates() {
        let checker = SchemaChecker::new().unwrap();
        let report = checker.check(ErrorCategory::NotFound, &not_found_doc());
        assert!(report.is_clean(), "{} violations", report.violations.len());
    }

    #[test]
    fn new_context_field_is_drift() {
        let checker = SchemaChecker::new().unwrap();
        let mut doc = not_found_doc();
        doc["extensions"]["owner"] = json!("alice");

        let report = checker.check(ErrorCategory::NotFound, &doc);
        assert!(!report.violations.is_empty());
        assert!(report.violations.iter().all(|v| v.scope == SCOPE_EXTENSIONS));
        assert_eq!(
            report.drift,
            vec![FieldDrift::Undeclared {
                scope: SCOPE_EXTENSIONS,
                field: "owner".to_owned(),
            }]
        );
    }

    #[test]
    fn dropped_required_field_is_drift() {
        let checker = SchemaChecker::new().unwrap();
        let mut doc = not_found_doc();
        doc["extensions"].as_object_mut().unwrap().remove("resourceName");

        let report = checker.check(ErrorCategory::NotFound, &doc);
        assert!(!report.violations.is_empty());
        assert!(report.drift.contains(&FieldDrift::NotEmitted {
            scope: SCOPE_EXTENSIONS,
            field: "resourceName".to_owned(),
        }));
    }

    #[test]
    fn binding_rejects_status_of_another_category() {
        let checker = SchemaChecker::new().unwrap();
        let mut doc = not_found_doc();
        doc["status"] = json!(500);
        let report = checker.check(ErrorCategory::NotFound, &doc);
        assert!(report.violations.iter().any(|v| v.scope == SCOPE_BINDING));
        assert!(report.drift.is_empty());
    }

    #[test]
    fn binding_rejects_context_of_another_category() {
        let checker = SchemaChecker::new().unwrap();
        let mut doc = not_found_doc();
        doc["status"] = json!(500);
        doc["extensions"] = json!({"retryAfterSeconds": 5});

        let binding = CompiledSchema::compile(schema::canonical_error_schema().unwrap()).unwrap();
        assert!(!binding.validator.is_valid(&doc));
        assert!(binding.validator.is_valid(&not_found_doc()));
    }

    #[test]
    fn binding_accepts_every_category_output() {
        let checker = SchemaChecker::new().unwrap();
        for category in ErrorCategory::ALL {
            let err = crate::fixtures::representative(category);
            let doc = serde_json::to_value(canonical_errors::Problem::from(err)).unwrap();
            let report = checker.check(category, &doc);
            assert!(report.is_clean(), "{category}: {} violations", report.violations.len());
        }
    }

    #[test]
    fn context_of_wrong_category_fails() {
        let checker = SchemaChecker::new().unwrap();
        let report = checker.check(ErrorCategory::ServiceUnavailable, &not_found_doc());
        assert!(!report.is_clean());
    }

    #[test]
    fn envelope_field_drift() {
        let checker = SchemaChecker::new().unwrap();
        let mut doc = not_found_doc();
        doc["severity"] = json!("high");
        let report = checker.check(ErrorCategory::NotFound, &doc);
        assert!(report.drift.contains(&FieldDrift::Undeclared {
            scope: SCOPE_PROBLEM,
            field: "severity".to_owned(),
        }));
    }

    #[test]
    fn composite_schema_uses_closest_branch() {
        let schema = json!({
            "anyOf": [
                {"type": "object", "properties": {"format": {}}, "required": ["format"]},
                {"type": "object", "properties": {"constraint": {}}, "required": ["constraint"]}
            ]
        });
        assert!(field_drift("x", &schema, &json!({"format": "bad"})).is_empty());
        assert_eq!(
            field_drift("x", &schema, &json!({"format": "bad", "hint": "y"})),
            vec![FieldDrift::Undeclared {
                scope: "x",
                field: "hint".to_owned(),
            }]
        );
    }

    #[test]
    fn debug_member_is_checked() {
        let checker = SchemaChecker::new().unwrap();
        let mut doc = not_found_doc();
        doc["debug"] = json!({"detail": "x"});
        let report = checker.check(ErrorCategory::NotFound, &doc);
        assert!(report.drift.contains(&FieldDrift::NotEmitted {
            scope: SCOPE_DEBUG,
            field: "stackEntries".to_owned(),
        }));
    }
}
