//! Context value objects carried by canonical errors.
//!
//! Each type is immutable once built and serializes with camelCase field
//! names. Unknown fields are rejected on the way in, which also makes the
//! generated schemas declare `additionalProperties: false`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::ContextSchema;

/// A single field validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldViolation {
    /// Path of the offending field, e.g. `user.email`.
    field: String,
    description: String,
    /// Machine-readable reason code, e.g. `REQUIRED`.
    reason: String,
}

impl FieldViolation {
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        description: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl ContextSchema for FieldViolation {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.field_violation.v1~";
}

/// Validation failure context for `InvalidArgument` and `OutOfRange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged, deny_unknown_fields)]
pub enum Validation {
    FieldViolations {
        #[serde(rename = "fieldViolations")]
        field_violations: Vec<FieldViolation>,
    },
    Format { format: String },
    Constraint { constraint: String },
}

impl Validation {
    #[must_use]
    pub fn fields(violations: impl Into<Vec<FieldViolation>>) -> Self {
        Self::FieldViolations {
            field_violations: violations.into(),
        }
    }

    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            format: message.into(),
        }
    }

    #[must_use]
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            constraint: message.into(),
        }
    }
}

impl ContextSchema for Validation {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.validation.v1~";
}

/// Identifies the resource a resource-scoped error is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceInfo {
    resource_type: String,
    resource_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl ResourceInfo {
    #[must_use]
    pub fn new(resource_type: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_name: resource_name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl ContextSchema for ResourceInfo {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.resource_info.v1~";
}

/// Reason, domain and free-form metadata for policy-style errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ErrorInfo {
    reason: String,
    domain: String,
    metadata: BTreeMap<String, String>,
}

impl ErrorInfo {
    #[must_use]
    pub fn new(reason: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            domain: domain.into(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

impl ContextSchema for ErrorInfo {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.error_info.v1~";
}

/// A single quota violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuotaViolation {
    subject: String,
    description: String,
}

impl QuotaViolation {
    #[must_use]
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
        }
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl ContextSchema for QuotaViolation {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.quota_violation.v1~";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuotaFailure {
    violations: Vec<QuotaViolation>,
}

impl QuotaFailure {
    #[must_use]
    pub fn new(violations: impl Into<Vec<QuotaViolation>>) -> Self {
        Self {
            violations: violations.into(),
        }
    }

    #[must_use]
    pub fn violations(&self) -> &[QuotaViolation] {
        &self.violations
    }
}

impl ContextSchema for QuotaFailure {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.quota_failure.v1~";
}

/// A single unmet precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreconditionViolation {
    #[serde(rename = "type")]
    precondition_type: String,
    subject: String,
    description: String,
}

impl PreconditionViolation {
    #[must_use]
    pub fn new(
        precondition_type: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            precondition_type: precondition_type.into(),
            subject: subject.into(),
            description: description.into(),
        }
    }

    #[must_use]
    pub fn precondition_type(&self) -> &str {
        &self.precondition_type
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl ContextSchema for PreconditionViolation {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.precondition_violation.v1~";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreconditionFailure {
    violations: Vec<PreconditionViolation>,
}

impl PreconditionFailure {
    #[must_use]
    pub fn new(violations: impl Into<Vec<PreconditionViolation>>) -> Self {
        Self {
            violations: violations.into(),
        }
    }

    #[must_use]
    pub fn violations(&self) -> &[PreconditionViolation] {
        &self.violations
    }
}

impl ContextSchema for PreconditionFailure {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.precondition_failure.v1~";
}

/// Diagnostic detail. Also attached to any error via `with_debug_info`, in
/// which case it only reaches the wire in debug mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DebugInfo {
    detail: String,
    stack_entries: Vec<String>,
}

impl DebugInfo {
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            stack_entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_stack(mut self, entries: impl Into<Vec<String>>) -> Self {
        self.stack_entries = entries.into();
        self
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub fn stack_entries(&self) -> &[String] {
        &self.stack_entries
    }
}

impl ContextSchema for DebugInfo {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.debug_info.v1~";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetryInfo {
    retry_after_seconds: u64,
}

impl RetryInfo {
    #[must_use]
    pub fn after_seconds(seconds: u64) -> Self {
        Self {
            retry_after_seconds: seconds,
        }
    }

    #[must_use]
    pub fn retry_after_seconds(&self) -> u64 {
        self.retry_after_seconds
    }
}

impl ContextSchema for RetryInfo {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.retry_info.v1~";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestInfo {
    request_id: String,
}

impl RequestInfo {
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl ContextSchema for RequestInfo {
    const SCHEMA_ID: &'static str = "gts.cf.core.errors.request_info.v1~";
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_info_omits_absent_description() {
        let info = ResourceInfo::new("User", "42");
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({"resourceType": "User", "resourceName": "42"})
        );

        let info = info.with_description("archived");
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({"resourceType": "User", "resourceName": "42", "description": "archived"})
        );
    }

    #[test]
    fn validation_variants_serialize_untagged() {
        let fields = Validation::fields(vec![FieldViolation::new(
            "email",
            "is required",
            "REQUIRED",
        )]);
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({"fieldViolations": [
                {"field": "email", "description": "is required", "reason": "REQUIRED"}
            ]})
        );
        assert_eq!(
            serde_json::to_value(Validation::format("bad date")).unwrap(),
            json!({"format": "bad date"})
        );
        assert_eq!(
            serde_json::to_value(Validation::constraint("age >= 18")).unwrap(),
            json!({"constraint": "age >= 18"})
        );
    }

    #[test]
    fn validation_deserializes_each_shape() {
        let v: Validation = serde_json::from_value(json!({"constraint": "x"})).unwrap();
        assert_eq!(v, Validation::constraint("x"));
        let v: Validation = serde_json::from_value(json!({"format": "y"})).unwrap();
        assert_eq!(v, Validation::format("y"));
    }

    #[test]
    fn precondition_violation_uses_type_key() {
        let v = PreconditionViolation::new("TOS", "user:42", "terms not accepted");
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!({"type": "TOS", "subject": "user:42", "description": "terms not accepted"})
        );
    }

    #[test]
    fn error_info_metadata_is_ordered() {
        let info = ErrorInfo::new("QUOTA", "billing")
            .with_metadata("zone", "eu")
            .with_metadata("account", "7");
        let rendered = serde_json::to_string(&info).unwrap();
        assert_eq!(
            rendered,
            r#"{"reason":"QUOTA","domain":"billing","metadata":{"account":"7","zone":"eu"}}"#
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_value::<RequestInfo>(json!({"requestId": "r", "extra": 1}));
        assert!(err.is_err());
        let err = serde_json::from_value::<ResourceInfo>(json!({"resourceType": "User"}));
        assert!(err.is_err(), "resourceName is required");
    }

    #[test]
    fn retry_info_round_trips() {
        let info: RetryInfo = serde_json::from_value(json!({"retryAfterSeconds": 30})).unwrap();
        assert_eq!(info.retry_after_seconds(), 30);
    }
}
