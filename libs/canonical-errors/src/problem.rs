//! RFC 9457 Problem Details: the wire form of a [`CanonicalError`].

use http::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::catalog::{TYPE_URL_PREFIX, TYPE_URL_SUFFIX};
use crate::category::ErrorCategory;
use crate::context::DebugInfo;
use crate::error::{CanonicalError, CategoryContext};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Custom serializer for `StatusCode` to u16
#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

/// Custom deserializer for `StatusCode` from u16
fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// The `extensions` member of a [`Problem`].
///
/// Converter output holds the typed context, which serializes in the field
/// order of its Rust definition whatever `serde_json` features are enabled.
/// A problem parsed from the wire holds the raw object until it is converted
/// back with `TryFrom<Problem>`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemExtensions {
    Context(CategoryContext),
    Raw(Value),
}

impl ProblemExtensions {
    /// JSON value of the extensions object.
    ///
    /// # Errors
    /// Returns the serializer error of the typed context.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Context(ctx) => serde_json::to_value(ctx),
            Self::Raw(value) => Ok(value.clone()),
        }
    }

    fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Context(ctx) => serde_json::to_value(&ctx),
            Self::Raw(value) => Ok(value),
        }
    }
}

impl From<CategoryContext> for ProblemExtensions {
    fn from(ctx: CategoryContext) -> Self {
        Self::Context(ctx)
    }
}

impl From<Value> for ProblemExtensions {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl Serialize for ProblemExtensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Context(ctx) => ctx.serialize(serializer),
            Self::Raw(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ProblemExtensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::Raw)
    }
}

/// RFC 9457 Problem Details for a canonical error.
///
/// Field names and nesting are the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[cfg_attr(
    feature = "utoipa",
    schema(
        title = "Problem",
        description = "RFC 9457 Problem Details for a canonical error"
    )
)]
#[must_use]
pub struct Problem {
    /// Stable type URI of the error category.
    #[serde(rename = "type")]
    pub type_url: String,
    /// Category default message, or the override supplied at the raise site.
    pub title: String,
    /// HTTP status of the error category. Serializes as u16.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    #[schemars(with = "u16")]
    #[cfg_attr(feature = "utoipa", schema(value_type = u16))]
    pub status: StatusCode,
    /// Explanation specific to this occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// URI reference identifying this occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Type of the resource the error was raised for, if tagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Category-specific context.
    #[schemars(with = "Value")]
    #[cfg_attr(feature = "utoipa", schema(value_type = Object))]
    pub extensions: ProblemExtensions,
    /// Debug information, only present in debug mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "utoipa", schema(value_type = Option<Object>))]
    pub debug: Option<DebugInfo>,
}

impl Problem {
    /// Converts a [`CanonicalError`] into a `Problem` (production mode).
    /// Debug info is always omitted.
    pub fn from_error(err: CanonicalError) -> Self {
        Self::build(err, false)
    }

    /// Converts a [`CanonicalError`] into a `Problem` (debug mode).
    /// Attached debug info becomes the top-level `debug` member.
    pub fn from_error_debug(err: CanonicalError) -> Self {
        Self::build(err, true)
    }

    fn build(err: CanonicalError, include_debug: bool) -> Self {
        let def = err.category().def();
        let title = err.message().to_owned();
        let (context, parts) = err.into_parts();

        Self {
            type_url: def.type_url.to_owned(),
            title,
            status: def.status_code(),
            detail: parts.detail,
            instance: None,
            trace_id: None,
            resource_type: parts.resource_type,
            extensions: ProblemExtensions::Context(context),
            debug: parts.debug_info.filter(|_| include_debug),
        }
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = Some(uri.into());
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Category named by the `type` URI.
    ///
    /// # Errors
    /// Returns [`ProblemConversionError::InvalidType`] for a URI outside the
    /// canonical namespace and [`ProblemConversionError::UnknownCategory`] for
    /// a well-formed URI naming a category this build does not know.
    pub fn category(&self) -> Result<ErrorCategory, ProblemConversionError> {
        parse_category(&self.type_url)
    }
}

impl From<CanonicalError> for Problem {
    fn from(err: CanonicalError) -> Self {
        Problem::from_error(err)
    }
}

/// Error returned when a `Problem` cannot be converted back into a
/// [`CanonicalError`].
#[derive(Debug, thiserror::Error)]
pub enum ProblemConversionError {
    /// The `type` URI is outside the canonical error namespace.
    #[error("invalid problem type URI: {0}")]
    InvalidType(String),
    /// The category named by the `type` URI is not known to this build.
    #[error("unknown canonical error category: {0}")]
    UnknownCategory(String),
    #[error("status {actual} does not match category {category} (expected {expected})")]
    StatusMismatch {
        category: ErrorCategory,
        expected: u16,
        actual: u16,
    },
    #[error("failed to deserialize context for {category}: {source}")]
    ContextDeserialization {
        category: ErrorCategory,
        #[source]
        source: serde_json::Error,
    },
}

/// Extracts the category from `gts.cf.core.errors.err.v1~cf.core.errors.<name>.v1~`.
fn parse_category(type_url: &str) -> Result<ErrorCategory, ProblemConversionError> {
    let name = type_url
        .strip_prefix(TYPE_URL_PREFIX)
        .and_then(|rest| rest.strip_suffix(TYPE_URL_SUFFIX))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ProblemConversionError::InvalidType(type_url.to_owned()))?;
    ErrorCategory::from_name(name)
        .ok_or_else(|| ProblemConversionError::UnknownCategory(name.to_owned()))
}

impl TryFrom<Problem> for CanonicalError {
    type Error = ProblemConversionError;

    fn try_from(problem: Problem) -> Result<Self, Self::Error> {
        let category = problem.category()?;

        if problem.status.as_u16() != category.status() {
            return Err(ProblemConversionError::StatusMismatch {
                category,
                expected: category.status(),
                actual: problem.status.as_u16(),
            });
        }

        let context = match problem.extensions {
            ProblemExtensions::Context(ctx) if ctx.category() == category => ctx,
            other => other
                .into_value()
                .and_then(|value| CategoryContext::from_extensions(category, value))
                .map_err(|source| ProblemConversionError::ContextDeserialization {
                    category,
                    source,
                })?,
        };

        let mut err = CanonicalError::from(context).with_message(problem.title);
        if let Some(resource_type) = problem.resource_type {
            err = err.with_resource_type(resource_type);
        }
        if let Some(detail) = problem.detail {
            err = err.with_detail(detail);
        }
        if let Some(info) = problem.debug {
            err = err.with_debug_info(info);
        }
        Ok(err)
    }
}

/// Axum integration: make Problem directly usable as a response
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        use axum::http::HeaderValue;

        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::context::{
        ErrorInfo, FieldViolation, PreconditionFailure, PreconditionViolation, QuotaFailure,
        QuotaViolation, RequestInfo, ResourceInfo, RetryInfo, Validation,
    };
    use serde_json::json;

    fn not_found() -> CanonicalError {
        CanonicalError::not_found(ResourceInfo::new("User", "42"))
    }

    #[test]
    fn not_found_end_to_end() {
        let problem = Problem::from(not_found());
        assert_eq!(
            serde_json::to_value(&problem).unwrap(),
            json!({
                "type": "gts.cf.core.errors.err.v1~cf.core.errors.not_found.v1~",
                "title": "Resource not found",
                "status": 404,
                "extensions": {"resourceType": "User", "resourceName": "42"}
            })
        );
    }

    #[test]
    fn problem_serializes_status_as_u16() {
        let json = serde_json::to_string(&Problem::from(not_found())).unwrap();
        assert!(json.contains("\"status\":404"));
    }

    #[test]
    fn problem_json_field_order_is_stable() {
        let problem = Problem::from(not_found().with_detail("no user 42"))
            .with_instance("/users/42")
            .with_trace_id("t-1");
        assert_eq!(
            serde_json::to_string(&problem).unwrap(),
            concat!(
                r#"{"type":"gts.cf.core.errors.err.v1~cf.core.errors.not_found.v1~","#,
                r#""title":"Resource not found","status":404,"detail":"no user 42","#,
                r#""instance":"/users/42","traceId":"t-1","#,
                r#""extensions":{"resourceType":"User","resourceName":"42"}}"#
            )
        );
    }

    #[test]
    fn conversion_is_deterministic() {
        let a = serde_json::to_vec(&Problem::from(not_found())).unwrap();
        let b = serde_json::to_vec(&Problem::from(not_found())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn override_replaces_title() {
        let problem = Problem::from(not_found().with_message("User 42 is gone"));
        assert_eq!(problem.title, "User 42 is gone");
    }

    /// One error per category, each carrying every optional part.
    fn samples() -> Vec<CanonicalError> {
        vec![
            CanonicalError::cancelled(RequestInfo::new("req-1")),
            CanonicalError::unknown("upstream sent garbage"),
            CanonicalError::invalid_argument(Validation::fields(vec![FieldViolation::new(
                "email",
                "must contain @",
                "FORMAT",
            )])),
            CanonicalError::deadline_exceeded(RequestInfo::new("req-2")),
            CanonicalError::not_found(ResourceInfo::new("User", "42")),
            CanonicalError::already_exists(
                ResourceInfo::new("User", "alice").with_description("email taken"),
            ),
            CanonicalError::permission_denied(
                ErrorInfo::new("ROLE_MISSING", "auth").with_metadata("role", "admin"),
            ),
            CanonicalError::resource_exhausted(QuotaFailure::new(vec![QuotaViolation::new(
                "tenant:acme",
                "100 per minute",
            )])),
            CanonicalError::failed_precondition(PreconditionFailure::new(vec![
                PreconditionViolation::new("STATE", "order:1", "must be draft"),
            ])),
            CanonicalError::aborted(ErrorInfo::new("VERSION_CONFLICT", "storage")),
            CanonicalError::out_of_range(Validation::constraint("page <= 100")),
            CanonicalError::unimplemented(ErrorInfo::new("NOT_IMPLEMENTED", "api")),
            CanonicalError::internal(DebugInfo::new("pool exhausted")),
            CanonicalError::service_unavailable(RetryInfo::after_seconds(5)),
            CanonicalError::data_loss(ResourceInfo::new("Document", "doc-7")),
            CanonicalError::unauthenticated(ErrorInfo::new("TOKEN_EXPIRED", "auth")),
        ]
        .into_iter()
        .map(|err| {
            err.with_resource_type("gts.cf.core.users.user.v1")
                .with_detail("occurrence detail")
                .with_debug_info(DebugInfo::new("trace").with_stack(vec!["a.rs:1".to_owned()]))
        })
        .collect()
    }

    #[test]
    fn every_category_uses_catalog_constants() {
        let samples = samples();
        assert_eq!(samples.len(), ErrorCategory::ALL.len());
        for (err, category) in samples.into_iter().zip(ErrorCategory::ALL) {
            assert_eq!(err.category(), category);
            let problem = Problem::from(err);
            assert_eq!(problem.type_url, category.type_url());
            assert_eq!(problem.status.as_u16(), category.status());
            assert_eq!(problem.title, category.default_message());
            assert!(problem.extensions.to_value().unwrap().is_object());
        }
    }

    #[test]
    fn every_category_round_trips_through_json() {
        for original in samples() {
            let category = original.category();
            let first = serde_json::to_vec(&Problem::from_error_debug(original.clone())).unwrap();
            let second = serde_json::to_vec(&Problem::from_error_debug(original.clone())).unwrap();
            assert_eq!(first, second, "{category} serialization is not deterministic");

            let parsed: Problem = serde_json::from_slice(&first).unwrap();
            assert!(matches!(parsed.extensions, ProblemExtensions::Raw(_)));
            let restored = CanonicalError::try_from(parsed).unwrap();
            assert_eq!(restored, original, "{category} did not round-trip");
        }
    }

    #[test]
    fn debug_info_only_in_debug_mode() {
        let err = not_found().with_debug_info(DebugInfo::new("db lookup failed"));
        assert!(Problem::from_error(err.clone()).debug.is_none());
        let problem = Problem::from_error_debug(err);
        assert_eq!(problem.debug, Some(DebugInfo::new("db lookup failed")));
        assert_eq!(
            serde_json::to_value(&problem).unwrap()["debug"],
            json!({"detail": "db lookup failed", "stackEntries": []})
        );
    }

    #[test]
    fn debug_mode_without_debug_info_omits_key() {
        let json = serde_json::to_value(Problem::from_error_debug(not_found())).unwrap();
        assert!(json.get("debug").is_none());
    }

    #[test]
    fn resource_type_is_top_level() {
        let problem = Problem::from(not_found().with_resource_type("gts.cf.core.users.user.v1"));
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["resourceType"], "gts.cf.core.users.user.v1");
        assert!(json["extensions"].get("resourceType").is_some());
        assert_eq!(json["extensions"]["resourceType"], "User");
    }

    #[test]
    fn round_trip_preserves_error() {
        let original = CanonicalError::permission_denied(
            ErrorInfo::new("ROLE_MISSING", "auth").with_metadata("role", "admin"),
        )
        .with_message("Admins only")
        .with_resource_type("gts.cf.core.users.user.v1")
        .with_detail("role admin required")
        .with_debug_info(DebugInfo::new("policy p-1"));

        let problem = Problem::from_error_debug(original.clone());
        let json = serde_json::to_string(&problem).unwrap();
        let parsed: Problem = serde_json::from_str(&json).unwrap();
        let restored = CanonicalError::try_from(parsed).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn round_trip_without_override_keeps_default() {
        let restored = CanonicalError::try_from(Problem::from(not_found())).unwrap();
        assert!(!restored.is_message_overridden());
        assert_eq!(restored, not_found());
    }

    #[test]
    fn malformed_type_uri_is_rejected() {
        let mut problem = Problem::from(not_found());
        problem.type_url = "about:blank".to_owned();
        assert!(matches!(
            CanonicalError::try_from(problem),
            Err(ProblemConversionError::InvalidType(_))
        ));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut problem = Problem::from(not_found());
        problem.type_url = format!("{TYPE_URL_PREFIX}teapot{TYPE_URL_SUFFIX}");
        assert!(matches!(
            CanonicalError::try_from(problem),
            Err(ProblemConversionError::UnknownCategory(name)) if name == "teapot"
        ));
    }

    #[test]
    fn mismatched_status_is_rejected() {
        let mut problem = Problem::from(not_found());
        problem.status = StatusCode::BAD_REQUEST;
        assert!(matches!(
            CanonicalError::try_from(problem),
            Err(ProblemConversionError::StatusMismatch { expected: 404, actual: 400, .. })
        ));
    }

    #[test]
    fn mismatched_context_shape_is_rejected() {
        let mut problem = Problem::from(not_found());
        problem.extensions = json!({"format": "not a resource"}).into();
        assert!(matches!(
            CanonicalError::try_from(problem),
            Err(ProblemConversionError::ContextDeserialization {
                category: ErrorCategory::NotFound,
                ..
            })
        ));
    }

    #[test]
    fn context_of_another_category_is_rejected() {
        let mut problem = Problem::from(not_found());
        problem.type_url = ErrorCategory::ServiceUnavailable.type_url().to_owned();
        problem.status = StatusCode::SERVICE_UNAVAILABLE;
        assert!(matches!(
            CanonicalError::try_from(problem),
            Err(ProblemConversionError::ContextDeserialization {
                category: ErrorCategory::ServiceUnavailable,
                ..
            })
        ));
    }

    #[test]
    fn malformed_debug_member_fails_to_parse() {
        let json = json!({
            "type": "gts.cf.core.errors.err.v1~cf.core.errors.internal.v1~",
            "title": "An internal error occurred. Please retry later.",
            "status": 500,
            "extensions": {"detail": "x", "stackEntries": []},
            "debug": {"detail": "x"}
        });
        assert!(serde_json::from_value::<Problem>(json).is_err());
    }

    #[test]
    fn problem_deserializes_status_from_u16() {
        let json = concat!(
            r#"{"type":"gts.cf.core.errors.err.v1~cf.core.errors.not_found.v1~","#,
            r#""title":"Resource not found","status":404,"#,
            r#""extensions":{"resourceType":"User","resourceName":"42"}}"#
        );
        let p: Problem = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, StatusCode::NOT_FOUND);
        assert_eq!(p.category().unwrap(), ErrorCategory::NotFound);
    }
}
