//! The canonical error type and its category-bound context.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::category::ErrorCategory;
use crate::context::{
    DebugInfo, ErrorInfo, PreconditionFailure, QuotaFailure, RequestInfo, ResourceInfo, RetryInfo,
    Validation,
};

/// Context of a canonical error, tagged by category.
///
/// Each variant holds the one context type its category accepts, so a
/// category paired with the wrong context cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryContext {
    Cancelled(RequestInfo),
    Unknown(DebugInfo),
    InvalidArgument(Validation),
    DeadlineExceeded(RequestInfo),
    NotFound(ResourceInfo),
    AlreadyExists(ResourceInfo),
    PermissionDenied(ErrorInfo),
    ResourceExhausted(QuotaFailure),
    FailedPrecondition(PreconditionFailure),
    Aborted(ErrorInfo),
    OutOfRange(Validation),
    Unimplemented(ErrorInfo),
    Internal(DebugInfo),
    ServiceUnavailable(RetryInfo),
    DataLoss(ResourceInfo),
    Unauthenticated(ErrorInfo),
}

impl CategoryContext {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Cancelled(_) => ErrorCategory::Cancelled,
            Self::Unknown(_) => ErrorCategory::Unknown,
            Self::InvalidArgument(_) => ErrorCategory::InvalidArgument,
            Self::DeadlineExceeded(_) => ErrorCategory::DeadlineExceeded,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::AlreadyExists(_) => ErrorCategory::AlreadyExists,
            Self::PermissionDenied(_) => ErrorCategory::PermissionDenied,
            Self::ResourceExhausted(_) => ErrorCategory::ResourceExhausted,
            Self::FailedPrecondition(_) => ErrorCategory::FailedPrecondition,
            Self::Aborted(_) => ErrorCategory::Aborted,
            Self::OutOfRange(_) => ErrorCategory::OutOfRange,
            Self::Unimplemented(_) => ErrorCategory::Unimplemented,
            Self::Internal(_) => ErrorCategory::Internal,
            Self::ServiceUnavailable(_) => ErrorCategory::ServiceUnavailable,
            Self::DataLoss(_) => ErrorCategory::DataLoss,
            Self::Unauthenticated(_) => ErrorCategory::Unauthenticated,
        }
    }

    /// Parses an `extensions` object as the context type bound to `category`.
    ///
    /// # Errors
    /// Returns the deserializer error when `value` does not have the shape of
    /// the bound context type.
    pub fn from_extensions(
        category: ErrorCategory,
        value: Value,
    ) -> Result<Self, serde_json::Error> {
        use serde_json::from_value;

        Ok(match category {
            ErrorCategory::Cancelled => Self::Cancelled(from_value(value)?),
            ErrorCategory::Unknown => Self::Unknown(from_value(value)?),
            ErrorCategory::InvalidArgument => Self::InvalidArgument(from_value(value)?),
            ErrorCategory::DeadlineExceeded => Self::DeadlineExceeded(from_value(value)?),
            ErrorCategory::NotFound => Self::NotFound(from_value(value)?),
            ErrorCategory::AlreadyExists => Self::AlreadyExists(from_value(value)?),
            ErrorCategory::PermissionDenied => Self::PermissionDenied(from_value(value)?),
            ErrorCategory::ResourceExhausted => Self::ResourceExhausted(from_value(value)?),
            ErrorCategory::FailedPrecondition => Self::FailedPrecondition(from_value(value)?),
            ErrorCategory::Aborted => Self::Aborted(from_value(value)?),
            ErrorCategory::OutOfRange => Self::OutOfRange(from_value(value)?),
            ErrorCategory::Unimplemented => Self::Unimplemented(from_value(value)?),
            ErrorCategory::Internal => Self::Internal(from_value(value)?),
            ErrorCategory::ServiceUnavailable => Self::ServiceUnavailable(from_value(value)?),
            ErrorCategory::DataLoss => Self::DataLoss(from_value(value)?),
            ErrorCategory::Unauthenticated => Self::Unauthenticated(from_value(value)?),
        })
    }
}

/// Serializes the inner context only, in its declared field order. This is
/// the Problem `extensions` object.
impl Serialize for CategoryContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Cancelled(ctx) | Self::DeadlineExceeded(ctx) => ctx.serialize(serializer),
            Self::Unknown(ctx) | Self::Internal(ctx) => ctx.serialize(serializer),
            Self::InvalidArgument(ctx) | Self::OutOfRange(ctx) => ctx.serialize(serializer),
            Self::NotFound(ctx) | Self::AlreadyExists(ctx) | Self::DataLoss(ctx) => {
                ctx.serialize(serializer)
            }
            Self::PermissionDenied(ctx)
            | Self::Aborted(ctx)
            | Self::Unimplemented(ctx)
            | Self::Unauthenticated(ctx) => ctx.serialize(serializer),
            Self::ResourceExhausted(ctx) => ctx.serialize(serializer),
            Self::FailedPrecondition(ctx) => ctx.serialize(serializer),
            Self::ServiceUnavailable(ctx) => ctx.serialize(serializer),
        }
    }
}

/// Optional parts of a [`CanonicalError`], handed to the converter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ErrorParts {
    pub(crate) resource_type: Option<String>,
    pub(crate) detail: Option<String>,
    pub(crate) debug_info: Option<DebugInfo>,
}

/// An error raised as a member of the canonical taxonomy.
///
/// Built with the category constructor, then refined with the `with_*`
/// builders:
///
/// ```
/// use canonical_errors::{CanonicalError, ErrorCategory, ResourceInfo};
///
/// let err = CanonicalError::not_found(ResourceInfo::new("User", "42"))
///     .with_detail("no user with id 42");
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// assert_eq!(err.to_string(), "not_found: Resource not found");
/// ```
///
/// A constructor only accepts the context bound to its category:
///
/// ```compile_fail
/// use canonical_errors::{CanonicalError, Validation};
///
/// let _ = CanonicalError::not_found(Validation::format("expected a user id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct CanonicalError {
    context: CategoryContext,
    message: Option<String>,
    parts: ErrorParts,
}

impl CanonicalError {
    fn new(context: CategoryContext) -> Self {
        Self {
            context,
            message: None,
            parts: ErrorParts::default(),
        }
    }

    pub fn cancelled(ctx: RequestInfo) -> Self {
        Self::new(CategoryContext::Cancelled(ctx))
    }

    /// Unknown error; `detail` is kept as debug context.
    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(CategoryContext::Unknown(DebugInfo::new(detail)))
    }

    pub fn invalid_argument(ctx: Validation) -> Self {
        Self::new(CategoryContext::InvalidArgument(ctx))
    }

    pub fn deadline_exceeded(ctx: RequestInfo) -> Self {
        Self::new(CategoryContext::DeadlineExceeded(ctx))
    }

    pub fn not_found(ctx: ResourceInfo) -> Self {
        Self::new(CategoryContext::NotFound(ctx))
    }

    pub fn already_exists(ctx: ResourceInfo) -> Self {
        Self::new(CategoryContext::AlreadyExists(ctx))
    }

    pub fn permission_denied(ctx: ErrorInfo) -> Self {
        Self::new(CategoryContext::PermissionDenied(ctx))
    }

    pub fn resource_exhausted(ctx: QuotaFailure) -> Self {
        Self::new(CategoryContext::ResourceExhausted(ctx))
    }

    pub fn failed_precondition(ctx: PreconditionFailure) -> Self {
        Self::new(CategoryContext::FailedPrecondition(ctx))
    }

    pub fn aborted(ctx: ErrorInfo) -> Self {
        Self::new(CategoryContext::Aborted(ctx))
    }

    pub fn out_of_range(ctx: Validation) -> Self {
        Self::new(CategoryContext::OutOfRange(ctx))
    }

    pub fn unimplemented(ctx: ErrorInfo) -> Self {
        Self::new(CategoryContext::Unimplemented(ctx))
    }

    pub fn internal(ctx: DebugInfo) -> Self {
        Self::new(CategoryContext::Internal(ctx))
    }

    pub fn service_unavailable(ctx: RetryInfo) -> Self {
        Self::new(CategoryContext::ServiceUnavailable(ctx))
    }

    pub fn data_loss(ctx: ResourceInfo) -> Self {
        Self::new(CategoryContext::DataLoss(ctx))
    }

    pub fn unauthenticated(ctx: ErrorInfo) -> Self {
        Self::new(CategoryContext::Unauthenticated(ctx))
    }

    /// Overrides the category default message.
    ///
    /// A message equal to the default is not an override.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message = (message != self.category().default_message()).then_some(message);
        self
    }

    /// Tags the error with the type of the resource it was raised for.
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.parts.resource_type = Some(resource_type.into());
        self
    }

    /// Attaches an explanation specific to this occurrence.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.parts.detail = Some(detail.into());
        self
    }

    /// Attaches debug information, emitted only by
    /// [`Problem::from_error_debug`](crate::Problem::from_error_debug).
    pub fn with_debug_info(mut self, info: DebugInfo) -> Self {
        self.parts.debug_info = Some(info);
        self
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.context.category()
    }

    #[must_use]
    pub fn context(&self) -> &CategoryContext {
        &self.context
    }

    /// The override if one was set, otherwise the category default.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.category().default_message())
    }

    #[must_use]
    pub fn is_message_overridden(&self) -> bool {
        self.message.is_some()
    }

    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        self.parts.resource_type.as_deref()
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.parts.detail.as_deref()
    }

    #[must_use]
    pub fn debug_info(&self) -> Option<&DebugInfo> {
        self.parts.debug_info.as_ref()
    }

    pub(crate) fn into_parts(self) -> (CategoryContext, ErrorParts) {
        (self.context, self.parts)
    }
}

impl From<CategoryContext> for CanonicalError {
    fn from(context: CategoryContext) -> Self {
        Self::new(context)
    }
}

impl fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category(), self.message())
    }
}

impl std::error::Error for CanonicalError {}
