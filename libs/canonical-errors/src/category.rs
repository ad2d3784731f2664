//! The closed set of error categories.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::catalog::{self, CategoryDef};
use crate::context::{
    DebugInfo, ErrorInfo, PreconditionFailure, QuotaFailure, RequestInfo, ResourceInfo, RetryInfo,
    Validation,
};
use crate::schema::{self, ContextSchema, SchemaDocument, SchemaError};

/// Error category. Each category is bound to exactly one context type.
///
/// Deliberately not `#[non_exhaustive]`: adding a category is a breaking
/// change that every `match` in downstream code has to acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCategory {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    ServiceUnavailable,
    DataLoss,
    Unauthenticated,
}

impl ErrorCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::Cancelled,
        Self::Unknown,
        Self::InvalidArgument,
        Self::DeadlineExceeded,
        Self::NotFound,
        Self::AlreadyExists,
        Self::PermissionDenied,
        Self::ResourceExhausted,
        Self::FailedPrecondition,
        Self::Aborted,
        Self::OutOfRange,
        Self::Unimplemented,
        Self::Internal,
        Self::ServiceUnavailable,
        Self::DataLoss,
        Self::Unauthenticated,
    ];

    /// Catalog entry for this category.
    #[must_use]
    pub const fn def(self) -> CategoryDef {
        match self {
            Self::Cancelled => catalog::CANCELLED,
            Self::Unknown => catalog::UNKNOWN,
            Self::InvalidArgument => catalog::INVALID_ARGUMENT,
            Self::DeadlineExceeded => catalog::DEADLINE_EXCEEDED,
            Self::NotFound => catalog::NOT_FOUND,
            Self::AlreadyExists => catalog::ALREADY_EXISTS,
            Self::PermissionDenied => catalog::PERMISSION_DENIED,
            Self::ResourceExhausted => catalog::RESOURCE_EXHAUSTED,
            Self::FailedPrecondition => catalog::FAILED_PRECONDITION,
            Self::Aborted => catalog::ABORTED,
            Self::OutOfRange => catalog::OUT_OF_RANGE,
            Self::Unimplemented => catalog::UNIMPLEMENTED,
            Self::Internal => catalog::INTERNAL,
            Self::ServiceUnavailable => catalog::SERVICE_UNAVAILABLE,
            Self::DataLoss => catalog::DATA_LOSS,
            Self::Unauthenticated => catalog::UNAUTHENTICATED,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.def().name
    }

    #[must_use]
    pub const fn status(self) -> u16 {
        self.def().status
    }

    #[must_use]
    pub const fn type_url(self) -> &'static str {
        self.def().type_url
    }

    #[must_use]
    pub const fn default_message(self) -> &'static str {
        self.def().default_message
    }

    /// Identifier of the schema describing this category's context.
    #[must_use]
    pub const fn context_schema_id(self) -> &'static str {
        match self {
            Self::Cancelled | Self::DeadlineExceeded => RequestInfo::SCHEMA_ID,
            Self::Unknown | Self::Internal => DebugInfo::SCHEMA_ID,
            Self::InvalidArgument | Self::OutOfRange => Validation::SCHEMA_ID,
            Self::NotFound | Self::AlreadyExists | Self::DataLoss => ResourceInfo::SCHEMA_ID,
            Self::PermissionDenied
            | Self::Aborted
            | Self::Unimplemented
            | Self::Unauthenticated => ErrorInfo::SCHEMA_ID,
            Self::ResourceExhausted => QuotaFailure::SCHEMA_ID,
            Self::FailedPrecondition => PreconditionFailure::SCHEMA_ID,
            Self::ServiceUnavailable => RetryInfo::SCHEMA_ID,
        }
    }

    /// Generates the schema of this category's context type.
    ///
    /// # Errors
    /// Returns [`SchemaError`] if the generated schema cannot be serialized.
    pub fn context_schema(self) -> Result<SchemaDocument, SchemaError> {
        match self {
            Self::Cancelled | Self::DeadlineExceeded => schema::generate::<RequestInfo>(),
            Self::Unknown | Self::Internal => schema::generate::<DebugInfo>(),
            Self::InvalidArgument | Self::OutOfRange => schema::generate::<Validation>(),
            Self::NotFound | Self::AlreadyExists | Self::DataLoss => {
                schema::generate::<ResourceInfo>()
            }
            Self::PermissionDenied
            | Self::Aborted
            | Self::Unimplemented
            | Self::Unauthenticated => schema::generate::<ErrorInfo>(),
            Self::ResourceExhausted => schema::generate::<QuotaFailure>(),
            Self::FailedPrecondition => schema::generate::<PreconditionFailure>(),
            Self::ServiceUnavailable => schema::generate::<RetryInfo>(),
        }
    }

    /// Looks a category up by its wire name, e.g. `"not_found"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializes as the wire name.
impl Serialize for ErrorCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
