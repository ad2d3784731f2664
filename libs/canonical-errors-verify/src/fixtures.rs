//! One representative error per category.
//!
//! These are the inputs whose converter output is pinned by the committed
//! baselines. Changing any value here changes the baselines.

use canonical_errors::{
    CanonicalError, DebugInfo, ErrorCategory, ErrorInfo, FieldViolation, PreconditionFailure,
    PreconditionViolation, QuotaFailure, QuotaViolation, RequestInfo, ResourceInfo, RetryInfo,
    Validation,
};

/// Representative error of `category`.
pub fn representative(category: ErrorCategory) -> CanonicalError {
    match category {
        ErrorCategory::Cancelled => CanonicalError::cancelled(RequestInfo::new("req-0001")),
        ErrorCategory::Unknown => CanonicalError::unknown("unexpected upstream response"),
        ErrorCategory::InvalidArgument => {
            CanonicalError::invalid_argument(Validation::fields(vec![FieldViolation::new(
                "email",
                "must be a valid email address",
                "INVALID_FORMAT",
            )]))
        }
        ErrorCategory::DeadlineExceeded => {
            CanonicalError::deadline_exceeded(RequestInfo::new("req-0002"))
        }
        ErrorCategory::NotFound => CanonicalError::not_found(ResourceInfo::new("User", "42")),
        ErrorCategory::AlreadyExists => {
            CanonicalError::already_exists(ResourceInfo::new("User", "alice@example.com"))
        }
        ErrorCategory::PermissionDenied => CanonicalError::permission_denied(
            ErrorInfo::new("MISSING_ROLE", "auth.cyberfabric.io").with_metadata("role", "admin"),
        ),
        ErrorCategory::ResourceExhausted => {
            CanonicalError::resource_exhausted(QuotaFailure::new(vec![QuotaViolation::new(
                "tenant:acme",
                "Request rate limit of 100 per minute exceeded",
            )]))
        }
        ErrorCategory::FailedPrecondition => CanonicalError::failed_precondition(
            PreconditionFailure::new(vec![PreconditionViolation::new(
                "STATE",
                "order:1001",
                "Order must be in draft state",
            )]),
        ),
        ErrorCategory::Aborted => CanonicalError::aborted(ErrorInfo::new(
            "VERSION_CONFLICT",
            "storage.cyberfabric.io",
        )),
        ErrorCategory::OutOfRange => {
            CanonicalError::out_of_range(Validation::constraint("page must be between 1 and 100"))
        }
        ErrorCategory::Unimplemented => CanonicalError::unimplemented(ErrorInfo::new(
            "NOT_IMPLEMENTED",
            "api.cyberfabric.io",
        )),
        ErrorCategory::Internal => {
            CanonicalError::internal(DebugInfo::new("connection pool exhausted")).with_debug_info(
                DebugInfo::new("pool size 16, all connections busy")
                    .with_stack(vec!["db::pool::acquire".to_owned()]),
            )
        }
        ErrorCategory::ServiceUnavailable => {
            CanonicalError::service_unavailable(RetryInfo::after_seconds(30))
        }
        ErrorCategory::DataLoss => {
            CanonicalError::data_loss(ResourceInfo::new("Document", "doc-7"))
        }
        ErrorCategory::Unauthenticated => CanonicalError::unauthenticated(ErrorInfo::new(
            "TOKEN_EXPIRED",
            "auth.cyberfabric.io",
        )),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn representative_matches_category() {
        for category in ErrorCategory::ALL {
            assert_eq!(representative(category).category(), category);
        }
    }

    #[test]
    fn representatives_use_default_messages() {
        for category in ErrorCategory::ALL {
            assert!(!representative(category).is_message_overridden(), "{category}");
        }
    }
}
