//! Static per-category definitions.
//!
//! Every value here is part of the wire contract: status codes, type URIs and
//! default messages are constants, never computed, so refactoring the
//! converter cannot change them.

use http::StatusCode;

/// Prefix shared by every category type URI.
pub const TYPE_URL_PREFIX: &str = "gts.cf.core.errors.err.v1~cf.core.errors.";
/// Suffix shared by every category type URI.
pub const TYPE_URL_SUFFIX: &str = ".v1~";

macro_rules! type_url {
    ($name:literal) => {
        concat!("gts.cf.core.errors.err.v1~cf.core.errors.", $name, ".v1~")
    };
}

/// Static definition of one error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDef {
    pub status: u16,
    /// Short category title, e.g. "Not Found".
    pub title: &'static str,
    /// Wire name used in type URIs and baseline file names.
    pub name: &'static str,
    pub type_url: &'static str,
    /// Problem `title` used when the error carries no message override.
    pub default_message: &'static str,
}

impl CategoryDef {
    /// HTTP status for this category.
    ///
    /// Falls back to 500 for codes `http` refuses; every catalog entry is a
    /// valid code, which the catalog tests assert.
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub const CANCELLED: CategoryDef = CategoryDef {
    status: 499,
    title: "Cancelled",
    name: "cancelled",
    type_url: type_url!("cancelled"),
    default_message: "Operation cancelled by the client",
};

pub const UNKNOWN: CategoryDef = CategoryDef {
    status: 500,
    title: "Unknown",
    name: "unknown",
    type_url: type_url!("unknown"),
    default_message: "An unknown error occurred",
};

pub const INVALID_ARGUMENT: CategoryDef = CategoryDef {
    status: 400,
    title: "Invalid Argument",
    name: "invalid_argument",
    type_url: type_url!("invalid_argument"),
    default_message: "Request validation failed",
};

pub const DEADLINE_EXCEEDED: CategoryDef = CategoryDef {
    status: 504,
    title: "Deadline Exceeded",
    name: "deadline_exceeded",
    type_url: type_url!("deadline_exceeded"),
    default_message: "Operation did not complete within the allowed time",
};

pub const NOT_FOUND: CategoryDef = CategoryDef {
    status: 404,
    title: "Not Found",
    name: "not_found",
    type_url: type_url!("not_found"),
    default_message: "Resource not found",
};

pub const ALREADY_EXISTS: CategoryDef = CategoryDef {
    status: 409,
    title: "Already Exists",
    name: "already_exists",
    type_url: type_url!("already_exists"),
    default_message: "Resource already exists",
};

pub const PERMISSION_DENIED: CategoryDef = CategoryDef {
    status: 403,
    title: "Permission Denied",
    name: "permission_denied",
    type_url: type_url!("permission_denied"),
    default_message: "You do not have permission to perform this operation",
};

pub const RESOURCE_EXHAUSTED: CategoryDef = CategoryDef {
    status: 429,
    title: "Resource Exhausted",
    name: "resource_exhausted",
    type_url: type_url!("resource_exhausted"),
    default_message: "Quota exceeded",
};

pub const FAILED_PRECONDITION: CategoryDef = CategoryDef {
    status: 400,
    title: "Failed Precondition",
    name: "failed_precondition",
    type_url: type_url!("failed_precondition"),
    default_message: "Operation precondition not met",
};

pub const ABORTED: CategoryDef = CategoryDef {
    status: 409,
    title: "Aborted",
    name: "aborted",
    type_url: type_url!("aborted"),
    default_message: "Operation aborted due to concurrency conflict",
};

pub const OUT_OF_RANGE: CategoryDef = CategoryDef {
    status: 400,
    title: "Out of Range",
    name: "out_of_range",
    type_url: type_url!("out_of_range"),
    default_message: "Value out of range",
};

pub const UNIMPLEMENTED: CategoryDef = CategoryDef {
    status: 501,
    title: "Unimplemented",
    name: "unimplemented",
    type_url: type_url!("unimplemented"),
    default_message: "This operation is not implemented",
};

pub const INTERNAL: CategoryDef = CategoryDef {
    status: 500,
    title: "Internal",
    name: "internal",
    type_url: type_url!("internal"),
    default_message: "An internal error occurred. Please retry later.",
};

pub const SERVICE_UNAVAILABLE: CategoryDef = CategoryDef {
    status: 503,
    title: "Unavailable",
    name: "service_unavailable",
    type_url: type_url!("service_unavailable"),
    default_message: "Service temporarily unavailable",
};

pub const DATA_LOSS: CategoryDef = CategoryDef {
    status: 500,
    title: "Data Loss",
    name: "data_loss",
    type_url: type_url!("data_loss"),
    default_message: "Data loss detected",
};

pub const UNAUTHENTICATED: CategoryDef = CategoryDef {
    status: 401,
    title: "Unauthenticated",
    name: "unauthenticated",
    type_url: type_url!("unauthenticated"),
    default_message: "Authentication required",
};
