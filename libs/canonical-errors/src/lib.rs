//! Canonical error taxonomy for Cyber Fabric services.
//!
//! Every error a service returns is a member of a closed set of categories,
//! each bound to exactly one typed context. A single converter turns any such
//! error into an RFC 9457 Problem document, and the JSON Schema of every
//! context is derived from its Rust definition. This crate contains:
//! - The taxonomy (`ErrorCategory`, `CanonicalError`)
//! - Context value objects (`ResourceInfo`, `Validation`, ...)
//! - The static catalog (`CategoryDef`)
//! - RFC 9457 Problem Details (`Problem`)
//! - Schema generation (`schema`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Lets `#[resource_error]` expansions name this crate from inside it.
extern crate self as canonical_errors;

pub mod catalog;
pub mod category;
pub mod context;
pub mod error;
pub mod problem;
pub mod schema;

// Re-export commonly used types
pub use catalog::CategoryDef;
pub use category::ErrorCategory;
pub use context::{
    DebugInfo, ErrorInfo, FieldViolation, PreconditionFailure, PreconditionViolation,
    QuotaFailure, QuotaViolation, RequestInfo, ResourceInfo, RetryInfo, Validation,
};
pub use error::{CanonicalError, CategoryContext};
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ProblemConversionError, ProblemExtensions};
pub use schema::{ContextSchema, SchemaDocument, SchemaError};

pub use canonical_errors_macros::resource_error;

/// Helper to attach instance and `trace_id` to a Problem
///
/// This is a convenience function for enriching Problem instances with
/// request-specific context before returning them as HTTP responses.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}
