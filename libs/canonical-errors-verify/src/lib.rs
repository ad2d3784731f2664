//! Consistency verification for the canonical error taxonomy.
//!
//! For every category the verifier renders a representative error through the
//! converter and checks the result two ways:
//! - against the approved baseline committed under `problems/`, reporting
//!   field-level diffs
//! - against the schemas generated from the context types, reporting
//!   validator messages and declared-vs-emitted field drift
//!
//! Verification never writes; baselines change only through [`Verifier::approve`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod baseline;
pub mod config;
pub mod diff;
pub mod error;
pub mod fixtures;
pub mod schema_check;
pub mod verifier;

pub use baseline::BaselineStore;
pub use config::{ConfigError, VerifyConfig};
pub use diff::FieldDiff;
pub use error::{BaselineError, VerifyError};
pub use schema_check::{FieldDrift, SchemaChecker, SchemaReport, SchemaViolation};
pub use verifier::{
    CategoryReport, Failure, Outcome, VerificationReport, Verdict, Verifier,
    check_schema_identity, export_schemas,
};
