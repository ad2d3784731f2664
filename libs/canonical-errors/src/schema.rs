//! JSON Schema generation for context types.
//!
//! Schemas are derived from the Rust definitions with `schemars`, so the
//! serializer and the schema read the same field list. Every schema carries a
//! stable identifier; identifiers are checked for uniqueness at compile time.

use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::category::ErrorCategory;
use crate::context::{
    DebugInfo, ErrorInfo, FieldViolation, PreconditionFailure, PreconditionViolation,
    QuotaFailure, QuotaViolation, RequestInfo, ResourceInfo, RetryInfo, Validation,
};
use crate::problem::Problem;

/// A context type with a stable, published schema identifier.
pub trait ContextSchema: JsonSchema + Serialize + DeserializeOwned {
    /// Never reused, never shared with another type.
    const SCHEMA_ID: &'static str;
}

/// Identifier of the `Problem` envelope schema.
pub const PROBLEM_SCHEMA_ID: &str = "gts.cf.core.errors.problem.v1~";

/// Identifier of the schema binding each category to its status and context.
pub const CANONICAL_ERROR_SCHEMA_ID: &str = "gts.cf.core.errors.canonical_error.v1~";

/// Declares the context types once: the identifier list and the generator
/// are both expanded from it.
macro_rules! context_types {
    ($($ty:ty),+ $(,)?) => {
        /// Every context schema identifier.
        pub const CONTEXT_SCHEMA_IDS: &[&str] = &[$(<$ty as ContextSchema>::SCHEMA_ID),+];

        fn generate_contexts() -> Result<Vec<SchemaDocument>, SchemaError> {
            Ok(vec![$(generate::<$ty>()?),+])
        }
    };
}

context_types!(
    DebugInfo,
    ErrorInfo,
    FieldViolation,
    PreconditionFailure,
    PreconditionViolation,
    QuotaFailure,
    QuotaViolation,
    RequestInfo,
    ResourceInfo,
    RetryInfo,
    Validation,
);

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn id_at<'a>(ids: &[&'a str], reserved: &[&'a str], i: usize) -> &'a str {
    if i < ids.len() {
        ids[i]
    } else {
        reserved[i - ids.len()]
    }
}

/// `true` when no identifier appears twice across `ids` and `reserved`.
#[must_use]
pub const fn ids_are_unique(ids: &[&str], reserved: &[&str]) -> bool {
    let n = ids.len() + reserved.len();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n {
            if str_eq(id_at(ids, reserved, i), id_at(ids, reserved, j)) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    ids_are_unique(
        CONTEXT_SCHEMA_IDS,
        &[PROBLEM_SCHEMA_ID, CANONICAL_ERROR_SCHEMA_ID]
    ),
    "duplicate schema identifier"
);

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to serialize schema '{id}': {source}")]
    Serialize {
        id: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A generated schema and its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    id: &'static str,
    body: Value,
}

impl SchemaDocument {
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Schema body without `$id`, suitable for validation.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Standalone document for export, with `$id` set to `gts://<id>`.
    #[must_use]
    pub fn to_document(&self) -> Value {
        let mut doc = self.body.clone();
        if let Value::Object(map) = &mut doc {
            map.insert("$id".to_owned(), Value::String(format!("gts://{}", self.id)));
        }
        doc
    }

    /// File name used when exporting, e.g. `gts.cf.core.errors.retry_info.v1~.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

fn generate_with_id<T: JsonSchema>(id: &'static str) -> Result<SchemaDocument, SchemaError> {
    let root = SchemaSettings::draft07()
        .into_generator()
        .into_root_schema_for::<T>();
    let body = serde_json::to_value(root).map_err(|source| SchemaError::Serialize { id, source })?;
    Ok(SchemaDocument { id, body })
}

/// Generates the schema of a context type.
///
/// # Errors
/// Returns [`SchemaError`] if the generated schema cannot be serialized.
pub fn generate<T: ContextSchema>() -> Result<SchemaDocument, SchemaError> {
    generate_with_id::<T>(T::SCHEMA_ID)
}

/// Generates every context schema, ordered by identifier.
///
/// # Errors
/// Returns [`SchemaError`] if any schema cannot be serialized.
pub fn context_schemas() -> Result<Vec<SchemaDocument>, SchemaError> {
    let mut docs = generate_contexts()?;
    docs.sort_by_key(SchemaDocument::id);
    Ok(docs)
}

/// Generates the schema of the `Problem` envelope.
///
/// # Errors
/// Returns [`SchemaError`] if the schema cannot be serialized.
pub fn problem_schema() -> Result<SchemaDocument, SchemaError> {
    generate_with_id::<Problem>(PROBLEM_SCHEMA_ID)
}

/// JSON pointer reference to `#/definitions/<name>`.
fn definition_ref(name: &str) -> String {
    format!("#/definitions/{}", name.replace('~', "~0").replace('/', "~1"))
}

/// Generates the schema binding every category to its status and context.
///
/// One `oneOf` branch per category: `type` and `status` are constants and
/// `extensions` refers to the category's context schema. Context schemas are
/// embedded under `definitions`, keyed by identifier, next to the types they
/// reference.
///
/// # Errors
/// Returns [`SchemaError`] if a context schema cannot be serialized.
pub fn canonical_error_schema() -> Result<SchemaDocument, SchemaError> {
    let mut definitions = Map::new();
    for doc in context_schemas()? {
        let mut body = doc.body;
        if let Value::Object(map) = &mut body {
            map.remove("$schema");
            if let Some(Value::Object(nested)) = map.remove("definitions") {
                definitions.extend(nested);
            }
        }
        definitions.insert(doc.id.to_owned(), body);
    }

    let variants: Vec<Value> = ErrorCategory::ALL
        .into_iter()
        .map(|category| {
            json!({
                "type": "object",
                "properties": {
                    "type": {"const": category.type_url()},
                    "status": {"const": category.status()},
                    "extensions": {"$ref": definition_ref(category.context_schema_id())}
                },
                "required": ["type", "status", "extensions"]
            })
        })
        .collect();

    Ok(SchemaDocument {
        id: CANONICAL_ERROR_SCHEMA_ID,
        body: json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "CanonicalError",
            "oneOf": variants,
            "definitions": definitions
        }),
    })
}
