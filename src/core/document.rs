//! Opaque documents and the generic fields every store maintains

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A stored document: an arbitrary JSON object
pub type Document = Map<String, Value>;

/// Primary identifier field (UUID rendered as a string)
pub const ID_FIELD: &str = "id";

/// Creation timestamp field
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Last-modification timestamp field
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Internal version-control field, never exposed to clients
pub const VERSION_FIELD: &str = "__v";

/// Fields a client payload can never write
const IMMUTABLE_FIELDS: &[&str] = &[ID_FIELD, "_id", CREATED_AT_FIELD, VERSION_FIELD];

/// Current time as an RFC 3339 UTC string
///
/// The fixed format (microseconds, `Z` suffix) keeps lexical and
/// chronological order identical.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Stamp a new document with an identifier, timestamps and version
///
/// Any client-supplied value for a generic field is discarded.
pub fn prepare_insert(mut document: Document) -> (Uuid, Document) {
    for field in IMMUTABLE_FIELDS {
        document.remove(*field);
    }
    document.remove(UPDATED_AT_FIELD);

    let id = Uuid::new_v4();
    let now = timestamp_now();
    document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    document.insert(CREATED_AT_FIELD.to_string(), Value::String(now.clone()));
    document.insert(UPDATED_AT_FIELD.to_string(), Value::String(now));
    document.insert(VERSION_FIELD.to_string(), Value::from(0));

    (id, document)
}

/// Turn an update payload into the set of fields to write
///
/// Generic fields are stripped and `updatedAt` is refreshed.
pub fn prepare_update(mut changes: Document) -> Document {
    for field in IMMUTABLE_FIELDS {
        changes.remove(*field);
    }
    changes.insert(
        UPDATED_AT_FIELD.to_string(),
        Value::String(timestamp_now()),
    );
    changes
}

/// Remove internal fields before a document leaves the store
pub fn strip_internal(mut document: Document) -> Document {
    document.remove(VERSION_FIELD);
    document
}

/// Read the identifier of a stored document
pub fn document_id(document: &Document) -> Option<Uuid> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Resolve a possibly dotted field path (`a.b.c`) inside a document
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
