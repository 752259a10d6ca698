//! Record types and error definitions for the user store.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Identifier assigned to a user when it is created.
pub type UserId = u64;

/// Caller-supplied user fields. Key order is preserved as submitted.
pub type UserFields = Map<String, Value>;

/// Name of the field reserved for the server-assigned identifier.
pub const ID_FIELD: &str = "id";

/// Errors produced by store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No user carries the requested id.
    #[error("User not found")]
    NotFound(UserId),
}

/// Strategy used to pick the id of a newly created user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdAllocation {
    /// `id = number of stored users + 1`.
    ///
    /// After a delete this can hand out an id that is still in use (for example deleting id 1
    /// out of `[1, 2, 3]` makes the next create return a second id 3). Kept as the default so
    /// existing clients observe the historical numbering.
    #[default]
    CollectionSize,
    /// Monotonic counter that never reuses an id, even after deletes.
    Sequence,
}

/// A stored user: the reserved `id` plus every other field the caller sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// Server-assigned identifier; never changes after creation.
    pub id: UserId,
    /// Open-ended caller fields, never containing `id`.
    #[serde(flatten)]
    pub fields: UserFields,
}

impl User {
    /// Build a record from caller fields, discarding any caller-provided `id`.
    pub fn new(id: UserId, mut fields: UserFields) -> Self {
        fields.shift_remove(ID_FIELD);
        Self { id, fields }
    }

    /// Shallow-merge `patch` into this record.
    ///
    /// Keys present in `patch` overwrite existing values, absent keys are untouched, and a
    /// patched `id` is ignored.
    pub fn merge(&mut self, patch: UserFields) {
        for (key, value) in patch {
            if key == ID_FIELD {
                continue;
            }
            self.fields.insert(key, value);
        }
    }
}
