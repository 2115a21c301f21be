use chrono::{DateTime, Utc};
use common::PrincipalId;
use serde::{Deserialize, Serialize};

/// Identifies one principal-scoped collection, e.g. the `cart` collection of
/// one signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionId {
    principal: PrincipalId,
    name: String,
}

impl CollectionId {
    /// Creates a collection ID for a principal and collection name.
    pub fn new(principal: PrincipalId, name: impl Into<String>) -> Self {
        Self {
            principal,
            name: name.into(),
        }
    }

    /// Returns the owning principal.
    pub fn principal(&self) -> &PrincipalId {
        &self.principal
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "users/{}/{}", self.principal, self.name)
    }
}

/// A stored document: an ID plus a loosely typed JSON value.
///
/// The store does not validate document contents; consumers normalize the
/// data into typed models on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID, unique within its collection.
    pub id: String,

    /// The document contents.
    pub data: serde_json::Value,

    /// Time of the last write, assigned by the store.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a document with the current time as its write timestamp.
    pub fn new(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            data,
            updated_at: Utc::now(),
        }
    }
}
