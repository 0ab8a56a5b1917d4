//! Metadata snapshot types.

use crate::taxonomy::TypeTag;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Identifier of a database in the metadata store.
    DatabaseId
);
id_type!(
    /// Identifier of a table in the metadata store.
    TableId
);
id_type!(
    /// Identifier of a field (column) in the metadata store.
    FieldId
);

/// Immutable snapshot of one field.
///
/// `link` is not part of the stored field: the matcher sets it on fields
/// reached through a linked table, to the id of the foreign-key field used
/// to get there. A field read straight from the store always has
/// `link = None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub id: FieldId,
    pub table_id: TableId,
    pub name: String,
    pub base_type: TypeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_type: Option<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk_target_field_id: Option<FieldId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<FieldId>,
}

impl FieldMetadata {
    pub fn new(id: FieldId, table_id: TableId, name: impl Into<String>, base_type: TypeTag) -> Self {
        Self {
            id,
            table_id,
            name: name.into(),
            base_type,
            special_type: None,
            fk_target_field_id: None,
            link: None,
        }
    }

    #[must_use]
    pub fn with_special_type(mut self, special_type: TypeTag) -> Self {
        self.special_type = Some(special_type);
        self
    }

    #[must_use]
    pub fn with_fk_target(mut self, target: FieldId) -> Self {
        self.fk_target_field_id = Some(target);
        self
    }

    /// Tag this field as matched through a linked table, reached via the
    /// given foreign-key field on the root table.
    #[must_use]
    pub fn with_link(mut self, via: FieldId) -> Self {
        self.link = Some(via);
        self
    }
}

/// Immutable snapshot of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub id: TableId,
    pub name: String,
    /// Domain classification of the table. Absent means generic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<TypeTag>,
    pub database_id: DatabaseId,
}

impl TableMetadata {
    pub fn new(id: TableId, name: impl Into<String>, database_id: DatabaseId) -> Self {
        Self {
            id,
            name: name.into(),
            entity_type: None,
            database_id,
        }
    }

    #[must_use]
    pub fn with_entity_type(mut self, entity_type: TypeTag) -> Self {
        self.entity_type = Some(entity_type);
        self
    }
}

/// One-hop reachability record: a table reachable from the root table
/// through a single foreign-key field.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedTable {
    pub table: TableMetadata,
    /// The foreign-key field on the root table that reaches `table`.
    pub via_fk_field_id: FieldId,
}
