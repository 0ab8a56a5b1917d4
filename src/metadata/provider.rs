//! MetadataProvider trait definition.
//!
//! The trait abstracts over where table and field metadata comes from. The
//! in-memory [`StaticMetadataProvider`] is the reference implementation,
//! used both in tests and by callers that already hold a snapshot.

use std::collections::HashMap;
use thiserror::Error;

use super::types::{FieldId, FieldMetadata, TableId, TableMetadata};

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors surfaced by a metadata provider.
///
/// These are collaborator failures, not matching misses: the engine cannot
/// recover from them and propagates them to the caller unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetadataError {
    #[error("unknown table: {0}")]
    UnknownTable(TableId),

    #[error("unknown field: {0}")]
    UnknownField(FieldId),

    #[error("metadata store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for fetching schema metadata.
///
/// Results are an immutable snapshot for the duration of one engine run;
/// the provider must return consistent, already-committed metadata.
/// [`MetadataProvider::fields`] returns fields in a stable order - that
/// order is the traversal order for linked-table tie-breaks.
pub trait MetadataProvider {
    /// Get metadata for a table.
    fn table(&self, id: TableId) -> MetadataResult<TableMetadata>;

    /// Get all fields of a table, in stable declaration order.
    fn fields(&self, table: TableId) -> MetadataResult<Vec<FieldMetadata>>;

    /// Get metadata for a single field, wherever it lives.
    ///
    /// Used to chase foreign-key targets when computing one-hop linked
    /// tables.
    fn field(&self, id: FieldId) -> MetadataResult<FieldMetadata>;
}

/// In-memory metadata provider backed by pre-registered snapshots.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataProvider {
    tables: HashMap<TableId, TableMetadata>,
    fields: HashMap<FieldId, FieldMetadata>,
    table_fields: HashMap<TableId, Vec<FieldId>>,
}

impl StaticMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.insert(table.id, table);
        self
    }

    /// Register a field. Field order within a table follows registration
    /// order.
    #[must_use]
    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.table_fields
            .entry(field.table_id)
            .or_default()
            .push(field.id);
        self.fields.insert(field.id, field);
        self
    }
}

impl MetadataProvider for StaticMetadataProvider {
    fn table(&self, id: TableId) -> MetadataResult<TableMetadata> {
        self.tables
            .get(&id)
            .cloned()
            .ok_or(MetadataError::UnknownTable(id))
    }

    fn fields(&self, table: TableId) -> MetadataResult<Vec<FieldMetadata>> {
        let ids = self.table_fields.get(&table).cloned().unwrap_or_default();
        ids.into_iter()
            .map(|id| self.field(id))
            .collect()
    }

    fn field(&self, id: FieldId) -> MetadataResult<FieldMetadata> {
        self.fields
            .get(&id)
            .cloned()
            .ok_or(MetadataError::UnknownField(id))
    }
}
