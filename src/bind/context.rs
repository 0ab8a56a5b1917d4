//! The per-run binding context.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::metadata::{
    DatabaseId, FieldMetadata, LinkedTable, MetadataProvider, MetadataResult, TableId,
    TableMetadata,
};
use crate::query::Form;
use crate::rules::{DefinitionGroup, DimensionSpec, Rule};
use crate::taxonomy::Taxonomy;

use super::{bind_dimensions, resolve_overloads};

/// Resolved match set plus score for one dimension identifier.
///
/// Invariant: a binding in an active context never has empty `matches` -
/// the binder discards those instead of retaining them.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub matches: Vec<FieldMetadata>,
    pub score: u32,
}

/// The winning overload for one metric or filter name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDefinition {
    pub body: Form,
    pub score: u32,
}

/// Everything one rule application knows about one root table.
///
/// Built once per `(root table, rule)` pair and read-only thereafter. The
/// card candidate generator only ever reads from here.
#[derive(Debug, Clone)]
pub struct Context {
    pub root_table: TableMetadata,
    pub fields: Vec<FieldMetadata>,
    /// One entry per foreign-key hop off the root table, in root field
    /// order. Two foreign keys to the same table yield two entries; the
    /// matcher takes the first that satisfies a table-type spec.
    pub linked_tables: Vec<LinkedTable>,
    pub database_id: DatabaseId,
    pub dimension_bindings: HashMap<String, Binding>,
    pub resolved_metrics: HashMap<String, ResolvedDefinition>,
    pub resolved_filters: HashMap<String, ResolvedDefinition>,
    linked_fields: HashMap<TableId, Vec<FieldMetadata>>,
}

impl Context {
    /// Stage zero: fetch the root table's fields and its one-hop linked
    /// tables from the metadata provider. Binding maps start empty.
    pub fn base(
        provider: &impl MetadataProvider,
        root_table: TableMetadata,
    ) -> MetadataResult<Self> {
        let fields = provider.fields(root_table.id)?;

        let mut linked_tables = Vec::new();
        let mut linked_fields: HashMap<TableId, Vec<FieldMetadata>> = HashMap::new();
        for field in &fields {
            let Some(target) = field.fk_target_field_id else {
                continue;
            };
            let target_field = provider.field(target)?;
            let table = provider.table(target_field.table_id)?;
            if let Entry::Vacant(entry) = linked_fields.entry(table.id) {
                entry.insert(provider.fields(table.id)?);
            }
            linked_tables.push(LinkedTable {
                table,
                via_fk_field_id: field.id,
            });
        }

        let database_id = root_table.database_id;
        Ok(Self {
            root_table,
            fields,
            linked_tables,
            database_id,
            dimension_bindings: HashMap::new(),
            resolved_metrics: HashMap::new(),
            resolved_filters: HashMap::new(),
            linked_fields,
        })
    }

    /// Stage one: bind the rule's dimension declarations.
    #[must_use]
    pub fn with_dimensions(mut self, taxonomy: &Taxonomy, specs: &[(String, DimensionSpec)]) -> Self {
        let bindings = bind_dimensions(taxonomy, &self, specs);
        self.dimension_bindings = bindings;
        self
    }

    /// Stage two: resolve metric overloads against the bound dimensions.
    #[must_use]
    pub fn with_metrics(mut self, groups: &[DefinitionGroup]) -> Self {
        self.resolved_metrics = resolve_overloads(&self.dimension_bindings, groups);
        self
    }

    /// Stage three: resolve filter overloads against the bound dimensions.
    #[must_use]
    pub fn with_filters(mut self, groups: &[DefinitionGroup]) -> Self {
        self.resolved_filters = resolve_overloads(&self.dimension_bindings, groups);
        self
    }

    /// Run all stages for one rule.
    pub fn for_rule(
        provider: &impl MetadataProvider,
        taxonomy: &Taxonomy,
        root_table: TableMetadata,
        rule: &Rule,
    ) -> MetadataResult<Self> {
        Ok(Self::base(provider, root_table)?
            .with_dimensions(taxonomy, &rule.dimensions)
            .with_metrics(&rule.metrics)
            .with_filters(&rule.filters))
    }

    /// Fields of a linked table, in declaration order.
    pub fn linked_table_fields(&self, table: TableId) -> &[FieldMetadata] {
        self.linked_fields
            .get(&table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
