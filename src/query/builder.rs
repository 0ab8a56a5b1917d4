//! Query assembly from resolved bindings.
//!
//! The builder is the only place a [`QuerySpec`] comes into existence, and
//! it refuses to produce one the principal may not run: the permission gate
//! is consulted after assembly, and a denial drops the candidate silently.

use std::collections::HashMap;

use super::form::Form;
use super::reference::{Referenceable, ReferenceResolver, TemplateDialect};
use super::spec::{OrderBy, QuerySpec};
use crate::metadata::{DatabaseId, FieldMetadata, TableId};
use crate::perms::{PermissionGate, PermissionSet, QueryPermissionMode};
use crate::rules::OrderByTemplate;

/// The template-side inputs of one query assembly, shared across all field
/// combinations of a card.
#[derive(Debug, Clone, Copy)]
pub struct QueryParts<'a> {
    pub database: DatabaseId,
    pub table: TableId,
    /// Resolved filter bodies, still containing dimension references.
    pub filters: &'a [Form],
    /// Resolved metric bodies, still containing dimension references.
    pub metrics: &'a [Form],
    /// The card's metric identifiers, for order-by targets that name a
    /// metric rather than a dimension.
    pub metric_names: &'a [String],
    /// Dimension identifiers that become the breakout, in template order.
    pub dimensions: &'a [String],
    pub limit: Option<u64>,
    pub order_by: &'a [OrderByTemplate],
}

/// Assembles concrete queries for one principal.
#[derive(Clone, Copy)]
pub struct QueryBuilder<'a> {
    resolver: &'a ReferenceResolver,
    gate: &'a dyn PermissionGate,
    principal: &'a PermissionSet,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(
        resolver: &'a ReferenceResolver,
        gate: &'a dyn PermissionGate,
        principal: &'a PermissionSet,
    ) -> Self {
        Self {
            resolver,
            gate,
            principal,
        }
    }

    /// Assemble one query from the template parts and a concrete
    /// identifier-to-field assignment.
    ///
    /// Returns `None` when any dimension reference fails to resolve or the
    /// principal lacks full query permission over the result's scope. Both
    /// are expected narrowing, not errors.
    pub fn build(
        &self,
        parts: &QueryParts<'_>,
        assignment: &HashMap<String, FieldMetadata>,
    ) -> Option<QuerySpec> {
        let resolve = |identifier: &str| {
            assignment.get(identifier).map(|field| {
                self.resolver
                    .resolve(TemplateDialect::Query, &Referenceable::Field(field.clone()))
            })
        };

        let mut breakout = Vec::with_capacity(parts.dimensions.len());
        for identifier in parts.dimensions {
            breakout.push(resolve(identifier)?);
        }

        let mut aggregation = Vec::with_capacity(parts.metrics.len());
        for body in parts.metrics {
            aggregation.push(body.instantiate(&resolve)?);
        }

        let mut predicates = Vec::with_capacity(parts.filters.len());
        for body in parts.filters {
            predicates.push(body.instantiate(&resolve)?);
        }
        let mut predicates = predicates.into_iter();
        let filter = match (predicates.next(), predicates.len()) {
            (None, _) => None,
            (Some(single), 0) => Some(single),
            (Some(first), _) => {
                let mut all = vec![first];
                all.extend(predicates);
                Some(Form::op("and", all))
            }
        };

        let mut order_by = Vec::with_capacity(parts.order_by.len());
        for entry in parts.order_by {
            if let Some(target) = resolve(&entry.target) {
                order_by.push(OrderBy {
                    target,
                    direction: entry.direction,
                });
            } else if let Some(index) = parts
                .metric_names
                .iter()
                .position(|name| name == &entry.target)
            {
                order_by.push(OrderBy {
                    target: Form::op("aggregation", vec![Form::Int(index as i64)]),
                    direction: entry.direction,
                });
            }
            // An order-by naming neither a bound dimension nor a metric of
            // this card is dropped; it cannot fail the whole query.
        }

        let query = QuerySpec {
            database: parts.database,
            source_table: parts.table,
            filter,
            breakout,
            aggregation,
            limit: parts.limit,
            order_by,
        };

        if self
            .gate
            .has_full_permission(self.principal, &query, QueryPermissionMode::Write)
        {
            Some(query)
        } else {
            None
        }
    }
}
