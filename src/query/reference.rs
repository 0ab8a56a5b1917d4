//! Reference resolution: from a bound entity to the form a target template
//! dialect expects.
//!
//! Dispatch is a lookup table keyed by `(dialect, entity kind)` with a
//! literal-passthrough default. New dialects register their own resolver
//! functions; existing cases are never touched.

use std::collections::HashMap;

use super::form::{FieldReference, Form};
use crate::metadata::FieldMetadata;

/// The template dialect a reference is being materialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateDialect {
    /// The execution-query dialect of [`crate::query::QuerySpec`].
    Query,
}

/// An entity a binding match can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Referenceable {
    Field(FieldMetadata),
    /// Anything already expressed as a form, carried through verbatim.
    Literal(Form),
}

impl Referenceable {
    pub fn kind(&self) -> ReferenceableKind {
        match self {
            Referenceable::Field(_) => ReferenceableKind::Field,
            Referenceable::Literal(_) => ReferenceableKind::Literal,
        }
    }
}

/// Dispatch key for the entity side of the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceableKind {
    Field,
    Literal,
}

/// A resolver for one `(dialect, entity kind)` pair.
pub type ResolverFn = fn(&Referenceable) -> Form;

/// The reference lookup table.
///
/// Pairs without a registered resolver fall through to literal passthrough.
/// A bare field has no literal form, so its passthrough degenerates to a
/// plain id reference.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    table: HashMap<(TemplateDialect, ReferenceableKind), ResolverFn>,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        let mut resolver = Self {
            table: HashMap::new(),
        };
        resolver.register(
            TemplateDialect::Query,
            ReferenceableKind::Field,
            query_field_reference,
        );
        resolver
    }
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the resolver for one dispatch pair.
    pub fn register(
        &mut self,
        dialect: TemplateDialect,
        kind: ReferenceableKind,
        resolver: ResolverFn,
    ) {
        self.table.insert((dialect, kind), resolver);
    }

    pub fn resolve(&self, dialect: TemplateDialect, entity: &Referenceable) -> Form {
        match self.table.get(&(dialect, entity.kind())) {
            Some(resolver) => resolver(entity),
            None => passthrough(entity),
        }
    }
}

/// Field references for the execution-query dialect.
///
/// A field reached through a linked table keeps the foreign-key hop that
/// found it (`["fk->", link, id]`); a field that is itself a foreign key
/// chains through to its target; everything else is a direct reference.
fn query_field_reference(entity: &Referenceable) -> Form {
    let Referenceable::Field(field) = entity else {
        return passthrough(entity);
    };
    let reference = if let Some(link) = field.link {
        FieldReference::ForeignKey(link, field.id)
    } else if let Some(target) = field.fk_target_field_id {
        FieldReference::ForeignKey(field.id, target)
    } else {
        FieldReference::Field(field.id)
    };
    Form::FieldRef(reference)
}

fn passthrough(entity: &Referenceable) -> Form {
    match entity {
        Referenceable::Literal(form) => form.clone(),
        Referenceable::Field(field) => Form::FieldRef(FieldReference::Field(field.id)),
    }
}
