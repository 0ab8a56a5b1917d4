//! Field candidate matching.

use crate::metadata::FieldMetadata;
use crate::taxonomy::{tags, FieldTypeSpec, Taxonomy, TypeTag};

use super::Context;

/// All fields matching a field-type spec.
///
/// A literal special name matches by exact field-name equality; a type tag
/// matches when the field's base type or special type is a subtype of it.
/// The two cases never mix.
pub fn match_fields(
    taxonomy: &Taxonomy,
    spec: &FieldTypeSpec,
    fields: &[FieldMetadata],
) -> Vec<FieldMetadata> {
    fields
        .iter()
        .filter(|field| field_matches(taxonomy, spec, field))
        .cloned()
        .collect()
}

fn field_matches(taxonomy: &Taxonomy, spec: &FieldTypeSpec, field: &FieldMetadata) -> bool {
    match spec {
        FieldTypeSpec::Named(name) => field.name == *name,
        FieldTypeSpec::Type(tag) => {
            taxonomy.is_subtype(&field.base_type, tag)
                || field
                    .special_type
                    .as_ref()
                    .map_or(false, |special| taxonomy.is_subtype(special, tag))
        }
    }
}

/// Match fields on a table one foreign-key hop away.
///
/// Takes the *first* linked table (in the root table's field traversal
/// order) whose entity type is a subtype of `table_type`; ties between
/// equally qualified linked tables are not disambiguated beyond that
/// order. Returns empty when no linked table qualifies. Every returned
/// field is tagged with the foreign-key field that reached it.
pub fn match_fields_across(
    taxonomy: &Taxonomy,
    table_type: &TypeTag,
    spec: &FieldTypeSpec,
    context: &Context,
) -> Vec<FieldMetadata> {
    let qualifies = |linked: &&crate::metadata::LinkedTable| {
        let entity_type = linked
            .table
            .entity_type
            .clone()
            .unwrap_or_else(|| TypeTag::from(tags::GENERIC_TABLE));
        taxonomy.is_subtype(&entity_type, table_type)
    };
    let Some(linked) = context.linked_tables.iter().find(qualifies) else {
        return Vec::new();
    };

    match_fields(taxonomy, spec, context.linked_table_fields(linked.table.id))
        .into_iter()
        .map(|field| field.with_link(linked.via_fk_field_id))
        .collect()
}
