//! Dimension binding.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::rules::DimensionSpec;
use crate::taxonomy::Taxonomy;

use super::matcher::{match_fields, match_fields_across};
use super::{Binding, Context};

/// Bind each declared dimension to its matching fields.
///
/// Declarations with no matches are discarded, never retained empty. When
/// an identifier recurs, the higher-scoring binding wins; on a tie the
/// first-seen binding is kept.
pub fn bind_dimensions(
    taxonomy: &Taxonomy,
    context: &Context,
    specs: &[(String, DimensionSpec)],
) -> HashMap<String, Binding> {
    let mut bindings: HashMap<String, Binding> = HashMap::new();
    for (identifier, spec) in specs {
        let matches = match &spec.linked_table_type {
            Some(table_type) => {
                match_fields_across(taxonomy, table_type, &spec.field_type, context)
            }
            None => match_fields(taxonomy, &spec.field_type, &context.fields),
        };
        if matches.is_empty() {
            continue;
        }
        let binding = Binding {
            matches,
            score: spec.score,
        };
        match bindings.entry(identifier.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(binding);
            }
            Entry::Occupied(mut entry) => {
                if binding.score > entry.get().score {
                    entry.insert(binding);
                }
            }
        }
    }
    bindings
}
