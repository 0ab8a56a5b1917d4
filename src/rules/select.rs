//! Rule selection by type specificity.

use crate::metadata::TableMetadata;
use crate::taxonomy::{tags, Taxonomy, TypeTag};

use super::Rule;

/// Pick the most specific rule that applies to `table`.
///
/// A rule applies when its `table_type` is an ancestor of (or equal to)
/// the table's entity type; a table without an entity type counts as
/// generic. Among applicable rules the one whose `table_type` has the
/// longest ancestor chain wins. Returns `None` when no rule applies -
/// the caller must treat that as "no dashboard can be generated".
///
/// Two applicable rules at equal, maximal specificity are an undefined
/// case: the first in iteration order is returned, and callers must not
/// rely on which one that is.
pub fn select_rule<'a>(
    taxonomy: &Taxonomy,
    rules: &'a [Rule],
    table: &TableMetadata,
) -> Option<&'a Rule> {
    let entity_type = table
        .entity_type
        .clone()
        .unwrap_or_else(|| TypeTag::from(tags::GENERIC_TABLE));

    let mut best: Option<(&Rule, usize)> = None;
    for rule in rules {
        if !taxonomy.is_subtype(&entity_type, &rule.table_type) {
            continue;
        }
        let specificity = taxonomy.ancestor_chain_len(&rule.table_type);
        if best.map_or(true, |(_, current)| specificity > current) {
            best = Some((rule, specificity));
        }
    }
    best.map(|(rule, _)| rule)
}
