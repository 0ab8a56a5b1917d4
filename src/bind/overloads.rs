//! Overload resolution for metrics and filters.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::rules::DefinitionGroup;

use super::{Binding, ResolvedDefinition};

/// Pick the best eligible overload for each definition group.
///
/// An overload is eligible only when every dimension identifier its body
/// references has a (necessarily non-empty) binding. Names with no
/// eligible overload are absent from the result; any card referencing them
/// later fails to materialize. Ties keep the first-seen overload.
pub fn resolve_overloads(
    bindings: &HashMap<String, Binding>,
    groups: &[DefinitionGroup],
) -> HashMap<String, ResolvedDefinition> {
    let mut resolved: HashMap<String, ResolvedDefinition> = HashMap::new();
    for group in groups {
        let mut best: Option<&crate::rules::Overload> = None;
        for overload in &group.overloads {
            let eligible = overload
                .body
                .dimension_refs()
                .iter()
                .all(|identifier| bindings.contains_key(identifier));
            if !eligible {
                continue;
            }
            if best.map_or(true, |current| overload.score > current.score) {
                best = Some(overload);
            }
        }
        let Some(best) = best else {
            continue;
        };
        let definition = ResolvedDefinition {
            body: best.body.clone(),
            score: best.score,
        };
        match resolved.entry(group.name.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(definition);
            }
            Entry::Occupied(mut entry) => {
                if definition.score > entry.get().score {
                    entry.insert(definition);
                }
            }
        }
    }
    resolved
}
