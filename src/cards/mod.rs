//! Card candidate generation.
//!
//! A card template plus a bound context expands into one candidate per
//! element of the cartesian product of the referenced dimensions' match
//! lists. That product is combinatorial by nature - three dimensions with
//! ten matches each is a thousand queries - so expansion is an odometer
//! iterator, never a materialized product. Callers take as many candidates
//! as they want and stop.

use std::collections::HashMap;
use std::iter;

use crate::bind::Context;
use crate::metadata::FieldMetadata;
use crate::perms::{PermissionGate, PermissionSet};
use crate::query::{QueryBuilder, QueryParts, QuerySpec, ReferenceResolver};
use crate::rules::{CardTemplate, MAX_SCORE};

/// A concrete, permission-checked card: template presentation metadata,
/// the realized score, and the assembled query.
#[derive(Debug, Clone, PartialEq)]
pub struct CardCandidate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub display: Option<String>,
    pub score: f64,
    pub query: QuerySpec,
}

/// Expands card templates against one bound context and principal.
pub struct CandidateGenerator<'a> {
    context: &'a Context,
    resolver: &'a ReferenceResolver,
    gate: &'a dyn PermissionGate,
    principal: &'a PermissionSet,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(
        context: &'a Context,
        resolver: &'a ReferenceResolver,
        gate: &'a dyn PermissionGate,
        principal: &'a PermissionSet,
    ) -> Self {
        Self {
            context,
            resolver,
            gate,
            principal,
        }
    }

    /// Lazily generate every candidate the template yields.
    ///
    /// A template referencing an unresolved metric, filter, or dimension
    /// yields nothing - that narrowing is expected, not an error.
    /// Combinations that fail reference resolution or the permission gate
    /// are skipped the same way.
    pub fn candidates(
        &'a self,
        template: &'a CardTemplate,
    ) -> Box<dyn Iterator<Item = CardCandidate> + 'a> {
        let Some(resolved) = self.resolve_template(template) else {
            return Box::new(iter::empty());
        };
        let score = self.realized_score(template, &resolved);

        // Every dimension identifier referenced anywhere in the template
        // body: breakout list first, then metric and filter definitions.
        let mut identifiers: Vec<&str> = Vec::new();
        for identifier in &template.dimension_refs {
            push_unique(&mut identifiers, identifier);
        }
        for body in resolved.metrics.iter().chain(&resolved.filters) {
            for identifier in body.dimension_refs() {
                if let Some((name, _)) = self
                    .context
                    .dimension_bindings
                    .get_key_value(identifier.as_str())
                {
                    push_unique(&mut identifiers, name);
                }
            }
        }

        let mut match_lists = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            // Resolution above guarantees a binding for each identifier.
            let Some(binding) = self.context.dimension_bindings.get(identifier) else {
                return Box::new(iter::empty());
            };
            match_lists.push((identifier.to_string(), binding.matches.clone()));
        }

        let builder = QueryBuilder::new(self.resolver, self.gate, self.principal);
        let database = self.context.database_id;
        let table = self.context.root_table.id;

        Box::new(
            FieldCombinations::new(match_lists).filter_map(move |assignment| {
                let parts = QueryParts {
                    database,
                    table,
                    filters: &resolved.filters,
                    metrics: &resolved.metrics,
                    metric_names: &template.metric_refs,
                    dimensions: &template.dimension_refs,
                    limit: template.limit,
                    order_by: &template.order_by,
                };
                builder.build(&parts, &assignment).map(|query| CardCandidate {
                    title: template.title.clone(),
                    description: template.description.clone(),
                    display: template.display.clone(),
                    score,
                    query,
                })
            }),
        )
    }

    /// Look up every name the template references. `None` when any is
    /// unresolved in the context.
    fn resolve_template(&self, template: &CardTemplate) -> Option<ResolvedTemplate> {
        let component_count = template.filter_refs.len()
            + template.metric_refs.len()
            + template.dimension_refs.len();
        let mut component_scores = Vec::with_capacity(component_count);

        let mut filters = Vec::with_capacity(template.filter_refs.len());
        for name in &template.filter_refs {
            let definition = self.context.resolved_filters.get(name)?;
            component_scores.push(definition.score);
            filters.push(definition.body.clone());
        }

        let mut metrics = Vec::with_capacity(template.metric_refs.len());
        for name in &template.metric_refs {
            let definition = self.context.resolved_metrics.get(name)?;
            component_scores.push(definition.score);
            metrics.push(definition.body.clone());
        }

        for name in &template.dimension_refs {
            let binding = self.context.dimension_bindings.get(name)?;
            component_scores.push(binding.score);
        }

        Some(ResolvedTemplate {
            filters,
            metrics,
            component_scores,
        })
    }

    /// The template's static weight, normalized by how well its bound
    /// components individually scored:
    /// `score * sum(components) / (MAX_SCORE * count)`. A template with no
    /// scored components keeps its raw score.
    fn realized_score(&self, template: &CardTemplate, resolved: &ResolvedTemplate) -> f64 {
        let components = &resolved.component_scores;
        if components.is_empty() {
            return f64::from(template.score);
        }
        let total: u32 = components.iter().sum();
        f64::from(template.score) * f64::from(total)
            / (f64::from(MAX_SCORE) * components.len() as f64)
    }
}

struct ResolvedTemplate {
    filters: Vec<crate::query::Form>,
    metrics: Vec<crate::query::Form>,
    component_scores: Vec<u32>,
}

fn push_unique<'a>(identifiers: &mut Vec<&'a str>, identifier: &'a str) {
    if !identifiers.contains(&identifier) {
        identifiers.push(identifier);
    }
}

/// Odometer over per-identifier match lists.
///
/// Yields one identifier-to-field assignment per combination, rightmost
/// list advancing fastest. Zero identifiers yield exactly one empty
/// assignment (a card with no dimension references is still one query);
/// any empty match list yields nothing.
pub struct FieldCombinations {
    lists: Vec<(String, Vec<FieldMetadata>)>,
    positions: Vec<usize>,
    done: bool,
}

impl FieldCombinations {
    pub fn new(lists: Vec<(String, Vec<FieldMetadata>)>) -> Self {
        let done = lists.iter().any(|(_, matches)| matches.is_empty());
        Self {
            positions: vec![0; lists.len()],
            lists,
            done,
        }
    }
}

impl Iterator for FieldCombinations {
    type Item = HashMap<String, FieldMetadata>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let assignment = self
            .lists
            .iter()
            .zip(&self.positions)
            .map(|((identifier, matches), &position)| (identifier.clone(), matches[position].clone()))
            .collect();

        // Advance the odometer; wrapping past the leftmost list ends it.
        let mut index = self.lists.len();
        loop {
            if index == 0 {
                self.done = true;
                break;
            }
            index -= 1;
            self.positions[index] += 1;
            if self.positions[index] < self.lists[index].1.len() {
                break;
            }
            self.positions[index] = 0;
        }

        Some(assignment)
    }
}
