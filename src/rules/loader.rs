//! JSON rule document parsing and structural validation.
//!
//! The document format mirrors the in-memory model, with definition bodies
//! in the array form wire format:
//!
//! ```json
//! {
//!   "table_type": "entity/TransactionTable",
//!   "title": "Transaction overview",
//!   "dimensions": [
//!     {"name": "Timestamp", "field_type": "type/CreationTimestamp", "score": 100}
//!   ],
//!   "metrics": [
//!     {"name": "Count", "overloads": [{"definition": ["count"], "score": 100}]}
//!   ],
//!   "cards": [
//!     {"name": "count-over-time", "metrics": ["Count"],
//!      "dimensions": ["Timestamp"], "score": 100}
//!   ]
//! }
//! ```
//!
//! Validation covers the structural contract only: scores within bounds,
//! overload groups non-empty, card references pointing at declared names.
//! Whether a rule is any good is not this module's business.

use serde::Deserialize;

use crate::query::Form;
use crate::taxonomy::{FieldTypeSpec, TypeTag};

use super::{
    CardTemplate, DefinitionGroup, DimensionSpec, OrderByTemplate, Overload, Rule, RuleError,
    RuleResult, MAX_SCORE,
};

/// Parse a single rule from its JSON document form.
pub fn parse_rule(json: &str) -> RuleResult<Rule> {
    let doc: RuleDoc = serde_json::from_str(json).map_err(invalid)?;
    convert(doc)
}

/// Parse a JSON array of rule documents.
pub fn parse_rules(json: &str) -> RuleResult<Vec<Rule>> {
    let docs: Vec<RuleDoc> = serde_json::from_str(json).map_err(invalid)?;
    docs.into_iter().map(convert).collect()
}

fn invalid(err: impl ToString) -> RuleError {
    RuleError::InvalidRuleDefinition(err.to_string())
}

fn default_score() -> u32 {
    MAX_SCORE
}

#[derive(Debug, Deserialize)]
struct RuleDoc {
    table_type: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    dimensions: Vec<DimensionDoc>,
    #[serde(default)]
    metrics: Vec<GroupDoc>,
    #[serde(default)]
    filters: Vec<GroupDoc>,
    #[serde(default)]
    cards: Vec<CardDoc>,
}

#[derive(Debug, Deserialize)]
struct DimensionDoc {
    name: String,
    field_type: FieldTypeSpec,
    #[serde(default)]
    linked_to: Option<String>,
    #[serde(default = "default_score")]
    score: u32,
}

#[derive(Debug, Deserialize)]
struct GroupDoc {
    name: String,
    overloads: Vec<OverloadDoc>,
}

#[derive(Debug, Deserialize)]
struct OverloadDoc {
    definition: Form,
    #[serde(default = "default_score")]
    score: u32,
}

#[derive(Debug, Deserialize)]
struct CardDoc {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    display: Option<String>,
    #[serde(default)]
    metrics: Vec<String>,
    #[serde(default)]
    filters: Vec<String>,
    #[serde(default)]
    dimensions: Vec<String>,
    #[serde(default = "default_score")]
    score: u32,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    order_by: Vec<OrderByDoc>,
}

#[derive(Debug, Deserialize)]
struct OrderByDoc {
    target: String,
    #[serde(default)]
    direction: crate::query::SortDirection,
}

fn convert(doc: RuleDoc) -> RuleResult<Rule> {
    if !doc.table_type.contains('/') {
        return Err(invalid(format!(
            "table_type {:?} is not a type tag",
            doc.table_type
        )));
    }

    let mut dimensions = Vec::with_capacity(doc.dimensions.len());
    for dim in doc.dimensions {
        check_score(dim.score, &format!("dimension {:?}", dim.name))?;
        let mut spec = DimensionSpec::new(dim.field_type, dim.score);
        if let Some(linked) = dim.linked_to {
            if !linked.contains('/') {
                return Err(invalid(format!(
                    "dimension {:?}: linked_to {linked:?} is not a type tag",
                    dim.name
                )));
            }
            spec = spec.via_linked_table(TypeTag::new(linked));
        }
        dimensions.push((dim.name, spec));
    }

    let metrics = convert_groups(doc.metrics, "metric")?;
    let filters = convert_groups(doc.filters, "filter")?;

    let dimension_names: Vec<&str> = dimensions.iter().map(|(name, _)| name.as_str()).collect();
    let metric_names: Vec<&str> = metrics.iter().map(|g| g.name.as_str()).collect();
    let filter_names: Vec<&str> = filters.iter().map(|g| g.name.as_str()).collect();

    let mut cards = Vec::with_capacity(doc.cards.len());
    for card in doc.cards {
        check_score(card.score, &format!("card {:?}", card.name))?;
        check_refs(&card.metrics, &metric_names, &card.name, "metric")?;
        check_refs(&card.filters, &filter_names, &card.name, "filter")?;
        check_refs(&card.dimensions, &dimension_names, &card.name, "dimension")?;
        for order in &card.order_by {
            if !card.dimensions.iter().any(|d| d == &order.target)
                && !card.metrics.iter().any(|m| m == &order.target)
            {
                return Err(invalid(format!(
                    "card {:?}: order_by target {:?} is not one of the card's dimensions or metrics",
                    card.name, order.target
                )));
            }
        }
        let template = CardTemplate {
            title: card.title,
            description: card.description,
            display: card.display,
            metric_refs: card.metrics,
            filter_refs: card.filters,
            dimension_refs: card.dimensions,
            score: card.score,
            limit: card.limit,
            order_by: card
                .order_by
                .into_iter()
                .map(|o| OrderByTemplate {
                    target: o.target,
                    direction: o.direction,
                })
                .collect(),
        };
        cards.push((card.name, template));
    }

    Ok(Rule {
        table_type: TypeTag::new(doc.table_type),
        title: doc.title,
        description: doc.description,
        dimensions,
        metrics,
        filters,
        cards,
    })
}

fn convert_groups(docs: Vec<GroupDoc>, kind: &str) -> RuleResult<Vec<DefinitionGroup>> {
    let mut groups = Vec::with_capacity(docs.len());
    for group in docs {
        if group.overloads.is_empty() {
            return Err(invalid(format!("{kind} {:?} has no definitions", group.name)));
        }
        let mut overloads = Vec::with_capacity(group.overloads.len());
        for overload in group.overloads {
            check_score(overload.score, &format!("{kind} {:?}", group.name))?;
            overloads.push(Overload {
                body: overload.definition,
                score: overload.score,
            });
        }
        groups.push(DefinitionGroup {
            name: group.name,
            overloads,
        });
    }
    Ok(groups)
}

fn check_score(score: u32, what: &str) -> RuleResult<()> {
    if score > MAX_SCORE {
        return Err(invalid(format!(
            "{what}: score {score} exceeds the maximum of {MAX_SCORE}"
        )));
    }
    Ok(())
}

fn check_refs(refs: &[String], declared: &[&str], card: &str, kind: &str) -> RuleResult<()> {
    for reference in refs {
        if !declared.contains(&reference.as_str()) {
            return Err(invalid(format!(
                "card {card:?} references undeclared {kind} {reference:?}"
            )));
        }
    }
    Ok(())
}
