//! Domain rules: the static knowledge the engine applies to a table.
//!
//! A rule says "for tables of this entity type, these are the interesting
//! dimensions, metrics, filters, and cards". Rules arrive fully parsed
//! through the [`RuleLibrary`] collaborator; [`loader`] turns the JSON rule
//! document format into validated [`Rule`] values; [`select`] picks the
//! most specific applicable rule for a table.
//!
//! All containers are ordered so that first-seen tie-breaks are
//! deterministic across runs.

pub mod loader;
pub mod select;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::{Form, SortDirection};
use crate::taxonomy::{FieldTypeSpec, TypeTag};

pub use loader::{parse_rule, parse_rules};
pub use select::select_rule;

/// The ceiling for every static score in a rule definition. Candidate
/// score normalization divides by this, which is what keeps realized
/// scores within a template's own weight.
pub const MAX_SCORE: u32 = 100;

/// Result type for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors surfaced by the rule library.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuleError {
    #[error("invalid rule definition: {0}")]
    InvalidRuleDefinition(String),
}

/// A dimension declaration: which fields qualify, and how much a binding
/// is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub field_type: FieldTypeSpec,
    /// When present, match fields on a table of this entity type reachable
    /// by one foreign-key hop, instead of on the root table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_table_type: Option<TypeTag>,
    pub score: u32,
}

impl DimensionSpec {
    pub fn new(field_type: FieldTypeSpec, score: u32) -> Self {
        Self {
            field_type,
            linked_table_type: None,
            score,
        }
    }

    #[must_use]
    pub fn via_linked_table(mut self, table_type: TypeTag) -> Self {
        self.linked_table_type = Some(table_type);
        self
    }
}

/// One scored alternative definition of a metric or filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overload {
    pub body: Form,
    pub score: u32,
}

/// A named group of overloaded definitions. The best eligible overload
/// (all referenced dimensions bound) wins the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionGroup {
    pub name: String,
    pub overloads: Vec<Overload>,
}

/// An order-by entry of a card template, referencing a dimension or metric
/// of the same card by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByTemplate {
    pub target: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// A parametrized query blueprint within a rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Presentation hint for the dashboard (e.g. "line", "bar"). Rides
    /// along to the sink; never influences scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default)]
    pub metric_refs: Vec<String>,
    #[serde(default)]
    pub filter_refs: Vec<String>,
    #[serde(default)]
    pub dimension_refs: Vec<String>,
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderByTemplate>,
}

/// A complete domain rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// The table entity type this rule applies to (and everything below it
    /// in the taxonomy).
    pub table_type: TypeTag,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered dimension declarations. The same identifier may recur; the
    /// binder keeps the highest-scoring binding.
    #[serde(default)]
    pub dimensions: Vec<(String, DimensionSpec)>,
    #[serde(default)]
    pub metrics: Vec<DefinitionGroup>,
    #[serde(default)]
    pub filters: Vec<DefinitionGroup>,
    /// Named card templates, in presentation order.
    #[serde(default)]
    pub cards: Vec<(String, CardTemplate)>,
}

/// The rule library collaborator: hands the engine fully parsed rules.
pub trait RuleLibrary {
    fn load_rules(&self) -> RuleResult<Vec<Rule>>;
}

/// A rule library over an in-memory rule list.
#[derive(Debug, Clone, Default)]
pub struct StaticRuleLibrary {
    rules: Vec<Rule>,
}

impl StaticRuleLibrary {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse a JSON rule document (an array of rules) into a library.
    pub fn from_json(json: &str) -> RuleResult<Self> {
        Ok(Self::new(parse_rules(json)?))
    }
}

impl RuleLibrary for StaticRuleLibrary {
    fn load_rules(&self) -> RuleResult<Vec<Rule>> {
        Ok(self.rules.clone())
    }
}
