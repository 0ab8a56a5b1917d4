//! Type taxonomy - a subtype relation over domain type tags.
//!
//! Type tags are data, not implementation types: field base types
//! (`type/Temporal`), semantic types (`type/CreationTimestamp`) and table
//! entity types (`entity/TransactionTable`) all live in one explicit DAG.
//! Every matching step in the pipeline goes through [`Taxonomy::is_subtype`];
//! rule specificity goes through [`Taxonomy::ancestor_chain_len`].
//!
//! Special dimension names (plain strings without a `/` namespace) are not
//! tags at all - they match fields by exact name and never enter the
//! taxonomy. [`FieldTypeSpec`] keeps the two cases disjoint.

use once_cell::sync::Lazy;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Well-known tag names used by the built-in taxonomy and the test fixtures.
pub mod tags {
    pub const TEXT: &str = "type/Text";
    pub const NAME: &str = "type/Name";
    pub const CITY: &str = "type/City";
    pub const STATE: &str = "type/State";
    pub const COUNTRY: &str = "type/Country";

    pub const NUMBER: &str = "type/Number";
    pub const INTEGER: &str = "type/Integer";
    pub const BIG_INTEGER: &str = "type/BigInteger";
    pub const FLOAT: &str = "type/Float";
    pub const DECIMAL: &str = "type/Decimal";
    pub const INCOME: &str = "type/Income";
    pub const QUANTITY: &str = "type/Quantity";

    pub const TEMPORAL: &str = "type/Temporal";
    pub const DATE_TIME: &str = "type/DateTime";
    pub const DATE: &str = "type/Date";
    pub const TIME: &str = "type/Time";
    pub const CREATION_TIMESTAMP: &str = "type/CreationTimestamp";

    pub const BOOLEAN: &str = "type/Boolean";

    pub const PRIMARY_KEY: &str = "type/PK";
    pub const FOREIGN_KEY: &str = "type/FK";
    pub const CATEGORY: &str = "type/Category";

    pub const GENERIC_TABLE: &str = "entity/GenericTable";
    pub const TRANSACTION_TABLE: &str = "entity/TransactionTable";
    pub const EVENT_TABLE: &str = "entity/EventTable";
    pub const USER_TABLE: &str = "entity/UserTable";
}

/// An opaque identifier in the type hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A rule's field selector: either a type tag (subtype match) or a literal
/// special dimension name (exact field-name match).
///
/// The two cases are disjoint by construction - a literal name is never
/// subtype-compared, a tag is never name-compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTypeSpec {
    /// Match fields whose base or special type is a subtype of this tag.
    Type(TypeTag),
    /// Match fields by exact name.
    Named(String),
}

impl FieldTypeSpec {
    /// Parse the textual form used in rule definitions: namespaced strings
    /// (`type/...`, `entity/...`) are tags, anything else is a literal name.
    pub fn parse(spec: &str) -> Self {
        if spec.contains('/') {
            FieldTypeSpec::Type(TypeTag::new(spec))
        } else {
            FieldTypeSpec::Named(spec.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldTypeSpec::Type(tag) => tag.as_str(),
            FieldTypeSpec::Named(name) => name,
        }
    }
}

impl fmt::Display for FieldTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldTypeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldTypeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spec = String::deserialize(deserializer)?;
        Ok(FieldTypeSpec::parse(&spec))
    }
}

/// The subtype relation, stored as an explicit DAG.
///
/// Edges point child -> parent, so reachability from a tag yields its
/// ancestor set. Multiple parents are allowed (`type/Name` is both
/// `type/Text` and `type/Category` in the built-in hierarchy).
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    graph: DiGraph<TypeTag, ()>,
    index: HashMap<TypeTag, NodeIndex>,
}

impl Taxonomy {
    pub fn builder() -> TaxonomyBuilder {
        TaxonomyBuilder {
            taxonomy: Taxonomy::default(),
        }
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.index.contains_key(tag)
    }

    /// Is `tag` a subtype of `ancestor`? Reflexive: every tag is a subtype
    /// of itself, known to the taxonomy or not.
    pub fn is_subtype(&self, tag: &TypeTag, ancestor: &TypeTag) -> bool {
        if tag == ancestor {
            return true;
        }
        let (Some(start), Some(target)) = (self.node(tag), self.node(ancestor)) else {
            return false;
        };
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            if node == target {
                return true;
            }
        }
        false
    }

    /// Number of distinct proper ancestors of `tag` - the tag's distance
    /// from the taxonomy's roots. Roots and unknown tags have length 0.
    pub fn ancestor_chain_len(&self, tag: &TypeTag) -> usize {
        let Some(start) = self.node(tag) else {
            return 0;
        };
        let mut count = 0;
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            if node != start {
                count += 1;
            }
        }
        count
    }

    fn node(&self, tag: &TypeTag) -> Option<NodeIndex> {
        self.index.get(tag).copied()
    }
}

/// Builder for [`Taxonomy`]. Parents named before or after their children
/// are both fine; unseen parents are registered on first mention. Cycles are
/// the caller's responsibility - the relation is declared, not checked.
#[derive(Debug, Default)]
pub struct TaxonomyBuilder {
    taxonomy: Taxonomy,
}

impl TaxonomyBuilder {
    /// Register a tag with no parents.
    #[must_use]
    pub fn root(self, tag: impl Into<TypeTag>) -> Self {
        self.tag(tag, &[])
    }

    /// Register a tag under the given parents.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<TypeTag>, parents: &[&str]) -> Self {
        let child = self.ensure(tag.into());
        for parent in parents {
            let parent = self.ensure(TypeTag::from(*parent));
            self.taxonomy.graph.update_edge(child, parent, ());
        }
        self
    }

    pub fn build(self) -> Taxonomy {
        self.taxonomy
    }

    fn ensure(&mut self, tag: TypeTag) -> NodeIndex {
        if let Some(&index) = self.taxonomy.index.get(&tag) {
            return index;
        }
        let index = self.taxonomy.graph.add_node(tag.clone());
        self.taxonomy.index.insert(tag, index);
        index
    }
}

static DEFAULT_TAXONOMY: Lazy<Taxonomy> = Lazy::new(|| {
    Taxonomy::builder()
        // Field base types
        .root(tags::TEXT)
        .tag(tags::NAME, &[tags::TEXT, tags::CATEGORY])
        .tag(tags::CITY, &[tags::TEXT, tags::CATEGORY])
        .tag(tags::STATE, &[tags::TEXT, tags::CATEGORY])
        .tag(tags::COUNTRY, &[tags::TEXT, tags::CATEGORY])
        .root(tags::NUMBER)
        .tag(tags::INTEGER, &[tags::NUMBER])
        .tag(tags::BIG_INTEGER, &[tags::INTEGER])
        .tag(tags::FLOAT, &[tags::NUMBER])
        .tag(tags::DECIMAL, &[tags::FLOAT])
        .tag(tags::INCOME, &[tags::NUMBER])
        .tag(tags::QUANTITY, &[tags::INTEGER])
        .root(tags::TEMPORAL)
        .tag(tags::DATE_TIME, &[tags::TEMPORAL])
        .tag(tags::DATE, &[tags::TEMPORAL])
        .tag(tags::TIME, &[tags::TEMPORAL])
        .tag(tags::CREATION_TIMESTAMP, &[tags::DATE_TIME])
        .root(tags::BOOLEAN)
        // Semantic types
        .root(tags::CATEGORY)
        .root(tags::PRIMARY_KEY)
        .root(tags::FOREIGN_KEY)
        // Table entity types
        .root(tags::GENERIC_TABLE)
        .tag(tags::TRANSACTION_TABLE, &[tags::GENERIC_TABLE])
        .tag(tags::EVENT_TABLE, &[tags::GENERIC_TABLE])
        .tag(tags::USER_TABLE, &[tags::GENERIC_TABLE])
        .build()
});

/// The built-in hierarchy covering the standard field and entity tags.
pub fn default_taxonomy() -> &'static Taxonomy {
    &DEFAULT_TAXONOMY
}
