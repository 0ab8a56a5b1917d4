//! Concrete query specifications.

use serde::{Deserialize, Serialize};

use super::form::Form;
use crate::metadata::{DatabaseId, TableId};

/// Sort direction for an order-by entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Ascending
    }
}

/// One order-by entry of an assembled query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub target: Form,
    pub direction: SortDirection,
}

/// A fully assembled query in the execution dialect.
///
/// Every dimension reference has been materialized to a concrete field
/// reference; the spec is ready to hand to a query executor as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub database: DatabaseId,
    pub source_table: TableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Form>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakout: Vec<Form>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregation: Vec<Form>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
}
