//! Engine-level error type.
//!
//! The pipeline favors silent narrowing over raised failures: unmatched
//! dimensions, ineligible overloads, and permission-denied queries all
//! shrink the result instead of erroring. What *does* error is a failing
//! collaborator - those are distinct kinds here because the engine cannot
//! recover from them.

use thiserror::Error;

use crate::dashboard::SinkError;
use crate::metadata::MetadataError;
use crate::rules::RuleError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// The metadata store failed or returned inconsistent metadata.
    #[error(transparent)]
    MetadataUnavailable(#[from] MetadataError),

    /// The rule library produced a structurally invalid rule.
    #[error(transparent)]
    InvalidRuleDefinition(#[from] RuleError),

    /// The dashboard-creation collaborator rejected the assembled
    /// dashboard.
    #[error(transparent)]
    DashboardSink(#[from] SinkError),
}
