//! # Glimpse
//!
//! A heuristic insight engine: given the metadata of one table and a
//! library of domain rules, it selects the most applicable rule and
//! synthesizes a ranked dashboard of analytical queries - no user ever
//! authors one.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Rule Library (domain knowledge)             │
//! │   (dimensions, metrics, filters, card templates)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [rules::select - most specific table type]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Selected Rule                         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [bind - dimensions, then metrics, filters]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Context (field bindings + overloads)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [cards - streamed cartesian expansion]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Card Candidates (scored, permission-checked)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [dashboard - best group per template, ranked]
//! ┌─────────────────────────────────────────────────────────┐
//! │                Dashboard Sink (collaborator)             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The pipeline is pure and synchronous. Missing matches narrow the
//! result silently; only collaborator failures error. See
//! [`dashboard::DashboardEngine`] for the entry point.

pub mod bind;
pub mod cards;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod metadata;
pub mod perms;
pub mod query;
pub mod rules;
pub mod taxonomy;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::bind::{Binding, Context, ResolvedDefinition};
    pub use crate::cards::{CandidateGenerator, CardCandidate};
    pub use crate::config::EngineConfig;
    pub use crate::dashboard::{
        DashboardEngine, DashboardId, DashboardSink, RecordingSink, SinkError,
    };
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::metadata::{
        DatabaseId, FieldId, FieldMetadata, LinkedTable, MetadataProvider,
        StaticMetadataProvider, TableId, TableMetadata,
    };
    pub use crate::perms::{PermissionGate, PermissionSet, QueryPermissionMode, ScopedPermissions};
    pub use crate::query::{FieldReference, Form, QuerySpec, ReferenceResolver, TemplateDialect};
    pub use crate::rules::{
        CardTemplate, DefinitionGroup, DimensionSpec, Overload, Rule, RuleLibrary,
        StaticRuleLibrary, MAX_SCORE,
    };
    pub use crate::taxonomy::{default_taxonomy, tags, FieldTypeSpec, Taxonomy, TypeTag};
}

pub use dashboard::DashboardEngine;
pub use error::{EngineError, EngineResult};
