//! Dashboard assembly - the top of the pipeline.
//!
//! One call to [`DashboardEngine::build_dashboard`] runs the whole
//! heuristic pipeline for one root table:
//!
//! ```text
//! select rule -> build context (dimensions, metrics, filters)
//!             -> expand card templates (capped, streamed)
//!             -> keep the best group per template name
//!             -> rank and hand off to the dashboard sink
//! ```
//!
//! The pipeline is pure and synchronous; its only side effects are the
//! terminal sink call and the per-candidate permission checks. Concurrent
//! invocations for different tables need no coordination - every run
//! builds its context fresh.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bind::Context;
use crate::cards::{CandidateGenerator, CardCandidate};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::metadata::{MetadataProvider, TableId};
use crate::perms::{PermissionGate, PermissionSet};
use crate::query::ReferenceResolver;
use crate::rules::{select_rule, Rule, RuleLibrary};
use crate::taxonomy::Taxonomy;

/// Identifier of a created dashboard, assigned by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardId(pub u64);

impl std::fmt::Display for DashboardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error from the dashboard-creation collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("dashboard sink failed: {0}")]
pub struct SinkError(pub String);

/// The dashboard-creation collaborator. From the engine's perspective the
/// call is fire-and-forget; whatever identifier comes back is the
/// caller-visible result.
pub trait DashboardSink {
    fn create_dashboard(
        &self,
        title: &str,
        description: Option<&str>,
        cards: &[CardCandidate],
    ) -> Result<DashboardId, SinkError>;
}

/// A dashboard as captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedDashboard {
    pub id: DashboardId,
    pub title: String,
    pub description: Option<String>,
    pub cards: Vec<CardCandidate>,
}

/// Sink that records every created dashboard in memory. Ids are assigned
/// sequentially from 1.
#[derive(Debug, Default)]
pub struct RecordingSink {
    created: RefCell<Vec<CreatedDashboard>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<CreatedDashboard> {
        self.created.borrow().clone()
    }
}

impl DashboardSink for RecordingSink {
    fn create_dashboard(
        &self,
        title: &str,
        description: Option<&str>,
        cards: &[CardCandidate],
    ) -> Result<DashboardId, SinkError> {
        let mut created = self.created.borrow_mut();
        let id = DashboardId(created.len() as u64 + 1);
        created.push(CreatedDashboard {
            id,
            title: title.to_string(),
            description: description.map(str::to_string),
            cards: cards.to_vec(),
        });
        Ok(id)
    }
}

/// The pipeline orchestrator.
pub struct DashboardEngine<'a, M, G, S> {
    provider: &'a M,
    gate: &'a G,
    sink: &'a S,
    taxonomy: &'a Taxonomy,
    resolver: ReferenceResolver,
    config: EngineConfig,
}

impl<'a, M, G, S> DashboardEngine<'a, M, G, S>
where
    M: MetadataProvider,
    G: PermissionGate,
    S: DashboardSink,
{
    pub fn new(provider: &'a M, gate: &'a G, sink: &'a S, taxonomy: &'a Taxonomy) -> Self {
        Self {
            provider,
            gate,
            sink,
            taxonomy,
            resolver: ReferenceResolver::default(),
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap in a reference resolver with additional dialect registrations.
    #[must_use]
    pub fn with_resolver(mut self, resolver: ReferenceResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Run the pipeline for one root table against an explicit rule list.
    ///
    /// `Ok(None)` means no dashboard could be generated: no rule applies
    /// to the table, or every candidate card failed binding or permission.
    /// Collaborator failures propagate as [`crate::error::EngineError`].
    pub fn build_dashboard(
        &self,
        table_id: TableId,
        rules: &[Rule],
        principal: &PermissionSet,
    ) -> EngineResult<Option<DashboardId>> {
        let table = self.provider.table(table_id)?;
        let Some(rule) = select_rule(self.taxonomy, rules, &table) else {
            return Ok(None);
        };

        let context = Context::for_rule(self.provider, self.taxonomy, table, rule)?;
        let generator = CandidateGenerator::new(&context, &self.resolver, self.gate, principal);
        let cap = self.config.candidate_cap();

        // Best candidate group per template name. Rules do not normally
        // reuse a name, but a collision keeps the higher-peaking group.
        let mut groups: HashMap<&str, Vec<CardCandidate>> = HashMap::new();
        for (name, template) in &rule.cards {
            let candidates: Vec<CardCandidate> = match cap {
                Some(limit) => generator.candidates(template).take(limit).collect(),
                None => generator.candidates(template).collect(),
            };
            if candidates.is_empty() {
                continue;
            }
            match groups.entry(name.as_str()) {
                Entry::Vacant(entry) => {
                    entry.insert(candidates);
                }
                Entry::Occupied(mut entry) => {
                    if peak_score(&candidates) > peak_score(entry.get()) {
                        entry.insert(candidates);
                    }
                }
            }
        }

        let mut cards: Vec<CardCandidate> = groups.into_values().flatten().collect();
        if cards.is_empty() {
            return Ok(None);
        }
        cards.sort_by(|a, b| b.score.total_cmp(&a.score));

        let id = self
            .sink
            .create_dashboard(&rule.title, rule.description.as_deref(), &cards)?;
        Ok(Some(id))
    }

    /// Convenience: load rules from a library, then build.
    pub fn build_from_library<L: RuleLibrary>(
        &self,
        table_id: TableId,
        library: &L,
        principal: &PermissionSet,
    ) -> EngineResult<Option<DashboardId>> {
        let rules = library.load_rules()?;
        self.build_dashboard(table_id, &rules, principal)
    }
}

fn peak_score(cards: &[CardCandidate]) -> f64 {
    cards.iter().map(|card| card.score).fold(f64::MIN, f64::max)
}
