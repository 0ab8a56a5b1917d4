//! Access control over generated queries.
//!
//! Authorization context is an explicit input: the principal's permission
//! set is threaded through query building as a parameter, never read from
//! ambient state. The gate itself is a collaborator trait - the engine only
//! asks one question, "may this principal run this query", once per
//! assembled spec.

use std::collections::HashSet;

use crate::metadata::{DatabaseId, TableId};
use crate::query::QuerySpec;

/// The permission level a check is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPermissionMode {
    Read,
    /// Full write-equivalent query permission. Generated candidates are
    /// checked at this level.
    Write,
}

/// An explicit set of grants held by a principal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionSet {
    unrestricted: bool,
    databases: HashSet<DatabaseId>,
    tables: HashSet<(DatabaseId, TableId)>,
}

impl PermissionSet {
    /// A principal with no grants at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// A principal allowed everything.
    pub fn unrestricted() -> Self {
        Self {
            unrestricted: true,
            ..Self::default()
        }
    }

    /// Grant full access to every table of a database.
    #[must_use]
    pub fn with_database(mut self, database: DatabaseId) -> Self {
        self.databases.insert(database);
        self
    }

    /// Grant full access to a single table.
    #[must_use]
    pub fn with_table(mut self, database: DatabaseId, table: TableId) -> Self {
        self.tables.insert((database, table));
        self
    }

    pub fn covers_table(&self, database: DatabaseId, table: TableId) -> bool {
        self.unrestricted
            || self.databases.contains(&database)
            || self.tables.contains(&(database, table))
    }
}

/// The access-control decision service.
pub trait PermissionGate {
    /// Must the principal be allowed to run `query` at the given level?
    ///
    /// Anything short of full permission over the query's required scope
    /// means "no" - there is no partial grant.
    fn has_full_permission(
        &self,
        principal: &PermissionSet,
        query: &QuerySpec,
        mode: QueryPermissionMode,
    ) -> bool;
}

/// Gate implementation that checks a query's table scope against the
/// principal's explicit grants. Both modes require the same full grant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedPermissions;

impl PermissionGate for ScopedPermissions {
    fn has_full_permission(
        &self,
        principal: &PermissionSet,
        query: &QuerySpec,
        _mode: QueryPermissionMode,
    ) -> bool {
        principal.covers_table(query.database, query.source_table)
    }
}
