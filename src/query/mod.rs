//! The execution-query dialect: template forms, concrete query specs,
//! reference resolution, and clause assembly.
//!
//! Rule bodies are written against dimension *identifiers*; nothing here
//! knows about matching or scoring. The [`builder::QueryBuilder`] replaces
//! every dimension-reference node with a concrete field reference resolved
//! through [`reference::ReferenceResolver`], assembles the clauses, and
//! applies the access-control gate before a query is allowed to exist.

pub mod builder;
pub mod form;
pub mod reference;
pub mod spec;

pub use builder::{QueryBuilder, QueryParts};
pub use form::{FieldReference, Form};
pub use reference::{Referenceable, ReferenceableKind, ReferenceResolver, TemplateDialect};
pub use spec::{OrderBy, QuerySpec, SortDirection};
