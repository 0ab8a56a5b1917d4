//! Binding a rule to a concrete table.
//!
//! Three dependent passes populate a fresh [`Context`] per rule
//! application:
//!
//! ```text
//! dimensions  -  field candidates per declared dimension (matcher)
//!     |
//!     v
//! metrics     -  best eligible overload per metric name
//!     |
//!     v
//! filters     -  best eligible overload per filter name
//! ```
//!
//! Metric and filter eligibility depends on which dimensions bound, which
//! is why the order is fixed. Each pass takes the immutable prior context
//! and returns a new one; nothing is mutated after construction.

mod context;
mod dimensions;
mod matcher;
mod overloads;

pub use context::{Binding, Context, ResolvedDefinition};
pub use dimensions::bind_dimensions;
pub use matcher::{match_fields, match_fields_across};
pub use overloads::resolve_overloads;
