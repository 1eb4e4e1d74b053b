//! Compiler for the compact filter syntax accepted by the catalog read API.
//!
//! A filter string is a `;`-separated list of expressions, each expression a
//! `_`-separated list of parts:
//!
//! - `field_op_value` with `op` one of `eq`, `lt`, `lte`, `gt`, `gte`
//! - `field_op_v1_v2_...` matches `field` against any of the values (the
//!   operator is ignored)
//! - anything shorter is ignored
//!
//! ```
//! use serde_json::json;
//!
//! let predicate = filter_query::compile("rarityscore_gte_10.2;isvirgin_eq_true");
//! assert_eq!(
//!     predicate.into_value(),
//!     json!({ "rarityscore": { "$gte": 10.2 }, "isvirgin": true })
//! );
//! ```
//!
//! Compilation never fails. Constraints that cannot be built are dropped and
//! reported through [`FilterCompiler::compile_with_diagnostics`].

mod builder;
mod compiler;
mod diagnostic;
mod normalize;
mod parser;
mod predicate;
mod types;

pub use compiler::{
    compile, compile_with_diagnostics, Compiled, FilterCompiler, FilterCompilerBuilder,
    EXPRESSION_SEPARATOR, PART_SEPARATOR,
};
pub use diagnostic::Diagnostic;
pub use normalize::{LiteralSubstitutions, ValueNormalizer};
pub use predicate::{Predicate, AND_KEY, OR_KEY};
pub use types::{Clause, Expression, Join, Operator};
