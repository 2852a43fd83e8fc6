//! The plural-rule engine: an expression AST, its recursive-descent parser,
//! and the `PluralRules` container parsed from a catalog's `Plural-Forms`
//! header value.

pub mod ast;
pub mod parser;
pub mod rules;

pub use ast::{CmpOp, Expr};
pub use rules::PluralRules;
