//! Declarative TABLE/LIST/TASK queries over the cached vault.
//!
//! [`parse`] turns a query string into a [`QueryAst`]; an [`Evaluator`] runs
//! the AST against any [`DocumentSource`] and produces a [`QueryResult`].

pub mod ast;
pub mod compare;
pub mod error;
pub mod eval;
pub mod expr;
pub mod fields;
pub mod lexer;
pub mod parser;
pub mod result;
pub mod source;

pub use ast::{FieldSpec, QueryAst, QueryKind, SortDirection, SortSpec};
pub use error::{ErrorKind, EvalError, ParseError, QueryError};
pub use eval::{DocumentSource, Evaluator, TASK_COLUMNS};
pub use expr::{Expr, Operand, parse_expr};
pub use parser::parse;
pub use result::{QueryFailure, QueryResult, Row};
pub use source::{FromClause, Source};
