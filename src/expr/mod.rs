//! Boolean routing expressions.
//!
//! A routing rule's predicate is a small expression such as
//! `amount==2 && selfDefine=='X'`. [`parse`] turns the text into a typed
//! [`Expr`] tree once, at rule-load time; [`Expr::evaluate`] runs it
//! against one request's [`ParameterMap`](crate::relay::payload::ParameterMap).
//!
//! Values are strictly typed: numbers compare numerically (`1 == 1.00`),
//! strings compare as strings, and a number never equals a string.

mod eval;
mod parser;

pub use eval::EvalError;
pub use parser::parse;

/// A runtime value produced while evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Field(String),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

/// Expression text that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid expression '{expression}' at offset {offset}: {message}")]
pub struct ExprError {
    pub expression: String,
    pub offset: usize,
    pub message: String,
}
