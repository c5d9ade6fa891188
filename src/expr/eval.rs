//! Evaluation of a parsed [`Expr`] against one request's parameters.

use std::cmp::Ordering;

use super::{CompareOp, Expr, LogicalOp, UnaryOp, Value};
use crate::relay::payload::ParameterMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("no parameter '{0}' found")]
    UnknownField(String),

    #[error("operator {op} cannot be applied to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("operator {op} cannot be applied to {operand}")]
    InvalidOperand {
        op: &'static str,
        operand: &'static str,
    },
}

impl Expr {
    pub fn evaluate(&self, params: &ParameterMap) -> Result<Value, EvalError> {
        match self {
            Self::Literal(v) => Ok(v.clone()),

            Self::Field(name) => params
                .value(name)
                .ok_or_else(|| EvalError::UnknownField(name.clone())),

            Self::Compare { op, left, right } => {
                let l = left.evaluate(params)?;
                let r = right.evaluate(params)?;
                compare(*op, &l, &r).map(Value::Bool)
            }

            Self::Logical { op, left, right } => {
                let l = expect_bool(logical_symbol(*op), left.evaluate(params)?)?;
                // Short-circuit
                match (op, l) {
                    (LogicalOp::And, false) => return Ok(Value::Bool(false)),
                    (LogicalOp::Or, true) => return Ok(Value::Bool(true)),
                    _ => {}
                }
                let r = expect_bool(logical_symbol(*op), right.evaluate(params)?)?;
                Ok(Value::Bool(r))
            }

            Self::Unary { op, operand } => match (op, operand.evaluate(params)?) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Not, other) => Err(EvalError::InvalidOperand {
                    op: "!",
                    operand: other.type_name(),
                }),
                (UnaryOp::Neg, other) => Err(EvalError::InvalidOperand {
                    op: "-",
                    operand: other.type_name(),
                }),
            },
        }
    }

    /// Evaluate as a rule predicate. A non-boolean result is an error.
    pub fn matches(&self, params: &ParameterMap) -> Result<bool, EvalError> {
        match self.evaluate(params)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::InvalidOperand {
                op: "predicate",
                operand: other.type_name(),
            }),
        }
    }
}

const fn logical_symbol(op: LogicalOp) -> &'static str {
    match op {
        LogicalOp::And => "&&",
        LogicalOp::Or => "||",
    }
}

const fn compare_symbol(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "==",
        CompareOp::Ne => "!=",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    }
}

fn expect_bool(op: &'static str, value: Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::InvalidOperand {
            op,
            operand: other.type_name(),
        }),
    }
}

#[allow(clippy::float_cmp)]
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::Str(l), Value::Str(r)) => l == r,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        // Different kinds never coerce
        _ => false,
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    let ordering = match op {
        CompareOp::Eq => return Ok(values_equal(left, right)),
        CompareOp::Ne => return Ok(!values_equal(left, right)),
        _ => match (left, right) {
            (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
            (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
            _ => {
                return Err(EvalError::TypeMismatch {
                    op: compare_symbol(op),
                    left: left.type_name(),
                    right: right.type_name(),
                })
            }
        },
    };

    // NaN orders with nothing
    let Some(ordering) = ordering else {
        return Ok(false);
    };

    Ok(match ordering {
        Ordering::Less => matches!(op, CompareOp::Lt | CompareOp::Le),
        Ordering::Equal => matches!(op, CompareOp::Le | CompareOp::Ge),
        Ordering::Greater => matches!(op, CompareOp::Gt | CompareOp::Ge),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use crate::relay::payload::Callback;

    fn params() -> ParameterMap {
        Callback {
            amount: 1.0,
            goods_id: "1".into(),
            self_define: "透传参数".into(),
            status: 1,
            channel: "ios".into(),
            ..Callback::default()
        }
        .into_params()
    }

    fn eval(expr: &str) -> Result<Value, EvalError> {
        parse(expr).unwrap().evaluate(&params())
    }

    #[test]
    fn numeric_equality_is_canonical() {
        for expr in ["amount==1", "amount==1.0", "amount==1.00", "amount == 1."] {
            assert_eq!(eval(expr), Ok(Value::Bool(true)), "{expr}");
        }
    }

    #[test]
    fn integer_fields_compare_as_numbers() {
        assert_eq!(eval("status==1.0"), Ok(Value::Bool(true)));
        assert_eq!(eval("status>=1 && status<2"), Ok(Value::Bool(true)));
    }

    #[test]
    fn strings_never_equal_numbers() {
        assert_eq!(eval("goodsId==1"), Ok(Value::Bool(false)));
        assert_eq!(eval("goodsId!=1"), Ok(Value::Bool(true)));
        assert_eq!(eval("goodsId=='1'"), Ok(Value::Bool(true)));
    }

    #[test]
    fn ordering_across_kinds_is_an_error() {
        assert!(matches!(
            eval("goodsId < 2"),
            Err(EvalError::TypeMismatch { op: "<", .. })
        ));
    }

    #[test]
    fn strings_order_lexicographically() {
        assert_eq!(eval("channel > 'android'"), Ok(Value::Bool(true)));
    }

    #[test]
    fn logical_operators() {
        assert_eq!(eval("(amount==2) || selfDefine=='透传参数'"), Ok(Value::Bool(true)));
        assert_eq!(eval("(amount==2) && selfDefine=='透传参数'"), Ok(Value::Bool(false)));
        assert_eq!(eval("(amount==1) && selfDefine=='透传参数 '"), Ok(Value::Bool(false)));
        assert_eq!(eval("!(amount==2)"), Ok(Value::Bool(true)));
    }

    #[test]
    fn logical_operands_must_be_bool() {
        assert!(eval("amount && true").is_err());
        assert!(eval("true || amount").is_ok());
    }

    #[test]
    fn unknown_field_is_an_error() {
        assert_eq!(
            eval("nope==1"),
            Err(EvalError::UnknownField("nope".into()))
        );
    }

    #[test]
    fn negation_applies_to_numbers_only() {
        assert_eq!(eval("-amount == -1"), Ok(Value::Bool(true)));
        assert!(eval("-channel == 1").is_err());
    }

    #[test]
    fn non_boolean_predicate_does_not_match() {
        let expr = parse("amount").unwrap();
        assert!(expr.matches(&params()).is_err());
    }
}
