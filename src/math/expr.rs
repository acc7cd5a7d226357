use std::convert::From;
use std::fmt::Display;
use crate::{Error, StatLookup};


/// Syntax tree of a math macro body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A number written in the body.
    Literal(i32),
    /// A character stat, resolved through a [`StatLookup`] at evaluation time.
    Stat(String),
    /// `+x` or `-x`.
    UnaryOperator {
        op: UnaryOperator,
        operand: Box<Expr>
    },
    /// `left op right`.
    BinaryOperator {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>
    }
}

impl Expr {
    /// Computes the value of the tree.
    ///
    /// # Errors
    /// Returns [`Error::UnknownStat`] when a stat is missing from `stats` or
    /// its value is not an integer.
    pub fn evaluate(&self, stats: &dyn StatLookup) -> Result<i32, Error> {
        match self {
            Expr::Literal(value) => Ok(*value),

            Expr::Stat(name) => {
                let value = stats.stat(name).ok_or_else(|| Error::UnknownStat(name.clone()))?;
                value.trim()
                    .parse::<i32>()
                    .map_err(|_| Error::UnknownStat(format!("{name} = {value}")))
            },

            Expr::UnaryOperator { op, operand } => Ok(op.op(operand.evaluate(stats)?)),

            Expr::BinaryOperator { op, left, right } => {
                let left = left.evaluate(stats)?;
                let right = right.evaluate(stats)?;
                Ok(op.op(left, right))
            }
        }
    }

    /// Names of every stat the tree reads, in reading order.
    pub fn stats(&self) -> Vec<&str> {
        match self {
            Expr::Literal(_) => Vec::new(),
            Expr::Stat(name) => vec![name.as_str()],
            Expr::UnaryOperator { operand, .. } => operand.stats(),
            Expr::BinaryOperator { left, right, .. } => {
                let mut names = left.stats();
                names.extend(right.stats());
                names
            }
        }
    }

    fn unary_op<T: Into<Expr>>(op: UnaryOperator, operand: T) -> Self {
        Self::UnaryOperator { op, operand: Box::new(operand.into()) }
    }

    /// `+operand`.
    pub fn pos<T: Into<Expr>>(operand: T) -> Self {
        Self::unary_op(UnaryOperator::Plus, operand)
    }

    /// `-operand`.
    pub fn neg<T: Into<Expr>>(operand: T) -> Self {
        Self::unary_op(UnaryOperator::Minus, operand)
    }

    fn binary_op<L: Into<Expr>, R: Into<Expr>>(op: BinaryOperator, left: L, right: R) -> Self {
        Self::BinaryOperator { op, left: Box::new(left.into()), right: Box::new(right.into()) }
    }

    /// `left + right`.
    pub fn add<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::Add, left, right)
    }

    /// `left - right`.
    pub fn sub<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::Subtract, left, right)
    }

    /// `left * right`.
    pub fn mul<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::Multiply, left, right)
    }

    /// `left / right`, truncating toward zero.
    pub fn div<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::Divide, left, right)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Stat(value.into())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Stat(name) => write!(f, "{{{name}}}"),
            Expr::UnaryOperator { op, operand } => write!(f, "{op}{operand}"),
            Expr::BinaryOperator { op, left, right } =>
                write!(f, "({left} {op} {right})")
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `+`, leaves the value as is.
    Plus,
    /// `-`, negates the value.
    Minus,
}

impl UnaryOperator {
    /// Applies the operator, saturating.
    pub fn op(&self, value: i32) -> i32 {
        use UnaryOperator as Op;
        match self {
            Op::Plus => value,
            Op::Minus => value.saturating_neg()
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Plus => write!(f, "+"),
            UnaryOperator::Minus => write!(f, "-")
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl BinaryOperator {
    /// Saturating arithmetic; dividing by zero gives 0.
    pub fn op(&self, left: i32, right: i32) -> i32 {
        use BinaryOperator as Op;
        match self {
            Op::Add => left.saturating_add(right),
            Op::Subtract => left.saturating_sub(right),
            Op::Multiply => left.saturating_mul(right),
            Op::Divide => left.checked_div(right).unwrap_or(0)
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/")
        }
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use super::*;
    use proptest::prelude::*;
    use crate::NoStats;

    fn expr_strategy() -> impl Strategy<Value = Expr> {
        let leaf = (-1000..1000i32).prop_map(Expr::Literal);

        leaf.prop_recursive(8, 64, 10, |inner| {
            prop_oneof![
                (prop::sample::select(&[UnaryOperator::Plus, UnaryOperator::Minus]), inner.clone())
                    .prop_map(|(op, operand)| Expr::UnaryOperator {
                        op,
                        operand: Box::new(operand)
                    }),

                (
                    prop::sample::select(&[
                        BinaryOperator::Add,
                        BinaryOperator::Subtract,
                        BinaryOperator::Multiply,
                        BinaryOperator::Divide
                    ]),
                    inner.clone(),
                    inner
                ).prop_map(|(op, left, right)| Expr::BinaryOperator {
                    op,
                    left: Box::new(left),
                    right: Box::new(right)
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_expr_evaluate_literal(value: i32) {
            prop_assert_eq!(Expr::Literal(value).evaluate(&NoStats), Ok(value));
        }

        #[test]
        fn test_expr_evaluate_unary(
            value in -1000..1000i32,
            op in prop::sample::select(&[UnaryOperator::Plus, UnaryOperator::Minus])
        ) {
            let expected = match op {
                UnaryOperator::Plus => value,
                UnaryOperator::Minus => -value,
            };

            prop_assert_eq!(Expr::unary_op(op, value).evaluate(&NoStats), Ok(expected));
        }

        #[test]
        fn test_binary_operator_op(
            left in -100..100i32,
            right in -100..100i32,
            op in prop::sample::select(&[
                BinaryOperator::Add,
                BinaryOperator::Subtract,
                BinaryOperator::Multiply,
                BinaryOperator::Divide
            ])
        ) {
            let result = op.op(left, right);

            match op {
                BinaryOperator::Add => prop_assert_eq!(result, left + right),
                BinaryOperator::Subtract => prop_assert_eq!(result, left - right),
                BinaryOperator::Multiply => prop_assert_eq!(result, left * right),
                BinaryOperator::Divide => prop_assert_eq!(result, left.checked_div(right).unwrap_or(0)),
            }
        }

        #[test]
        fn test_literal_trees_never_fail(expr in expr_strategy()) {
            prop_assert!(expr.evaluate(&NoStats).is_ok());
            prop_assert!(expr.stats().is_empty());
        }
    }

    #[test]
    fn test_saturation() {
        assert_eq!(BinaryOperator::Add.op(i32::MAX, 1), i32::MAX);
        assert_eq!(BinaryOperator::Multiply.op(i32::MIN, 2), i32::MIN);
        assert_eq!(BinaryOperator::Divide.op(i32::MIN, -1), 0);
        assert_eq!(UnaryOperator::Minus.op(i32::MIN), i32::MAX);
    }

    #[test]
    fn test_stats() {
        let stats = HashMap::from([
            ("str".to_string(), "3".to_string()),
            ("name".to_string(), "Valeros".to_string()),
        ]);

        let expr = Expr::mul(Expr::add("str", 2), 2);
        assert_eq!(expr.evaluate(&stats), Ok(10));
        assert_eq!(expr.stats(), vec!["str"]);
        assert_eq!(expr.to_string(), "(({str} + 2) * 2)");

        assert_eq!(Expr::from("dex").evaluate(&stats), Err(Error::UnknownStat("dex".into())));
        assert!(matches!(Expr::from("name").evaluate(&stats), Err(Error::UnknownStat(_))));
    }
}
