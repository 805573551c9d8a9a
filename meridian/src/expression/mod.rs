//! Filter expressions of style rules.
//!
//! An expression is parsed from text (see [`Expression::from_str`](std::str::FromStr)) and evaluated against a
//! [`Feature`]. A rule is applied to a feature if its filter evaluates to a truthy [`Value`].
//!
//! ```
//! use meridian::expression::Expression;
//! use meridian::{Feature, Value};
//!
//! let filter: Expression = "[population] > 1000 and [name].match('^New')".parse().unwrap();
//! let feature = Feature::new(1)
//!     .with_attribute("population", 8_000_000)
//!     .with_attribute("name", "New York");
//! assert!(filter.matches(&feature));
//! assert_eq!(filter.evaluate(&Feature::new(2)), Value::Bool(false));
//! ```

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use regex::Regex;

use crate::error::ExpressionError;
use crate::feature::{Feature, Value};

mod parser;

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation.
    Not,
    /// Arithmetic negation.
    Neg,
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `and`
    And,
    /// `or`
    Or,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Less
            | BinaryOp::LessEq
            | BinaryOp::Greater
            | BinaryOp::GreaterEq => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }
}

/// Syntax tree of a filter expression.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Constant value.
    Literal(Value),
    /// Value of a feature attribute. Missing attributes evaluate to [`Value::Null`].
    Attribute(String),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<Expression>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// Regular expression match of the string representation of the operand.
    Match {
        /// Operand.
        expr: Box<Expression>,
        /// Pattern to search for.
        regex: Regex,
    },
}

impl Expression {
    /// Expression that is true for every feature.
    pub fn always() -> Self {
        Expression::Literal(Value::Bool(true))
    }

    /// Reference to an attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        Expression::Attribute(name.into())
    }

    /// Constant value.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Combines two expressions with a binary operator.
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluates the expression for the feature.
    pub fn evaluate(&self, feature: &Feature) -> Value {
        match self {
            Expression::Literal(value) => value.clone(),
            Expression::Attribute(name) => feature.get(name).cloned().unwrap_or_default(),
            Expression::Unary { op, expr } => {
                let value = expr.evaluate(feature);
                match op {
                    UnaryOp::Not => Value::Bool(!value.to_bool()),
                    UnaryOp::Neg => value.neg(),
                }
            }
            Expression::Binary { op, left, right } => match op {
                BinaryOp::And => Value::Bool(
                    left.evaluate(feature).to_bool() && right.evaluate(feature).to_bool(),
                ),
                BinaryOp::Or => Value::Bool(
                    left.evaluate(feature).to_bool() || right.evaluate(feature).to_bool(),
                ),
                _ => {
                    let left = left.evaluate(feature);
                    let right = right.evaluate(feature);
                    Self::apply_binary(*op, &left, &right)
                }
            },
            Expression::Match { expr, regex } => {
                let value = expr.evaluate(feature);
                Value::Bool(!value.is_null() && regex.is_match(&value.to_string()))
            }
        }
    }

    /// Returns true if the expression evaluates to a truthy value for the feature.
    pub fn matches(&self, feature: &Feature) -> bool {
        self.evaluate(feature).to_bool()
    }

    fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
        use std::cmp::Ordering::*;

        let ordering = || left.compare(right);
        match op {
            BinaryOp::Eq => Value::Bool(left.equals(right)),
            BinaryOp::NotEq => Value::Bool(!left.equals(right)),
            BinaryOp::Less => Value::Bool(ordering() == Some(Less)),
            BinaryOp::LessEq => Value::Bool(matches!(ordering(), Some(Less | Equal))),
            BinaryOp::Greater => Value::Bool(ordering() == Some(Greater)),
            BinaryOp::GreaterEq => Value::Bool(matches!(ordering(), Some(Greater | Equal))),
            BinaryOp::Add => left.add(right),
            BinaryOp::Sub => left.sub(right),
            BinaryOp::Mul => left.mul(right),
            BinaryOp::Div => left.div(right),
            BinaryOp::Rem => left.rem(right),
            BinaryOp::And | BinaryOp::Or => unreachable!("logical operators are short-circuited"),
        }
    }

    /// Adds the names of all attributes referenced by the expression to `names`.
    pub fn collect_attributes(&self, names: &mut BTreeSet<String>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Attribute(name) => {
                if !names.contains(name) {
                    names.insert(name.clone());
                }
            }
            Expression::Unary { expr, .. } | Expression::Match { expr, .. } => {
                expr.collect_attributes(names)
            }
            Expression::Binary { left, right, .. } => {
                left.collect_attributes(names);
                right.collect_attributes(names);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.precedence(),
            Expression::Unary {
                op: UnaryOp::Not, ..
            } => 3,
            Expression::Unary { op: UnaryOp::Neg, .. } => 7,
            Expression::Literal(_) | Expression::Attribute(_) | Expression::Match { .. } => 8,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, min_precedence: u8) -> std::fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expression::Literal(a), Expression::Literal(b)) => a == b,
            (Expression::Attribute(a), Expression::Attribute(b)) => a == b,
            (
                Expression::Unary { op: op_a, expr: a },
                Expression::Unary { op: op_b, expr: b },
            ) => op_a == op_b && a == b,
            (
                Expression::Binary {
                    op: op_a,
                    left: left_a,
                    right: right_a,
                },
                Expression::Binary {
                    op: op_b,
                    left: left_b,
                    right: right_b,
                },
            ) => op_a == op_b && left_a == left_b && right_a == right_b,
            (
                Expression::Match {
                    expr: a,
                    regex: regex_a,
                },
                Expression::Match {
                    expr: b,
                    regex: regex_b,
                },
            ) => a == b && regex_a.as_str() == regex_b.as_str(),
            _ => false,
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(Value::Null) => write!(f, "null"),
            Expression::Literal(Value::String(v)) => write!(f, "'{}'", escape(v)),
            Expression::Literal(Value::Double(v)) if v.fract() == 0.0 && v.is_finite() => {
                write!(f, "{v:.1}")
            }
            Expression::Literal(v) => write!(f, "{v}"),
            Expression::Attribute(name) => write!(f, "[{name}]"),
            Expression::Unary { op, expr } => {
                let precedence = self.precedence();
                match op {
                    UnaryOp::Not => write!(f, "not ")?,
                    UnaryOp::Neg => write!(f, "-")?,
                }
                expr.fmt_operand(f, precedence)
            }
            Expression::Binary { op, left, right } => {
                let precedence = op.precedence();
                left.fmt_operand(f, precedence)?;
                write!(f, " {} ", op.symbol())?;
                // Operators are left-associative.
                right.fmt_operand(f, precedence + 1)
            }
            Expression::Match { expr, regex } => {
                expr.fmt_operand(f, 8)?;
                write!(f, ".match('{}')", escape(regex.as_str()))
            }
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

impl TryFrom<String> for Expression {
    type Error = ExpressionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Expression> for String {
    fn from(value: Expression) -> Self {
        value.to_string()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Expression {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Expression {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn city(population: i64, name: &str) -> Feature {
        Feature::new(1)
            .with_attribute("population", population)
            .with_attribute("name", name)
    }

    fn parse(s: &str) -> Expression {
        s.parse().expect("valid expression")
    }

    #[test]
    fn comparison_filters() {
        let filter = parse("[population] > 1000");
        assert!(!filter.matches(&city(500, "a")));
        assert!(filter.matches(&city(2000, "a")));
        assert!(!filter.matches(&Feature::new(2)));

        assert!(parse("name = 'Paris'").matches(&city(1, "Paris")));
        assert!(parse("[name] != 'Paris'").matches(&city(1, "Rome")));
        assert!(parse("[population] >= 1.0e3").matches(&city(1000, "a")));
    }

    #[test]
    fn logical_and_arithmetic() {
        let feature = city(2500, "Lyon");
        assert!(parse("[population] / 1000 = 2").matches(&feature));
        assert!(parse("[population] % 1000 = 500 and not [name] = 'Nice'").matches(&feature));
        assert!(parse("[missing] or -[population] < 0").matches(&feature));
        assert_eq!(parse("2 + 3 * 4").evaluate(&feature), Value::Integer(14));
        assert_eq!(parse("(2 + 3) * 4").evaluate(&feature), Value::Integer(20));
    }

    #[test]
    fn regex_match() {
        let filter = parse("[name].match('^Sa(n|int)')");
        assert!(filter.matches(&city(1, "San Jose")));
        assert!(filter.matches(&city(1, "Saint Malo")));
        assert!(!filter.matches(&city(1, "Seattle")));
        assert!(!filter.matches(&Feature::new(1)));
    }

    #[test]
    fn collects_referenced_attributes() {
        let mut names = BTreeSet::new();
        parse("[a] > 1 and ([b] = 'x' or [a].match('y')) or not c").collect_attributes(&mut names);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let mut names = BTreeSet::new();
        parse("1 = 1").collect_attributes(&mut names);
        assert!(names.is_empty());
    }

    #[test]
    fn display_can_be_parsed_back() {
        for source in [
            "[population] > 1000",
            "not ([a] = 1 or [b] = 2)",
            "[a] - ([b] - [c])",
            "-([a] + 1) * 2.0",
            "[name].match('it\\'s') and [x] != null",
        ] {
            let expr = parse(source);
            let printed = expr.to_string();
            assert_eq!(parse(&printed), expr, "{source} printed as {printed}");
        }
        assert_eq!(parse("a>1&&b<2").to_string(), "[a] > 1 and [b] < 2");
    }

    #[test]
    fn parse_errors() {
        assert_matches!("[population] >".parse::<Expression>(), Err(ExpressionError { .. }));
        assert_matches!("(1 + 2".parse::<Expression>(), Err(ExpressionError { .. }));
        assert_matches!("[a].match('(')".parse::<Expression>(), Err(_));
        assert_matches!("'unterminated".parse::<Expression>(), Err(e) if e.position == 0);
        assert_matches!("1 2".parse::<Expression>(), Err(e) if e.position == 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_string() {
        let expr = parse("[population] > 1000");
        let json = serde_json::to_string(&expr).expect("serializable");
        assert_eq!(json, "\"[population] > 1000\"");
        let restored: Expression = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(restored, expr);
        assert!(serde_json::from_str::<Expression>("\"[a] >\"").is_err());
    }
}
