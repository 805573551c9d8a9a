//! [`Feature`] is a geographic object produced by a datasource: one or more geometries with a set of typed
//! attributes.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use ahash::AHashMap;
use meridian_types::{Geom, Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a feature. Ids are only unique inside the [`Featureset`](crate::Featureset) that produced them.
pub type FeatureId = u64;

/// Shared reference to a feature. Features are never copied between the retrieval task, the feature cache and the
/// renderer.
pub type FeatureRef = Arc<Feature>;

/// Value of a feature attribute, or a result of evaluating an [`Expression`](crate::expression::Expression).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer number.
    Integer(i64),
    /// Floating point number.
    Double(f64),
    /// Text.
    String(String),
}

impl Value {
    /// Truthiness of the value: `null`, `false`, zero and empty strings are false, everything else is true.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(v) => *v,
            Value::Integer(v) => *v != 0,
            Value::Double(v) => *v != 0.0,
            Value::String(v) => !v.is_empty(),
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric representation of the value, if it is a number or a boolean.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Null | Value::String(_) => None,
        }
    }

    /// Compares two values. Numbers are compared numerically regardless of their representation, strings
    /// lexicographically. Values of different kinds are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Integer(_) | Value::Double(_), Value::Integer(_) | Value::Double(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            _ => None,
        }
    }

    /// Equality as used by filter expressions: `1 = 1.0` holds, values of different kinds are never equal.
    pub fn equals(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    pub(crate) fn add(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::String(a), b) => Value::String(format!("{a}{b}")),
            (a, Value::String(b)) if !a.is_null() => Value::String(format!("{a}{b}")),
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_add(*b).map_or(Value::Null, Value::Integer)
            }
            _ => self.float_op(other, |a, b| a + b),
        }
    }

    pub(crate) fn sub(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_sub(*b).map_or(Value::Null, Value::Integer)
            }
            _ => self.float_op(other, |a, b| a - b),
        }
    }

    pub(crate) fn mul(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_mul(*b).map_or(Value::Null, Value::Integer)
            }
            _ => self.float_op(other, |a, b| a * b),
        }
    }

    pub(crate) fn div(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_div(*b).map_or(Value::Null, Value::Integer)
            }
            _ => match other.as_f64() {
                Some(d) if d != 0.0 => self.float_op(other, |a, b| a / b),
                _ => Value::Null,
            },
        }
    }

    pub(crate) fn rem(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_rem(*b).map_or(Value::Null, Value::Integer)
            }
            _ => match other.as_f64() {
                Some(d) if d != 0.0 => self.float_op(other, |a, b| a % b),
                _ => Value::Null,
            },
        }
    }

    pub(crate) fn neg(&self) -> Value {
        match self {
            Value::Integer(v) => v.checked_neg().map_or(Value::Null, Value::Integer),
            Value::Double(v) => Value::Double(-v),
            _ => Value::Null,
        }
    }

    fn float_op(&self, other: &Value, op: impl Fn(f64, f64) -> f64) -> Value {
        match (self, other) {
            (Value::Integer(_) | Value::Double(_), Value::Integer(_) | Value::Double(_)) => {
                match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => Value::Double(op(a, b)),
                    _ => Value::Null,
                }
            }
            _ => Value::Null,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// A geographic object: geometries and attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    id: FeatureId,
    geometries: Vec<Geom>,
    attributes: AHashMap<String, Value>,
}

impl Feature {
    /// Creates a new feature without geometries and attributes.
    pub fn new(id: FeatureId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Adds a geometry to the feature.
    pub fn with_geometry(mut self, geometry: Geom) -> Self {
        self.geometries.push(geometry);
        self
    }

    /// Sets an attribute of the feature.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets an attribute of the feature, replacing the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Id of the feature.
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Geometries of the feature.
    pub fn geometries(&self) -> &[Geom] {
        &self.geometries
    }

    /// Value of the attribute with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Iterates over all attributes of the feature.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Bounding box of all geometries of the feature.
    pub fn envelope(&self) -> Option<Rect> {
        Rect::merge_all(self.geometries.iter().filter_map(Geom::bounding_rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_types::Point2d;

    #[test]
    fn truthiness() {
        assert!(!Value::Null.to_bool());
        assert!(!Value::from(0).to_bool());
        assert!(!Value::from("").to_bool());
        assert!(Value::from(0.5).to_bool());
        assert!(Value::from("no").to_bool());
    }

    #[test]
    fn mixed_numeric_comparison() {
        assert!(Value::from(1).equals(&Value::from(1.0)));
        assert_eq!(Value::from(2).compare(&Value::from(1.5)), Some(Ordering::Greater));
        assert_eq!(Value::from("2").compare(&Value::from(2)), None);
        assert!(!Value::Null.equals(&Value::from(0)));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(Value::from(7).div(&Value::from(2)), Value::from(3));
        assert_eq!(Value::from(7.0).div(&Value::from(2)), Value::from(3.5));
        assert_eq!(Value::from(1).div(&Value::from(0)), Value::Null);
        assert_eq!(Value::from("a").add(&Value::from(1)), Value::from("a1"));
        assert_eq!(Value::from(i64::MAX).add(&Value::from(1)), Value::Null);
    }

    #[test]
    fn envelope_of_all_geometries() {
        let feature = Feature::new(1)
            .with_geometry(Geom::Point(Point2d::new(1.0, 1.0)))
            .with_geometry(Geom::Point(Point2d::new(3.0, -2.0)))
            .with_attribute("name", "x");
        assert_eq!(feature.envelope(), Some(Rect::new(1.0, -2.0, 3.0, 1.0)));
        assert_eq!(feature.get("name"), Some(&Value::from("x")));
        assert_eq!(Feature::new(2).envelope(), None);
    }
}
