#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::feature::Feature;
use crate::style::Symbolizer;

/// Evaluation track of a rule inside its style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RuleCategory {
    /// Applied to features matching its filter.
    #[default]
    If,
    /// Applied to features that matched no `If` rule of the style.
    Else,
    /// Applied to every feature that reaches rule evaluation.
    Also,
}

/// Rule of a [`Style`](super::Style): a scale range, a filter and a list of symbolizers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Rule {
    /// Optional name of the rule, for diagnostics.
    pub name: Option<String>,
    /// The rule is active at scale denominators greater or equal to this value.
    pub min_scale: f64,
    /// The rule is active at scale denominators less than this value.
    pub max_scale: f64,
    /// Filter of an `If` rule. A rule without filter matches all features.
    pub filter: Option<Expression>,
    /// Evaluation track.
    pub category: RuleCategory,
    /// Symbolizers to apply, in order.
    pub symbolizers: Vec<Symbolizer>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            name: None,
            min_scale: 0.0,
            max_scale: f64::MAX,
            filter: None,
            category: RuleCategory::If,
            symbolizers: vec![],
        }
    }
}

impl Rule {
    /// Creates an `If` rule with the given filter.
    pub fn new(filter: Option<Expression>, symbolizers: Vec<Symbolizer>) -> Self {
        Self {
            filter,
            symbolizers,
            ..Default::default()
        }
    }

    /// Creates an `Else` rule.
    pub fn otherwise(symbolizers: Vec<Symbolizer>) -> Self {
        Self {
            category: RuleCategory::Else,
            symbolizers,
            ..Default::default()
        }
    }

    /// Creates an `Also` rule.
    pub fn also(symbolizers: Vec<Symbolizer>) -> Self {
        Self {
            category: RuleCategory::Also,
            symbolizers,
            ..Default::default()
        }
    }

    /// Sets the rule name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the scale range `[min_scale, max_scale)` of the rule.
    pub fn with_scale_range(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Returns true if the rule is applied at the given scale denominator.
    pub fn active(&self, scale_denominator: f64) -> bool {
        self.min_scale <= scale_denominator && scale_denominator < self.max_scale
    }

    /// Evaluates the rule filter for the feature.
    pub fn matches(&self, feature: &Feature) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |filter| filter.matches(feature))
    }
}
