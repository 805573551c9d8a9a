//! Styles define how features of a layer are rendered.
//!
//! A [`Style`] is an ordered list of [`Rule`]s. Each rule has a scale range it is active in, a
//! [category](RuleCategory) and a list of [`Symbolizer`]s, which are sent to the renderer for every feature the
//! rule applies to:
//!
//! * `If` rules are applied to features matching their filter. With [`FilterMode::First`] only the first matching
//!   `If` rule of the style is applied.
//! * `Else` rules are applied to features that matched no `If` rule.
//! * `Also` rules are applied to every feature.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod rule;
mod symbolizer;

pub use rule::{Rule, RuleCategory};
pub use symbolizer::*;

/// Which of the matching `If` rules of a style are applied to a feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FilterMode {
    /// Every matching rule.
    #[default]
    All,
    /// Only the first matching rule.
    First,
}

/// Named set of rules, referenced by layers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    /// Rules in evaluation order.
    pub rules: Vec<Rule>,
    /// Which of the matching `If` rules are applied.
    pub filter_mode: FilterMode,
}

impl Style {
    /// Creates a style with the given rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            filter_mode: FilterMode::All,
        }
    }

    /// Sets the filter mode of the style.
    pub fn with_filter_mode(mut self, filter_mode: FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    /// Rules active at the given scale denominator.
    pub fn active_rules(&self, scale_denominator: f64) -> impl Iterator<Item = &Rule> + '_ {
        self.rules
            .iter()
            .filter(move |rule| rule.active(scale_denominator))
    }

    /// Returns true if at least one rule is active at the given scale denominator.
    pub fn is_active(&self, scale_denominator: f64) -> bool {
        self.active_rules(scale_denominator).next().is_some()
    }
}
