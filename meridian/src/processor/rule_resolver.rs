use crate::feature::Feature;
use crate::style::{FilterMode, Rule, RuleCategory, Style};

/// Rules of a style active at one scale, split by category.
#[derive(Debug)]
pub struct ResolvedRules<'a> {
    if_rules: Vec<&'a Rule>,
    else_rules: Vec<&'a Rule>,
    also_rules: Vec<&'a Rule>,
    filter_mode: FilterMode,
}

/// Rules to apply to one feature.
#[derive(Debug, Default)]
pub struct RuleMatch<'a> {
    /// Whether at least one `If` rule matched the feature.
    pub matched_primary: bool,
    /// Rules in the order their symbolizers are rendered.
    pub rules: Vec<&'a Rule>,
}

impl<'a> ResolvedRules<'a> {
    /// Selects rules of the style active at the scale denominator.
    pub fn new(style: &'a Style, scale_denominator: f64) -> Self {
        let mut resolved = Self {
            if_rules: vec![],
            else_rules: vec![],
            also_rules: vec![],
            filter_mode: style.filter_mode,
        };

        for rule in style.active_rules(scale_denominator) {
            match rule.category {
                RuleCategory::If => resolved.if_rules.push(rule),
                RuleCategory::Else => resolved.else_rules.push(rule),
                RuleCategory::Also => resolved.also_rules.push(rule),
            }
        }

        resolved
    }

    /// Returns true if no rule is active.
    pub fn is_empty(&self) -> bool {
        self.if_rules.is_empty() && self.else_rules.is_empty() && self.also_rules.is_empty()
    }

    /// All active rules in declaration order within each category.
    pub fn iter(&self) -> impl Iterator<Item = &'a Rule> + '_ {
        self.if_rules
            .iter()
            .chain(&self.else_rules)
            .chain(&self.also_rules)
            .copied()
    }

    /// Decides which rules apply to the feature.
    ///
    /// Matching `If` rules come first (only the first one with [`FilterMode::First`]), then `Else` rules if no
    /// `If` rule matched, then all `Also` rules.
    pub fn evaluate(&self, feature: &Feature) -> RuleMatch<'a> {
        let mut result = RuleMatch::default();

        for &rule in &self.if_rules {
            if rule.matches(feature) {
                result.matched_primary = true;
                result.rules.push(rule);

                if self.filter_mode == FilterMode::First {
                    break;
                }
            }
        }

        if !result.matched_primary {
            result.rules.extend(&self.else_rules);
        }

        result.rules.extend(&self.also_rules);
        result
    }
}
