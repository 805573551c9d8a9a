use std::collections::BTreeSet;

use crate::style::Rule;

/// Collects names of feature attributes that rule filters refer to, so that datasources can skip loading the rest.
#[derive(Debug)]
pub struct AttributeCollector<'a> {
    names: &'a mut BTreeSet<String>,
}

impl<'a> AttributeCollector<'a> {
    /// Creates a collector that adds names to the given set.
    pub fn new(names: &'a mut BTreeSet<String>) -> Self {
        Self { names }
    }

    /// Adds attributes referenced by the rule filter.
    pub fn collect(&mut self, rule: &Rule) {
        if let Some(filter) = &rule.filter {
            filter.collect_attributes(self.names);
        }
    }
}
