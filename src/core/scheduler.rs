//! Orders rules so every label a rule requires is provided before it runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::MappingResult;
use crate::rules::{Label, Rule};
use crate::utils::topo::topological_sort;

/// `(required, provided)` for every requirement and provision of every rule.
pub fn dependency_edges(rules: &[Rule]) -> BTreeSet<(Label, Label)> {
    let mut edges = BTreeSet::new();
    for rule in rules {
        let provided = rule.provided_labels();
        for required in rule.required_labels() {
            for label in &provided {
                edges.insert((required.clone(), label.clone()));
            }
        }
    }
    edges
}

/// Catalogue positions of `rules` in execution order.
///
/// Rules are stable-sorted by the earliest topological rank among the labels
/// they provide, so rules that do not constrain each other keep catalogue
/// order when their ranks tie.
pub fn schedule_indices(rules: &[Rule]) -> MappingResult<Vec<usize>> {
    let order = topological_sort(&dependency_edges(rules))?;
    let rank: BTreeMap<&Label, usize> = order.iter().enumerate().map(|(i, l)| (l, i)).collect();

    let mut indices: Vec<usize> = (0..rules.len()).collect();
    indices.sort_by_key(|&i| {
        rules[i]
            .provided_labels()
            .iter()
            .filter_map(|label| rank.get(label).copied())
            .min()
            .unwrap_or(usize::MAX)
    });
    Ok(indices)
}

/// `rules` in an order where providers precede their dependents.
pub fn schedule(rules: &[Rule]) -> MappingResult<Vec<&Rule>> {
    Ok(schedule_indices(rules)?
        .into_iter()
        .map(|i| &rules[i])
        .collect())
}

/// Labels some rule requires but no rule provides.
///
/// Not a scheduling error: a body reading such a role fails at run time with
/// `UnresolvedReference`.
pub fn unprovided_requirements(rules: &[Rule]) -> BTreeSet<Label> {
    let provided: BTreeSet<Label> = rules.iter().flat_map(Rule::provided_labels).collect();
    rules
        .iter()
        .flat_map(Rule::required_labels)
        .filter(|label| *label != Label::Any && !provided.contains(label))
        .collect()
}
