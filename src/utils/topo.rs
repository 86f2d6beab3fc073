use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::error::{MappingError, MappingResult};

/// Kahn's algorithm over a set of directed `(tail, head)` edges.
///
/// Returns every node appearing in `edges`, each tail before its head. When
/// several nodes are ready at once the smallest one (by `Ord`) is taken, so
/// the result is deterministic. Fails with `CyclicDependency` if any edge
/// survives, listing the nodes that still have incoming edges.
pub fn topological_sort<N>(edges: &BTreeSet<(N, N)>) -> MappingResult<Vec<N>>
where
    N: Ord + Clone + Display,
{
    let mut successors: BTreeMap<N, Vec<N>> = BTreeMap::new();
    let mut in_degree: BTreeMap<N, usize> = BTreeMap::new();

    for (tail, head) in edges {
        successors.entry(tail.clone()).or_default().push(head.clone());
        successors.entry(head.clone()).or_default();
        in_degree.entry(tail.clone()).or_insert(0);
        *in_degree.entry(head.clone()).or_insert(0) += 1;
    }

    let mut ready: BTreeSet<N> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(node, _)| node.clone())
        .collect();
    let mut sorted = Vec::with_capacity(in_degree.len());

    while let Some(node) = ready.pop_first() {
        if let Some(heads) = successors.get(&node) {
            for head in heads {
                if let Some(degree) = in_degree.get_mut(head) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(head.clone());
                    }
                }
            }
        }
        sorted.push(node);
    }

    if sorted.len() != in_degree.len() {
        let nodes = in_degree
            .iter()
            .filter(|(_, &degree)| degree > 0)
            .map(|(node, _)| node.to_string())
            .collect();
        return Err(MappingError::CyclicDependency { nodes });
    }

    Ok(sorted)
}
