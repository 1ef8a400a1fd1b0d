//! Impact scope analysis
//!
//! The impact scope of an element is every element that reaches it through present edges.
//! Analysis walks the reversed graph from the start element and flags each traversed edge with
//! `should_paint_self`.

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::matrix::Matrix;

/// Flags every present edge lying on a path that ends at `start_key`.
///
/// Does not clear previous flags; call [`clear_impact_scope`] first. Unknown start keys and
/// start keys without predecessors leave the matrix untouched.
pub fn compute_impact_scope(matrix: &mut Matrix, start_key: &str) {
    // target -> sources
    let mut reverse: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (row, col, _) in matrix.present_edges() {
        reverse
            .entry(col.to_string())
            .or_default()
            .insert(row.to_string());
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut stack = vec![start_key.to_string()];
    let mut flagged = 0usize;

    while let Some(target) = stack.pop() {
        if !visited.insert(target.clone()) {
            continue;
        }

        let Some(sources) = reverse.get(&target) else {
            continue;
        };

        for source in sources {
            matrix.value_mut(source, &target).should_paint_self = true;
            flagged += 1;
            if !visited.contains(source) {
                stack.push(source.clone());
            }
        }
    }

    debug!(
        "impact scope of {}: {} edges over {} elements",
        start_key,
        flagged,
        visited.len()
    );
}

/// Resets every highlight flag in the matrix
pub fn clear_impact_scope(matrix: &mut Matrix) {
    for (_, _, value) in matrix.entries_mut() {
        value.should_paint_self = false;
    }
}

/// Sources of the currently flagged edges, i.e. the elements inside the last computed scope
pub fn impacted_elements(matrix: &Matrix) -> BTreeSet<String> {
    matrix
        .entries()
        .filter(|(_, _, value)| value.should_paint_self)
        .map(|(row, _, _)| row.to_string())
        .collect()
}
