use std::collections::BTreeSet;
use std::collections::VecDeque;

use crate::apply::find_scc;
use crate::apply::ApplyData;
use crate::apply::ApplyError;
use crate::apply::Graph;
use crate::paxos::ColumnId;

/// scc_column_to_apply chooses the lowest column in the first strongly
/// connected component of the dependency graph starting at `column`.
/// The first component depends on nothing outside itself.
pub fn scc_column_to_apply(d: &ApplyData, column: ColumnId) -> Result<ColumnId, ApplyError> {
    if !d.is_committed(column) {
        return Err(ApplyError::Uncommitted(column));
    }

    let g = build_dep_graph(d, column)?;
    debug!(d.logger, "built dep graph from {}: {:?}", column, g);

    let sccs = find_scc(&g, column);
    debug!(d.logger, "sccs: {:?}", sccs);

    let first = sccs
        .first()
        .and_then(|scc| scc.iter().min().copied())
        .unwrap_or(column);

    Ok(first)
}

/// build_dep_graph walks from `column` to every column it transitively
/// depends on. Columns without dependency have no entry.
pub fn build_dep_graph(d: &ApplyData, column: ColumnId) -> Result<Graph, ApplyError> {
    let mut g = Graph::new();

    let mut visited = BTreeSet::new();
    let mut q = VecDeque::new();

    visited.insert(column);
    q.push_back(column);

    while let Some(c) = q.pop_front() {
        if !d.is_committed(c) {
            return Err(ApplyError::Uncommitted(c));
        }

        let deps = d.get_deps(c)?;

        for dep in deps.iter() {
            if visited.insert(*dep) {
                q.push_back(*dep);
            }
        }

        if !deps.is_empty() {
            g.insert(c, deps);
        }
    }

    Ok(g)
}
