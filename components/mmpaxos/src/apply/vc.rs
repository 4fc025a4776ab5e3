use std::collections::BTreeSet;
use std::collections::VecDeque;

use crate::apply::ApplyData;
use crate::apply::ApplyError;
use crate::paxos::ColumnId;

/// vc_column_to_apply walks the dependency graph from `column` and chooses
/// the visited column with the fewest direct dependencies, the lower column
/// id on a tie.
pub fn vc_column_to_apply(d: &ApplyData, column: ColumnId) -> Result<ColumnId, ApplyError> {
    if !d.is_committed(column) {
        return Err(ApplyError::Uncommitted(column));
    }

    let (n_deps, chosen) = find_min_rank(d, column)?;
    debug!(
        d.logger,
        "choose column {} to apply, it has {} deps, walked from {}", chosen, n_deps, column
    );

    Ok(chosen)
}

/// find_min_rank returns the minimal `(number of deps, column)` among all
/// columns reachable from `column`.
pub fn find_min_rank(d: &ApplyData, column: ColumnId) -> Result<(usize, ColumnId), ApplyError> {
    let mut min_rank = (usize::MAX, column);

    let mut accessed = BTreeSet::new();
    let mut q = VecDeque::new();
    q.push_back(column);

    while let Some(c) = q.pop_front() {
        if !accessed.insert(c) {
            continue;
        }

        let deps = d.get_deps(c)?;
        let rank = (deps.len(), c);
        if rank < min_rank {
            min_rank = rank;
        }

        q.extend(deps);
    }

    Ok(min_rank)
}
