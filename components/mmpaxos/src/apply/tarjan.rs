use std::cmp::min;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::paxos::ColumnId;

/// Graph maps a column to the columns it depends on.
pub type Graph = BTreeMap<ColumnId, Vec<ColumnId>>;

/// find_scc returns the strongly connected components reachable from
/// `start`, in reverse topological order: a component comes before any
/// component that depends on it.
pub fn find_scc(g: &Graph, start: ColumnId) -> Vec<Vec<ColumnId>> {
    let mut t = Tarjan {
        g,
        counter: 0,
        index: BTreeMap::new(),
        low: BTreeMap::new(),
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        sccs: Vec::new(),
    };

    t.visit(start);
    t.sccs
}

struct Tarjan<'a> {
    g: &'a Graph,
    counter: usize,
    index: BTreeMap<ColumnId, usize>,
    low: BTreeMap<ColumnId, usize>,
    stack: Vec<ColumnId>,
    on_stack: BTreeSet<ColumnId>,
    sccs: Vec<Vec<ColumnId>>,
}

impl<'a> Tarjan<'a> {
    fn visit(&mut self, v: ColumnId) {
        self.index.insert(v, self.counter);
        self.low.insert(v, self.counter);
        self.counter += 1;

        self.stack.push(v);
        self.on_stack.insert(v);

        let g = self.g;
        let nexts = g.get(&v).map(|x| &x[..]).unwrap_or(&[]);

        for w in nexts.iter() {
            let low_v = self.low[&v];

            if !self.index.contains_key(w) {
                self.visit(*w);
                self.low.insert(v, min(low_v, self.low[w]));
            } else if self.on_stack.contains(w) {
                self.low.insert(v, min(low_v, self.index[w]));
            }
        }

        if self.low[&v] != self.index[&v] {
            return;
        }

        let mut scc = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.remove(&w);
            scc.push(w);
            if w == v {
                break;
            }
        }
        self.sccs.push(scc);
    }
}
