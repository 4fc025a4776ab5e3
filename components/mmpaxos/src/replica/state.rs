use crate::column::Column;
use crate::paxos::ColumnId;
use crate::paxos::Lsn;
use crate::state_machine::StateMachine;

/// ReplicaState is everything a replica mutates: the columns and the state
/// machine. It is always accessed under one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaState {
    pub columns: Vec<Column>,
    pub state_machine: StateMachine,
}

impl ReplicaState {
    pub fn new(n_columns: usize) -> Self {
        ReplicaState {
            columns: (0..n_columns as ColumnId).map(Column::new).collect(),
            state_machine: StateMachine::new(),
        }
    }

    pub fn column(&self, column: ColumnId) -> Option<&Column> {
        if column < 0 {
            return None;
        }
        self.columns.get(column as usize)
    }

    pub fn column_mut(&mut self, column: ColumnId) -> Option<&mut Column> {
        if column < 0 {
            return None;
        }
        self.columns.get_mut(column as usize)
    }

    /// log_lens returns the log length of every column. It is the deps of
    /// an instance proposed now.
    pub fn log_lens(&self) -> Vec<i64> {
        self.columns.iter().map(|c| c.len()).collect()
    }

    /// commit_state returns the commit watermark and the log length of a
    /// column.
    pub fn commit_state(&self, column: ColumnId) -> (Lsn, i64) {
        match self.column(column) {
            Some(col) => (col.commit_watermark, col.len()),
            None => (0, 0),
        }
    }

    /// apply_state returns the apply watermark and the log length of a
    /// column.
    pub fn apply_state(&self, column: ColumnId) -> (Lsn, i64) {
        match self.column(column) {
            Some(col) => (col.apply_watermark, col.len()),
            None => (0, 0),
        }
    }

    pub fn is_all_applied(&self) -> bool {
        self.columns.iter().all(|c| c.apply_watermark == c.len())
    }

    /// graphviz renders all instances in dot. A light edge points to an
    /// instance depended on. The heavy path is the apply order.
    pub fn graphviz(&self) -> String {
        let mut lines: Vec<String> = vec![
            "digraph x".into(),
            "{".into(),
            "node [shape=plaintext]".into(),
            "rankdir=LR".into(),
        ];

        let n = self.columns.len() as ColumnId;

        for col in self.columns.iter() {
            let column = col.column;
            let mut symbols = Vec::with_capacity(col.log.len());

            for (lsn, inst) in col.log.iter().enumerate() {
                let lsn = lsn as Lsn;
                let symbol = node_symbol(column, lsn);
                lines.push(format!("{} [ label=\"{}\"]", symbol, node_label(column, lsn)));

                if let Some(inst) = inst {
                    for dep in 0..n {
                        let seen = if dep == column {
                            lsn - 1
                        } else {
                            inst.dep(dep) - 1
                        };

                        if seen >= 0 {
                            lines.push(format!(
                                "{} -> {} [ color=\"#aaaadd\"]",
                                symbol,
                                node_symbol(dep, seen)
                            ));
                        }
                    }
                }

                symbols.push(symbol);
            }

            // keeps one column in a row
            lines.push(format!("{{ rank=same {} }}", symbols.join(" ")));
        }

        let mut prev: Option<String> = None;
        for (column, lsn) in self.state_machine.apply_seq().iter() {
            let symbol = node_symbol(*column, *lsn);
            if let Some(p) = prev {
                lines.push(format!("{} -> {} [ color=\"#444444\", penwidth=3]", symbol, p));
            }
            prev = Some(symbol);
        }

        lines.push("}".into());
        lines.join("\n")
    }
}

fn node_symbol(column: ColumnId, lsn: Lsn) -> String {
    format!("X{}X{}", column, lsn)
}

fn node_label(column: ColumnId, lsn: Lsn) -> String {
    let letter = (b'a' + (column % 26) as u8) as char;
    format!("{}{}", letter, lsn)
}
