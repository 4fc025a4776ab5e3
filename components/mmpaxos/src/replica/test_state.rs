use crate::inst;
use crate::replica::*;

use pretty_assertions::assert_eq;

fn build_state() -> ReplicaState {
    let mut st = ReplicaState::new(3);

    st.columns[0]
        .set_instance(inst!((0, 0, 0), (x = 1), (1, 0), [1, 0, 0], committed))
        .unwrap();
    st.columns[0]
        .set_instance(inst!((0, 1, 0), (y = 2), [2, 1, 0]))
        .unwrap();
    st.columns[1]
        .set_instance(inst!((1, 0, 1), (z = 3), (1, 1), [1, 1, 0], committed))
        .unwrap();

    for c in st.columns.iter_mut() {
        c.advance_commit_watermark();
    }
    st
}

#[test]
fn test_replica_state_new() {
    let st = ReplicaState::new(3);

    assert_eq!(3, st.columns.len());
    for (i, c) in st.columns.iter().enumerate() {
        assert_eq!(i as i64, c.column);
    }
    assert_eq!(vec![0, 0, 0], st.log_lens());
    assert!(st.is_all_applied());

    assert!(st.column(-1).is_none());
    assert!(st.column(3).is_none());
}

#[test]
fn test_replica_state_watermarks() {
    let mut st = build_state();

    assert_eq!(vec![2, 1, 0], st.log_lens());
    assert_eq!((1, 2), st.commit_state(0));
    assert_eq!((1, 1), st.commit_state(1));
    assert_eq!((0, 0), st.commit_state(2));
    assert_eq!((0, 0), st.commit_state(9));

    assert_eq!((0, 2), st.apply_state(0));
    assert!(!st.is_all_applied());

    st.columns[0].apply_watermark = 2;
    st.columns[1].apply_watermark = 1;
    assert_eq!((2, 2), st.apply_state(0));
    assert!(st.is_all_applied());
}

#[test]
fn test_replica_state_graphviz() {
    let mut st = build_state();
    st.state_machine
        .apply_instance(st.columns[0].get_instance(0).unwrap());
    st.state_machine
        .apply_instance(st.columns[1].get_instance(0).unwrap());

    let dot = st.graphviz();
    let lines: Vec<&str> = dot.lines().collect();

    assert_eq!("digraph x", lines[0]);
    assert_eq!("}", lines[lines.len() - 1]);

    let want = vec![
        "X0X0 [ label=\"a0\"]",
        "X0X1 [ label=\"a1\"]",
        "X1X0 [ label=\"b0\"]",
        // a1 follows a0 and saw b0.
        "X0X1 -> X0X0 [ color=\"#aaaadd\"]",
        "X0X1 -> X1X0 [ color=\"#aaaadd\"]",
        "X1X0 -> X0X0 [ color=\"#aaaadd\"]",
        "{ rank=same X0X0 X0X1 }",
        "{ rank=same X1X0 }",
        "{ rank=same  }",
        "X1X0 -> X0X0 [ color=\"#444444\", penwidth=3]",
    ];

    for w in want.iter() {
        assert!(lines.contains(w), "expect line: {}\n{}", w, dot);
    }

    assert!(!dot.contains("X0X0 ->"), "a0 depends on nothing:\n{}", dot);
}
