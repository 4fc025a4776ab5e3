use crate::apply::Applier;
use crate::inst;
use crate::paxos::*;
use crate::replica::*;
use crate::testutil::new_replica;
use crate::transport::PaxosService;

use pretty_assertions::assert_eq;

fn reply_inst(reply: &Reply, lsn: i64) -> Instance {
    reply.instances.get(&lsn).cloned().unwrap()
}

#[test]
fn test_handle_fresh_prepare() {
    let r = new_replica(1, Applier::VectorClock);
    {
        let mut st = r.lock_state();
        r.alloc_new_inst(&mut st, ("y", 2).into());
    }

    let req = Request::accept(ballot!(1, 0), 0, inst!((0, 0, 0), (x = 1), [1, 0, 0]));
    let reply = r.handle_paxos(req);

    assert_eq!(Some(ballot!(0, 0)), reply.highest_seen);

    let got = reply_inst(&reply, 0);
    assert_eq!(inst!((0, 0, 0), (x = 1), (1, 0), [1, 1, 0]), got);

    let st = r.lock_state();
    assert_eq!(ballot!(1, 0), st.columns[0].highest_seen);
    assert_eq!(Some(&got), st.columns[0].get_instance(0));
    assert_eq!(0, st.columns[0].commit_watermark);
}

#[test]
fn test_handle_reject_lower_ballot() {
    let r = new_replica(1, Applier::VectorClock);

    let reply = r.handle_paxos(Request::accept(
        ballot!(2, 2),
        0,
        inst!((0, 0, 0), (x = 1), [1, 0, 0]),
    ));
    assert_eq!(1, reply.instances.len());

    let cases = vec![ballot!(1, 0), ballot!(2, 0), ballot!(1, 9)];

    for bal in cases.into_iter() {
        let reply = r.handle_paxos(Request::accept(
            bal,
            0,
            inst!((0, 1, 0), (x = 2), [2, 0, 0]),
        ));

        assert_eq!(Some(ballot!(2, 2)), reply.highest_seen, "bal: {}", bal);
        assert!(reply.instances.is_empty(), "bal: {}", bal);
    }

    let st = r.lock_state();
    assert!(!st.columns[0].has_instance(1));
    assert_eq!(ballot!(2, 2), st.columns[0].highest_seen);
}

#[test]
fn test_handle_accept_without_ballot() {
    let r = new_replica(1, Applier::VectorClock);

    let mut req = Request::accept(ballot!(1, 0), 0, inst!((0, 0, 0), (x = 1), [1, 0, 0]));
    req.ballot = None;

    let reply = r.handle_paxos(req);
    assert!(reply.instances.is_empty());
    assert!(!r.lock_state().columns[0].has_instance(0));
}

#[test]
fn test_handle_both_fast_accepted_merge_deps() {
    let r = new_replica(1, Applier::VectorClock);
    {
        let mut st = r.lock_state();
        r.alloc_new_inst(&mut st, ("y", 2).into());

        let outcome = r.hdl_prepare_instance(&mut st, &inst!((0, 0, 0), (x = 1), [1, 0, 0]));
        assert_eq!(
            PrepareOutcome::Fresh(inst!((0, 0, 0), (x = 1), [1, 1, 0])),
            outcome
        );

        let outcome = r.hdl_prepare_instance(&mut st, &inst!((0, 0, 0), (x = 1), [1, 0, 2]));
        assert_eq!(
            PrepareOutcome::AlreadyPrepared(inst!((0, 0, 0), (x = 1), [1, 1, 0])),
            outcome
        );
    }

    let reply = r.handle_paxos(Request::accept(
        ballot!(2, 0),
        0,
        inst!((0, 0, 0), (x = 1), [1, 0, 2]),
    ));

    assert_eq!(
        inst!((0, 0, 0), (x = 1), (2, 0), [1, 1, 2]),
        reply_inst(&reply, 0)
    );
}

#[test]
fn test_handle_remote_wins_commits() {
    let r = new_replica(1, Applier::VectorClock);

    r.handle_paxos(Request::accept(
        ballot!(1, 0),
        0,
        inst!((0, 0, 0), (x = 1), [1, 0, 0]),
    ));

    // a recovering replica that saw the same value accepted under (1, 0).
    let reply = r.handle_paxos(Request::accept(
        ballot!(2, 2),
        0,
        inst!((0, 0, 0), (x = 1), (1, 0), [1, 0, 0]),
    ));

    let got = reply_inst(&reply, 0);
    assert_eq!(
        inst!((0, 0, 0), (x = 1), (2, 2), [1, 0, 0], committed),
        got
    );

    let st = r.lock_state();
    assert_eq!(1, st.columns[0].commit_watermark);
    assert_eq!(1, st.columns[0].apply_watermark);
    assert_eq!(Some(1), st.state_machine.get("x"));
}

#[test]
fn test_handle_local_wins() {
    let r = new_replica(1, Applier::VectorClock);
    {
        let mut st = r.lock_state();
        r.hdl_accept_instance(&mut st, ballot!(3, 2), inst!((0, 0, 2), noop, [1, 0, 0]));
    }

    let reply = r.handle_paxos(Request::accept(
        ballot!(4, 0),
        0,
        inst!((0, 0, 0), (x = 1), [1, 0, 0]),
    ));

    let got = reply_inst(&reply, 0);
    assert_eq!(inst!((0, 0, 2), noop, [1, 0, 0]).instance_id, got.instance_id);
    assert!(got.is_noop());
    assert_eq!(Some(&ballot!(4, 0)), got.vbal());
    assert!(!got.committed);
}

#[test]
fn test_handle_commit() {
    let r = new_replica(1, Applier::VectorClock);

    r.handle_paxos(Request::accept(
        ballot!(5, 2),
        0,
        inst!((0, 1, 0), (y = 2), [2, 0, 0]),
    ));

    // commit does not check the ballot, and does not raise highest_seen.
    let committed = inst!((0, 0, 0), (x = 1), (1, 0), [1, 0, 0]);
    let reply = r.handle_paxos(Request::commit(0, committed));

    let got = reply_inst(&reply, 0);
    assert!(got.committed);
    assert_eq!(Some(ballot!(5, 2)), reply.highest_seen);

    {
        let st = r.lock_state();
        assert_eq!(ballot!(5, 2), st.columns[0].highest_seen);
        assert_eq!(1, st.columns[0].commit_watermark);
        assert_eq!(&[(0, 0)], st.state_machine.apply_seq());
        assert_eq!(Some(1), st.state_machine.get("x"));
    }

    // commit of lsn 1 moves the watermark over it.
    let mut req = Request::commit(0, inst!((0, 1, 0), (y = 2), (5, 2), [2, 0, 0]));
    req.ballot = None;
    r.handle_paxos(req);

    let st = r.lock_state();
    assert_eq!(2, st.columns[0].commit_watermark);
    assert_eq!(2, st.columns[0].apply_watermark);
    assert_eq!(Some(2), st.state_machine.get("y"));
}

#[test]
fn test_handle_commit_out_of_order() {
    let r = new_replica(2, Applier::Scc);

    r.handle_paxos(Request::commit(0, inst!((0, 1, 0), (y = 2), (1, 0), [2, 0, 0])));
    {
        let st = r.lock_state();
        assert_eq!(0, st.columns[0].commit_watermark);
        assert_eq!(None, st.state_machine.get("y"));
    }

    r.handle_paxos(Request::commit(0, inst!((0, 0, 0), (x = 1), (1, 0), [1, 0, 0])));

    let st = r.lock_state();
    assert_eq!(2, st.columns[0].commit_watermark);
    assert_eq!(&[(0, 0), (0, 1)], st.state_machine.apply_seq());
}

#[test]
fn test_handle_bad_request() {
    let r = new_replica(1, Applier::VectorClock);

    let reply = r.handle_paxos(Request::accept(
        ballot!(1, 0),
        7,
        inst!((7, 0, 0), (x = 1), [1, 0, 0]),
    ));
    assert_eq!(Reply::default(), reply);

    // the instance does not belong to the slot it is keyed with.
    let cases = vec![
        inst!((1, 0, 0), (x = 1), [1, 0, 0]),
        inst!((0, 3, 0), (x = 1), [1, 0, 0]),
    ];

    for c in cases.into_iter() {
        let mut req = Request::accept(ballot!(1, 0), 0, inst!((0, 0, 0), (x = 1), [1, 0, 0]));
        req.instances.insert(0, c.clone());

        let reply = r.handle_paxos(req);
        assert!(reply.instances.is_empty(), "inst: {}", c);
    }

    let st = r.lock_state();
    assert_eq!(vec![0, 0, 0], st.log_lens());
}

#[test]
#[should_panic(expected = "bug")]
fn test_handle_overwrite_committed() {
    let r = new_replica(1, Applier::VectorClock);

    r.handle_paxos(Request::commit(0, inst!((0, 0, 0), (x = 1), (1, 0), [1, 0, 0])));
    r.handle_paxos(Request::commit(0, inst!((0, 0, 2), noop, [1, 0, 0])));
}
