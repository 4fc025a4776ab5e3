use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;

use crate::apply::Applier;
use crate::inst;
use crate::paxos::*;
use crate::replica::*;
use crate::testutil::*;
use crate::transport::TransportError;

use pretty_assertions::assert_eq;

const CONVERGE_TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn test_alloc_new_inst() {
    let r = new_replica(1, Applier::VectorClock);
    let mut st = r.lock_state();

    let a = r.alloc_new_inst(&mut st, ("x", 1).into());
    assert_eq!(inst!((1, 0, 1), (x = 1), [0, 1, 0]), a);

    st.columns[0]
        .set_instance(inst!((0, 2, 0), (y = 1), [3, 0, 0]))
        .unwrap();

    let b = r.alloc_new_inst(&mut st, ("x", 2).into());
    assert_eq!(inst!((1, 1, 1), (x = 2), [3, 2, 0]), b);

    assert_eq!(2, st.columns[1].len());
    assert_eq!(Some(&b), st.columns[1].get_instance(1));
}

#[test]
fn test_local_prepare() {
    let r = new_replica(1, Applier::VectorClock);
    {
        let mut st = r.lock_state();
        r.alloc_new_inst(&mut st, ("x", 1).into());
    }

    let (bal, inst) = r.local_prepare(1, 0);
    assert_eq!(ballot!(1, 1), bal);
    assert_eq!(0, inst.lsn());

    // the active ballot is reused.
    let (bal, _) = r.local_prepare(1, 0);
    assert_eq!(ballot!(1, 1), bal);

    r.invalidate_ballot(1, Some(ballot!(3, 0)));
    let (bal, _) = r.local_prepare(1, 0);
    assert_eq!(ballot!(4, 1), bal);
}

#[tokio::test]
async fn test_set_single_write() {
    for applier in [Applier::Scc, Applier::VectorClock].iter() {
        let cluster = TestCluster::new(*applier);
        let r0 = &cluster.replicas[0];

        let cmd = r0.set(("x", 1).into()).await.unwrap();
        assert_eq!(Command::set("x", 1), cmd);

        // applied locally before set returns.
        assert_eq!(Some(1), r0.get("x"));

        timeout(CONVERGE_TIMEOUT, cluster.wait_for_converge())
            .await
            .unwrap();

        for r in cluster.replicas.iter() {
            let st = r.lock_state();
            assert_eq!(Some(1), st.state_machine.get("x"), "{:?}", applier);
            assert_eq!(&[(0, 0)], st.state_machine.apply_seq());
            assert_eq!(vec![1, 0, 0], st.log_lens());
        }
    }
}

#[tokio::test]
async fn test_set_depends_on_previous_write() {
    let cluster = TestCluster::new(Applier::VectorClock);

    cluster.replicas[0].set(("x", 1).into()).await.unwrap();
    // replica 1 accepted x=1, thus x=2 depends on it.
    cluster.replicas[1].set(("x", 2).into()).await.unwrap();

    {
        let st = cluster.replicas[1].lock_state();
        let inst = st.columns[1].get_instance(0).unwrap();
        assert_eq!(vec![1, 1, 0], inst.deps);
    }

    timeout(CONVERGE_TIMEOUT, cluster.wait_for_converge())
        .await
        .unwrap();

    for r in cluster.replicas.iter() {
        assert_eq!(Some(2), r.get("x"));
        assert_eq!(&[(0, 0), (1, 0)], r.lock_state().state_machine.apply_seq());
    }
}

#[tokio::test]
async fn test_run_paxos_higher_ballot() {
    let cluster = TestCluster::new(Applier::VectorClock);
    let r0 = &cluster.replicas[0];

    cluster.replicas[1].lock_state().columns[0].grant(ballot!(5, 2));

    let inst = {
        let mut st = r0.lock_state();
        r0.alloc_new_inst(&mut st, ("x", 1).into())
    };

    let (bal, local) = r0.local_prepare(0, 0);
    assert_eq!(ballot!(1, 0), bal);

    let rst = r0.run_paxos(bal, 0, 1, local).await;
    assert_eq!(Err(ReplicaError::HigherBallot(ballot!(5, 2))), rst);

    {
        let st = r0.lock_state();
        assert_eq!(None, st.columns[0].active_ballot);
        assert_eq!(ballot!(5, 2), st.columns[0].highest_seen);
    }

    let (bal, local) = r0.local_prepare(0, 0);
    assert_eq!(ballot!(6, 0), bal);

    let committed = r0.run_paxos(bal, 0, 1, local).await.unwrap();
    assert_eq!(inst.instance_id, committed.instance_id);
    assert!(committed.committed);
    assert_eq!(Some(&ballot!(6, 0)), committed.vbal());
}

#[tokio::test]
async fn test_run_paxos_peer_down() {
    let cluster = TestCluster::new(Applier::VectorClock);
    let r0 = &cluster.replicas[0];

    cluster.local.set_down(1, true);

    let inst = {
        let mut st = r0.lock_state();
        r0.alloc_new_inst(&mut st, ("x", 1).into())
    };

    let (bal, local) = r0.local_prepare(0, 0);
    let rst = r0.run_paxos(bal, 0, 1, local).await;
    assert_eq!(
        Err(ReplicaError::Transport(TransportError::Unreachable(1))),
        rst
    );
    assert_eq!(None, r0.lock_state().columns[0].active_ballot);

    // rounds to replica 1 keep failing until one goes to replica 2.
    assert_eq!(Ok(true), r0.propose(&inst).await);
    assert_eq!(Some(1), r0.get("x"));

    {
        let st = cluster.replicas[2].lock_state();
        assert!(st.columns[0].has_instance(0));
    }
}

#[tokio::test]
async fn test_set_after_stop() {
    let cluster = TestCluster::new(Applier::VectorClock);
    let r0 = &cluster.replicas[0];

    r0.stop();
    assert!(r0.is_stopped());
    assert_eq!(Err(ReplicaError::Shutdown), r0.set(("x", 1).into()).await);
    assert_eq!(0, r0.lock_state().columns[0].len());
}

#[tokio::test]
async fn test_set_concurrent() {
    for applier in [Applier::Scc, Applier::VectorClock].iter() {
        let cluster = TestCluster::new(*applier);

        let mut futs = Vec::new();
        for i in 0..30 {
            let r = cluster.replicas[i % 3].clone();
            futs.push(async move { r.set(("k", i as i64).into()).await });
        }

        for rst in join_all(futs).await {
            assert!(rst.is_ok());
        }

        timeout(CONVERGE_TIMEOUT, cluster.wait_for_converge())
            .await
            .unwrap();

        let st0 = cluster.replicas[0].lock_state().clone();
        assert_eq!(30, st0.state_machine.apply_seq().len());

        let sorted = |seq: &[(ColumnId, Lsn)]| {
            let mut s = seq.to_vec();
            s.sort();
            s
        };

        for r in cluster.replicas.iter().skip(1) {
            let st = r.lock_state();
            assert_eq!(st0.state_machine.snapshot(), st.state_machine.snapshot());
            assert_eq!(
                sorted(st0.state_machine.apply_seq()),
                sorted(st.state_machine.apply_seq())
            );
        }
    }
}
