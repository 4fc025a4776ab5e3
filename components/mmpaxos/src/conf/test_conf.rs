use std::io::Write;

use crate::apply::Applier;
use crate::conf::*;

use pretty_assertions::assert_eq;

fn load_conf(cont: &str) -> Result<(tempfile::NamedTempFile, ClusterInfo), ConfError> {
    let mut f = tempfile::NamedTempFile::new()?;
    f.write_all(cont.as_bytes()).unwrap();
    f.as_file().sync_all().unwrap();

    let ci = ClusterInfo::from_file(f.path())?;
    Ok((f, ci))
}

lazy_static::lazy_static! {
    static ref THREE_NODES: &'static str = "
nodes:
    127.0.0.1:4441:
        api_addr: 127.0.0.1:3331
        replication: 127.0.0.1:5551
    127.0.0.1:4442:
        api_addr: 127.0.0.1:3332
        replication: 127.0.0.1:5552
    192.168.0.1:4443:
        api_addr: 192.168.0.1:3333
        replication: 192.168.0.1:5553
";
}

#[test]
fn test_conf_serde_yaml() {
    let cont = format!(
        "{}
replicas:
    0: 127.0.0.1:4441
    1: 127.0.0.1:4442
    2: 192.168.0.1:4443
",
        *THREE_NODES
    );

    let (_tmpf, ci) = load_conf(&cont).unwrap();
    assert_eq!(3, ci.nodes.len());

    let nid = "192.168.0.1:4443";
    let n = ci.get(nid).unwrap();
    assert_eq!(nid, n.node_id);
    assert_eq!(n.api_addr, "192.168.0.1:3333".parse().unwrap());
    assert_eq!(n.replication, "192.168.0.1:5553".parse().unwrap());

    assert_eq!(vec![0, 1, 2], ci.replica_ids());
    assert_eq!(Applier::VectorClock, ci.applier);
    assert_eq!(ReplicaConf::default(), ci.replica);

    let addrs = ci.replication_addrs();
    assert_eq!(3, addrs.len());
    assert_eq!("127.0.0.1:5552".parse::<std::net::SocketAddr>().unwrap(), addrs[&1]);
}

#[test]
fn test_conf_from_str() {
    let cont = format!(
        "{}
replicas:
    0: 127.0.0.1:4441
    1: 127.0.0.1:4442
    2: 127.0.0.1:4442
applier: scc
replica:
    rpc_timeout_ms: 500
    recovery_interval_ms: 20
",
        *THREE_NODES
    );

    let ci: ClusterInfo = cont.parse().unwrap();
    assert_eq!(Applier::Scc, ci.applier);
    assert_eq!(
        ReplicaConf {
            rpc_timeout_ms: 500,
            recovery_interval_ms: 20,
            ..ReplicaConf::default()
        },
        ci.replica
    );
    assert_eq!(std::time::Duration::from_millis(500), ci.replica.rpc_timeout());
}

#[test]
fn test_conf_replica() {
    let cont = format!(
        "{}
replicas:
    0: 127.0.0.1:4441
    1: 127.0.0.1:4442
    2: 127.0.0.1:4442
",
        *THREE_NODES
    );

    let (_f, ci) = load_conf(&cont).unwrap();
    assert!(ci.get_replica_node(100).is_none());
    assert_eq!(
        ci.get_replica_node(2).unwrap(),
        &Node {
            node_id: "127.0.0.1:4442".into(),
            api_addr: "127.0.0.1:3332".parse().unwrap(),
            replication: "127.0.0.1:5552".parse().unwrap(),
        }
    );
}

#[test]
fn test_conf_bad_replicas() {
    let cases = vec![
        (
            "
    0: 127.0.0.1:4441
    1: 127.0.0.1:4442
    2: 192.168.0.1:9999
",
            ConfError::OrphanReplica(2, "192.168.0.1:9999".into()),
        ),
        (
            "
    0: 127.0.0.1:4441
    1: 127.0.0.1:4442
    3: 127.0.0.1:4442
",
            ConfError::BadReplicaId(3),
        ),
        (
            "
    1: 127.0.0.1:4441
    2: 127.0.0.1:4442
    3: 127.0.0.1:4442
",
            ConfError::BadReplicaId(1),
        ),
        (
            "
    0: 127.0.0.1:4441
    1: 127.0.0.1:4442
",
            ConfError::ClusterSize(2),
        ),
        (
            "
    0: 127.0.0.1:4441
    1: 127.0.0.1:4442
    2: 127.0.0.1:4442
    3: 127.0.0.1:4442
",
            ConfError::ClusterSize(4),
        ),
    ];

    for (replicas, want) in cases.into_iter() {
        let cont = format!("{}\nreplicas:{}", *THREE_NODES, replicas);
        let rst = load_conf(&cont);
        assert_eq!(want, rst.err().unwrap(), "replicas: {}", replicas);
    }
}

#[test]
fn test_conf_bad_input() {
    let rst = ClusterInfo::from_file("/no/such/file.yaml");
    match rst {
        Err(ConfError::IOError(_)) => {}
        _ => panic!("expect IOError, got {:?}", rst),
    }

    let rst: Result<ClusterInfo, ConfError> = "nodes: [1, 2".parse();
    match rst {
        Err(ConfError::BadYaml(_)) => {}
        _ => panic!("expect BadYaml, got {:?}", rst),
    }
}
