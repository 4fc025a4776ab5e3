#[macro_export]
#[allow(unused_macros)]
macro_rules! ballot {
    ($n:expr, $replica_id:expr) => {
        $crate::paxos::BallotNum {
            n: $n as i64,
            replica_id: $replica_id as i64,
        }
    };
}

/// Create an Instance.
///
/// Supported patterns:
/// inst!((column, lsn, proposer), (key = value), [deps])
/// inst!((column, lsn, proposer), (key = value), [deps], committed)
/// inst!((column, lsn, proposer), (key = value), (n, replica_id), [deps])
/// inst!((column, lsn, proposer), (key = value), (n, replica_id), [deps], committed)
/// inst!((column, lsn, proposer), noop, [deps])
#[macro_export]
#[allow(unused_macros)]
macro_rules! inst {
    (($col:expr, $lsn:expr, $pid:expr), noop, [$($dep:expr),*]) => {
        $crate::paxos::Instance::of(
            $crate::paxos::InstanceId::from(($col as i64, $lsn as i64, $pid as i64)),
            $crate::paxos::Command::noop(),
            vec![$($dep as i64),*],
        )
    };

    (($col:expr, $lsn:expr, $pid:expr), ($key:ident = $val:expr), [$($dep:expr),*]) => {
        $crate::paxos::Instance::of(
            $crate::paxos::InstanceId::from(($col as i64, $lsn as i64, $pid as i64)),
            $crate::paxos::Command::set(stringify!($key), $val as i64),
            vec![$($dep as i64),*],
        )
    };

    (($col:expr, $lsn:expr, $pid:expr), ($key:ident = $val:expr), [$($dep:expr),*], committed) => {
        $crate::paxos::Instance {
            committed: true,
            ..$crate::inst!(($col, $lsn, $pid), ($key = $val), [$($dep),*])
        }
    };

    (($col:expr, $lsn:expr, $pid:expr), ($key:ident = $val:expr), ($n:expr, $rid:expr), [$($dep:expr),*]) => {
        $crate::paxos::Instance {
            accept_ballot: Some($crate::ballot!($n, $rid)),
            ..$crate::inst!(($col, $lsn, $pid), ($key = $val), [$($dep),*])
        }
    };

    (($col:expr, $lsn:expr, $pid:expr), ($key:ident = $val:expr), ($n:expr, $rid:expr), [$($dep:expr),*], committed) => {
        $crate::paxos::Instance {
            accept_ballot: Some($crate::ballot!($n, $rid)),
            committed: true,
            ..$crate::inst!(($col, $lsn, $pid), ($key = $val), [$($dep),*])
        }
    };
}

/// bug! logs a broken protocol invariant and panics.
#[macro_export]
macro_rules! bug {
    ($logger:expr, $($arg:tt)+) => {{
        let msg = format!($($arg)+);
        crit!($logger, "bug: {}", msg);
        panic!("bug: {}", msg)
    }};
}
