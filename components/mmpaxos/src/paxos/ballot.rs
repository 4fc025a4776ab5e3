use crate::paxos::BallotNum;
use crate::paxos::ReplicaId;

impl BallotNum {
    pub fn new(n: i64, replica_id: ReplicaId) -> Self {
        BallotNum { n, replica_id }
    }
}

impl From<(i64, i64)> for BallotNum {
    fn from(t: (i64, i64)) -> BallotNum {
        BallotNum::new(t.0, t.1)
    }
}

/// ballot_less compares two maybe-absent accept ballots.
///
/// An absent ballot is less than any concrete one. Two absent ballots are
/// not comparable, thus `ballot_less(None, None)` is false.
pub fn ballot_less(a: Option<&BallotNum>, b: Option<&BallotNum>) -> bool {
    match (a, b) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(a), Some(b)) => a < b,
    }
}

/// ballot_ge returns true if `a` is a concrete ballot not less than `b`.
/// Two absent ballots are not comparable either way.
pub fn ballot_ge(a: Option<&BallotNum>, b: Option<&BallotNum>) -> bool {
    match (a, b) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(a), Some(b)) => a >= b,
    }
}
