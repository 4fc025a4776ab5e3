use std::collections::BTreeMap;
use std::fmt;

use crate::paxos::BallotNum;
use crate::paxos::Command;
use crate::paxos::Instance;
use crate::paxos::InstanceId;
use crate::paxos::OpCode;
use crate::paxos::Reply;
use crate::paxos::Request;

pub trait ToStringExt {
    fn tostr_ext(&self) -> String;
}

impl ToStringExt for String {
    fn tostr_ext(&self) -> String {
        self.clone()
    }
}

impl<T: ToStringExt> ToStringExt for Option<T> {
    fn tostr_ext(&self) -> String {
        match self {
            Some(v) => v.tostr_ext(),
            None => "None".into(),
        }
    }
}

impl<T: ToStringExt> ToStringExt for Vec<T> {
    fn tostr_ext(&self) -> String {
        let items: Vec<String> = self.iter().map(|x| x.tostr_ext()).collect();
        format!("[{}]", items.join(", "))
    }
}

impl<K: ToStringExt, V: ToStringExt> ToStringExt for BTreeMap<K, V> {
    fn tostr_ext(&self) -> String {
        let items: Vec<String> = self
            .iter()
            .map(|(k, v)| format!("{}:{}", k.tostr_ext(), v.tostr_ext()))
            .collect();
        format!("{{{}}}", items.join(", "))
    }
}

impl ToStringExt for Command {
    fn tostr_ext(&self) -> String {
        if self.noop {
            "NoOp".into()
        } else {
            format!("Set:{}={}", self.key, self.value)
        }
    }
}

impl ToStringExt for OpCode {
    fn tostr_ext(&self) -> String {
        match self {
            Self::AcceptOrPrepare => "Accept".into(),
            Self::Commit => "Commit".into(),
        }
    }
}

impl ToStringExt for Request {
    fn tostr_ext(&self) -> String {
        format!(
            "{{op:{}, bal:{}, col:{}, insts:{}}}",
            self.op().tostr_ext(),
            self.ballot.tostr_ext(),
            self.column,
            self.instances.tostr_ext()
        )
    }
}

macro_rules! impl_tostr_ext {
    ($typ:path) => {
        impl ToStringExt for $typ {
            fn tostr_ext(&self) -> String {
                format!("{}", self)
            }
        }
    };

    ($typ:path, $fmt:expr, $($field:tt),*) => {
        impl ToStringExt for $typ {
            fn tostr_ext(&self) -> String {
                format!($fmt, $(self.$field.tostr_ext()),*)
            }
        }
    };
}

impl_tostr_ext!(bool);
impl_tostr_ext!(i64);
impl_tostr_ext!(BallotNum, "({}, {})", n, replica_id);
impl_tostr_ext!(InstanceId, "({}, {}, {})", column, lsn, proposer_id);
impl_tostr_ext!(
    Instance,
    "{{id:{}, cmd:{}, vbal:{}, c:{}, deps:{}}}",
    instance_id,
    cmd,
    accept_ballot,
    committed,
    deps
);
impl_tostr_ext!(Reply, "{{seen:{}, insts:{}}}", highest_seen, instances);

macro_rules! impl_display {
    ($typ:path) => {
        impl fmt::Display for $typ {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.tostr_ext())
            }
        }
    };
}

impl_display!(BallotNum);
impl_display!(InstanceId);
impl_display!(Command);
impl_display!(Instance);
impl_display!(Request);
impl_display!(Reply);
