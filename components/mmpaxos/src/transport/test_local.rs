use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::inst;
use crate::paxos::*;
use crate::transport::*;

use pretty_assertions::assert_eq;

/// Echo replies with what it received and counts requests.
#[derive(Default)]
pub struct Echo {
    pub n: AtomicUsize,
}

impl PaxosService for Echo {
    fn handle_paxos(&self, req: Request) -> Reply {
        self.n.fetch_add(1, Ordering::SeqCst);
        Reply {
            highest_seen: req.ballot,
            instances: req.instances,
        }
    }
}

pub fn echo_req() -> Request {
    Request::accept(ballot!(3, 1), 1, inst!((1, 0, 1), (x = 1), [0, 1, 0]))
}

#[tokio::test]
async fn test_local_transport() {
    let t = LocalTransport::new();

    let echo = Arc::new(Echo::default());
    let svc: Arc<dyn PaxosService> = echo.clone();
    t.register(2, &svc);

    let reply = t.send(2, echo_req()).await.unwrap();
    assert_eq!(Some(ballot!(3, 1)), reply.highest_seen);
    assert_eq!(echo_req().instances, reply.instances);
    assert_eq!(1, echo.n.load(Ordering::SeqCst));

    assert_eq!(
        Err(TransportError::NoSuchReplica(0)),
        t.send(0, echo_req()).await
    );

    t.set_down(2, true);
    assert_eq!(
        Err(TransportError::Unreachable(2)),
        t.send(2, echo_req()).await
    );
    assert_eq!(1, echo.n.load(Ordering::SeqCst));

    t.set_down(2, false);
    assert!(t.send(2, echo_req()).await.is_ok());

    // only weak references are held.
    drop(svc);
    drop(echo);
    assert_eq!(
        Err(TransportError::NoSuchReplica(2)),
        t.send(2, echo_req()).await
    );
}
