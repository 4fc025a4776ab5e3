use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use crate::paxos::Reply;
use crate::paxos::ReplicaId;
use crate::paxos::Request;
use crate::transport::Transport;
use crate::transport::TransportError;

/// FaultyTransport fails a random fraction of requests, for testing.
///
/// A send error drops the request before it reaches the peer. A recv error
/// lets the peer handle the request, then drops the reply.
pub struct FaultyTransport {
    inner: Arc<dyn Transport>,
    pub send_error_rate: f64,
    pub recv_error_rate: f64,
    enabled: AtomicBool,
}

impl FaultyTransport {
    pub fn new(inner: Arc<dyn Transport>, send_error_rate: f64, recv_error_rate: f64) -> Self {
        FaultyTransport {
            inner,
            send_error_rate,
            recv_error_rate,
            enabled: AtomicBool::new(true),
        }
    }

    /// set_enabled turns fault injection on or off. A disabled
    /// FaultyTransport passes every request through.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn inject(&self, rate: f64) -> bool {
        self.enabled.load(Ordering::SeqCst) && rand::random::<f64>() < rate
    }
}

#[async_trait]
impl Transport for FaultyTransport {
    async fn send(&self, to: ReplicaId, req: Request) -> Result<Reply, TransportError> {
        if self.inject(self.send_error_rate) {
            return Err(TransportError::Injected("send"));
        }

        let reply = self.inner.send(to, req).await?;

        if self.inject(self.recv_error_rate) {
            return Err(TransportError::Injected("recv"));
        }
        Ok(reply)
    }
}
