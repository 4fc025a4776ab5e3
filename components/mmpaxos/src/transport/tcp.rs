use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::SinkExt;
use futures::StreamExt;
use prost::Message;
use slog::Logger;
use tokio::net::TcpListener;
use tokio::net::TcpSocket;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tokio_util::codec::LengthDelimitedCodec;

use crate::paxos::Reply;
use crate::paxos::ReplicaId;
use crate::paxos::Request;
use crate::transport::PaxosService;
use crate::transport::Transport;
use crate::transport::TransportError;

const TCP_BACKLOG: u32 = 1024;

/// TcpTransport dials a new connection for every request. A frame is a
/// length-delimited protobuf message.
pub struct TcpTransport {
    addrs: BTreeMap<ReplicaId, SocketAddr>,
}

impl TcpTransport {
    pub fn new(addrs: BTreeMap<ReplicaId, SocketAddr>) -> Self {
        TcpTransport { addrs }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, to: ReplicaId, req: Request) -> Result<Reply, TransportError> {
        let addr = *self
            .addrs
            .get(&to)
            .ok_or(TransportError::NoSuchReplica(to))?;

        let sock = TcpStream::connect(addr).await?;
        sock.set_nodelay(true)?;

        let mut framed = Framed::new(sock, LengthDelimitedCodec::new());
        framed.send(Bytes::from(req.encode_to_vec())).await?;

        let frame = framed.next().await.ok_or(TransportError::Closed)??;
        let reply = Reply::decode(frame)?;
        Ok(reply)
    }
}

/// bind_listener binds `addr` with SO_REUSEADDR so that a restarted server
/// does not wait for TIME_WAIT sockets.
pub fn bind_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let sock = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    sock.set_reuseaddr(true)?;
    sock.bind(addr)?;
    sock.listen(TCP_BACKLOG)
}

/// serve_with_shutdown accepts agreement requests on `addr` until `signal`
/// resolves. Every connection is served by its own task.
pub async fn serve_with_shutdown<F>(
    addr: SocketAddr,
    service: Arc<dyn PaxosService>,
    signal: F,
    logger: Logger,
) -> Result<(), io::Error>
where
    F: Future + Send,
{
    let lis = bind_listener(addr)?;
    info!(logger, "replication listened: {}", addr);

    tokio::pin!(signal);

    loop {
        tokio::select! {
            _v = (&mut signal) => {
                break;
            },
            inc = lis.accept() => {
                let (sock, peer) = inc?;
                let svc = service.clone();
                let lg = logger.new(o!("peer" => peer.to_string()));
                tokio::spawn(async move {
                    handle_conn(sock, svc, lg).await;
                });
            }
        }
    }

    info!(logger, "replication server stopped: {}", addr);
    Ok(())
}

async fn handle_conn(sock: TcpStream, svc: Arc<dyn PaxosService>, logger: Logger) {
    let mut framed = Framed::new(sock, LengthDelimitedCodec::new());

    while let Some(frame) = framed.next().await {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                debug!(logger, "read frame: {}", e);
                return;
            }
        };

        let req = match Request::decode(frame) {
            Ok(r) => r,
            Err(e) => {
                warn!(logger, "bad request: {}", e);
                return;
            }
        };

        let reply = svc.handle_paxos(req);

        if let Err(e) = framed.send(Bytes::from(reply.encode_to_vec())).await {
            debug!(logger, "write reply: {}", e);
            return;
        }
    }
}
