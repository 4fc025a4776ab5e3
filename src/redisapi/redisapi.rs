use std::io;
use std::net::SocketAddr;
use std::str::from_utf8;
use std::sync::Arc;

use futures::Future;
use futures::SinkExt;
use futures::StreamExt;
use slog::Logger;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use mmpaxos::paxos::Command;
use mmpaxos::replica::Replica;
use mmpaxos::transport::bind_listener;

use parse::BytesFrame;
use parse::CodecError;
use parse::RespCodec;
use parse::Response;

use crate::RedisApiError;

/// RedisApi serves SET, GET and PING with the redis protocol.
#[derive(Clone)]
pub struct RedisApi {
    pub replica: Arc<Replica>,
    logger: Logger,
}

impl RedisApi {
    pub fn new(replica: Arc<Replica>, logger: &Logger) -> Self {
        RedisApi {
            replica,
            logger: logger.new(o!("api" => "redis")),
        }
    }

    pub async fn serve_with_shutdown<F>(self, addr: SocketAddr, signal: F) -> Result<(), io::Error>
    where
        F: Future + Send,
    {
        let lis = bind_listener(addr)?;
        info!(self.logger, "redis api listened: {}", addr);

        tokio::pin!(signal);

        loop {
            tokio::select! {
                _v = (&mut signal) => {
                    break;
                },
                inc = lis.accept() => {
                    let (sock, cli_addr) = inc?;
                    let slf = self.clone();
                    tokio::spawn(async move {
                        slf.handle_new_conn(sock, cli_addr).await;
                    });
                }
            }
        }

        info!(self.logger, "redis api stopped: {}", addr);
        Ok(())
    }

    async fn handle_new_conn(self, sock: TcpStream, cli_addr: SocketAddr) {
        let logger = self.logger.new(o!("client" => cli_addr.to_string()));
        debug!(logger, "new connection");

        let mut framed = Framed::new(sock, RespCodec::default());

        while let Some(frame) = framed.next().await {
            let r = match frame {
                Ok(f) => self.exec_redis_cmd(f).await,
                Err(CodecError::Io(e)) => {
                    debug!(logger, "read: {}", e);
                    return;
                }
                Err(e) => {
                    warn!(logger, "bad redis protocol: {}", e);
                    let r = Response::Error(format!("ERR protocol error: {}", e));
                    let _ = framed.send(r).await;
                    return;
                }
            };
            debug!(logger, "reply: {:?}", r);

            if let Err(e) = framed.send(r).await {
                debug!(logger, "write reply: {}", e);
                return;
            }
        }

        debug!(logger, "client closed");
    }

    /// exec_redis_cmd runs one command, e.g. `["SET", "x", "1"]`. Any failure
    /// becomes an error reply.
    pub async fn exec_redis_cmd(&self, frame: BytesFrame) -> Response {
        let rst = self.dispatch(frame).await;
        match rst {
            Ok(r) => r,
            Err(e) => Response::Error(format!("ERR {}", e)),
        }
    }

    async fn dispatch(&self, frame: BytesFrame) -> Result<Response, RedisApiError> {
        let tokens = match frame {
            BytesFrame::Array(tokens) => tokens,
            _ => return Err(RedisApiError::InvalidCommand),
        };

        let mut args: Vec<&[u8]> = Vec::with_capacity(tokens.len());
        for t in tokens.iter() {
            match t {
                BytesFrame::BulkString(d) | BytesFrame::SimpleString(d) => args.push(d),
                _ => return Err(RedisApiError::InvalidCommand),
            }
        }

        let name = match args.first() {
            Some(n) => String::from_utf8_lossy(n).to_uppercase(),
            None => return Err(RedisApiError::InvalidCommand),
        };

        match name.as_str() {
            "SET" => self.cmd_set(&args[1..]).await,
            "GET" => self.cmd_get(&args[1..]),
            "PING" => Ok(Response::Status("PONG".to_owned())),
            _ => Err(RedisApiError::UnknownCommand(name)),
        }
    }

    /// cmd_set commits `key = value` through the column of this replica.
    async fn cmd_set(&self, args: &[&[u8]]) -> Result<Response, RedisApiError> {
        if args.len() != 2 {
            return Err(RedisApiError::WrongArity("set".into()));
        }

        let key = from_utf8(args[0]).map_err(|_| RedisApiError::InvalidKey)?;
        let value = from_utf8(args[1])
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(RedisApiError::NotInteger)?;

        self.replica.set(Command::set(key, value)).await?;

        Ok(Response::Status("OK".to_owned()))
    }

    /// cmd_get reads the local state machine.
    fn cmd_get(&self, args: &[&[u8]]) -> Result<Response, RedisApiError> {
        if args.len() != 1 {
            return Err(RedisApiError::WrongArity("get".into()));
        }

        let key = from_utf8(args[0]).map_err(|_| RedisApiError::InvalidKey)?;

        let r = match self.replica.get(key) {
            Some(v) => Response::Integer(v),
            None => Response::Nil,
        };
        Ok(r)
    }
}
