use bytes::Buf;
use bytes::BytesMut;
use redis_protocol::codec::Resp2;
use redis_protocol::error::RedisProtocolError;
use redis_protocol::resp2::types::BytesFrame;
use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;

use crate::Response;

/// Default bound of the array headers a single frame may nest.
pub const MAX_NESTING: usize = 64;

/// Default bound of the bytes buffered without completing a frame.
pub const MAX_BUFFERED: usize = 1 << 20;

quick_error! {
    #[derive(Debug)]
    pub enum CodecError {
        Io(e: std::io::Error) {
            from()
            display("io: {}", e)
        }

        Protocol(e: RedisProtocolError) {
            from()
            display("{}", e)
        }

        TooDeep(max: usize) {
            display("more than {} nested arrays", max)
        }

        TooLarge(len: usize) {
            display("incomplete request of {} bytes", len)
        }
    }
}

/// RespCodec decodes client requests and encodes `Response`s with `Resp2`.
///
/// A frame can nest no more array headers than `max_nesting`. Every array
/// header is a `*` at the start of a line, so only the bytes before the
/// `max_nesting + 1`-th such `*` are handed to the decoder.
pub struct RespCodec {
    inner: Resp2,
    max_nesting: usize,
    max_buffered: usize,
}

impl Default for RespCodec {
    fn default() -> Self {
        RespCodec::new(MAX_NESTING, MAX_BUFFERED)
    }
}

impl RespCodec {
    pub fn new(max_nesting: usize, max_buffered: usize) -> Self {
        RespCodec {
            inner: Resp2::default(),
            max_nesting,
            max_buffered,
        }
    }
}

impl Decoder for RespCodec {
    type Item = BytesFrame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesFrame>, CodecError> {
        let cut = src
            .iter()
            .enumerate()
            .filter(|(i, b)| **b == b'*' && (*i == 0 || src[*i - 1] == b'\n'))
            .nth(self.max_nesting)
            .map(|(i, _)| i);

        let frame = match cut {
            None => self.inner.decode(src)?,
            Some(cut) => {
                let mut window = BytesMut::from(&src[..cut]);
                match self.inner.decode(&mut window)? {
                    Some(frame) => {
                        src.advance(cut - window.len());
                        Some(frame)
                    }
                    None => return Err(CodecError::TooDeep(self.max_nesting)),
                }
            }
        };

        if frame.is_none() && src.len() > self.max_buffered {
            return Err(CodecError::TooLarge(src.len()));
        }
        Ok(frame)
    }
}

impl Encoder<Response> for RespCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), CodecError> {
        Encoder::<BytesFrame>::encode(&mut self.inner, item.into_frame(), dst)?;
        Ok(())
    }
}
