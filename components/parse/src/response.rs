use bytes::Bytes;
use redis_protocol::resp2::types::BytesFrame;

/// A reply to send to a redis client.
#[derive(PartialEq, Debug, Clone)]
pub enum Response {
    /// Null bulk string
    Nil,
    Integer(i64),
    /// Bulk string
    Data(Vec<u8>),
    /// A simple error string
    Error(String),
    /// A simple status string
    Status(String),
    /// An array of responses that may mix different types
    Array(Vec<Response>),
}

impl Response {
    /// into_frame converts a reply to the frame written by the codec.
    /// A line break in a simple string would end the reply early, so it is
    /// replaced with a space.
    pub fn into_frame(self) -> BytesFrame {
        match self {
            Response::Nil => BytesFrame::Null,
            Response::Integer(i) => BytesFrame::Integer(i),
            Response::Data(d) => BytesFrame::BulkString(Bytes::from(d)),
            Response::Error(s) => BytesFrame::Error(one_line(&s).into()),
            Response::Status(s) => BytesFrame::SimpleString(Bytes::from(one_line(&s))),
            Response::Array(a) => BytesFrame::Array(a.into_iter().map(|r| r.into_frame()).collect()),
        }
    }

    /// Returns true if and only if the response is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Response::Status(_))
    }
}

fn one_line(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}
