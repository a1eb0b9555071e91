use std::fmt::{self, Display};

use super::{Chunks, ChunksError};

#[derive(Debug)]
pub enum Error {
    ChunksError(ChunksError),
    InvalidPayload,
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Error::ChunksError(_), Error::ChunksError(_))
                | (Error::InvalidPayload, Error::InvalidPayload)
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ChunksError(err) => write!(f, "stream interrupted: {}", err.0),
            Error::InvalidPayload => write!(f, "malformed event stream"),
        }
    }
}

/// Reads the `data` payloads of server-sent events from a chunk stream.
///
/// Bytes are buffered until a whole event is available, so multi-byte
/// characters split across chunks decode correctly.
pub struct Sse {
    buf: Vec<u8>,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            chunks,
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            // Events already buffered are served before reading more.
            if let Some(event) = self.try_parse_event()? {
                return Ok(Some(event));
            }

            let Some(bytes) =
                self.chunks.next_chunk().await.map_err(Error::ChunksError)?
            else {
                // A trailing partial event is dropped.
                return Ok(None);
            };
            self.buf.extend(bytes.iter().filter(|b| **b != b'\r'));
        }
    }

    fn try_parse_event(&mut self) -> Result<Option<String>, Error> {
        // event       = *( comment / field ) end-of-line
        // comment     = colon *any-char end-of-line
        // field       = 1*name-char [ colon [ space ] *any-char ] end-of-line
        //
        // Only `data` fields are kept; other fields are ignored. CR has
        // already been stripped, so `end-of-line` is always LF.
        loop {
            let Some(eol_idx) = self.buf.windows(2).position(|w| w == b"\n\n")
            else {
                return Ok(None);
            };
            let block: Vec<u8> = self.buf.drain(0..eol_idx + 2).collect();
            let Ok(block) = str::from_utf8(&block[..eol_idx]) else {
                return Err(Error::InvalidPayload);
            };

            let mut data: Option<String> = None;
            for line in block.split('\n') {
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }
                let Some((name, value)) = line.split_once(':') else {
                    return Err(Error::InvalidPayload);
                };
                if name != "data" {
                    continue;
                }
                let value = value.strip_prefix(' ').unwrap_or(value);
                match &mut data {
                    Some(data) => {
                        data.push('\n');
                        data.push_str(value);
                    }
                    None => data = Some(value.to_owned()),
                }
            }

            // Blocks made only of comments carry no event.
            if let Some(data) = data {
                return Ok(Some(data));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn sse_from(chunks: Vec<&'static [u8]>) -> Sse {
        Sse::new(Chunks::from_vec_deque(
            chunks.into_iter().map(Bytes::from_static).collect(),
        ))
    }

    #[tokio::test]
    async fn test_normal_events() {
        let mut sse = sse_from(vec![&b"data: hello\n\ndata: bye\n\n"[..]]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "bye");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_across_chunks() {
        let mut sse = sse_from(vec![
            &b"data:"[..],
            &b" 22\xc2"[..],
            &b"\xb0C\n"[..],
            &b"\n"[..],
        ]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "22°C");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_crlf_and_comments() {
        let mut sse = sse_from(vec![
            &b": keep-alive\r\n\r\n"[..],
            &b"event: chunk\r\ndata: {\"a\":1}\r\n\r\n"[..],
            &b"data: [DONE]\r\n\r\n"[..],
        ]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "{\"a\":1}");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "[DONE]");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let mut sse = sse_from(vec![&b"xxxxxx\n\n"[..]]);
        assert_eq!(sse.next_event().await.unwrap_err(), Error::InvalidPayload);

        let mut sse = sse_from(vec![&b"data: \xff\xfe\n\n"[..]]);
        assert_eq!(sse.next_event().await.unwrap_err(), Error::InvalidPayload);

        let mut sse = sse_from(vec![&b"xxxxxx\n"[..]]);
        assert_eq!(sse.next_event().await.unwrap(), None);

        let mut sse =
            sse_from(vec![&b"data: hello\n"[..], &b"data: bye\n"[..]]);
        assert_eq!(sse.next_event().await.unwrap(), None);
    }
}
