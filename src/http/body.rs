//! Response body types
//!
//! Every response uses one boxed body type so fixed pages and streamed files
//! can come out of the same handler.

use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::future::Future;
use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

use crate::resolver::Chunks;

/// Body type shared by all responses
pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// Fixed body from bytes or a string
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

/// Zero-length body (HEAD responses)
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

/// Where the next chunk comes from
#[derive(Debug)]
enum ReadState<R> {
    Idle(Chunks<R>),
    /// A read is running on the blocking pool and hands the reader back
    Reading(JoinHandle<(Chunks<R>, Option<io::Result<Bytes>>)>),
    Done,
}

/// Streams a file chunk by chunk
///
/// Each read runs on tokio's blocking pool so the connection task never waits
/// on the disk. Dropping the body (for instance when the client disconnects)
/// drops the underlying [`Chunks`] and with it the file handle; a read still
/// in flight releases the handle as soon as it returns.
#[derive(Debug)]
pub struct ChunkedBody<R> {
    state: ReadState<R>,
    remaining: u64,
}

impl<R: Read> ChunkedBody<R> {
    /// `len` is the expected total size, used for the size hint
    pub fn new(chunks: Chunks<R>, len: u64) -> Self {
        Self {
            state: ReadState::Idle(chunks),
            remaining: len,
        }
    }
}

impl<R: Read + Send + Unpin + 'static> Body for ChunkedBody<R> {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        loop {
            match std::mem::replace(&mut this.state, ReadState::Done) {
                ReadState::Idle(mut chunks) => {
                    this.state = ReadState::Reading(tokio::task::spawn_blocking(move || {
                        let next = chunks.next();
                        (chunks, next)
                    }));
                }
                ReadState::Reading(mut task) => match Pin::new(&mut task).poll(cx) {
                    Poll::Pending => {
                        this.state = ReadState::Reading(task);
                        return Poll::Pending;
                    }
                    Poll::Ready(Ok((chunks, Some(Ok(data))))) => {
                        this.remaining = this.remaining.saturating_sub(data.len() as u64);
                        this.state = ReadState::Idle(chunks);
                        return Poll::Ready(Some(Ok(Frame::data(data))));
                    }
                    Poll::Ready(Ok((_, Some(Err(e))))) => return Poll::Ready(Some(Err(e))),
                    Poll::Ready(Ok((_, None))) => return Poll::Ready(None),
                    Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(io::Error::other(e)))),
                },
                ReadState::Done => return Poll::Ready(None),
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.state {
            ReadState::Idle(chunks) => !chunks.is_open(),
            ReadState::Reading(_) => false,
            ReadState::Done => true,
        }
    }

    fn size_hint(&self) -> SizeHint {
        let mut hint = SizeHint::new();
        hint.set_upper(self.remaining);
        hint
    }
}

/// Box a streamed file body into the shared response body type
pub fn chunked<R>(chunks: Chunks<R>, len: u64) -> ResponseBody
where
    R: Read + Unpin + Send + Sync + 'static,
{
    ChunkedBody::new(chunks, len).boxed()
}
