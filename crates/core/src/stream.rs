//! Line-source plumbing - pumps feeding a session from async sources

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::error::Result;
use crate::session::CaptureSession;

/// Feed every line from a buffered reader into the session.
///
/// Returns as soon as the session completes, without draining the rest of
/// the source. Closes the session at EOF so a waiter sees
/// [`crate::Error::StreamClosed`] instead of hanging.
pub async fn pump_reader<R>(reader: R, session: &CaptureSession) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        session.feed(&line);
        if session.is_complete() {
            trace!("capture complete, pump finished");
            return Ok(());
        }
    }

    session.close();
    Ok(())
}

/// Feed every line from an in-memory stream (e.g. a channel receiver
/// wrapped as a stream) into the session. Same termination behavior as
/// [`pump_reader`].
pub async fn pump_stream<S>(mut stream: S, session: &CaptureSession)
where
    S: Stream<Item = String> + Unpin,
{
    while let Some(line) = stream.next().await {
        session.feed(&line);
        if session.is_complete() {
            trace!("capture complete, pump finished");
            return;
        }
    }

    session.close();
}

/// Spawn a background producer task pumping a reader into the session.
///
/// This is the push-based single-producer form: the returned handle is the
/// producer, the caller stays the single consumer on
/// [`CaptureSession::await_completion`].
pub fn spawn_reader<R>(reader: R, session: Arc<CaptureSession>) -> JoinHandle<Result<()>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move { pump_reader(reader, &session).await })
}
