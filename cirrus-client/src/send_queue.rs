use std::sync::Arc;

use bytes::BytesMut;
use parking_lot::Mutex;
use tokio::{io::AsyncWriteExt, runtime::Handle, task::AbortHandle};

use cirrus_parser::Message;

use crate::{error::ClientError, stream::BoxedWriter};

const CRLF: &[u8] = b"\r\n";

#[derive(Default)]
struct Outgoing {
    buffer: BytesMut,
    in_flight: bool,
    attached: bool,
    /// `None` while a write holds it.
    writer: Option<BoxedWriter>,
    /// The task holding the writer.
    write_task: Option<AbortHandle>,
    runtime: Option<Handle>,
    /// Bumped on attach and detach, so a write finishing after its connection is gone
    /// does not touch the next one.
    generation: u64,
}

/// Outbound side of the connection.
///
/// Lines from any number of callers are appended to one buffer; whatever accumulated
/// while a write was in flight goes out as a single write once it completes. There is
/// never more than one write in flight and bytes leave in enqueue order.
#[derive(Clone, Default)]
pub(crate) struct SendQueue {
    outgoing: Arc<Mutex<Outgoing>>,
}

impl SendQueue {
    /// Must be called from within a tokio runtime, writes are spawned on it.
    pub(crate) fn attach(&self, writer: BoxedWriter) {
        let mut outgoing = self.outgoing.lock();
        outgoing.generation += 1;
        outgoing.buffer.clear();
        outgoing.in_flight = false;
        outgoing.attached = true;
        outgoing.writer = Some(writer);
        outgoing.runtime = Some(Handle::current());
    }

    /// Drop the writer, which shuts down the write side of the socket, along with
    /// anything not yet written. A write in flight is aborted, its task owns the writer
    /// and may never complete if the peer stopped reading.
    pub(crate) fn detach(&self) {
        let (writer, write_task) = {
            let mut outgoing = self.outgoing.lock();
            outgoing.generation += 1;
            outgoing.buffer.clear();
            outgoing.in_flight = false;
            outgoing.attached = false;
            outgoing.runtime = None;
            (outgoing.writer.take(), outgoing.write_task.take())
        };
        if let Some(write_task) = write_task {
            write_task.abort();
        }
        drop(writer);
    }

    pub(crate) fn enqueue(&self, message: &Message) -> Result<(), ClientError> {
        self.enqueue_line(message.to_string().as_bytes())
    }

    pub(crate) fn enqueue_line(&self, line: &[u8]) -> Result<(), ClientError> {
        {
            let mut outgoing = self.outgoing.lock();
            if !outgoing.attached {
                return Err(ClientError::NotConnected);
            }
            outgoing.buffer.extend_from_slice(line);
            outgoing.buffer.extend_from_slice(CRLF);
        }
        log::trace!("-> {}", String::from_utf8_lossy(line));

        self.flush();
        Ok(())
    }

    fn flush(&self) {
        let mut outgoing = self.outgoing.lock();
        if outgoing.in_flight || outgoing.buffer.is_empty() {
            return;
        }
        let Some(runtime) = outgoing.runtime.clone() else {
            return;
        };
        let Some(mut writer) = outgoing.writer.take() else {
            return;
        };

        let snapshot = outgoing.buffer.split().freeze();
        let generation = outgoing.generation;
        outgoing.in_flight = true;

        // spawned under the lock, so that the handle is stored before the task can
        // complete and start the next write
        let queue = self.clone();
        let write_task = runtime.spawn(async move {
            let result = async {
                writer.write_all(&snapshot).await?;
                writer.flush().await
            }
            .await;
            queue.complete_write(generation, writer, result);
        });
        outgoing.write_task = Some(write_task.abort_handle());
    }

    fn complete_write(&self, generation: u64, writer: BoxedWriter, result: std::io::Result<()>) {
        {
            let mut outgoing = self.outgoing.lock();
            if outgoing.generation != generation {
                // connection closed or replaced meanwhile, the writer goes with it
                return;
            }
            if let Err(err) = result {
                log::warn!("error when writing to the server: {err}");
            }
            outgoing.in_flight = false;
            outgoing.writer = Some(writer);
            outgoing.write_task = None;
        }

        // pick up what was enqueued during the write
        self.flush();
    }
}
