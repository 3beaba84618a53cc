//! One live socket: a reader task and a writer task joined at teardown.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use murmur_core::config::RealtimeConfig;
use murmur_core::types::{ConnectionId, SubjectId};

use crate::hub::HubHandle;
use crate::message::serializer::serialize_outbound;
use crate::message::types::OutboundMessage;
use crate::message::validator::validate_inbound;

use super::frame::Frame;
use super::handle::ConnectionHandle;

/// What a finished connection did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSummary {
    /// Connection that finished.
    pub connection_id: ConnectionId,
    /// Subject that owned it.
    pub subject_id: SubjectId,
    /// Inbound frames accepted and submitted for broadcast.
    pub received: u64,
    /// Outbound messages written to the socket.
    pub written: u64,
}

/// An authenticated socket that has not been served yet.
#[derive(Debug)]
pub struct Connection {
    /// Shared with the hub registry.
    handle: Arc<ConnectionHandle>,
    /// Receiving half of the outbound queue, drained by the writer.
    outbound: mpsc::Receiver<Arc<OutboundMessage>>,
    /// Hub the connection registers with.
    hub: HubHandle,
    /// Inbound frame size limit.
    max_message_bytes: usize,
}

impl Connection {
    /// Creates a connection for `subject_id` with a fresh outbound queue.
    pub fn new(subject_id: SubjectId, hub: HubHandle, config: &RealtimeConfig) -> Self {
        let (handle, outbound) = ConnectionHandle::new(subject_id, config.outbound_queue_capacity);
        Self {
            handle,
            outbound,
            hub,
            max_message_bytes: config.max_message_bytes,
        }
    }

    /// Handle shared with the hub.
    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Connection id.
    pub fn id(&self) -> ConnectionId {
        self.handle.id
    }

    /// Registers with the hub and runs the reader and writer until the socket
    /// closes, a write fails, or the hub closes the outbound queue.
    ///
    /// The reader unregisters exactly once when it stops. The writer keeps
    /// draining the queue until the hub closes it, so the hub never waits on
    /// a dead socket.
    pub async fn serve<W, R, E>(self, mut sink: W, stream: R) -> ConnectionSummary
    where
        W: Sink<Frame> + Unpin + Send + 'static,
        W::Error: Display + Send,
        R: Stream<Item = Result<Frame, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let Self {
            handle,
            outbound,
            hub,
            max_message_bytes,
        } = self;

        let mut summary = ConnectionSummary {
            connection_id: handle.id,
            subject_id: handle.subject_id,
            received: 0,
            written: 0,
        };

        if let Err(e) = hub.register(handle.clone()).await {
            warn!(conn_id = %handle.id, error = %e, "Failed to register connection");
            handle.close();
            let _ = sink.close().await;
            return summary;
        }

        info!(
            conn_id = %handle.id,
            subject_id = %handle.subject_id,
            "WebSocket connection established"
        );

        let stop = handle.shutdown_token().child_token();

        let writer = tokio::spawn(write_loop(handle.id, sink, outbound, stop.clone()));
        let reader = tokio::spawn(read_loop(
            handle.clone(),
            stream,
            hub,
            stop,
            max_message_bytes,
        ));

        let (written, received) = tokio::join!(writer, reader);
        summary.written = written.unwrap_or_else(|e| {
            warn!(conn_id = %handle.id, error = %e, "Writer task failed");
            0
        });
        summary.received = received.unwrap_or_else(|e| {
            warn!(conn_id = %handle.id, error = %e, "Reader task failed");
            handle.close();
            0
        });

        info!(
            conn_id = %summary.connection_id,
            subject_id = %summary.subject_id,
            received = summary.received,
            written = summary.written,
            "WebSocket connection closed"
        );

        summary
    }
}

/// Forwards queued messages to the socket until the queue is closed.
async fn write_loop<W>(
    conn_id: ConnectionId,
    mut sink: W,
    mut outbound: mpsc::Receiver<Arc<OutboundMessage>>,
    stop: CancellationToken,
) -> u64
where
    W: Sink<Frame> + Unpin,
    W::Error: Display,
{
    let mut written = 0u64;
    let mut failed = false;

    while let Some(message) = outbound.recv().await {
        if failed {
            continue;
        }

        let text = match serialize_outbound(&message) {
            Ok(text) => text,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "Failed to serialize outbound message");
                continue;
            }
        };

        match sink.send(Frame::Text(text)).await {
            Ok(()) => written += 1,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "Socket write failed");
                failed = true;
                stop.cancel();
            }
        }
    }

    if !failed {
        let _ = sink.send(Frame::Close).await;
        let _ = sink.close().await;
    }

    written
}

/// Validates inbound frames and submits them for broadcast, then unregisters.
async fn read_loop<R, E>(
    handle: Arc<ConnectionHandle>,
    mut stream: R,
    hub: HubHandle,
    stop: CancellationToken,
    max_message_bytes: usize,
) -> u64
where
    R: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    let metrics = hub.metrics().clone();
    let mut received = 0u64;

    loop {
        let frame = tokio::select! {
            _ = stop.cancelled() => break,
            frame = stream.next() => frame,
        };

        let raw = match frame {
            Some(Ok(Frame::Text(text))) => text.into_bytes(),
            Some(Ok(Frame::Binary(bytes))) => bytes,
            Some(Ok(Frame::Ping(_) | Frame::Pong(_))) => continue,
            Some(Ok(Frame::Close)) | None => break,
            Some(Err(e)) => {
                warn!(conn_id = %handle.id, error = %e, "WebSocket error");
                break;
            }
        };

        let payload = match validate_inbound(&raw, max_message_bytes) {
            Ok(payload) => payload,
            Err(e) => {
                metrics.inbound_rejected();
                debug!(conn_id = %handle.id, error = %e, "Inbound frame rejected");
                continue;
            }
        };

        metrics.inbound_accepted();
        received += 1;

        if let Err(e) = hub
            .broadcast(OutboundMessage::broadcast(handle.subject_id, payload))
            .await
        {
            warn!(conn_id = %handle.id, error = %e, "Broadcast rejected, closing connection");
            break;
        }
    }

    if hub.unregister(handle.clone()).await.is_err() {
        handle.close();
    }

    received
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::channel::mpsc as fmpsc;
    use tokio_util::sync::CancellationToken;

    use crate::hub::Hub;

    type Inbound = fmpsc::UnboundedSender<Result<Frame, String>>;
    type Outbound = fmpsc::UnboundedReceiver<Frame>;

    fn start_hub() -> (HubHandle, CancellationToken) {
        let shutdown = CancellationToken::new();
        let (hub, _task) = Hub::spawn(&RealtimeConfig::default(), shutdown.clone());
        (hub, shutdown)
    }

    fn serve(
        hub: &HubHandle,
        subject: SubjectId,
    ) -> (
        Arc<ConnectionHandle>,
        Inbound,
        Outbound,
        tokio::task::JoinHandle<ConnectionSummary>,
    ) {
        let connection = Connection::new(subject, hub.clone(), &RealtimeConfig::default());
        let handle = connection.handle().clone();
        let (in_tx, in_rx) = fmpsc::unbounded();
        let (out_tx, out_rx) = fmpsc::unbounded();
        let task = tokio::spawn(connection.serve(out_tx, in_rx));
        (handle, in_tx, out_rx, task)
    }

    async fn wait_for_connections(hub: &HubHandle, n: usize) {
        for _ in 0..100 {
            if hub.stats().await.unwrap().connections == n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("hub never reached {n} connections");
    }

    #[tokio::test]
    async fn test_inbound_frame_is_broadcast_back() {
        let (hub, _shutdown) = start_hub();
        let subject = SubjectId::new();
        let (_handle, in_tx, out_rx, task) = serve(&hub, subject);
        wait_for_connections(&hub, 1).await;

        in_tx
            .unbounded_send(Ok(Frame::Text(r#"{"hello":"world"}"#.to_string())))
            .unwrap();
        drop(in_tx);

        let summary = task.await.unwrap();
        assert_eq!(summary.subject_id, subject);
        assert_eq!(summary.received, 1);
        assert_eq!(summary.written, 1);

        let frames: Vec<Frame> = out_rx.collect().await;
        assert_eq!(frames.len(), 2);
        let Frame::Text(text) = &frames[0] else {
            panic!("expected text frame, got {:?}", frames[0]);
        };
        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(value["type"], "broadcast");
        assert_eq!(value["payload"]["hello"], "world");
        assert_eq!(value["sender"], subject.to_string());
        assert_eq!(frames[1], Frame::Close);
    }

    #[tokio::test]
    async fn test_invalid_inbound_is_rejected_not_fatal() {
        let (hub, _shutdown) = start_hub();
        let (_handle, in_tx, _out_rx, task) = serve(&hub, SubjectId::new());
        wait_for_connections(&hub, 1).await;

        in_tx
            .unbounded_send(Ok(Frame::Text("not json".to_string())))
            .unwrap();
        in_tx.unbounded_send(Ok(Frame::Ping(vec![1]))).unwrap();
        in_tx
            .unbounded_send(Ok(Frame::Binary(b"[1,2]".to_vec())))
            .unwrap();
        in_tx.unbounded_send(Ok(Frame::Close)).unwrap();

        let summary = task.await.unwrap();
        assert_eq!(summary.received, 1);

        let metrics = hub.metrics().snapshot();
        assert_eq!(metrics.inbound_rejected, 1);
        assert_eq!(metrics.inbound_accepted, 1);
        assert_eq!(metrics.connections_closed, 1);
    }

    #[tokio::test]
    async fn test_write_failure_tears_down_both_tasks() {
        let (hub, _shutdown) = start_hub();
        let (handle, _in_tx, out_rx, task) = serve(&hub, SubjectId::new());
        wait_for_connections(&hub, 1).await;

        drop(out_rx);
        hub.broadcast(OutboundMessage::broadcast(
            SubjectId::new(),
            serde_json::json!({"n": 1}),
        ))
        .await
        .unwrap();

        let summary = task.await.unwrap();
        assert_eq!(summary.written, 0);
        assert!(handle.is_closed());
        assert_eq!(hub.stats().await.unwrap().connections, 0);
    }

    #[tokio::test]
    async fn test_stream_error_ends_connection() {
        let (hub, _shutdown) = start_hub();
        let (handle, in_tx, _out_rx, task) = serve(&hub, SubjectId::new());
        wait_for_connections(&hub, 1).await;

        in_tx.unbounded_send(Err("reset by peer".to_string())).unwrap();

        task.await.unwrap();
        assert!(handle.is_closed());
        assert_eq!(hub.metrics().snapshot().connections_closed, 1);
    }

    #[tokio::test]
    async fn test_hub_shutdown_ends_connection() {
        let (hub, shutdown) = start_hub();
        let (handle, _in_tx, _out_rx, task) = serve(&hub, SubjectId::new());
        wait_for_connections(&hub, 1).await;

        shutdown.cancel();

        let summary = task.await.unwrap();
        assert_eq!(summary.received, 0);
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_serve_against_stopped_hub_returns_immediately() {
        let (hub, shutdown) = start_hub();
        shutdown.cancel();
        while !hub.is_closed() {
            tokio::task::yield_now().await;
        }

        let (handle, _in_tx, mut out_rx, task) = serve(&hub, SubjectId::new());
        let summary = task.await.unwrap();

        assert_eq!(summary.received, 0);
        assert_eq!(summary.written, 0);
        assert!(handle.is_closed());
        assert!(out_rx.next().await.is_none());
    }
}
