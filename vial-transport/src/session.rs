//! Request/response session over a raw transport
//!
//! `Session` wraps a raw `Transport` (which only moves frames) and adds query
//! semantics: zero padding, deadlines, and strict one-at-a-time correlation.
//!
//! ```text
//! [HidTransport / test doubles]   ← implements Transport (raw frames)
//!              |
//!          [Session]              ← one request in flight, timeouts
//!              |
//!     [VialKeyboard / CLI]
//! ```
//!
//! All traffic is funneled through a worker thread fed by a one-slot
//! mailbox. Callers wait on a oneshot reply, so concurrent requests queue
//! instead of interleaving their writes and reads.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::command::HidCommand;
use crate::error::TransportError;
use crate::protocol::{self, frame_name, timing, MSG_LEN};
use crate::types::TransportDeviceInfo;
use crate::Transport;

enum RequestKind {
    /// Write only, do not wait for a frame
    Send,
    /// Write and wait for the next inbound frame
    Query { timeout: Duration },
}

struct Request {
    frame: [u8; MSG_LEN],
    kind: RequestKind,
    reply_tx: oneshot::Sender<Result<Option<Vec<u8>>, TransportError>>,
}

/// Serialized request/response channel to one device
///
/// The session borrows the transport; dropping it stops the worker but
/// leaves the transport open.
pub struct Session {
    transport: Arc<dyn Transport>,
    request_tx: mpsc::Sender<Request>,
    timeout: Duration,
}

impl Session {
    /// Start a session worker for `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| TransportError::Internal(format!("session runtime: {}", e)))?;

        let (request_tx, request_rx) = mpsc::channel(timing::REQUEST_QUEUE_SIZE);
        let worker_transport = Arc::clone(&transport);
        std::thread::Builder::new()
            .name("vial-session".into())
            .spawn(move || runtime.block_on(session_worker(worker_transport, request_rx)))
            .map_err(|e| TransportError::Internal(format!("session worker: {}", e)))?;

        Ok(Self {
            transport,
            request_tx,
            timeout: Duration::from_millis(timing::DEFAULT_TIMEOUT_MS),
        })
    }

    /// Override the default response deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default response deadline for [`Session::request`]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Access the wrapped raw transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn device_info(&self) -> &TransportDeviceInfo {
        self.transport.device_info()
    }

    /// Open the device; a no-op when already open
    pub async fn open(&self) -> Result<(), TransportError> {
        self.transport.open().await
    }

    /// Write one zero-padded frame without waiting for a reply
    pub async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let frame = protocol::build_frame(data)?;
        self.dispatch(frame, RequestKind::Send).await?;
        Ok(())
    }

    /// Write one frame and return the next inbound frame
    pub async fn request(&self, data: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.request_with_timeout(data, self.timeout).await
    }

    /// [`Session::request`] with an explicit deadline
    pub async fn request_with_timeout(
        &self,
        data: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let frame = protocol::build_frame(data)?;
        self.dispatch(frame, RequestKind::Query { timeout })
            .await?
            .ok_or(TransportError::Internal("query completed without a frame".into()))
    }

    /// Send a typed command and return the raw response frame
    pub async fn query<C: HidCommand + Sync>(&self, cmd: &C) -> Result<Vec<u8>, TransportError> {
        let frame = cmd.build()?;
        self.dispatch(
            frame,
            RequestKind::Query {
                timeout: self.timeout,
            },
        )
        .await?
        .ok_or(TransportError::Internal("query completed without a frame".into()))
    }

    async fn dispatch(
        &self,
        frame: [u8; MSG_LEN],
        kind: RequestKind,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.request_tx
            .send(Request {
                frame,
                kind,
                reply_tx,
            })
            .await
            .map_err(|_| TransportError::Disconnected)?;

        reply_rx.await.map_err(|_| TransportError::Disconnected)?
    }
}

// ============================================================================
// Worker
// ============================================================================

async fn session_worker(transport: Arc<dyn Transport>, mut rx: mpsc::Receiver<Request>) {
    debug!("Session worker started");

    while let Some(req) = rx.recv().await {
        let result = execute(transport.as_ref(), &req.frame, &req.kind).await;
        let _ = req.reply_tx.send(result);
    }

    debug!("Session worker stopped");
}

async fn execute(
    transport: &dyn Transport,
    frame: &[u8; MSG_LEN],
    kind: &RequestKind,
) -> Result<Option<Vec<u8>>, TransportError> {
    discard_stale(transport).await?;
    transport.write_frame(frame).await?;

    let RequestKind::Query { timeout } = kind else {
        return Ok(None);
    };

    let timeout_ms = timeout.as_millis() as u64;
    match tokio::time::timeout(*timeout, transport.read_frame(*timeout)).await {
        Ok(Ok(Some(resp))) => Ok(Some(resp)),
        Ok(Ok(None)) | Err(_) => {
            warn!(
                "{} timed out after {} ms",
                frame_name(frame),
                timeout_ms
            );
            Err(TransportError::Timeout { timeout_ms })
        }
        Ok(Err(e)) => Err(e),
    }
}

/// Drop frames that arrived after their request gave up
///
/// A late reply left in the queue would otherwise be taken as the answer to
/// the next request.
async fn discard_stale(transport: &dyn Transport) -> Result<(), TransportError> {
    for _ in 0..timing::MAX_STALE_FRAMES {
        match transport.read_frame(Duration::ZERO).await? {
            Some(stale) => warn!(
                "Discarding stale frame: {:02X?}",
                &stale[..stale.len().min(8)]
            ),
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Instant;

    type Responder = Box<dyn Fn(usize, &[u8]) -> Vec<(Duration, Vec<u8>)> + Send + Sync>;

    /// Scripted device: each written frame yields zero or more delayed replies
    struct MockTransport {
        info: TransportDeviceInfo,
        responder: Responder,
        inbound: Mutex<Vec<(Instant, Vec<u8>)>>,
        written: Mutex<Vec<Vec<u8>>>,
        writes: AtomicUsize,
        in_flight: AtomicUsize,
        overlapped: AtomicBool,
        opens: AtomicUsize,
        fail_write: AtomicBool,
    }

    impl MockTransport {
        fn new(responder: Responder) -> Arc<Self> {
            Arc::new(Self {
                info: TransportDeviceInfo::default(),
                responder,
                inbound: Mutex::new(Vec::new()),
                written: Mutex::new(Vec::new()),
                writes: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                overlapped: AtomicBool::new(false),
                opens: AtomicUsize::new(0),
                fail_write: AtomicBool::new(false),
            })
        }

        fn echo() -> Arc<Self> {
            Self::new(Box::new(|_, frame| vec![(Duration::ZERO, frame.to_vec())]))
        }

        fn pop_ready(&self) -> Option<Vec<u8>> {
            let mut inbound = self.inbound.lock();
            let now = Instant::now();
            let idx = inbound
                .iter()
                .enumerate()
                .filter(|(_, (at, _))| *at <= now)
                .min_by_key(|(_, (at, _))| *at)
                .map(|(i, _)| i)?;
            Some(inbound.remove(idx).1)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn open(&self) -> Result<(), TransportError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn write_frame(&self, frame: &[u8; MSG_LEN]) -> Result<(), TransportError> {
            if self.fail_write.load(Ordering::SeqCst) {
                self.written.lock().push(frame.to_vec());
                return Err(TransportError::Write("device unplugged".into()));
            }
            if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            let n = self.writes.fetch_add(1, Ordering::SeqCst);
            self.written.lock().push(frame.to_vec());
            let now = Instant::now();
            let replies = (self.responder)(n, frame);
            if replies.is_empty() {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            self.inbound
                .lock()
                .extend(replies.into_iter().map(|(delay, f)| (now + delay, f)));
            Ok(())
        }

        async fn read_frame(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
            let deadline = Instant::now() + timeout;
            loop {
                if let Some(frame) = self.pop_ready() {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    return Ok(Some(frame));
                }
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }

        fn device_info(&self) -> &TransportDeviceInfo {
            &self.info
        }

        async fn is_connected(&self) -> bool {
            true
        }

        async fn close(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_request_pads_frame_and_returns_reply() {
        let mock = MockTransport::echo();
        let session = Session::new(mock.clone()).unwrap();

        let resp = session.request(&[0x11]).await.unwrap();
        assert_eq!(resp.len(), MSG_LEN);
        assert_eq!(resp[0], 0x11);
        assert!(resp[1..].iter().all(|&b| b == 0));
        assert_eq!(mock.written.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_request_times_out_without_reply() {
        let mock = MockTransport::new(Box::new(|_, _| Vec::new()));
        let session = Session::new(mock).unwrap();

        let err = session
            .request_with_timeout(&[0x01], Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout { timeout_ms: 30 }));
    }

    #[tokio::test]
    async fn test_late_reply_does_not_answer_next_request() {
        // First request's reply arrives after its deadline
        let mock = MockTransport::new(Box::new(|n, frame| {
            let delay = if n == 0 {
                Duration::from_millis(60)
            } else {
                Duration::ZERO
            };
            vec![(delay, frame.to_vec())]
        }));
        let session = Session::new(mock).unwrap();

        let err = session
            .request_with_timeout(&[0xAA], Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));

        tokio::time::sleep(Duration::from_millis(80)).await;

        let resp = session.request(&[0xBB]).await.unwrap();
        assert_eq!(resp[0], 0xBB);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_requests_never_overlap() {
        let mock = MockTransport::new(Box::new(|_, frame| {
            vec![(Duration::from_millis(2), frame.to_vec())]
        }));
        let session = Arc::new(Session::new(mock.clone()).unwrap());

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let session = Arc::clone(&session);
            handles.push(tokio::spawn(async move {
                let resp = session.request(&[0x12, 0, i, 28]).await.unwrap();
                assert_eq!(resp[2], i);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(mock.writes.load(Ordering::SeqCst), 8);
        assert!(!mock.overlapped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_write_error_reaches_caller() {
        let mock = MockTransport::echo();
        mock.fail_write.store(true, Ordering::SeqCst);
        let session = Session::new(mock.clone()).unwrap();

        let err = session.request(&[0x01]).await.unwrap_err();
        assert!(matches!(err, TransportError::Write(_)));
        let err = session.send(&[0x09]).await.unwrap_err();
        assert!(matches!(err, TransportError::Write(_)));

        // worker survives the failure
        mock.fail_write.store(false, Ordering::SeqCst);
        let resp = session.request(&[0x11]).await.unwrap();
        assert_eq!(resp[0], 0x11);
        assert_eq!(mock.written.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_send_rejects_oversize_payload() {
        let session = Session::new(MockTransport::echo()).unwrap();
        let err = session.send(&[0u8; 33]).await.unwrap_err();
        assert!(matches!(err, TransportError::FrameTooLong { len: 33, .. }));
    }

    #[tokio::test]
    async fn test_send_does_not_consume_reply_for_next_request() {
        let mock = MockTransport::new(Box::new(|n, frame| {
            if n == 0 {
                // ack for the fire-and-forget write
                vec![(Duration::ZERO, vec![0xEE; MSG_LEN])]
            } else {
                vec![(Duration::ZERO, frame.to_vec())]
            }
        }));
        let session = Session::new(mock).unwrap();

        session.send(&[0x09]).await.unwrap();
        let resp = session.request(&[0x01]).await.unwrap();
        assert_eq!(resp[0], 0x01);
    }

    #[tokio::test]
    async fn test_open_delegates_to_transport() {
        let mock = MockTransport::echo();
        let session = Session::new(mock.clone()).unwrap();
        session.open().await.unwrap();
        session.open().await.unwrap();
        assert_eq!(mock.opens.load(Ordering::SeqCst), 2);
    }
}
