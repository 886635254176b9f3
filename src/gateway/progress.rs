use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

/// Size of each body chunk handed to the transport
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Upload completion percentages, non-decreasing, ending at 100 only when
/// the upload succeeded. The sequence is finite and can be consumed once.
#[derive(Debug)]
pub struct UploadProgress {
    rx: UnboundedReceiver<u8>,
}

impl Stream for UploadProgress {
    type Item = u8;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<u8>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

#[derive(Debug)]
struct Counter {
    sent: u64,
    last: u8,
}

/// Producer side shared by the streaming body and the inbound stage
#[derive(Debug)]
pub(crate) struct ProgressReporter {
    tx: UnboundedSender<u8>,
    total: u64,
    counter: Mutex<Counter>,
}

impl ProgressReporter {
    pub(crate) fn channel(total: u64) -> (Arc<Self>, UploadProgress) {
        let (tx, rx) = unbounded();
        let reporter = Arc::new(Self {
            tx,
            total,
            counter: Mutex::new(Counter { sent: 0, last: 0 }),
        });
        (reporter, UploadProgress { rx })
    }

    /// Record `bytes` handed to the transport. Capped at 99 until the
    /// response confirms success.
    pub(crate) fn advance(&self, bytes: usize) {
        let mut counter = self.counter.lock().unwrap_or_else(|p| p.into_inner());
        counter.sent += bytes as u64;

        let percent = if self.total == 0 {
            0
        } else {
            (counter.sent.saturating_mul(100) / self.total).min(99) as u8
        };
        if percent > counter.last {
            counter.last = percent;
            let _ = self.tx.unbounded_send(percent);
        }
    }

    pub(crate) fn succeed(&self) {
        let mut counter = self.counter.lock().unwrap_or_else(|p| p.into_inner());
        counter.last = 100;
        let _ = self.tx.unbounded_send(100);
        self.tx.close_channel();
    }

    pub(crate) fn fail(&self) {
        self.tx.close_channel();
    }
}

/// Streaming request body that reports progress as chunks are consumed
pub(crate) fn progress_body(bytes: Vec<u8>, reporter: Arc<ProgressReporter>) -> reqwest::Body {
    let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        reporter.advance(chunk.len());
        Ok::<_, std::io::Error>(chunk)
    }));
    reqwest::Body::wrap_stream(stream)
}
