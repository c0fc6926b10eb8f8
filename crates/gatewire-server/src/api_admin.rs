//! Streaming `Admin` handlers: the live call log and periodic statistics.
//!
//! Both streams are Server-Sent Events. Each response owns a call-scoped
//! cancellation token; when the client disconnects axum drops the response
//! stream, the token fires, and the subscriber task releases its slot.

use crate::api::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    response::sse::{Event as SseEvent, KeepAlive, KeepAliveStream, Sse},
};
use futures_util::Stream;
use gatewire_observe::{LogTail, StatsAggregator, StreamLifetime};
use gatewire_types::StatInterval;
use serde::Serialize;
use std::{
    convert::Infallible,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Items buffered between a subscriber task and its HTTP response.
const STREAM_BUFFER: usize = 16;

/// A response stream that cancels its call token when dropped.
pub struct CallStream<S> {
    inner: S,
    _guard: DropGuard,
}

impl<S> CallStream<S> {
    fn new(inner: S, call: &CancellationToken) -> Self {
        Self {
            inner,
            _guard: call.clone().drop_guard(),
        }
    }
}

impl<S: Stream + Unpin> Stream for CallStream<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

type SseStream = CallStream<Pin<Box<dyn Stream<Item = Result<SseEvent, Infallible>> + Send>>>;

/// Wraps subscriber output as named SSE events serialised to JSON.
fn sse_stream<T>(rx: mpsc::Receiver<T>, name: &'static str, call: &CancellationToken) -> SseStream
where
    T: Serialize + Send + 'static,
{
    let mapped = ReceiverStream::new(rx).filter_map(move |item| match serde_json::to_string(&item) {
        Ok(data) => Some(Ok(SseEvent::default().event(name).data(data))),
        Err(e) => {
            tracing::error!("failed to serialize {} item: {}", name, e);
            None
        }
    });
    CallStream::new(Box::pin(mapped), call)
}

/// Handler for `POST /main.Admin/Logging`.
///
/// Streams every admitted call made after this stream was opened.
pub async fn logging_handler(Extension(state): Extension<Arc<AppState>>) -> Sse<KeepAliveStream<SseStream>> {
    let tail = LogTail::acquire(&state.broadcaster).await;
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
    let call = CancellationToken::new();
    let lifetime = StreamLifetime::new(state.shutdown.clone(), call.clone());

    let slot = tail.slot();
    tokio::spawn(async move {
        if let Err(e) = tail.run(tx, lifetime).await {
            tracing::debug!(slot, "log stream ended: {}", e);
        }
    });

    Sse::new(sse_stream(rx, "log", &call)).keep_alive(KeepAlive::default())
}

/// Handler for `POST /main.Admin/Statistics`.
///
/// Streams one snapshot of per-method and per-consumer call counts every
/// `interval_seconds`. A malformed body is an invalid argument, like a zero
/// interval.
pub async fn statistics_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<StatInterval>, JsonRejection>,
) -> Result<Sse<KeepAliveStream<SseStream>>, ApiError> {
    let Json(interval) = payload?;
    let period = Duration::from_secs(interval.interval_seconds);
    let aggregator = StatsAggregator::acquire(&state.broadcaster, period).await?;
    tracing::debug!(
        slot = aggregator.slot(),
        interval_secs = aggregator.period().as_secs(),
        "statistics stream opened"
    );
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
    let call = CancellationToken::new();
    let lifetime = StreamLifetime::new(state.shutdown.clone(), call.clone());

    let slot = aggregator.slot();
    tokio::spawn(async move {
        if let Err(e) = aggregator.run(tx, lifetime).await {
            tracing::debug!(slot, "statistics stream ended: {}", e);
        }
    });

    Ok(Sse::new(sse_stream(rx, "stat", &call)).keep_alive(KeepAlive::default()))
}
