//! SSE translation of progress-event streams.
//!
//! Each download or initialization request gets its own channel: the
//! producing task owns the sender, this module turns the receiver into an
//! `text/event-stream` response. When the producer finishes (for any
//! reason) the channel closes and a final `close` event is appended, so a
//! client-side reader can always detect the end of the stream.
//!
//! A client that disconnects drops only the receiver; the producing task
//! keeps running to completion. Downloads are therefore never cancelled
//! mid-file by a closed browser tab.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use facelift_core::ProgressEvent;

/// Capacity of per-request progress channels. Emission is rate-limited
/// upstream, so a small buffer absorbs any burst.
pub const CHANNEL_CAPACITY: usize = 64;

/// Create a progress channel sized for one SSE request.
#[must_use]
pub fn progress_channel() -> (mpsc::Sender<ProgressEvent>, mpsc::Receiver<ProgressEvent>) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Turn a progress-event receiver into an SSE response.
///
/// Events serialize to JSON data frames; ones that fail to serialize are
/// logged and skipped. The stream ends with a named `close` event once the
/// sender side is dropped. A keep-alive ping every 15 seconds stops
/// proxies from timing out long downloads between progress ticks.
pub fn progress_stream(
    rx: mpsc::Receiver<ProgressEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let events = ReceiverStream::new(rx).filter_map(|event| match serde_json::to_string(&event) {
        Ok(json) => Some(Ok(Event::default().data(json))),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize progress event");
            None
        }
    });

    let stream = events.chain(tokio_stream::once(Ok(Event::default()
        .event("close")
        .data("close"))));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
