//! Lifecycle event subscription.
//!
//! `GET /events` answers with an unbounded body of concatenated JSON
//! records. [`subscribe`] decodes them one at a time and pushes each into
//! the caller's channel before reading the next, so events arrive in wire
//! order and none that was decoded is ever dropped.
//!
//! The signal and the deadline are honoured while the request is still
//! waiting for its response headers too.
//!
//! The subscription ends when:
//! - the server closes the feed (clean end, `Ok`);
//! - the [`CancellationSignal`] fires or the deadline passes (`Ok`);
//! - the receiving end of the channel is dropped (`Ok`);
//! - a record is malformed or the connection breaks mid-record
//!   ([`ClientError::StreamDecode`]).
//!
//! Cancellation works by closing the response body from a watcher task.
//! The watcher is aborted on every exit path, including when the
//! `subscribe` future itself is dropped.

use podwire_common::constants::EVENTS_PATH;
use podwire_common::filters::{FilterSet, encode_filters};
use podwire_common::types::Event;
use reqwest::Method;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::body::{BodyCloser, ClosableBody};
use crate::cancel::CancellationSignal;
use crate::connection::{Connection, QueryParams};
use crate::decoder::RecordDecoder;
use crate::error::{ClientError, Result, StreamFault};

/// What to ask the server for.
#[derive(Debug, Clone, Default)]
pub struct EventOptions {
    /// Only events after this point; passed through verbatim.
    pub since: Option<String>,
    /// Only events before this point; passed through verbatim.
    pub until: Option<String>,
    /// Server-side filters; omitted from the request when empty.
    pub filters: FilterSet,
    /// Stop reading at this instant, with the same effect as cancelling.
    pub deadline: Option<Instant>,
}

impl EventOptions {
    /// Query parameters for `GET /events`.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the filters cannot be serialized.
    pub fn query(&self) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        if let Some(since) = &self.since {
            params.push(("since", since.clone()));
        }
        if let Some(until) = &self.until {
            params.push(("until", until.clone()));
        }
        if let Some(filters) = encode_filters(&self.filters)? {
            params.push(("filters", filters));
        }
        Ok(params)
    }
}

/// Streams events from the server into `sink` until the feed ends.
///
/// Returns once the stream is over; the channel sender is dropped at that
/// point, so the receiver sees the end too.
///
/// # Errors
///
/// - Encoding error for invalid filters, before any request is sent.
/// - [`ClientError::Connection`] or [`ClientError::Status`] if the stream
///   cannot be opened.
/// - [`ClientError::StreamDecode`] if a record is malformed or the
///   connection breaks mid-record. Events delivered before that stay valid.
pub async fn subscribe(
    conn: &Connection,
    sink: mpsc::Sender<Event>,
    cancel: Option<CancellationSignal>,
    options: EventOptions,
) -> Result<()> {
    let params = options.query()?;
    let opened = tokio::select! {
        biased;
        () = fired(cancel.as_ref()) => None,
        () = expired(options.deadline) => None,
        sent = conn.send(Method::GET, EVENTS_PATH, &params) => Some(sent?),
    };
    let Some((endpoint, response)) = opened else {
        tracing::debug!("event subscription ended before the stream opened");
        return Ok(());
    };
    tracing::debug!(endpoint = %endpoint, "event stream opened");

    let body = ClosableBody::from_response(response);
    match pump(body, &sink, cancel, options.deadline).await {
        Ok(delivered) => {
            tracing::debug!(endpoint = %endpoint, delivered, "event stream finished");
            Ok(())
        }
        Err(e) => {
            tracing::debug!(endpoint = %endpoint, error = %e, "event stream failed");
            Err(e)
        }
    }
}

/// Decode loop. Returns the number of events delivered.
pub(crate) async fn pump(
    mut body: ClosableBody,
    sink: &mpsc::Sender<Event>,
    cancel: Option<CancellationSignal>,
    deadline: Option<Instant>,
) -> Result<u64> {
    let _watcher = Watcher::spawn(body.closer(), cancel, deadline);
    let closer = body.closer();
    let mut decoder = RecordDecoder::<Event>::new();
    let mut delivered = 0_u64;

    loop {
        // Once closed, records still sitting in the buffer are not delivered.
        while !body.is_closed() {
            let Some(event) = decoder.next_record().map_err(StreamFault::Malformed)? else {
                break;
            };
            let sent = tokio::select! {
                biased;
                () = closer.closed() => return Ok(delivered),
                sent = sink.send(event) => sent,
            };
            if sent.is_err() {
                tracing::debug!(delivered, "event receiver dropped, ending subscription");
                let _ = closer.close();
                return Ok(delivered);
            }
            delivered += 1;
            tracing::trace!(delivered, "event delivered");
        }

        match body.next_chunk().await {
            Ok(Some(chunk)) => decoder.extend(&chunk),
            Ok(None) if body.is_closed() => return Ok(delivered),
            Ok(None) => {
                decoder.finish().map_err(StreamFault::Malformed)?;
                return Ok(delivered);
            }
            Err(e) => return Err(ClientError::from(StreamFault::Interrupted(e))),
        }
    }
}

/// Background task that closes the body when the signal fires or the
/// deadline passes. Aborted when dropped.
struct Watcher(Option<JoinHandle<()>>);

impl Watcher {
    fn spawn(
        closer: BodyCloser,
        cancel: Option<CancellationSignal>,
        deadline: Option<Instant>,
    ) -> Self {
        if cancel.is_none() && deadline.is_none() {
            return Self(None);
        }
        if cancel.as_ref().is_some_and(CancellationSignal::is_fired) {
            let _ = closer.close();
            return Self(None);
        }

        let handle = tokio::spawn(async move {
            let reason = tokio::select! {
                () = fired(cancel.as_ref()) => "cancelled",
                () = expired(deadline) => "deadline reached",
            };
            if closer.close() {
                tracing::debug!(reason, "closing event stream");
            } else {
                tracing::trace!(reason, "event stream already closed");
            }
        });
        Self(Some(handle))
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}

async fn fired(signal: Option<&CancellationSignal>) {
    match signal {
        Some(signal) => signal.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
