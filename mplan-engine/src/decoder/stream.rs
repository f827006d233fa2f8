//! Async adapter from a chunk stream to decoder events
//!
//! Wraps one [`StreamDecoder`] session around any `futures::Stream` of text
//! chunks. The transport decides timeouts; callers abort a session by
//! cancelling the token.

use super::{DecoderConfig, StreamDecoder};
use crate::error::DecodeError;
use futures::stream::{Stream, StreamExt};
use mplan_common::DecoderEvent;
use std::fmt::Display;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

enum Step<T> {
    Cancelled,
    Next(Option<T>),
}

/// Decode a chunk stream into a stream of decoder events
///
/// - Each chunk is fed in arrival order; meal events are yielded as soon as
///   the chunk that completes them arrives.
/// - When the chunk stream ends, late meals from the final reconciliation are
///   yielded, then either `SessionComplete` or a `MalformedDocument` error.
/// - A chunk-level error yields `DecodeError::Transport` and ends the stream.
/// - Cancelling `cancel` discards the session and yields `SessionCancelled`.
pub fn decode_stream<S, E>(
    chunks: S,
    config: DecoderConfig,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<DecoderEvent, DecodeError>>
where
    S: Stream<Item = Result<String, E>>,
    E: Display,
{
    async_stream::stream! {
        let mut decoder = StreamDecoder::new(config);
        let mut chunks = Box::pin(chunks);

        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Cancelled,
                item = chunks.next() => Step::Next(item),
            };

            match step {
                Step::Cancelled => {
                    if let Some(event) = decoder.cancel() {
                        yield Ok(event);
                    }
                    break;
                }
                Step::Next(Some(Ok(chunk))) => match decoder.feed(&chunk) {
                    Ok(events) => {
                        for event in events {
                            yield Ok(event);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                },
                Step::Next(Some(Err(e))) => {
                    warn!(
                        "Chunk source failed for session {}: {}",
                        decoder.session_id(),
                        e
                    );
                    decoder.cancel();
                    yield Err(DecodeError::Transport(e.to_string()));
                    break;
                }
                Step::Next(None) => {
                    info!(
                        "Chunk source exhausted for session {} ({} bytes)",
                        decoder.session_id(),
                        decoder.buffered_len()
                    );
                    match decoder.reconcile() {
                        Ok(events) => {
                            for event in events {
                                yield Ok(event);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            break;
                        }
                    }
                    match decoder.finish() {
                        Ok(events) => {
                            for event in events {
                                yield Ok(event);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                        }
                    }
                    break;
                }
            }
        }
    }
}
