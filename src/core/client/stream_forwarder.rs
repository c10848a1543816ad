use std::io;

use axum::body::Body;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::Response;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn, Instrument};

/// Pipe an upstream response body to the client chunk by chunk.
///
/// A spawned task reads the upstream byte stream and pushes each chunk into a
/// bounded channel backing the returned body. Bytes keep their order and
/// framing. The task stops, dropping the upstream connection, as soon as the
/// client side goes away; an upstream read error aborts the client body.
pub fn forward_stream(upstream: Response, capacity: usize) -> Body {
    let (tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(capacity.max(1));

    tokio::spawn(
        async move {
            let mut stream = upstream.bytes_stream();
            let mut forwarded: usize = 0;

            loop {
                let next = tokio::select! {
                    _ = tx.closed() => {
                        debug!(forwarded, "client disconnected, releasing upstream");
                        break;
                    }
                    next = stream.next() => next,
                };

                match next {
                    Some(Ok(chunk)) => {
                        forwarded += chunk.len();
                        if tx.send(Ok(chunk)).await.is_err() {
                            debug!(forwarded, "client disconnected, releasing upstream");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(forwarded, error = %e, "upstream stream interrupted");
                        let _ = tx.send(Err(io::Error::other(e))).await;
                        break;
                    }
                    None => {
                        debug!(forwarded, "upstream stream completed");
                        break;
                    }
                }
            }
        }
        .in_current_span(),
    );

    Body::from_stream(ReceiverStream::new(rx))
}
