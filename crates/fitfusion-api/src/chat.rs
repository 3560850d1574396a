//! Incremental consumption of the AI chat endpoint.
//!
//! `/api/chat/` answers with a plain-text body that grows as the model
//! generates. The consumer reads the body chunk by chunk and emits the
//! *cumulative* text after every chunk, never deltas: each snapshot is a
//! prefix-extension of the previous one, and a caller renders it by
//! replacing whatever it showed before. The last snapshot is the complete
//! answer.
//!
//! A transport failure mid-stream surfaces as an error item on the stream;
//! snapshots already emitted are not rolled back. There is no cancellation:
//! dropping the stream stops consumption, but the request itself runs on
//! server-side until it finishes.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::error::{expect_success, ApiError};
use crate::ApiClient;

/// Stream of cumulative text snapshots for one chat call.
pub type ChatStream = ReceiverStream<Result<String, ApiError>>;

impl ApiClient {
    /// Ask the coach a question and observe the answer as it streams in.
    ///
    /// Returns an error immediately for a non-2xx status or a request that
    /// never got a response; once the stream is returned, failures arrive as
    /// the final stream item.
    pub async fn chat(&self, query: &str) -> Result<ChatStream, ApiError> {
        debug!(query, "issuing chat request");
        let response = self
            .http()
            .post(self.url("/api/chat/"))
            .json(&json!({ "query": query }))
            .send()
            .await?;
        let response = expect_success(response, "Chat request failed").await?;

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(pump_snapshots(response.bytes_stream(), tx));
        Ok(ReceiverStream::new(rx))
    }

    /// Callback-style adapter over [`ApiClient::chat`]: `on_update` is
    /// invoked with each cumulative snapshot, and the final complete text is
    /// returned once the stream ends. Text already delivered to `on_update`
    /// stays delivered if the stream fails partway.
    pub async fn chat_with_updates(
        &self,
        query: &str,
        mut on_update: impl FnMut(&str),
    ) -> Result<String, ApiError> {
        let mut stream = self.chat(query).await?;
        let mut text = String::new();
        while let Some(snapshot) = stream.next().await {
            let snapshot = snapshot?;
            on_update(&snapshot);
            text = snapshot;
        }
        Ok(text)
    }
}

/// Read transport chunks, fold them into the accumulated text, and send one
/// cumulative snapshot per chunk that contributed visible characters.
///
/// Chunks are byte deltas with no alignment guarantee, so a multi-byte
/// UTF-8 character split across chunks is held back until its remaining
/// bytes arrive.
async fn pump_snapshots<S, E>(mut chunks: S, tx: mpsc::Sender<Result<String, ApiError>>)
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<ApiError>,
{
    let mut pending: Vec<u8> = Vec::new();
    let mut text = String::new();

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(chunk) => {
                pending.extend_from_slice(&chunk);
                if !drain_valid_utf8(&mut pending, &mut text) {
                    continue;
                }
                debug!(chars = text.len(), "chat snapshot");
                if tx.send(Ok(text.clone())).await.is_err() {
                    debug!("chat stream receiver dropped, stopping");
                    return;
                }
            }
            Err(err) => {
                let _ = tx.send(Err(err.into())).await;
                return;
            }
        }
    }

    if !pending.is_empty() {
        warn!(bytes = pending.len(), "chat stream ended inside a UTF-8 sequence");
    }
    debug!(chars = text.len(), "chat stream completed");
}

/// Move every complete UTF-8 character from `pending` into `text`, leaving
/// only an incomplete trailing sequence behind. Invalid byte runs are
/// dropped with a warning rather than poisoning the stream. Returns whether
/// `text` grew.
fn drain_valid_utf8(pending: &mut Vec<u8>, text: &mut String) -> bool {
    let mut grew = false;
    loop {
        match std::str::from_utf8(pending) {
            Ok(valid) => {
                if !valid.is_empty() {
                    text.push_str(valid);
                    grew = true;
                }
                pending.clear();
                return grew;
            }
            Err(err) => {
                let valid_len = err.valid_up_to();
                if valid_len > 0 {
                    text.push_str(&String::from_utf8_lossy(&pending[..valid_len]));
                    grew = true;
                }
                match err.error_len() {
                    Some(invalid_len) => {
                        warn!(bytes = invalid_len, "dropping invalid UTF-8 in chat stream");
                        pending.drain(..valid_len + invalid_len);
                    }
                    None => {
                        // Incomplete trailing sequence: keep it for the next chunk.
                        pending.drain(..valid_len);
                        return grew;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    /// Run the pump over a fixed chunk sequence and collect everything it
    /// emits.
    async fn pump_collect(chunks: Vec<Result<Bytes, ApiError>>) -> Vec<Result<String, ApiError>> {
        let (tx, mut rx) = mpsc::channel(32);
        pump_snapshots(stream::iter(chunks), tx).await;

        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        items
    }

    fn fake_stream_error() -> ApiError {
        ApiError::Server {
            status: reqwest::StatusCode::BAD_GATEWAY,
            message: "connection reset".to_string(),
        }
    }

    #[tokio::test]
    async fn snapshots_are_cumulative_and_ordered() {
        let chunks = ["H", "e", "ll", "o"]
            .iter()
            .map(|s| Ok(Bytes::from_static(s.as_bytes())))
            .collect();
        let items = pump_collect(chunks).await;

        let snapshots: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(snapshots, vec!["H", "He", "Hell", "Hello"]);
    }

    #[tokio::test]
    async fn final_snapshot_is_complete_text() {
        let chunks = vec![
            Ok(Bytes::from_static(b"Par")),
            Ok(Bytes::from_static(b"tial answer")),
        ];
        let items = pump_collect(chunks).await;
        let last = items.last().unwrap().as_ref().unwrap();
        assert_eq!(last, "Partial answer");
    }

    #[tokio::test]
    async fn failure_after_partial_text_keeps_prior_snapshots() {
        let chunks = vec![Ok(Bytes::from_static(b"Par")), Err(fake_stream_error())];
        let items = pump_collect(chunks).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "Par");
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn empty_body_emits_no_snapshots() {
        let items = pump_collect(vec![]).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn multibyte_character_split_across_chunks_is_held_back() {
        // "Hü" with the two bytes of 'ü' split across chunks.
        let chunks = vec![
            Ok(Bytes::from_static(&[b'H', 0xC3])),
            Ok(Bytes::from_static(&[0xBC, b'!'])),
        ];
        let items = pump_collect(chunks).await;

        let snapshots: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(snapshots, vec!["H", "Hü!"]);
    }

    #[tokio::test]
    async fn invalid_bytes_are_dropped_without_poisoning_the_stream() {
        let chunks = vec![
            Ok(Bytes::from_static(b"ok")),
            Ok(Bytes::from_static(&[0xFF, 0xFE])),
            Ok(Bytes::from_static(b" fine")),
        ];
        let items = pump_collect(chunks).await;

        let snapshots: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(snapshots.last().unwrap(), "ok fine");
    }

    #[tokio::test]
    async fn every_snapshot_extends_the_previous_one() {
        let chunks = (0..20)
            .map(|i| Ok(Bytes::from(format!("chunk{} ", i))))
            .collect();
        let items = pump_collect(chunks).await;

        let snapshots: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        for pair in snapshots.windows(2) {
            assert!(
                pair[1].starts_with(pair[0].as_str()),
                "snapshot {:?} does not extend {:?}",
                pair[1],
                pair[0]
            );
        }
    }
}
