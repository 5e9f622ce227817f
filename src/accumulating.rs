//! Accumulates streaming chunks into a complete reply while passing text
//! fragments through.

use std::pin::Pin;

use futures::Stream;

use crate::error::{Error, Result};
use crate::types::{GenerateContentResponse, UsageMetadata};

/// The completed reply assembled from a drained stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Concatenation of every text fragment, in arrival order.
    pub text: String,

    /// Token accounting from the final chunk that carried it, if any.
    pub usage: Option<UsageMetadata>,

    /// The last finish reason seen, if any.
    pub finish_reason: Option<String>,
}

/// A stream wrapper that accumulates response chunks into a complete [`Reply`].
///
/// This allows streaming text fragments to the user while simultaneously
/// building the final reply without buffering twice. Fragments with no text
/// are absorbed silently (their metadata still counts). When the stream is
/// fully drained, the accumulated reply is sent via the oneshot channel
/// returned by `new()`; if the stream yields an error or is dropped early,
/// the receiver resolves to a receive error instead.
pub struct AccumulatingStream {
    inner: Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>,
    reply_tx: Option<tokio::sync::oneshot::Sender<Reply>>,
    text: String,
    usage: Option<UsageMetadata>,
    finish_reason: Option<String>,
}

impl AccumulatingStream {
    /// Wraps a chunk stream, yielding its non-empty text fragments.
    ///
    /// Returns the stream and a receiver that will contain the accumulated
    /// [`Reply`] once the stream is fully drained.
    pub fn new<S>(stream: S) -> (Self, tokio::sync::oneshot::Receiver<Reply>)
    where
        S: Stream<Item = Result<GenerateContentResponse>> + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let this = Self {
            inner: Box::pin(stream),
            reply_tx: Some(tx),
            text: String::new(),
            usage: None,
            finish_reason: None,
        };
        (this, rx)
    }

    fn accumulate_chunk(&mut self, chunk: &GenerateContentResponse) -> String {
        if let Some(usage) = chunk.usage_metadata {
            self.usage = Some(usage);
        }
        if let Some(reason) = chunk
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.clone())
        {
            self.finish_reason = Some(reason);
        }
        let fragment = chunk.text();
        self.text.push_str(&fragment);
        fragment
    }

    fn finalize(&mut self) -> Reply {
        Reply {
            text: std::mem::take(&mut self.text),
            usage: self.usage.take(),
            finish_reason: self.finish_reason.take(),
        }
    }
}

impl Stream for AccumulatingStream {
    type Item = Result<String>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        loop {
            match self.inner.as_mut().poll_next(cx) {
                std::task::Poll::Ready(Some(Ok(chunk))) => {
                    let fragment = self.accumulate_chunk(&chunk);
                    if fragment.is_empty() {
                        // Metadata-only chunk; nothing to emit.
                        continue;
                    }
                    return std::task::Poll::Ready(Some(Ok(fragment)));
                }
                std::task::Poll::Ready(Some(Err(e))) => {
                    return std::task::Poll::Ready(Some(Err(e)));
                }
                std::task::Poll::Ready(None) => {
                    if let Some(tx) = self.reply_tx.take() {
                        let reply = self.finalize();
                        let _ = tx.send(reply);
                    }
                    return std::task::Poll::Ready(None);
                }
                std::task::Poll::Pending => return std::task::Poll::Pending,
            }
        }
    }
}

/// Drains a chunk stream without observing fragments, returning the reply.
///
/// Convenience for callers that want streaming semantics on the wire but a
/// single string in hand.
pub async fn collect_reply<S>(stream: S) -> Result<Reply>
where
    S: Stream<Item = Result<GenerateContentResponse>> + Send + 'static,
{
    use futures::StreamExt;

    let (mut accumulating, reply_rx) = AccumulatingStream::new(stream);
    while let Some(fragment) = accumulating.next().await {
        fragment?;
    }
    reply_rx
        .await
        .map_err(|_| Error::streaming("stream dropped before completing a reply", None))
}

#[cfg(test)]
mod tests {
    use futures::{StreamExt, stream};

    use super::*;
    use crate::types::{Candidate, Content, Role};

    fn chunk(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::with_role(Role::Model, text)),
                finish_reason: None,
            }],
            usage_metadata: None,
            prompt_feedback: None,
        }
    }

    fn metadata_chunk(prompt: u64, candidates: u64) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("STOP".to_string()),
            }],
            usage_metadata: Some(UsageMetadata {
                prompt_token_count: prompt,
                candidates_token_count: candidates,
                total_token_count: prompt + candidates,
            }),
            prompt_feedback: None,
        }
    }

    #[tokio::test]
    async fn fragments_concatenate_into_reply() {
        let chunks = vec![Ok(chunk("Hel")), Ok(chunk("lo!"))];
        let (mut accumulating, reply_rx) = AccumulatingStream::new(stream::iter(chunks));

        let mut fragments = Vec::new();
        while let Some(fragment) = accumulating.next().await {
            fragments.push(fragment.unwrap());
        }
        assert_eq!(fragments, vec!["Hel".to_string(), "lo!".to_string()]);

        let reply = reply_rx.await.unwrap();
        assert_eq!(reply.text, "Hello!");
        assert_eq!(reply.text, fragments.concat());
    }

    #[tokio::test]
    async fn empty_fragments_are_skipped() {
        let chunks = vec![
            Ok(chunk("Hi")),
            Ok(chunk("")),
            Ok(metadata_chunk(4, 2)),
            Ok(chunk(" there")),
        ];
        let (mut accumulating, reply_rx) = AccumulatingStream::new(stream::iter(chunks));

        let mut fragments = Vec::new();
        while let Some(fragment) = accumulating.next().await {
            fragments.push(fragment.unwrap());
        }
        assert_eq!(fragments, vec!["Hi".to_string(), " there".to_string()]);

        let reply = reply_rx.await.unwrap();
        assert_eq!(reply.text, "Hi there");
        assert_eq!(reply.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(reply.usage.unwrap().total_token_count, 6);
    }

    #[tokio::test]
    async fn error_interrupts_without_reply() {
        let chunks = vec![
            Ok(chunk("partial")),
            Err(Error::streaming("connection reset", None)),
        ];
        let (mut accumulating, reply_rx) = AccumulatingStream::new(stream::iter(chunks));

        assert_eq!(accumulating.next().await.unwrap().unwrap(), "partial");
        assert!(accumulating.next().await.unwrap().is_err());
        drop(accumulating);

        assert!(reply_rx.await.is_err());
    }

    #[tokio::test]
    async fn collect_reply_equals_streamed_concatenation() {
        let chunks = vec![Ok(chunk("Hel")), Ok(chunk("lo!")), Ok(metadata_chunk(4, 2))];
        let reply = collect_reply(stream::iter(chunks)).await.unwrap();
        assert_eq!(reply.text, "Hello!");
        assert_eq!(reply.usage.unwrap().candidates_token_count, 2);
    }

    #[test]
    fn collect_reply_propagates_stream_errors() {
        let chunks = vec![Ok(chunk("a")), Err(Error::streaming("reset", None))];
        let result = tokio_test::block_on(collect_reply(stream::iter(chunks)));
        assert!(result.is_err());
    }
}
